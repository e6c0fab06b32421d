//! Monthly climatology: the mean value of each calendar month across years

use crate::series::TimeSeries;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Three-letter English abbreviation of a month number (1 = January)
#[must_use]
pub fn month_abbreviation(month: u32) -> Option<&'static str> {
    MONTH_ABBREVIATIONS.get(usize::try_from(month).ok()?.checked_sub(1)?).copied()
}

/// Mean of all values falling in one calendar month
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthlyMean {
    pub month: u32,
    pub mean: f64,
    /// Number of time steps averaged
    pub count: usize,
}

/// Calendar month (1–12) to mean value, iterated in ascending month order
///
/// Months absent from the input are absent here; nothing is zero-filled.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SeasonalCycle {
    months: BTreeMap<u32, MonthlyMean>,
}

impl SeasonalCycle {
    pub fn len(&self) -> usize {
        self.months.len()
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    /// Mean for `month`, if the input had any values in it
    pub fn get(&self, month: u32) -> Option<f64> {
        self.months.get(&month).map(|m| m.mean)
    }

    pub fn entry(&self, month: u32) -> Option<&MonthlyMean> {
        self.months.get(&month)
    }

    /// Entries in ascending month order
    pub fn iter(&self) -> impl Iterator<Item = &MonthlyMean> + '_ {
        self.months.values()
    }

    pub fn months(&self) -> Vec<u32> {
        self.months.keys().copied().collect()
    }

    pub fn means(&self) -> Vec<f64> {
        self.months.values().map(|m| m.mean).collect()
    }

    /// Total number of time steps that went into the averages
    pub fn total_count(&self) -> usize {
        self.months.values().map(|m| m.count).sum()
    }

    /// Coldest and warmest months, ignoring NaN means
    pub fn extremes(&self) -> Option<(MonthlyMean, MonthlyMean)> {
        let mut finite = self.months.values().filter(|m| m.mean.is_finite());
        let first = *finite.next()?;
        Some(finite.fold((first, first), |(lo, hi), m| {
            (
                if m.mean < lo.mean { *m } else { lo },
                if m.mean > hi.mean { *m } else { hi },
            )
        }))
    }
}

/// Group a series by calendar month and average each group
///
/// Every value is counted, so the per-month counts always sum to the series
/// length; a NaN value makes its month's mean NaN.
pub fn extract_cycle(series: &TimeSeries) -> SeasonalCycle {
    let mut groups: BTreeMap<u32, (f64, usize)> = BTreeMap::new();
    for (time, value) in series.iter() {
        let group = groups.entry(time.month()).or_insert((0.0, 0));
        group.0 += value;
        group.1 += 1;
    }

    let months: BTreeMap<u32, MonthlyMean> = groups
        .into_iter()
        .map(|(month, (sum, count))| {
            #[allow(clippy::cast_precision_loss)]
            let mean = sum / count as f64;
            (month, MonthlyMean { month, mean, count })
        })
        .collect();

    debug!(months = months.len(), steps = series.len(), "extracted monthly climatology");

    SeasonalCycle { months }
}
