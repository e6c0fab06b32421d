use netcdf::{create, open, AttributeValue};
use seasonal_cycle::{
    errors::{Result, SeasonalCycleError},
    netcdf_io::{load_gridded_series, open_gridded_series, LoadOptions, NetCDFWriter},
    pipeline::{run, PipelineConfig},
    report::{write_json, ReportStyle},
};
use std::f64::consts::PI;
use std::path::Path;
use tempfile::tempdir;

const N_TIME: usize = 120;
const LATS: [f32; 5] = [-10.0, -5.0, 0.0, 5.0, 10.0];
const LONS: [f32; 6] = [170.0, 180.0, 190.0, 200.0, 240.0, 250.0];
const FILL: f32 = 1.0e36;
const NOLEAP_MONTH_START: [f64; 12] = [
    0.0, 31.0, 59.0, 90.0, 120.0, 151.0, 181.0, 212.0, 243.0, 273.0, 304.0, 334.0,
];

fn seasonal(month: usize) -> f64 {
    2.0 * (2.0 * PI * month as f64 / 12.0).sin()
}

/// A CESM-like monthly TS file on a noleap calendar, 1990-2000
fn create_test_file(path: &Path) -> Result<()> {
    let mut file = create(path)?;
    file.add_attribute("title", "Synthetic surface temperature")?;

    file.add_dimension("time", N_TIME)?;
    file.add_dimension("lat", LATS.len())?;
    file.add_dimension("lon", LONS.len())?;

    {
        let mut time = file.add_variable::<f64>("time", &["time"])?;
        time.put_attribute("units", "days since 1990-01-01 00:00:00")?;
        time.put_attribute("calendar", "noleap")?;
        let offsets: Vec<f64> = (0..N_TIME)
            .map(|i| 365.0 * (i / 12) as f64 + NOLEAP_MONTH_START[i % 12] + 14.0)
            .collect();
        time.put_values(&offsets, ..)?;
    }
    {
        let mut lat = file.add_variable::<f32>("lat", &["lat"])?;
        lat.put_attribute("units", "degrees_north")?;
        lat.put_values(&LATS, ..)?;
    }
    {
        let mut lon = file.add_variable::<f32>("lon", &["lon"])?;
        lon.put_attribute("units", "degrees_east")?;
        lon.put_values(&LONS, ..)?;
    }
    {
        let mut ts = file.add_variable::<f32>("TS", &["time", "lat", "lon"])?;
        ts.put_attribute("units", "K")?;
        ts.put_attribute("long_name", "Surface temperature (radiative)")?;
        ts.put_attribute("_FillValue", FILL)?;

        let mut data = Vec::with_capacity(N_TIME * LATS.len() * LONS.len());
        for i in 0..N_TIME {
            for (j, _) in LATS.iter().enumerate() {
                for (k, _) in LONS.iter().enumerate() {
                    // The corner point is masked and sits outside the default box
                    if j == 0 && k == 0 {
                        data.push(FILL);
                    } else {
                        let value = 300.0 + seasonal(i % 12 + 1) + 0.01 * i as f64 + j as f64;
                        data.push(value as f32);
                    }
                }
            }
        }
        ts.put_values(&data, ..)?;
    }

    Ok(())
}

#[test]
fn test_load_gridded_series() -> Result<()> {
    let temp_dir = tempdir()?;
    let file_path = temp_dir.path().join("ts.nc");
    create_test_file(&file_path)?;

    let field = open_gridded_series(&file_path, &LoadOptions::default())?;
    assert_eq!(field.variable(), "TS");
    assert_eq!(field.units(), Some("K"));
    assert_eq!(field.dim(), (N_TIME, 5, 6));
    assert_eq!(field.lat().to_vec(), vec![-10.0, -5.0, 0.0, 5.0, 10.0]);
    assert_eq!(field.lon()[4], 240.0);

    // noleap decoding keeps every step on the 15th of its month
    for (i, t) in field.time().iter().enumerate() {
        assert_eq!(t.month() as usize, i % 12 + 1);
        assert_eq!(t.day, 15);
        assert_eq!(t.year, 1990 + (i / 12) as i32);
    }

    assert!(field.values()[[0, 0, 0]].is_nan());
    assert!(field.values()[[0, 0, 1]].is_finite());
    Ok(())
}

#[test]
fn test_load_errors() -> Result<()> {
    let temp_dir = tempdir()?;
    let file_path = temp_dir.path().join("bad.nc");
    {
        let mut file = create(&file_path)?;
        file.add_dimension("time", 2)?;
        file.add_dimension("lat", 2)?;
        file.add_dimension("lon", 2)?;
        {
            // No units on the time coordinate
            let mut time = file.add_variable::<f64>("time", &["time"])?;
            time.put_values(&[0.0, 31.0], ..)?;
        }
        {
            let mut lat = file.add_variable::<f64>("lat", &["lat"])?;
            lat.put_values(&[0.0, 1.0], ..)?;
        }
        {
            let mut lon = file.add_variable::<f64>("lon", &["lon"])?;
            lon.put_values(&[0.0, 1.0], ..)?;
        }
        {
            let mut flat = file.add_variable::<f32>("flat", &["lat", "lon"])?;
            flat.put_values(&[1.0_f32, 2.0, 3.0, 4.0], ..)?;
        }
        {
            let mut ts = file.add_variable::<f32>("TS", &["time", "lat", "lon"])?;
            ts.put_values(&[0.0_f32; 8], ..)?;
        }
    }

    let file = open(&file_path)?;

    match load_gridded_series(&file, &LoadOptions::new("missing")) {
        Err(SeasonalCycleError::VariableNotFound { var }) => assert_eq!(var, "missing"),
        other => panic!("Expected VariableNotFound error, got {other:?}"),
    }
    assert!(matches!(
        load_gridded_series(&file, &LoadOptions::new("flat")),
        Err(SeasonalCycleError::MalformedInput { .. })
    ));
    match load_gridded_series(&file, &LoadOptions::new("TS")) {
        Err(SeasonalCycleError::MalformedInput { message }) => assert!(message.contains("units")),
        other => panic!("Expected MalformedInput error, got {other:?}"),
    }
    Ok(())
}

#[test]
fn test_load_transposed_dimensions() -> Result<()> {
    let temp_dir = tempdir()?;
    let file_path = temp_dir.path().join("transposed.nc");
    {
        let mut file = create(&file_path)?;
        file.add_dimension("latitude", 2)?;
        file.add_dimension("longitude", 3)?;
        file.add_dimension("time", 4)?;
        {
            let mut time = file.add_variable::<f64>("time", &["time"])?;
            time.put_attribute("units", "days since 2000-01-01")?;
            time.put_values(&[0.0, 31.0, 60.0, 91.0], ..)?;
        }
        {
            let mut lat = file.add_variable::<f64>("latitude", &["latitude"])?;
            lat.put_values(&[-1.0, 1.0], ..)?;
        }
        {
            let mut lon = file.add_variable::<f64>("longitude", &["longitude"])?;
            lon.put_values(&[0.0, 1.0, 2.0], ..)?;
        }
        {
            // value = 100 * lat + 10 * lon + time
            let data: Vec<f64> = (0..2)
                .flat_map(|j| (0..3).flat_map(move |k| (0..4).map(move |t| f64::from(100 * j + 10 * k + t))))
                .collect();
            let mut tas = file.add_variable::<f64>("tas", &["latitude", "longitude", "time"])?;
            tas.put_attribute("scale_factor", 0.5)?;
            tas.put_attribute("add_offset", 1.0)?;
            tas.put_values(&data, ..)?;
        }
    }

    let file = open(&file_path)?;
    let field = load_gridded_series(&file, &LoadOptions::new("tas"))?;
    assert_eq!(field.dim(), (4, 2, 3));
    assert_eq!(field.units(), None);
    assert_eq!(field.time()[2].month(), 3);
    // time 3, lat 1, lon 2 -> raw 123 -> 123 * 0.5 + 1
    assert_eq!(field.values()[[3, 1, 2]], 62.5);
    assert_eq!(field.values()[[0, 0, 0]], 1.0);
    Ok(())
}

#[test]
fn test_pipeline_round_trip() -> Result<()> {
    let temp_dir = tempdir()?;
    let file_path = temp_dir.path().join("ts.nc");
    create_test_file(&file_path)?;

    let input = open(&file_path)?;
    let field = load_gridded_series(&input, &LoadOptions::default())?;
    let output = run(&field, &PipelineConfig::default())?;

    // lat -5..5 (3 rows) x lon 180..240 (4 columns)
    assert_eq!(output.grid_points, 12);
    assert_eq!(output.regional_mean.len(), N_TIME);
    assert_eq!(output.cycle.len(), 12);
    assert_eq!(output.cycle.total_count(), N_TIME);

    let level = output.regional_mean.mean();
    for m in output.cycle.iter() {
        assert!(
            (m.mean - level - seasonal(m.month as usize)).abs() < 0.1,
            "month {} mean {} too far from {}",
            m.month,
            m.mean,
            level + seasonal(m.month as usize)
        );
    }

    // NetCDF export
    let nc_path = temp_dir.path().join("cycle.nc");
    NetCDFWriter::new(&input, &nc_path).write_output(&output, true)?;

    let written = open(&nc_path)?;
    let months: Vec<i32> = written.variable("month").expect("month variable").get_values(..)?;
    assert_eq!(months, (1..=12).collect::<Vec<i32>>());

    let cycle_var = written.variable("TS").expect("cycle variable");
    let cycle: Vec<f64> = cycle_var.get_values(..)?;
    assert_eq!(cycle, output.cycle.means());
    assert!(matches!(
        cycle_var.attribute("units").map(|a| a.value()),
        Some(Ok(AttributeValue::Str(ref units))) if units == "K"
    ));
    assert!(cycle_var.attribute("_FillValue").is_none());

    let counts: Vec<i32> = written.variable("sample_count").expect("counts").get_values(..)?;
    assert!(counts.iter().all(|&c| c == 10));

    let detrended: Vec<f64> = written
        .variable("TS_detrended")
        .expect("detrended series")
        .get_values(..)?;
    assert_eq!(detrended.len(), N_TIME);
    assert!(written.variable("TS_regional_mean").is_some());
    assert!(written.variable("TS_trend").is_some());
    assert!(written.attribute("history").is_some());

    // JSON export
    let json_path = temp_dir.path().join("cycle.json");
    write_json(&output, &ReportStyle::default(), &json_path)?;
    let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&json_path)?)?;
    assert_eq!(json["grid_points"], 12);
    assert_eq!(json["units"], "K");
    assert_eq!(json["months"].as_array().map(Vec::len), Some(12));

    Ok(())
}
