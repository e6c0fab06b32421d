//! Parallel processing configuration
//!
//! The spatial reduction runs on Rayon's global pool; this module sizes it.

use crate::errors::{Result, SeasonalCycleError};
use rayon::ThreadPoolBuilder;
use tracing::info;

/// Configuration for parallel processing
#[derive(Debug, Clone, Default)]
pub struct ParallelConfig {
    pub num_threads: Option<usize>,
}

impl ParallelConfig {
    pub fn new(num_threads: Option<usize>) -> Self {
        Self { num_threads }
    }

    /// Use every available CPU core
    pub fn all_cores() -> Self {
        Self {
            num_threads: Some(num_cpus::get()),
        }
    }

    pub fn with_threads(num_threads: usize) -> Self {
        Self {
            num_threads: Some(num_threads),
        }
    }

    /// Set up the global Rayon thread pool
    ///
    /// # Errors
    ///
    /// Returns [`SeasonalCycleError::ThreadPoolError`] if the global pool was
    /// already initialised or cannot be built.
    pub fn setup_global_pool(&self) -> Result<()> {
        if let Some(num_threads) = self.num_threads {
            ThreadPoolBuilder::new()
                .num_threads(num_threads)
                .build_global()
                .map_err(|e| {
                    SeasonalCycleError::ThreadPoolError(format!(
                        "Failed to initialize thread pool with {num_threads} threads: {e}"
                    ))
                })?;
            info!(threads = num_threads, "configured parallel processing");
        } else {
            info!(
                threads = rayon::current_num_threads(),
                cores = num_cpus::get(),
                "using default thread pool"
            );
        }

        Ok(())
    }

    /// Threads in the current pool
    pub fn current_threads(&self) -> usize {
        rayon::current_num_threads()
    }
}
