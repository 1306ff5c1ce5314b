//! Worker pool configuration for the concurrent analysis passes.
//!
//! Path analysis, closure computation and coverage aggregation each run one
//! independent task per test or session on a dedicated rayon pool sized from
//! this configuration.

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};

/// Default pool size when none is configured
const DEFAULT_WORKERS: usize = 4;

/// Default value for parallel processing enabled
fn default_enabled() -> bool {
    true
}

/// Configuration for parallel processing operations.
///
/// # Example
///
/// ```rust
/// use testlens::config::ParallelConfig;
///
/// let config = ParallelConfig {
///     enabled: true,
///     max_concurrency: Some(2),
/// };
/// assert_eq!(config.effective_concurrency(), 2);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParallelConfig {
    /// Enable parallel processing (default: true)
    ///
    /// When disabled, every pass runs on a single worker.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Worker count (default: 4)
    #[serde(default)]
    pub max_concurrency: Option<usize>,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            max_concurrency: None,
        }
    }
}

impl ParallelConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a config with parallel processing disabled.
    pub fn sequential() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    pub fn with_workers(workers: usize) -> Self {
        Self {
            enabled: true,
            max_concurrency: Some(workers),
        }
    }

    /// Get the effective concurrency level.
    pub fn effective_concurrency(&self) -> usize {
        if !self.enabled {
            return 1;
        }
        self.max_concurrency.unwrap_or(DEFAULT_WORKERS).max(1)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_concurrency == Some(0) {
            return Err(Error::config("parallel.max_concurrency must be at least 1"));
        }
        Ok(())
    }

    /// Build a dedicated pool; the global rayon pool is left untouched.
    pub fn build_pool(&self) -> Result<rayon::ThreadPool> {
        rayon::ThreadPoolBuilder::new()
            .num_threads(self.effective_concurrency())
            .thread_name(|index| format!("testlens-worker-{index}"))
            .build()
            .map_err(|e| Error::config(format!("failed to build worker pool: {e}")))
    }
}
