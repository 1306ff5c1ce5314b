//! Analysis configuration.

mod core;
mod loader;
mod parallel;

pub use self::core::{AnalysisConfig, Granularity, Language};
pub use loader::{
    directory_ancestors, discover_config, load_config, parse_and_validate_config,
    CONFIG_FILE_NAME,
};
pub use parallel::ParallelConfig;
