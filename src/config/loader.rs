use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::core::AnalysisConfig;

pub const CONFIG_FILE_NAME: &str = ".testlens.toml";

/// Parse and validate config from a TOML string
pub fn parse_and_validate_config(contents: &str) -> Result<AnalysisConfig> {
    let config = toml::from_str::<AnalysisConfig>(contents)
        .with_context(|| format!("Failed to parse {}", CONFIG_FILE_NAME))?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from an explicit path.
pub fn load_config(path: &Path) -> Result<AnalysisConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config = parse_and_validate_config(&contents)
        .with_context(|| format!("Invalid config file: {}", path.display()))?;
    tracing::debug!("Loaded config from {}", path.display());
    Ok(config)
}

/// Generate directory ancestors up to a depth limit
pub fn directory_ancestors(start: PathBuf, max_depth: usize) -> impl Iterator<Item = PathBuf> {
    std::iter::successors(Some(start), |dir| {
        let mut parent = dir.clone();
        if parent.pop() {
            Some(parent)
        } else {
            None
        }
    })
    .take(max_depth)
}

/// Search `start` and its ancestors for a config file.
///
/// Falls back to the default configuration when none is found. A file that
/// exists but fails to parse is an error rather than a silent fallback.
pub fn discover_config(start: &Path) -> Result<AnalysisConfig> {
    const MAX_TRAVERSAL_DEPTH: usize = 10;

    match directory_ancestors(start.to_path_buf(), MAX_TRAVERSAL_DEPTH)
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find(|path| path.is_file())
    {
        Some(path) => load_config(&path),
        None => {
            tracing::debug!(
                "No config found after checking {} directories. Using default config.",
                MAX_TRAVERSAL_DEPTH
            );
            Ok(AnalysisConfig::default())
        }
    }
}
