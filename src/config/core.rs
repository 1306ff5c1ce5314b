use super::parallel::ParallelConfig;
use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Target language of the analyzed project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Compiled to JVM class files ahead of time.
    Jvm,
    /// Interpreted; graphs come from external extractor output.
    Python,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::Jvm => f.write_str("jvm"),
            Language::Python => f.write_str("python"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Method,
    Class,
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Granularity::Method => f.write_str("method"),
            Granularity::Class => f.write_str("class"),
        }
    }
}

fn default_language() -> Language {
    Language::Jvm
}

fn default_granularity() -> Granularity {
    Granularity::Method
}

/// Settings for one analysis run, read from `.testlens.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisConfig {
    #[serde(default = "default_language")]
    pub language: Language,

    #[serde(default = "default_granularity")]
    pub granularity: Granularity,

    /// Fold inner and synthetic classes into their host after building.
    #[serde(default)]
    pub collapse_synthetic: bool,

    /// Directories searched when mapping qualified names to source files.
    #[serde(default)]
    pub source_roots: Vec<PathBuf>,

    #[serde(default)]
    pub parallel: ParallelConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            granularity: default_granularity(),
            collapse_synthetic: false,
            source_roots: Vec::new(),
            parallel: ParallelConfig::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<()> {
        self.parallel.validate()?;
        if self.collapse_synthetic && self.language != Language::Jvm {
            return Err(Error::config(
                "collapse_synthetic only applies to jvm class names",
            ));
        }
        if self.collapse_synthetic && self.granularity != Granularity::Class {
            return Err(Error::config(
                "collapse_synthetic requires class granularity",
            ));
        }
        Ok(())
    }
}
