//! Error types for graph loading, decoding and classification.
//!
//! Only two states abort a loader: an extractor that exits non-zero and a
//! graph that ends up with no nodes. Everything else is reported per item,
//! per session or per heuristic, and callers are expected to log and skip.

use crate::config::{Granularity, Language};
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// File system errors while reading analysis inputs
    #[error("I/O error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The built graph has no nodes; the target project is likely not compiled
    #[error("graph loaded from {origin} has no nodes; is the target project built?")]
    EmptyGraph { origin: String },

    /// An external extraction tool reported failure
    #[error("{tool} exited with status {code}")]
    ExtractorFailed { tool: String, code: i32 },

    /// Malformed class file
    #[error("malformed class file at byte {offset}: {message}")]
    ClassFormat { message: String, offset: usize },

    /// No builder or heuristic is registered for the current configuration
    #[error("no {what} registered for {language}/{granularity}")]
    NoApplicableMethod {
        what: &'static str,
        language: Language,
        granularity: Granularity,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed coverage session data
    #[error("Coverage error: {0}")]
    Coverage(String),

    /// JSON errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn empty_graph(origin: impl Into<String>) -> Self {
        Self::EmptyGraph {
            origin: origin.into(),
        }
    }

    pub fn class_format(message: impl Into<String>, offset: usize) -> Self {
        Self::ClassFormat {
            message: message.into(),
            offset,
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn coverage(message: impl Into<String>) -> Self {
        Self::Coverage(message.into())
    }

    /// Fatal errors abort the whole loading step; the rest are per-item.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::EmptyGraph { .. } | Self::ExtractorFailed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(Error::empty_graph("target/classes").is_fatal());
        assert!(Error::ExtractorFailed {
            tool: "jdeps".into(),
            code: 2
        }
        .is_fatal());
        assert!(!Error::class_format("bad magic", 0).is_fatal());
        assert!(!Error::coverage("missing test id").is_fatal());
    }

    #[test]
    fn test_messages_name_the_context() {
        let err = Error::NoApplicableMethod {
            what: "graph builder",
            language: Language::Python,
            granularity: Granularity::Method,
        };
        assert_eq!(
            err.to_string(),
            "no graph builder registered for python/method"
        );

        let err = Error::ExtractorFailed {
            tool: "pydeps".into(),
            code: 1,
        };
        assert_eq!(err.to_string(), "pydeps exited with status 1");
    }
}
