//! Per-test output rows.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Metrics gathered for one test by one or more heuristics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    /// Qualified name of the test.
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    pub metrics: BTreeMap<String, String>,
}

impl AnalysisRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            path: None,
            metrics: BTreeMap::new(),
        }
    }

    pub fn with_path(mut self, path: Option<PathBuf>) -> Self {
        self.path = path;
        self
    }

    pub fn with_metric(mut self, name: &str, value: impl ToString) -> Self {
        self.metrics.insert(name.to_string(), value.to_string());
        self
    }

    pub fn metric(&self, name: &str) -> Option<&str> {
        self.metrics.get(name).map(String::as_str)
    }
}

/// Combine records from several heuristics into one row per test.
///
/// Later records win on metric name collisions; the first known path is kept.
pub fn merge_records<I>(records: I) -> Vec<AnalysisRecord>
where
    I: IntoIterator<Item = AnalysisRecord>,
{
    let mut merged: BTreeMap<String, AnalysisRecord> = BTreeMap::new();
    for record in records {
        match merged.get_mut(&record.id) {
            Some(existing) => {
                if existing.path.is_none() {
                    existing.path = record.path;
                }
                existing.metrics.extend(record.metrics);
            }
            None => {
                merged.insert(record.id.clone(), record);
            }
        }
    }
    merged.into_values().collect()
}
