//! Coverage records of the dynamic target.
//!
//! The tracer writes a JSON array with one record per test function:
//!
//! ```json
//! [{"module": "tests.test_billing", "class": "TestBilling", "method": "test_total",
//!   "file": "tests/test_billing.py", "line": 12,
//!   "tested_methods": [{"module": "app.billing", "method": "total", "covered_lines": 5}]}]
//! ```
//!
//! `covered_lines` may be a count or the list of covered line numbers.

use super::CoverageSession;
use crate::errors::{Error, Result};
use crate::unit::Unit;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PythonTestRecord {
    pub module: String,
    #[serde(default)]
    pub class: Option<String>,
    pub method: String,
    pub file: PathBuf,
    #[serde(default)]
    pub line: Option<u32>,
    #[serde(default)]
    pub tested_methods: Vec<PythonTestedMethod>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PythonTestedMethod {
    /// Defaults to the test's own module.
    #[serde(default)]
    pub module: Option<String>,
    #[serde(default)]
    pub class: Option<String>,
    pub method: String,
    pub covered_lines: CoveredLines,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CoveredLines {
    Count(u64),
    Lines(Vec<u32>),
}

impl CoveredLines {
    pub fn count(&self) -> u64 {
        match self {
            CoveredLines::Count(n) => *n,
            CoveredLines::Lines(lines) => lines.len() as u64,
        }
    }
}

fn qualified(module: &str, class: Option<&str>, method: &str) -> String {
    match class.filter(|c| !c.is_empty()) {
        Some(class) => format!("{module}.{class}.{method}"),
        None => format!("{module}.{method}"),
    }
}

impl PythonTestRecord {
    pub fn qualified_name(&self) -> String {
        qualified(&self.module, self.class.as_deref(), &self.method)
    }

    pub fn to_session(&self) -> Result<CoverageSession> {
        if self.method.trim().is_empty() {
            return Err(Error::coverage(format!(
                "record in {} has an empty test method",
                self.file.display()
            )));
        }

        let id = self.qualified_name();
        let covered = self
            .tested_methods
            .iter()
            .filter(|tested| !tested.method.trim().is_empty())
            .map(|tested| {
                let module = tested.module.as_deref().unwrap_or(&self.module);
                let name = qualified(module, tested.class.as_deref(), &tested.method);
                (Unit::method(name, None), tested.covered_lines.count())
            })
            .collect();

        Ok(CoverageSession {
            test: Unit::method(id.clone(), None).with_source(&self.file),
            id,
            covered,
        })
    }
}

pub fn parse_python_records(json: &str) -> Result<Vec<PythonTestRecord>> {
    Ok(serde_json::from_str(json)?)
}

pub fn load_python_records(path: &Path) -> Result<Vec<PythonTestRecord>> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    parse_python_records(&content)
}
