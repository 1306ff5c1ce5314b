//! Coverage aggregation.
//!
//! Coverage arrives as independent sessions, one per test execution. Each
//! session is parsed and merged on its own rayon task into a shared
//! [`DashMap`] keyed by test unit; the join of the parallel iterator is the
//! only synchronization point. The result is then frozen into a plain
//! [`CoverageRecord`].
//!
//! Merging is additive: covered-unit sets are unioned and line counts are
//! summed per covered unit, so repeated sessions for the same test (for
//! example parameterized runs) accumulate.

pub mod jvm;
pub mod python;

use crate::errors::Result;
use crate::unit::Unit;
use dashmap::DashMap;
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

pub use jvm::{parse_jvm_session, JvmSession, SESSION_DELIMITER, TEST_METHOD_SIGNATURE};
pub use python::{load_python_records, parse_python_records, PythonTestRecord, PythonTestedMethod};

/// Coverage produced by one test execution.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageSession {
    pub id: String,
    pub test: Unit,
    /// Covered unit and the number of lines it had covered.
    pub covered: Vec<(Unit, u64)>,
}

/// Test unit -> covered unit -> covered line count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoverageRecord {
    entries: HashMap<Unit, HashMap<Unit, u64>>,
}

impl CoverageRecord {
    pub fn tests(&self) -> impl Iterator<Item = &Unit> {
        self.entries.keys()
    }

    pub fn sorted_tests(&self) -> Vec<Unit> {
        let mut tests: Vec<Unit> = self.entries.keys().cloned().collect();
        tests.sort();
        tests
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The stored test unit, which carries the source path if one was known.
    pub fn test(&self, test: &Unit) -> Option<&Unit> {
        self.entries.get_key_value(test).map(|(unit, _)| unit)
    }

    pub fn covered(&self, test: &Unit) -> HashSet<Unit> {
        self.entries
            .get(test)
            .map(|units| units.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn lines(&self, test: &Unit, unit: &Unit) -> u64 {
        self.entries
            .get(test)
            .and_then(|units| units.get(unit))
            .copied()
            .unwrap_or(0)
    }

    pub fn total_lines(&self, test: &Unit) -> u64 {
        self.entries
            .get(test)
            .map(|units| units.values().sum())
            .unwrap_or(0)
    }

    /// Covered sets keyed by test, the shape classification consumes.
    pub fn to_mapping(&self) -> HashMap<Unit, HashSet<Unit>> {
        self.entries
            .iter()
            .map(|(test, units)| (test.clone(), units.keys().cloned().collect()))
            .collect()
    }
}

/// Sessions accepted and skipped during one aggregation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoverageSummary {
    pub accepted: usize,
    pub skipped: usize,
}

#[derive(Debug, Default)]
struct AggregationStats {
    accepted: AtomicUsize,
    skipped: AtomicUsize,
}

impl AggregationStats {
    fn summary(&self) -> CoverageSummary {
        CoverageSummary {
            accepted: self.accepted.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
        }
    }
}

/// Parse and merge every input on `pool`.
///
/// `parse` runs once per input; inputs it rejects are logged and counted as
/// skipped, never fatal.
pub fn aggregate<T, F>(
    inputs: &[T],
    parse: F,
    pool: &rayon::ThreadPool,
) -> (CoverageRecord, CoverageSummary)
where
    T: Sync,
    F: Fn(&T) -> Result<CoverageSession> + Sync,
{
    let _span = tracing::info_span!("coverage_aggregation", sessions = inputs.len()).entered();

    let merged: DashMap<Unit, HashMap<Unit, u64>> = DashMap::new();
    let stats = AggregationStats::default();

    pool.install(|| {
        inputs.par_iter().for_each(|input| match parse(input) {
            Ok(session) => {
                merge_session(&merged, session);
                stats.accepted.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                tracing::warn!(error = %e, "skipping coverage session");
                stats.skipped.fetch_add(1, Ordering::Relaxed);
            }
        });
    });

    let summary = stats.summary();
    tracing::info!(
        accepted = summary.accepted,
        skipped = summary.skipped,
        tests = merged.len(),
        "coverage aggregated"
    );

    let record = CoverageRecord {
        entries: merged.into_iter().collect(),
    };
    (record, summary)
}

/// Aggregate sessions that are already parsed.
pub fn aggregate_sessions(
    sessions: &[CoverageSession],
    pool: &rayon::ThreadPool,
) -> (CoverageRecord, CoverageSummary) {
    aggregate(sessions, |session| Ok(session.clone()), pool)
}

fn merge_session(merged: &DashMap<Unit, HashMap<Unit, u64>>, session: CoverageSession) {
    let mut entry = merged.entry(session.test).or_default();
    for (unit, lines) in session.covered {
        *entry.entry(unit).or_insert(0) += lines;
    }
}
