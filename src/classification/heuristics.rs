//! Heuristic drivers turning graphs and coverage into [`AnalysisRecord`]s.

use super::{classify_count, directness_ratio, Dimension};
use crate::analysis::CallDepths;
use crate::coverage::CoverageRecord;
use crate::graph::{closure_all, UnitGraph};
use crate::record::AnalysisRecord;
use crate::unit::Unit;

pub const METRIC_COVERAGE_LABEL: &str = "coverage_label";
pub const METRIC_COVERED_LINES: &str = "covered_lines";
pub const METRIC_CALL_DEPTH: &str = "call_depth";
pub const METRIC_DIRECTNESS: &str = "directness_ratio";

fn source_of(unit: &Unit) -> Option<std::path::PathBuf> {
    unit.source().map(|path| path.to_path_buf())
}

/// Label each test of `graph` by its reachability closure, once per dimension.
pub fn structural_records(graph: &UnitGraph, pool: &rayon::ThreadPool) -> Vec<AnalysisRecord> {
    let tests = graph.test_nodes();
    let closures = closure_all(graph, &tests, pool);

    tests
        .iter()
        .map(|test| {
            let stored = graph.node(test).unwrap_or(test);
            let mut record =
                AnalysisRecord::new(test.to_string()).with_path(source_of(stored));
            if let Some(closure) = closures.get(test) {
                for dimension in Dimension::ALL {
                    record = record.with_metric(
                        dimension.metric_name(),
                        classify_count(dimension.count(closure)),
                    );
                }
            }
            record
        })
        .collect()
}

/// Label each covered test by the number of distinct production units it
/// executed, with its total covered line count.
pub fn coverage_records(coverage: &CoverageRecord) -> Vec<AnalysisRecord> {
    coverage
        .sorted_tests()
        .iter()
        .map(|test| {
            let stored = coverage.test(test).unwrap_or(test);
            let covered = coverage.covered(test);
            AnalysisRecord::new(test.to_string())
                .with_path(source_of(stored))
                .with_metric(
                    METRIC_COVERAGE_LABEL,
                    classify_count(Dimension::Units.count(&covered)),
                )
                .with_metric(METRIC_COVERED_LINES, coverage.total_lines(test))
        })
        .collect()
}

pub fn call_depth_records(depths: &CallDepths) -> Vec<AnalysisRecord> {
    depths
        .iter()
        .map(|(test, depth)| AnalysisRecord::new(test.clone()).with_metric(METRIC_CALL_DEPTH, depth))
        .collect()
}

pub fn directness_records(graph: &UnitGraph) -> Vec<AnalysisRecord> {
    graph
        .test_nodes()
        .iter()
        .map(|test| {
            let stored = graph.node(test).unwrap_or(test);
            AnalysisRecord::new(test.to_string())
                .with_path(source_of(stored))
                .with_metric(METRIC_DIRECTNESS, directness_ratio(graph, test))
        })
        .collect()
}
