//! Unit / integration classification of tests.
//!
//! Every heuristic reduces a test to a set of units it depends on (its call
//! closure, the units it covered, ...). Test units in that set are dropped,
//! the rest is projected onto a [`Dimension`], and the size of the
//! projection picks the [`Label`]: nothing is unknown, exactly one
//! dependency is a unit test, anything more is an integration test.

mod heuristics;

pub use heuristics::{
    call_depth_records, coverage_records, directness_records, structural_records,
    METRIC_CALL_DEPTH, METRIC_COVERAGE_LABEL, METRIC_COVERED_LINES, METRIC_DIRECTNESS,
};

use crate::graph::UnitGraph;
use crate::unit::Unit;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Unit,
    Integration,
    Unknown,
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Unit => f.write_str("unit"),
            Label::Integration => f.write_str("integration"),
            Label::Unknown => f.write_str("unknown"),
        }
    }
}

/// What a dependency is counted as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    /// Every distinct unit.
    Units,
    /// Distinct enclosing classes.
    Classes,
    /// Distinct packages.
    Packages,
}

impl Dimension {
    pub const ALL: [Dimension; 3] = [Dimension::Units, Dimension::Classes, Dimension::Packages];

    /// Metric name for labels along this dimension.
    pub fn metric_name(&self) -> &'static str {
        match self {
            Dimension::Units => "label_units",
            Dimension::Classes => "label_classes",
            Dimension::Packages => "label_packages",
        }
    }

    /// Number of distinct non-test dependencies along this dimension.
    pub fn count(&self, dependencies: &HashSet<Unit>) -> usize {
        let production = dependencies.iter().filter(|unit| !unit.is_test());
        match self {
            Dimension::Units => production.count(),
            Dimension::Classes => production
                .map(Unit::class_name)
                .collect::<HashSet<_>>()
                .len(),
            Dimension::Packages => production
                .map(Unit::package)
                .collect::<HashSet<_>>()
                .len(),
        }
    }
}

pub fn classify_count(count: usize) -> Label {
    match count {
        0 => Label::Unknown,
        1 => Label::Unit,
        _ => Label::Integration,
    }
}

/// Label every test in `mapping` by the size of its projected dependency set.
pub fn classify(
    mapping: &HashMap<Unit, HashSet<Unit>>,
    dimension: Dimension,
) -> BTreeMap<Unit, Label> {
    mapping
        .iter()
        .map(|(test, dependencies)| (test.clone(), classify_count(dimension.count(dependencies))))
        .collect()
}

/// Share of all production units in `graph` that are direct neighbours of
/// `test`, as a percentage rounded to four decimals.
pub fn directness_ratio(graph: &UnitGraph, test: &Unit) -> f64 {
    let production = graph.nodes().filter(|unit| !unit.is_test()).count();
    if production == 0 {
        return 0.0;
    }
    let adjacent = graph
        .adjacent(test)
        .iter()
        .filter(|unit| !unit.is_test())
        .count();
    round4(100.0 * adjacent as f64 / production as f64)
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
