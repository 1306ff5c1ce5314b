//! Factories for graphs and coverage sessions named by plain strings.

use crate::config::Granularity;
use crate::coverage::CoverageSession;
use crate::graph::{EdgeKind, UnitGraph};
use crate::unit::Unit;

/// Class-granularity call graph with one `Direct` edge per pair.
pub fn class_graph(edges: &[(&str, &str)]) -> UnitGraph {
    let mut graph = UnitGraph::call_graph(Granularity::Class);
    for (caller, callee) in edges {
        graph.add_call(Unit::class(*caller), Unit::class(*callee), EdgeKind::Direct);
    }
    graph
}

/// Method-granularity call graph; every method takes no parameters.
pub fn method_graph(edges: &[(&str, &str)]) -> UnitGraph {
    let mut graph = UnitGraph::call_graph(Granularity::Method);
    for (caller, callee) in edges {
        graph.add_call(method(caller), method(callee), EdgeKind::Direct);
    }
    graph
}

pub fn method(fqn: &str) -> Unit {
    Unit::method(fqn, Some("()".to_string()))
}

/// Session for test method `test` covering classes with line counts.
///
/// The test unit has the same identity as [`method`] gives it in a graph.
pub fn coverage_session(test: &str, covered: &[(&str, u64)]) -> CoverageSession {
    CoverageSession {
        id: test.to_string(),
        test: method(test),
        covered: covered
            .iter()
            .map(|(class, lines)| (Unit::class(*class), *lines))
            .collect(),
    }
}
