//! Cycle-safe reachability closure.

use super::types::UnitGraph;
use crate::unit::Unit;
use dashmap::DashMap;
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};

/// All units transitively reachable from `start`, excluding `start` itself.
///
/// Iterative depth-first search; the visited set makes cycles terminate.
/// A start node that reaches itself through a cycle is still excluded, since
/// a unit does not depend on itself.
pub fn closure(graph: &UnitGraph, start: &Unit) -> HashSet<Unit> {
    let mut visited: HashSet<&Unit> = HashSet::new();
    let mut stack: Vec<&Unit> = graph.successors_iter(start).collect();

    while let Some(current) = stack.pop() {
        if !visited.insert(current) {
            continue;
        }
        for callee in graph.successors_iter(current) {
            if !visited.contains(callee) {
                stack.push(callee);
            }
        }
    }

    visited.remove(start);
    visited.into_iter().cloned().collect()
}

/// Closures for many start nodes, computed in parallel on `pool`.
pub fn closure_all(
    graph: &UnitGraph,
    starts: &[Unit],
    pool: &rayon::ThreadPool,
) -> HashMap<Unit, HashSet<Unit>> {
    let results: DashMap<Unit, HashSet<Unit>> = DashMap::new();

    pool.install(|| {
        starts.par_iter().for_each(|start| {
            results.insert(start.clone(), closure(graph, start));
        });
    });

    results.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Granularity;
    use crate::graph::EdgeKind;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn class(name: &str) -> Unit {
        Unit::class(name)
    }

    fn set(names: &[&str]) -> HashSet<Unit> {
        names.iter().map(|n| class(n)).collect()
    }

    #[test]
    fn test_closure_terminates_on_cycle() {
        let mut graph = UnitGraph::call_graph(Granularity::Class);
        graph.add_call(class("T"), class("C1"), EdgeKind::Static);
        graph.add_call(class("C1"), class("C2"), EdgeKind::Static);
        graph.add_call(class("C2"), class("C1"), EdgeKind::Static);

        assert_eq!(closure(&graph, &class("T")), set(&["C1", "C2"]));
    }

    #[test]
    fn test_closure_excludes_start_on_self_cycle() {
        let mut graph = UnitGraph::call_graph(Granularity::Class);
        graph.add_call(class("A"), class("B"), EdgeKind::Direct);
        graph.add_call(class("B"), class("A"), EdgeKind::Direct);

        assert_eq!(closure(&graph, &class("A")), set(&["B"]));
    }

    #[test]
    fn test_closure_of_unknown_node_is_empty() {
        let graph = UnitGraph::call_graph(Granularity::Class);
        assert!(closure(&graph, &class("Missing")).is_empty());
    }

    #[test]
    fn test_closure_all_matches_sequential() {
        let mut graph = UnitGraph::call_graph(Granularity::Class);
        graph.add_call(class("T1"), class("A"), EdgeKind::Direct);
        graph.add_call(class("T2"), class("B"), EdgeKind::Direct);
        graph.add_call(class("A"), class("B"), EdgeKind::Direct);

        let pool = rayon::ThreadPoolBuilder::new().num_threads(2).build().unwrap();
        let starts = vec![class("T1"), class("T2")];
        let all = closure_all(&graph, &starts, &pool);

        assert_eq!(all.len(), 2);
        assert_eq!(all[&class("T1")], set(&["A", "B"]));
        assert_eq!(all[&class("T2")], set(&["B"]));
    }

    proptest! {
        #[test]
        fn prop_start_never_in_own_closure(
            edges in prop::collection::vec((0u8..8, 0u8..8), 0..40),
            start in 0u8..8,
        ) {
            let mut graph = UnitGraph::call_graph(Granularity::Class);
            for (from, to) in &edges {
                graph.add_call(class(&format!("N{from}")), class(&format!("N{to}")), EdgeKind::Direct);
            }
            let start = class(&format!("N{start}"));
            let reached = closure(&graph, &start);

            prop_assert!(!reached.contains(&start));
            for unit in &reached {
                prop_assert!(graph.contains(unit));
            }
        }
    }
}
