//! Call depth per test.
//!
//! The call depth of a test is the largest number of hops on a shortest path
//! from the test to any production unit it reaches. A test calling `C1`
//! which calls `C2` which calls `C3` has depth 3, however many other routes
//! exist between those units.

use crate::graph::UnitGraph;
use crate::unit::Unit;
use dashmap::DashMap;
use petgraph::algo::dijkstra;
use petgraph::graph::{DiGraph, NodeIndex};
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};

/// Test FQN -> call depth, ordered by FQN.
pub type CallDepths = BTreeMap<String, usize>;

/// Compute call depths for every test node on `pool`.
///
/// Tests that reach no production unit have no entry. The result does not
/// depend on the number of threads in `pool`.
pub fn call_depths(graph: &UnitGraph, pool: &rayon::ThreadPool) -> CallDepths {
    let _span = tracing::info_span!("call_depth", nodes = graph.node_count()).entered();

    let (petgraph, node_map) = build_petgraph(graph);
    let tests = graph.test_nodes();
    let results: DashMap<String, usize> = DashMap::new();

    pool.install(|| {
        tests.par_iter().for_each(|test| {
            let Some(&start) = node_map.get(test) else {
                return;
            };
            if let Some(depth) = depth_from(&petgraph, start) {
                results.insert(test.to_string(), depth);
            }
        });
    });

    tracing::debug!(tests = tests.len(), with_depth = results.len(), "computed call depths");
    results.into_iter().collect()
}

/// Longest shortest-path distance from `start` to a production unit.
fn depth_from(graph: &DiGraph<Unit, ()>, start: NodeIndex) -> Option<usize> {
    dijkstra(graph, start, None, |_| 1usize)
        .into_iter()
        .filter(|(node, _)| *node != start && !graph[*node].is_test())
        .map(|(_, distance)| distance)
        .max()
}

/// Build a petgraph DiGraph from the unit graph
fn build_petgraph(graph: &UnitGraph) -> (DiGraph<Unit, ()>, HashMap<Unit, NodeIndex>) {
    let mut petgraph = DiGraph::new();
    let mut node_map = HashMap::new();

    for unit in graph.sorted_nodes() {
        let index = petgraph.add_node(unit.clone());
        node_map.insert(unit, index);
    }

    for edge in graph.edges() {
        if let (Some(&from), Some(&to)) = (node_map.get(&edge.caller), node_map.get(&edge.callee))
        {
            // Parallel edges of different kinds collapse to one hop.
            if petgraph.find_edge(from, to).is_none() {
                petgraph.add_edge(from, to, ());
            }
        }
    }

    (petgraph, node_map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Granularity, ParallelConfig};
    use crate::graph::EdgeKind;
    use pretty_assertions::assert_eq;

    fn class(name: &str) -> Unit {
        Unit::class(name)
    }

    fn pool(threads: usize) -> rayon::ThreadPool {
        ParallelConfig::with_workers(threads).build_pool().unwrap()
    }

    fn scenario() -> UnitGraph {
        let mut graph = UnitGraph::call_graph(Granularity::Class);
        graph.add_call(class("a.T1Test"), class("a.C1"), EdgeKind::Direct);
        graph.add_call(class("a.C1"), class("a.C2"), EdgeKind::Direct);
        graph.add_call(class("a.C2"), class("a.C3"), EdgeKind::Direct);
        graph.add_call(class("a.C2"), class("a.C2b"), EdgeKind::Direct);
        graph.add_call(class("a.C3"), class("a.C2b"), EdgeKind::Direct);
        graph
    }

    #[test]
    fn test_depth_is_longest_shortest_path() {
        let depths = call_depths(&scenario(), &pool(1));
        assert_eq!(depths.get("a.T1Test"), Some(&3));
    }

    #[test]
    fn test_cycles_do_not_inflate_depth() {
        let mut graph = scenario();
        graph.add_call(class("a.C3"), class("a.C1"), EdgeKind::Virtual);

        let depths = call_depths(&graph, &pool(2));
        assert_eq!(depths.get("a.T1Test"), Some(&3));
    }

    #[test]
    fn test_tests_reaching_only_tests_have_no_entry() {
        let mut graph = scenario();
        graph.add_call(class("a.HelperTest"), class("a.MockLedger"), EdgeKind::Direct);

        let depths = call_depths(&graph, &pool(1));
        assert!(!depths.contains_key("a.HelperTest"));
        assert_eq!(depths.len(), 1);
    }

    #[test]
    fn test_paths_through_test_units_still_count() {
        let mut graph = UnitGraph::call_graph(Granularity::Class);
        graph.add_call(class("a.BillingTest"), class("a.BillingFixture"), EdgeKind::Direct);
        graph.add_call(class("a.BillingFixture"), class("a.Billing"), EdgeKind::Direct);

        let depths = call_depths(&graph, &pool(1));
        assert_eq!(depths.get("a.BillingTest"), Some(&2));
    }

    #[test]
    fn test_result_independent_of_pool_size() {
        let mut graph = scenario();
        for i in 0..20 {
            graph.add_call(class(&format!("b.Case{i}Test")), class("a.C2"), EdgeKind::Direct);
            graph.add_call(
                class(&format!("b.Case{i}Test")),
                class(&format!("b.Step{i}")),
                EdgeKind::Static,
            );
        }

        let sequential = call_depths(&graph, &pool(1));
        let parallel = call_depths(&graph, &pool(4));
        assert_eq!(sequential, parallel);
        assert_eq!(sequential.len(), 21);
        assert_eq!(sequential.get("b.Case7Test"), Some(&2));
    }
}
