//! Basic graph operations for adding and querying nodes and edges

use super::types::{Edge, EdgeKind, UnitGraph};
use crate::unit::Unit;
use std::collections::HashSet;

impl UnitGraph {
    /// Insert an edge; returns `false` when an equal edge was already present.
    ///
    /// Endpoints are registered as nodes. A node first seen without a source
    /// path picks one up from a later edge that carries it.
    pub fn add_edge(&mut self, edge: Edge) -> bool {
        self.insert_node(&edge.caller);
        self.insert_node(&edge.callee);

        if self.edges.contains(&edge) {
            return false;
        }

        let caller = edge.caller.clone();
        let callee = edge.callee.clone();

        self.edges.insert(edge);

        self.callee_index
            .entry(caller.clone())
            .or_default()
            .insert(callee.clone());

        self.caller_index.entry(callee).or_default().insert(caller);
        true
    }

    /// Add an edge whose ordinal is the caller's next call position.
    pub fn add_call(&mut self, caller: Unit, callee: Unit, kind: EdgeKind) -> bool {
        let counter = self.call_counts.entry(caller.clone()).or_insert(0);
        let ordinal = *counter;
        *counter += 1;
        self.add_edge(Edge::new(caller, callee, kind).with_ordinal(ordinal))
    }

    fn insert_node(&mut self, unit: &Unit) {
        let replace = match self.nodes.get(unit) {
            None => true,
            Some(existing) => existing.source().is_none() && unit.source().is_some(),
        };
        if replace {
            self.nodes.insert(unit.clone(), unit.clone());
        }
    }

    pub fn merge(&mut self, other: &UnitGraph) {
        for edge in other.edges() {
            self.add_edge(edge.clone());
        }
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Unit> {
        self.nodes.values()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    /// Nodes in name order, for reproducible output.
    pub fn sorted_nodes(&self) -> Vec<Unit> {
        let mut nodes: Vec<Unit> = self.nodes().cloned().collect();
        nodes.sort();
        nodes
    }

    /// The stored copy of `unit`, which carries the best known source path.
    pub fn node(&self, unit: &Unit) -> Option<&Unit> {
        self.nodes.get(unit)
    }

    pub fn contains(&self, unit: &Unit) -> bool {
        self.nodes.contains_key(unit)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn successors(&self, unit: &Unit) -> HashSet<Unit> {
        self.callee_index
            .get(unit)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn predecessors(&self, unit: &Unit) -> HashSet<Unit> {
        self.caller_index
            .get(unit)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Undirected neighborhood of `unit`, excluding the unit itself.
    pub fn adjacent(&self, unit: &Unit) -> HashSet<Unit> {
        let mut neighbors = self.successors(unit);
        neighbors.extend(self.predecessors(unit));
        neighbors.remove(unit);
        neighbors
    }

    pub(crate) fn successors_iter<'a>(&'a self, unit: &Unit) -> impl Iterator<Item = &'a Unit> {
        self.callee_index.get(unit).into_iter().flat_map(|set| set.iter())
    }

    pub fn test_nodes(&self) -> Vec<Unit> {
        let mut tests: Vec<Unit> = self.nodes().filter(|u| u.is_test()).cloned().collect();
        tests.sort();
        tests
    }

    pub fn production_nodes(&self) -> Vec<Unit> {
        let mut production: Vec<Unit> = self.nodes().filter(|u| !u.is_test()).cloned().collect();
        production.sort();
        production
    }

    /// Check whether `unit` reaches itself through one or more edges.
    pub fn is_recursive(&self, unit: &Unit) -> bool {
        let mut visited = HashSet::new();
        let mut stack: Vec<&Unit> = self.successors_iter(unit).collect();

        while let Some(current) = stack.pop() {
            if current == unit {
                return true;
            }
            if visited.insert(current) {
                stack.extend(self.successors_iter(current));
            }
        }
        false
    }

    /// Check whether any cycle exists.
    ///
    /// Uses iterative DFS with explicit stack to avoid stack overflow on large graphs.
    pub fn has_cycle(&self) -> bool {
        /// Stack entry state for cycle detection DFS
        enum CycleState<'a> {
            Enter(&'a Unit),
            Exit(&'a Unit),
        }

        let mut visited: HashSet<&Unit> = HashSet::new();
        let mut on_path: HashSet<&Unit> = HashSet::new();

        for start in self.nodes.keys() {
            if visited.contains(start) {
                continue;
            }

            let mut stack = vec![CycleState::Enter(start)];
            while let Some(state) = stack.pop() {
                match state {
                    CycleState::Enter(node) => {
                        if !visited.insert(node) {
                            continue;
                        }
                        on_path.insert(node);

                        // Schedule exit after processing children
                        stack.push(CycleState::Exit(node));

                        for callee in self.successors_iter(node) {
                            if on_path.contains(callee) {
                                return true;
                            }
                            if !visited.contains(callee) {
                                stack.push(CycleState::Enter(callee));
                            }
                        }
                    }
                    CycleState::Exit(node) => {
                        on_path.remove(node);
                    }
                }
            }
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Granularity;
    use pretty_assertions::assert_eq;

    fn class(name: &str) -> Unit {
        Unit::class(name)
    }

    #[test]
    fn test_add_edge_is_idempotent() {
        let mut graph = UnitGraph::call_graph(Granularity::Class);
        assert!(graph.add_edge(Edge::new(class("a.T"), class("a.C"), EdgeKind::Direct)));
        assert!(!graph.add_edge(Edge::new(class("a.T"), class("a.C"), EdgeKind::Direct)));

        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn test_ordinal_does_not_affect_identity() {
        let mut graph = UnitGraph::call_graph(Granularity::Class);
        graph.add_call(class("a.T"), class("a.C"), EdgeKind::Static);
        graph.add_call(class("a.T"), class("a.C"), EdgeKind::Static);

        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_distinct_kinds_are_distinct_edges() {
        let mut graph = UnitGraph::call_graph(Granularity::Class);
        graph.add_call(class("a.T"), class("a.C"), EdgeKind::Static);
        graph.add_call(class("a.T"), class("a.C"), EdgeKind::Virtual);

        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.successors(&class("a.T")).len(), 1);
    }

    #[test]
    fn test_node_picks_up_source_from_later_edge() {
        let mut graph = UnitGraph::call_graph(Granularity::Class);
        graph.add_call(class("a.T"), class("a.C"), EdgeKind::Direct);
        graph.add_call(
            class("a.D"),
            class("a.C").with_source("a/C.java"),
            EdgeKind::Direct,
        );

        let stored = graph.node(&class("a.C")).unwrap();
        assert_eq!(stored.source(), Some(std::path::Path::new("a/C.java")));
    }

    #[test]
    fn test_adjacent_is_undirected_and_excludes_self() {
        let mut graph = UnitGraph::call_graph(Granularity::Class);
        graph.add_call(class("a.T"), class("a.C"), EdgeKind::Direct);
        graph.add_call(class("a.P"), class("a.T"), EdgeKind::Direct);
        graph.add_call(class("a.T"), class("a.T"), EdgeKind::Direct);

        let adjacent = graph.adjacent(&class("a.T"));
        let expected: HashSet<Unit> = [class("a.C"), class("a.P")].into_iter().collect();
        assert_eq!(adjacent, expected);
    }

    #[test]
    fn test_test_and_production_partition() {
        let mut graph = UnitGraph::call_graph(Granularity::Class);
        graph.add_call(class("a.BillingTest"), class("a.Billing"), EdgeKind::Direct);
        graph.add_call(class("a.Billing"), class("a.Ledger"), EdgeKind::Direct);

        assert_eq!(graph.test_nodes(), vec![class("a.BillingTest")]);
        assert_eq!(graph.production_nodes(), vec![class("a.Billing"), class("a.Ledger")]);
    }

    #[test]
    fn test_has_cycle_detects_mutual_references() {
        let mut graph = UnitGraph::call_graph(Granularity::Class);
        graph.add_call(class("a.T"), class("a.A"), EdgeKind::Static);
        graph.add_call(class("a.A"), class("a.B"), EdgeKind::Static);
        assert!(!graph.has_cycle());

        graph.add_call(class("a.B"), class("a.A"), EdgeKind::Static);
        assert!(graph.has_cycle());
        assert!(graph.is_recursive(&class("a.A")));
        assert!(!graph.is_recursive(&class("a.T")));
    }
}
