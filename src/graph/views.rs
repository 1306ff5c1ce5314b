//! Derived views that project a graph onto a coarser granularity.
//!
//! Views are recomputed from the current edge set on every call; nothing is
//! cached on the source graph, so a view never goes stale.

use super::types::{Edge, UnitGraph};
use crate::config::Granularity;
use crate::unit::Unit;

impl UnitGraph {
    /// Collapse a method-level graph to class granularity.
    ///
    /// Each edge maps to `(class(caller), class(callee), kind)`. Edges between
    /// methods of the same class are dropped.
    pub fn class_level_view(&self) -> UnitGraph {
        self.project(Granularity::Class, Unit::to_class)
    }

    /// Collapse to one node per package.
    pub fn package_level_view(&self) -> UnitGraph {
        self.project(Granularity::Class, Unit::to_package)
    }

    /// Fold inner, anonymous and synthetic classes into their outermost host.
    ///
    /// Opt-in: correctness depends on the `Outer$Inner` naming convention.
    pub fn collapse_synthetic(&self) -> UnitGraph {
        self.project(Granularity::Class, |unit| {
            let class = unit.to_class();
            let outer = class.outer_class_name();
            if outer == class.name() {
                return class;
            }
            match class.source() {
                Some(path) => Unit::class(outer).with_source(path),
                None => Unit::class(outer),
            }
        })
    }

    fn project<F>(&self, granularity: Granularity, map: F) -> UnitGraph
    where
        F: Fn(&Unit) -> Unit,
    {
        let mut view = UnitGraph::new(self.kind, granularity);

        let mut edges: Vec<&Edge> = self.edges().collect();
        edges.sort_by(|a, b| {
            (&a.caller, &a.callee, a.kind, a.ordinal).cmp(&(&b.caller, &b.callee, b.kind, b.ordinal))
        });

        for edge in edges {
            let caller = map(self.node(&edge.caller).unwrap_or(&edge.caller));
            let callee = map(self.node(&edge.callee).unwrap_or(&edge.callee));
            if caller == callee {
                continue;
            }
            view.add_edge(Edge::new(caller, callee, edge.kind).with_ordinal(edge.ordinal));
        }

        view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::EdgeKind;
    use std::collections::HashSet;

    fn method(name: &str) -> Unit {
        Unit::method(name, Some("()V".into()))
    }

    fn method_graph() -> UnitGraph {
        let mut graph = UnitGraph::call_graph(Granularity::Method);
        graph.add_call(
            method("a.BillingTest.testTotal"),
            method("a.Billing.total"),
            EdgeKind::Virtual,
        );
        graph.add_call(method("a.Billing.total"), method("a.Billing.sum"), EdgeKind::Direct);
        graph.add_call(method("a.Billing.sum"), method("b.Ledger.read"), EdgeKind::Static);
        graph.add_call(method("a.Billing.total"), method("b.Ledger.read"), EdgeKind::Static);
        graph
    }

    #[test]
    fn test_class_level_view_unions_edges() {
        let view = method_graph().class_level_view();

        assert_eq!(view.granularity(), Granularity::Class);
        assert_eq!(view.node_count(), 3);
        assert_eq!(view.edge_count(), 2);
        assert!(view
            .successors(&Unit::class("a.Billing"))
            .contains(&Unit::class("b.Ledger")));
        assert!(!view.is_recursive(&Unit::class("a.Billing")));
    }

    #[test]
    fn test_class_level_view_tracks_later_changes() {
        let mut graph = method_graph();
        let before = graph.class_level_view();

        graph.add_call(method("b.Ledger.read"), method("c.Store.get"), EdgeKind::Virtual);
        let after = graph.class_level_view();

        assert_eq!(before.node_count(), 3);
        assert_eq!(after.node_count(), 4);
    }

    #[test]
    fn test_package_level_view() {
        let view = method_graph().package_level_view();
        let names: HashSet<&str> = view.nodes().map(|u| u.name()).collect();
        assert_eq!(names, ["a", "b"].into_iter().collect());
        assert_eq!(view.edge_count(), 1);
    }

    #[test]
    fn test_collapse_synthetic_folds_into_host() {
        let mut graph = UnitGraph::call_graph(Granularity::Class);
        graph.add_call(
            Unit::class("a.BillingTest"),
            Unit::class("a.Billing$1"),
            EdgeKind::Direct,
        );
        graph.add_call(Unit::class("a.Billing$1"), Unit::class("a.Billing"), EdgeKind::Direct);
        graph.add_call(
            Unit::class("a.Billing$Line"),
            Unit::class("b.Ledger"),
            EdgeKind::Static,
        );

        let collapsed = graph.collapse_synthetic();

        let names: HashSet<&str> = collapsed.nodes().map(|u| u.name()).collect();
        assert_eq!(
            names,
            ["a.BillingTest", "a.Billing", "b.Ledger"].into_iter().collect()
        );
        assert!(!collapsed.has_cycle());
        // The source graph is untouched.
        assert_eq!(graph.node_count(), 5);
    }
}
