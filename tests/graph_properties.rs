//! Property tests for traversal, views and classification on random graphs.

use proptest::prelude::*;
use std::collections::HashMap;
use testlens::analysis::call_depths;
use testlens::classification::{classify, classify_count, Dimension, Label};
use testlens::graph::{closure, closure_all, EdgeKind, UnitGraph};
use testlens::testkit::helpers::method_graph;
use testlens::{Granularity, ParallelConfig, Unit};

fn unit_name(i: u8) -> String {
    if i % 4 == 0 {
        format!("app.t{}.Case{}Test.run", i % 3, i)
    } else {
        format!("app.p{}.C{}.call", i % 3, i)
    }
}

fn arb_graph() -> impl Strategy<Value = UnitGraph> {
    prop::collection::vec((0u8..16, 0u8..16), 1..60).prop_map(|pairs| {
        let names: Vec<(String, String)> = pairs
            .iter()
            .map(|(a, b)| (unit_name(*a), unit_name(*b)))
            .collect();
        let edges: Vec<(&str, &str)> = names
            .iter()
            .map(|(a, b)| (a.as_str(), b.as_str()))
            .collect();
        method_graph(&edges)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_parallel_results_match_sequential(graph in arb_graph()) {
        let one = ParallelConfig::with_workers(1).build_pool().unwrap();
        let four = ParallelConfig::with_workers(4).build_pool().unwrap();
        let tests = graph.test_nodes();

        prop_assert_eq!(call_depths(&graph, &one), call_depths(&graph, &four));
        prop_assert_eq!(closure_all(&graph, &tests, &one), closure_all(&graph, &tests, &four));
    }

    #[test]
    fn prop_closure_all_agrees_with_closure(graph in arb_graph()) {
        let pool = ParallelConfig::with_workers(3).build_pool().unwrap();
        let tests = graph.test_nodes();
        let all = closure_all(&graph, &tests, &pool);

        for test in &tests {
            prop_assert_eq!(&all[test], &closure(&graph, test));
        }
    }

    #[test]
    fn prop_class_view_has_no_self_loops(graph in arb_graph()) {
        let view = graph.class_level_view();
        prop_assert_eq!(view.granularity(), Granularity::Class);
        for edge in view.edges() {
            prop_assert!(edge.caller != edge.callee);
        }
        prop_assert!(view.node_count() <= graph.node_count());
    }

    #[test]
    fn prop_coarser_dimensions_never_count_more(graph in arb_graph()) {
        let pool = ParallelConfig::default().build_pool().unwrap();
        let mapping: HashMap<Unit, _> = closure_all(&graph, &graph.test_nodes(), &pool);

        for dependencies in mapping.values() {
            let units = Dimension::Units.count(dependencies);
            let classes = Dimension::Classes.count(dependencies);
            let packages = Dimension::Packages.count(dependencies);
            prop_assert!(packages <= classes && classes <= units);
        }

        let labels = classify(&mapping, Dimension::Units);
        prop_assert_eq!(labels.len(), mapping.len());
    }

    #[test]
    fn prop_classify_count_is_monotone(n in 0usize..1000) {
        let label = classify_count(n);
        match n {
            0 => prop_assert_eq!(label, Label::Unknown),
            1 => prop_assert_eq!(label, Label::Unit),
            _ => prop_assert_eq!(label, Label::Integration),
        }
    }
}

#[test]
fn test_edge_insertion_is_idempotent_across_kinds() {
    let mut graph = UnitGraph::call_graph(Granularity::Class);
    let a = Unit::class("app.ATest");
    let b = Unit::class("app.B");

    for _ in 0..3 {
        graph.add_call(a.clone(), b.clone(), EdgeKind::Static);
    }
    graph.add_call(a.clone(), b.clone(), EdgeKind::Virtual);

    assert_eq!(graph.edge_count(), 2);
    assert_eq!(graph.node_count(), 2);
    assert_eq!(closure(&graph, &a).len(), 1);
}
