//! Extractor output through the registry, for both targets.

use indoc::indoc;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use testlens::builders::{BuilderRegistry, ExtractorOutput, GraphSource};
use testlens::classification::{classify, Dimension, Label};
use testlens::graph::{closure, GraphKind};
use testlens::resolver::SourceResolver;
use testlens::{AnalysisConfig, Error, Granularity, Language, Unit};

fn registry() -> BuilderRegistry {
    BuilderRegistry::with_defaults(Arc::new(SourceResolver::empty()))
}

#[test]
fn test_jvm_dependency_graph_from_arrow_lines() {
    let output = ExtractorOutput::new(
        "jdeps",
        0,
        indoc! {"
            classes -> java.base
               com.acme.BillingTest -> com.acme.Billing   classes
               com.acme.Billing -> com.acme.store.Ledger   classes
               com.acme.store.Ledger -> com.acme.Billing   classes
               com.acme.Billing -> java.lang.Object   java.base
        "},
    );
    let config = AnalysisConfig {
        granularity: Granularity::Class,
        ..AnalysisConfig::default()
    };

    let graph = registry()
        .build(&config, GraphKind::Dependency, &GraphSource::Extractor(output))
        .unwrap();
    assert!(graph.has_cycle());

    let test = Unit::class("com.acme.BillingTest");
    let mapping = [(test.clone(), closure(&graph, &test))].into_iter().collect();

    assert_eq!(classify(&mapping, Dimension::Units)[&test], Label::Integration);
    assert_eq!(classify(&mapping, Dimension::Packages)[&test], Label::Integration);
}

#[test]
fn test_python_call_graph_from_comma_pairs() {
    let output = ExtractorOutput::new(
        "pyan",
        0,
        "tests.test_billing,app.billing\napp.billing,app.util\n",
    );
    let config = AnalysisConfig {
        language: Language::Python,
        granularity: Granularity::Class,
        ..AnalysisConfig::default()
    };

    let graph = registry()
        .build(&config, GraphKind::Call, &GraphSource::Extractor(output))
        .unwrap();

    let test = Unit::module("tests.test_billing");
    let mapping = [(test.clone(), closure(&graph, &test))].into_iter().collect();
    assert_eq!(classify(&mapping, Dimension::Units)[&test], Label::Integration);
    assert_eq!(classify(&mapping, Dimension::Packages)[&test], Label::Unit);
}

#[test]
fn test_python_method_granularity_is_unsupported() {
    let config = AnalysisConfig {
        language: Language::Python,
        granularity: Granularity::Method,
        ..AnalysisConfig::default()
    };
    let output = ExtractorOutput::new("pyan", 0, "a,b\n");

    let err = registry()
        .build(&config, GraphKind::Call, &GraphSource::Extractor(output))
        .unwrap_err();
    assert!(matches!(err, Error::NoApplicableMethod { .. }));
    assert!(!err.is_fatal());
}

#[test]
fn test_failed_extractor_aborts() {
    let config = AnalysisConfig {
        granularity: Granularity::Class,
        ..AnalysisConfig::default()
    };
    let output = ExtractorOutput::new("jdeps", 1, "");

    let err = registry()
        .build(&config, GraphKind::Dependency, &GraphSource::Extractor(output))
        .unwrap_err();
    assert_eq!(err.to_string(), "jdeps exited with status 1");
}
