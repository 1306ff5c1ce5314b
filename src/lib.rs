//! Test classification from structural graphs and coverage.
//!
//! `testlens` decides, for every test of a target project, whether it behaves
//! as a unit test or an integration test. Call and dependency graphs are
//! built from compiled JVM class files or from extractor output, traversed
//! per test, and the size of what each test reaches is turned into a label.
//! Coverage sessions feed the same classification.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use testlens::builders::{BuilderRegistry, GraphSource};
//! use testlens::config::AnalysisConfig;
//! use testlens::graph::GraphKind;
//! use testlens::resolver::SourceResolver;
//!
//! # fn main() -> testlens::Result<()> {
//! let config = AnalysisConfig::default();
//! let resolver = Arc::new(SourceResolver::from_roots(&config.source_roots));
//! let registry = BuilderRegistry::with_defaults(resolver);
//! let graph = registry.build(
//!     &config,
//!     GraphKind::Call,
//!     &GraphSource::ClassDirectory("target/classes".into()),
//! )?;
//!
//! let pool = config.parallel.build_pool()?;
//! let depths = testlens::analysis::call_depths(&graph, &pool);
//! let records = testlens::record::merge_records(
//!     testlens::classification::structural_records(&graph, &pool)
//!         .into_iter()
//!         .chain(testlens::classification::call_depth_records(&depths)),
//! );
//! # let _ = records;
//! # Ok(())
//! # }
//! ```

// Export modules for library usage
pub mod analysis;
pub mod builders;
pub mod classification;
pub mod config;
pub mod coverage;
pub mod errors;
pub mod graph;
pub mod observability;
pub mod record;
pub mod resolver;
pub mod testkit;
pub mod unit;

// Re-export commonly used types
pub use crate::classification::{classify, classify_count, directness_ratio, Dimension, Label};
pub use crate::config::{AnalysisConfig, Granularity, Language, ParallelConfig};
pub use crate::errors::{Error, Result};
pub use crate::graph::{closure, Edge, EdgeKind, GraphKind, UnitGraph};
pub use crate::record::AnalysisRecord;
pub use crate::unit::{Unit, UnitKind};
