//! Graph construction strategies.
//!
//! Every builder produces the same [`UnitGraph`] model from a different
//! input: compiled class files, or the captured text output of an external
//! extractor. Building is synchronous and finishes before any traversal or
//! path analysis starts.

pub mod classfile;
pub mod protocol;
pub mod registry;

use crate::errors::{Error, Result};
use crate::graph::UnitGraph;
use std::path::PathBuf;

pub use classfile::ClassFileBuilder;
pub use protocol::{ArrowLineBuilder, CommaPairBuilder};
pub use registry::{BuilderKey, BuilderRegistry};

/// Captured result of running an external extraction tool.
///
/// Running the tool (and draining its output while it runs) belongs to the
/// caller; builders only interpret the exit status and the text.
#[derive(Debug, Clone)]
pub struct ExtractorOutput {
    pub tool: String,
    pub exit_code: i32,
    pub stdout: String,
}

impl ExtractorOutput {
    pub fn new(tool: impl Into<String>, exit_code: i32, stdout: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            exit_code,
            stdout: stdout.into(),
        }
    }

    /// A non-zero exit means the target project is misconfigured or unbuilt.
    pub fn check_status(&self) -> Result<()> {
        if self.exit_code != 0 {
            return Err(Error::ExtractorFailed {
                tool: self.tool.clone(),
                code: self.exit_code,
            });
        }
        Ok(())
    }
}

/// Input handed to a [`GraphBuilder`].
#[derive(Debug, Clone)]
pub enum GraphSource {
    /// Directory tree of compiled `.class` files.
    ClassDirectory(PathBuf),
    /// Class-file images with a label used in diagnostics.
    ClassImages(Vec<(String, Vec<u8>)>),
    Extractor(ExtractorOutput),
}

impl GraphSource {
    pub fn describe(&self) -> String {
        match self {
            GraphSource::ClassDirectory(path) => path.display().to_string(),
            GraphSource::ClassImages(images) => format!("{} class images", images.len()),
            GraphSource::Extractor(output) => format!("{} output", output.tool),
        }
    }
}

pub trait GraphBuilder: Send + Sync {
    fn name(&self) -> &'static str;

    fn build(&self, source: &GraphSource) -> Result<UnitGraph>;
}

/// Reject graphs with no nodes.
pub fn ensure_not_empty(graph: UnitGraph, origin: &str) -> Result<UnitGraph> {
    if graph.is_empty() {
        return Err(Error::empty_graph(origin));
    }
    tracing::info!(
        origin,
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "graph loaded"
    );
    Ok(graph)
}

fn unsupported_source(builder: &str, source: &GraphSource) -> Error {
    Error::config(format!("{builder} cannot read {}", source.describe()))
}
