//! Line-oriented output of external extraction tools.
//!
//! Two grammars are understood:
//!
//! - **arrow lines** from a JVM dependency extractor, where an edge line is
//!   indented by exactly three spaces: `   com.acme.A -> com.acme.B  app.jar`
//! - **comma pairs** from the dynamic-language extractor:
//!   `app.billing,app.ledger`
//!
//! Both are read line by line from any [`BufRead`]; lines that do not match
//! are logged and skipped.

use super::{ensure_not_empty, unsupported_source, GraphBuilder, GraphSource};
use crate::config::Granularity;
use crate::errors::{Error, Result};
use crate::graph::{EdgeKind, GraphKind, UnitGraph};
use crate::resolver::SourceResolver;
use crate::unit::Unit;
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::{BufRead, Cursor};
use std::sync::Arc;

/// Three spaces, then `caller -> callee`; anything after the callee is ignored.
static ARROW_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ {3}(\S+)\s+->\s+(\S+)").unwrap());

/// Parse arrow lines into `(caller, callee)` class-name pairs.
pub fn parse_arrow_lines<R: BufRead>(input: R, origin: &str) -> Result<Vec<(String, String)>> {
    let mut pairs = Vec::new();
    for (number, line) in input.lines().enumerate() {
        let line = line.map_err(|e| Error::io(origin, e))?;
        if !is_edge_line(&line) {
            continue;
        }
        match ARROW_LINE.captures(&line) {
            Some(caps) => pairs.push((caps[1].to_string(), caps[2].to_string())),
            None => tracing::warn!(origin, line = number + 1, "skipping malformed dependency line"),
        }
    }
    Ok(pairs)
}

/// Header and summary lines are not indented by exactly three spaces.
fn is_edge_line(line: &str) -> bool {
    line.starts_with("   ") && line[3..].chars().next().is_some_and(|c| !c.is_whitespace())
}

/// Parse `caller,callee` lines into module-name pairs.
pub fn parse_comma_pairs<R: BufRead>(input: R, origin: &str) -> Result<Vec<(String, String)>> {
    let mut pairs = Vec::new();
    for (number, line) in input.lines().enumerate() {
        let line = line.map_err(|e| Error::io(origin, e))?;
        if line.trim().is_empty() {
            continue;
        }
        match line.split_once(',') {
            Some((caller, callee)) if !caller.trim().is_empty() && !callee.trim().is_empty() => {
                pairs.push((caller.trim().to_string(), callee.trim().to_string()));
            }
            _ => tracing::warn!(origin, line = number + 1, "skipping malformed module pair"),
        }
    }
    Ok(pairs)
}

/// Class dependency graphs from arrow-line extractor output.
pub struct ArrowLineBuilder {
    resolver: Arc<SourceResolver>,
}

impl ArrowLineBuilder {
    pub fn new(resolver: Arc<SourceResolver>) -> Self {
        Self { resolver }
    }
}

impl GraphBuilder for ArrowLineBuilder {
    fn name(&self) -> &'static str {
        "arrow-line decoder"
    }

    fn build(&self, source: &GraphSource) -> Result<UnitGraph> {
        let GraphSource::Extractor(output) = source else {
            return Err(unsupported_source(self.name(), source));
        };
        output.check_status()?;

        let pairs = parse_arrow_lines(Cursor::new(output.stdout.as_bytes()), &output.tool)?;
        let mut graph = UnitGraph::dependency_graph(Granularity::Class);
        for (caller, callee) in pairs {
            graph.add_call(
                self.resolver.attach(Unit::class(caller)),
                self.resolver.attach(Unit::class(callee)),
                EdgeKind::Static,
            );
        }
        ensure_not_empty(graph, &source.describe())
    }
}

/// Module graphs from comma-pair extractor output.
pub struct CommaPairBuilder {
    kind: GraphKind,
    resolver: Arc<SourceResolver>,
}

impl CommaPairBuilder {
    pub fn new(kind: GraphKind, resolver: Arc<SourceResolver>) -> Self {
        Self { kind, resolver }
    }
}

impl GraphBuilder for CommaPairBuilder {
    fn name(&self) -> &'static str {
        "comma-pair decoder"
    }

    fn build(&self, source: &GraphSource) -> Result<UnitGraph> {
        let GraphSource::Extractor(output) = source else {
            return Err(unsupported_source(self.name(), source));
        };
        output.check_status()?;

        let pairs = parse_comma_pairs(Cursor::new(output.stdout.as_bytes()), &output.tool)?;
        let mut graph = UnitGraph::new(self.kind, Granularity::Class);
        for (caller, callee) in pairs {
            graph.add_call(
                self.resolver.attach(Unit::module(caller)),
                self.resolver.attach(Unit::module(callee)),
                EdgeKind::Direct,
            );
        }
        ensure_not_empty(graph, &source.describe())
    }
}
