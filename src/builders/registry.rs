//! Explicit mapping from analysis configuration to a graph builder.

use super::{ArrowLineBuilder, ClassFileBuilder, CommaPairBuilder, GraphBuilder, GraphSource};
use crate::config::{AnalysisConfig, Granularity, Language};
use crate::errors::{Error, Result};
use crate::graph::{GraphKind, UnitGraph};
use crate::resolver::SourceResolver;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BuilderKey {
    pub language: Language,
    pub granularity: Granularity,
    pub kind: GraphKind,
}

impl BuilderKey {
    pub fn new(language: Language, granularity: Granularity, kind: GraphKind) -> Self {
        Self {
            language,
            granularity,
            kind,
        }
    }

    pub fn for_config(config: &AnalysisConfig, kind: GraphKind) -> Self {
        Self::new(config.language, config.granularity, kind)
    }
}

#[derive(Default)]
pub struct BuilderRegistry {
    builders: HashMap<BuilderKey, Box<dyn GraphBuilder>>,
}

impl BuilderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// All builders this crate ships, sharing one resolver.
    pub fn with_defaults(resolver: Arc<SourceResolver>) -> Self {
        use Granularity::{Class, Method};
        use GraphKind::{Call, Dependency};
        use Language::{Jvm, Python};

        let mut registry = Self::new();
        registry.register(
            BuilderKey::new(Jvm, Method, Call),
            Box::new(ClassFileBuilder::new(Method, Arc::clone(&resolver))),
        );
        registry.register(
            BuilderKey::new(Jvm, Class, Call),
            Box::new(ClassFileBuilder::new(Class, Arc::clone(&resolver))),
        );
        registry.register(
            BuilderKey::new(Jvm, Class, Dependency),
            Box::new(ArrowLineBuilder::new(Arc::clone(&resolver))),
        );
        registry.register(
            BuilderKey::new(Python, Class, Call),
            Box::new(CommaPairBuilder::new(Call, Arc::clone(&resolver))),
        );
        registry.register(
            BuilderKey::new(Python, Class, Dependency),
            Box::new(CommaPairBuilder::new(Dependency, resolver)),
        );
        registry
    }

    /// Replaces any builder already registered under `key`.
    pub fn register(&mut self, key: BuilderKey, builder: Box<dyn GraphBuilder>) {
        self.builders.insert(key, builder);
    }

    pub fn resolve(&self, key: BuilderKey) -> Result<&dyn GraphBuilder> {
        self.builders
            .get(&key)
            .map(|builder| builder.as_ref())
            .ok_or(Error::NoApplicableMethod {
                what: match key.kind {
                    GraphKind::Call => "call graph builder",
                    GraphKind::Dependency => "dependency graph builder",
                },
                language: key.language,
                granularity: key.granularity,
            })
    }

    /// Build a graph of `kind` for `config`, applying synthetic collapse
    /// when the configuration asks for it. Invalid configurations are
    /// rejected before any builder runs.
    pub fn build(
        &self,
        config: &AnalysisConfig,
        kind: GraphKind,
        source: &GraphSource,
    ) -> Result<UnitGraph> {
        config.validate()?;
        let builder = self.resolve(BuilderKey::for_config(config, kind))?;
        tracing::debug!(builder = builder.name(), source = %source.describe(), "building graph");

        let graph = builder.build(source)?;
        if config.collapse_synthetic {
            return Ok(graph.collapse_synthetic());
        }
        Ok(graph)
    }
}
