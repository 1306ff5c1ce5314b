//! Value-identity representation of a callable or dependency node.
//!
//! A [`Unit`] is identified by its qualified name plus, for method-level
//! units, its parameter signature. The package, kind and source path are
//! carried along but never take part in equality or hashing, so a unit
//! synthesized by the class-file decoder and one synthesized from a coverage
//! session collide as map keys.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

/// Case-insensitive substrings that mark a unit as test code.
pub const TEST_MARKERS: &[&str] = &["test", "mock", "fixture"];

/// Granularity of the element a unit stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitKind {
    Method,
    Class,
    /// A module of the dynamically interpreted target.
    Module,
    Package,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    name: String,
    package: String,
    params: Option<String>,
    kind: UnitKind,
    source: Option<PathBuf>,
}

impl Unit {
    /// Method-level unit; `fqn` is `package.Class.method`.
    pub fn method(fqn: impl Into<String>, params: Option<String>) -> Self {
        let name = fqn.into();
        let package = parent_of(parent_of(&name)).to_string();
        Self {
            name,
            package,
            params,
            kind: UnitKind::Method,
            source: None,
        }
    }

    pub fn class(fqn: impl Into<String>) -> Self {
        let name = fqn.into();
        let package = parent_of(&name).to_string();
        Self {
            name,
            package,
            params: None,
            kind: UnitKind::Class,
            source: None,
        }
    }

    /// Module of the dynamic target, e.g. `app.services.billing`.
    pub fn module(name: impl Into<String>) -> Self {
        let name = name.into();
        let package = parent_of(&name).to_string();
        Self {
            name,
            package,
            params: None,
            kind: UnitKind::Module,
            source: None,
        }
    }

    pub fn with_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = Some(path.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn params(&self) -> Option<&str> {
        self.params.as_deref()
    }

    pub fn kind(&self) -> UnitKind {
        self.kind
    }

    /// Source file, absent for external or library symbols.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Derived from the qualified name, never stored.
    pub fn is_test(&self) -> bool {
        let lowered = self.name.to_ascii_lowercase();
        TEST_MARKERS.iter().any(|marker| lowered.contains(marker))
    }

    /// Enclosing class of a method; classes and modules are their own class.
    pub fn class_name(&self) -> &str {
        match self.kind {
            UnitKind::Method => parent_of(&self.name),
            UnitKind::Class | UnitKind::Module | UnitKind::Package => &self.name,
        }
    }

    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    /// Class name with every `$Inner` segment removed.
    pub fn outer_class_name(&self) -> &str {
        let class = self.class_name();
        let simple_start = class.rfind('.').map(|i| i + 1).unwrap_or(0);
        match class[simple_start..].find('$') {
            Some(offset) => &class[..simple_start + offset],
            None => class,
        }
    }

    /// Compiler-generated units: anonymous classes, lambdas, `invokedynamic`
    /// call sites.
    pub fn is_synthetic(&self) -> bool {
        if self.name.contains("lambda$") || self.name.contains("$indy") {
            return true;
        }
        let bytes = self.name.as_bytes();
        bytes
            .windows(2)
            .any(|pair| pair[0] == b'$' && pair[1].is_ascii_digit())
    }

    /// Class-level unit for this unit's enclosing class, keeping the source.
    pub fn to_class(&self) -> Unit {
        if self.kind != UnitKind::Method {
            return self.clone();
        }
        Unit {
            name: self.class_name().to_string(),
            package: self.package.clone(),
            params: None,
            kind: UnitKind::Class,
            source: self.source.clone(),
        }
    }

    pub fn to_package(&self) -> Unit {
        Unit {
            name: self.package.clone(),
            package: parent_of(&self.package).to_string(),
            params: None,
            kind: UnitKind::Package,
            source: None,
        }
    }
}

/// Everything before the last `.`, or the empty string.
fn parent_of(name: &str) -> &str {
    name.rfind('.').map(|i| &name[..i]).unwrap_or("")
}

impl PartialEq for Unit {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.params == other.params
    }
}

impl Eq for Unit {}

impl Hash for Unit {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.params.hash(state);
    }
}

impl PartialOrd for Unit {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Unit {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (&self.name, &self.params).cmp(&(&other.name, &other.params))
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.params {
            Some(params) => write!(f, "{}{}", self.name, params),
            None => f.write_str(&self.name),
        }
    }
}
