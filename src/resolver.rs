//! Mapping of qualified names to source files.
//!
//! A [`SourceResolver`] is built once per analysis run from the configured
//! source roots and handed to the builders that need it. Units that cannot
//! be mapped (library symbols, generated code) keep a `None` path and the
//! analysis continues on the name alone.

use crate::unit::Unit;
use dashmap::DashSet;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const SOURCE_EXTENSIONS: &[&str] = &["java", "kt", "scala", "groovy", "py"];

#[derive(Debug, Default)]
pub struct SourceResolver {
    /// Dotted qualified name -> source file
    index: HashMap<String, PathBuf>,
    /// Names already reported as unresolved
    unresolved: DashSet<String>,
}

impl SourceResolver {
    /// A resolver that maps nothing and reports nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Index every source file below `roots`.
    ///
    /// `com/acme/Billing.java` under a root becomes `com.acme.Billing`;
    /// a package's `__init__.py` is indexed under the package name.
    pub fn from_roots(roots: &[PathBuf]) -> Self {
        let mut index = HashMap::new();

        for root in roots {
            for entry in WalkDir::new(root)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
            {
                if let Some(name) = qualified_name(root, entry.path()) {
                    index.entry(name).or_insert_with(|| entry.path().to_path_buf());
                }
            }
        }

        tracing::debug!(files = index.len(), "indexed source roots");
        Self {
            index,
            unresolved: DashSet::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Source file for `unit`, trying the outer class and then shorter
    /// dotted prefixes so `pkg.mod.Class.method` resolves to `pkg/mod.py`.
    pub fn resolve(&self, unit: &Unit) -> Option<&Path> {
        let mut candidate = unit.outer_class_name();
        loop {
            if let Some(path) = self.index.get(candidate) {
                return Some(path.as_path());
            }
            candidate = &candidate[..candidate.rfind('.')?];
        }
    }

    /// Attach the resolved source path, or warn once per unresolved name.
    pub fn attach(&self, unit: Unit) -> Unit {
        if unit.source().is_some() || self.is_empty() {
            return unit;
        }
        match self.resolve(&unit) {
            Some(path) => {
                let path = path.to_path_buf();
                unit.with_source(path)
            }
            None => {
                if self.unresolved.insert(unit.outer_class_name().to_string()) {
                    tracing::warn!(unit = %unit, "no source file found; continuing with name only");
                }
                unit
            }
        }
    }

    /// Distinct names that could not be mapped so far.
    pub fn unresolved_count(&self) -> usize {
        self.unresolved.len()
    }
}

fn qualified_name(root: &Path, path: &Path) -> Option<String> {
    let extension = path.extension()?.to_str()?;
    if !SOURCE_EXTENSIONS.contains(&extension) {
        return None;
    }

    let relative = path.strip_prefix(root).ok()?.with_extension("");
    let mut parts: Vec<&str> = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<_>>()?;

    if parts.last() == Some(&"__init__") {
        parts.pop();
    }
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn test_resolves_jvm_classes_and_inner_classes() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "com/acme/Billing.java");

        let resolver = SourceResolver::from_roots(&[temp.path().to_path_buf()]);
        let expected = temp.path().join("com/acme/Billing.java");

        assert_eq!(resolver.resolve(&Unit::class("com.acme.Billing")), Some(expected.as_path()));
        assert_eq!(
            resolver.resolve(&Unit::method("com.acme.Billing$Line.amount", None)),
            Some(expected.as_path())
        );
    }

    #[test]
    fn test_resolves_python_modules_and_packages() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "app/services/billing.py");
        touch(temp.path(), "app/__init__.py");

        let resolver = SourceResolver::from_roots(&[temp.path().to_path_buf()]);

        assert_eq!(
            resolver.resolve(&Unit::method("app.services.billing.Invoice.total", None)),
            Some(temp.path().join("app/services/billing.py").as_path())
        );
        assert_eq!(
            resolver.resolve(&Unit::module("app")),
            Some(temp.path().join("app/__init__.py").as_path())
        );
    }

    #[test]
    fn test_unresolved_units_keep_no_path() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "com/acme/Billing.java");
        let resolver = SourceResolver::from_roots(&[temp.path().to_path_buf()]);

        let unit = resolver.attach(Unit::class("java.lang.String"));
        assert!(unit.source().is_none());
        resolver.attach(Unit::method("java.lang.String.length", None));
        assert_eq!(resolver.unresolved_count(), 1);
    }

    #[test]
    fn test_empty_resolver_is_silent() {
        let resolver = SourceResolver::empty();
        let unit = resolver.attach(Unit::class("com.acme.Billing"));
        assert!(unit.source().is_none());
        assert_eq!(resolver.unresolved_count(), 0);
    }
}
