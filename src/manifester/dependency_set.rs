//! Resolved dependencies, served to the linker by package

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::{Bundle, IndexedSourceFile, RawSourceFile};
use crate::error::{Result, link};
use crate::index;
use crate::linker::{PackageProvider, package_prefixes};

/// A dependency bundle and the name its files are namespaced under
#[derive(Debug, Clone)]
pub struct ResolvedDependency {
    pub name: String,
    /// Specifier as declared, for reports
    pub specifier: String,
    pub bundle: Arc<Bundle>,
}

/// Every dependency of a bundle, transitive ones included
#[derive(Debug, Default)]
pub struct ResolvedDependencySet {
    dependencies: Vec<ResolvedDependency>,
    packages: BTreeMap<String, IndexedSourceFile>,
}

impl ResolvedDependencySet {
    /// Index all dependency files, keyed as `@<dependency>/<path>`.
    ///
    /// Two dependencies declaring the same package is an error.
    pub fn build(dependencies: Vec<ResolvedDependency>) -> Result<Self> {
        let raws: Vec<RawSourceFile> = dependencies
            .iter()
            .flat_map(|dep| {
                dep.bundle.files.values().map(move |f| {
                    RawSourceFile::new(format!("@{}/{}", dep.name, f.path), f.content.clone())
                })
            })
            .collect();

        let mut declared: BTreeMap<String, Vec<IndexedSourceFile>> = BTreeMap::new();
        for file in index::index_all(&raws)? {
            declared.entry(file.package.clone()).or_default().push(file);
        }

        let mut packages = BTreeMap::new();
        for (package, mut files) in declared {
            if files.len() > 1 {
                let paths = files.iter().map(|f| f.raw.path.clone()).collect();
                return Err(link::duplicate(package, paths));
            }
            if let Some(file) = files.pop() {
                packages.insert(package, file);
            }
        }

        Ok(Self {
            dependencies,
            packages,
        })
    }

    pub fn dependencies(&self) -> &[ResolvedDependency] {
        &self.dependencies
    }
}

impl PackageProvider for ResolvedDependencySet {
    fn provide(&self, reference: &str) -> Option<IndexedSourceFile> {
        package_prefixes(reference)
            .find_map(|package| self.packages.get(package))
            .cloned()
    }
}
