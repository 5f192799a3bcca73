//! Linker: binds every import of every file to the file declaring it
//!
//! Linking is all-or-nothing and deterministic. The result depends only on
//! the set of input files, never on their order.
//!
//! 1. Build the package → file lookup; a package declared twice fails, also
//!    when the second declaration comes from the [`PackageProvider`].
//! 2. Resolve each import by longest package prefix (`data.a.b.rule` binds to
//!    package `a.b`) over the bundle's packages and the provider's. Imports of
//!    a file's own package are ignored. Provided files join the link set.
//! 3. Reject cycles.

mod cycle;

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use tracing::debug;

use crate::domain::{IndexedSourceFile, LinkedSourceFile};
use crate::error::{Result, link};

/// Supplies files for packages declared outside the linked bundle
pub trait PackageProvider {
    /// The file declaring the longest package prefix of `reference`
    fn provide(&self, reference: &str) -> Option<IndexedSourceFile>;
}

/// Candidate packages for a reference, longest first: `a.b.c`, `a.b`, `a`
pub fn package_prefixes(reference: &str) -> impl Iterator<Item = &str> {
    let mut end = Some(reference.len());
    std::iter::from_fn(move || {
        let current = end?;
        let candidate = &reference[..current];
        end = candidate.rfind('.');
        Some(candidate)
    })
}

/// Link a self-contained file set
pub fn link(files: Vec<IndexedSourceFile>) -> Result<BTreeMap<String, LinkedSourceFile>> {
    link_with(files, None)
}

/// Link a file set against its own packages and those `provider` declares
pub fn link_with(
    files: Vec<IndexedSourceFile>,
    provider: Option<&dyn PackageProvider>,
) -> Result<BTreeMap<String, LinkedSourceFile>> {
    let mut files: BTreeMap<String, IndexedSourceFile> = files
        .into_iter()
        .map(|f| (f.path().to_owned(), f))
        .collect();
    let packages = build_lookup(&files)?;
    if let Some(provider) = provider {
        reject_shadowed(&packages, provider)?;
    }

    let mut queue: VecDeque<String> = files.keys().cloned().collect();
    let mut resolved: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();

    while let Some(path) = queue.pop_front() {
        let Some(file) = files.get(&path) else {
            continue;
        };
        let own_package = file.package.clone();
        let imports = file.imports.clone();
        let mut dependencies = BTreeMap::new();

        for import in imports {
            let local = package_prefixes(&import).find(|p| packages.contains_key(*p));
            let external = provider
                .and_then(|p| p.provide(&import))
                .filter(|f| local.is_none_or(|l| f.package.len() > l.len()));

            let Some(external) = external else {
                let Some(package) = local else {
                    return Err(link::missing(&path, &import));
                };
                if package != own_package {
                    dependencies.insert(import.clone(), packages[package].clone());
                }
                continue;
            };
            if external.package == own_package {
                continue;
            }

            let external_path = external.raw.path.clone();
            debug!(file = %path, %import, provided_by = %external_path, "resolved external package");
            dependencies.insert(import.clone(), external_path.clone());
            if !files.contains_key(&external_path) {
                files.insert(external_path.clone(), external);
                queue.push_back(external_path);
            }
        }

        resolved.insert(path, dependencies);
    }

    let edges: BTreeMap<String, BTreeSet<String>> = resolved
        .iter()
        .map(|(path, deps)| (path.clone(), deps.values().cloned().collect()))
        .collect();
    cycle::detect_cycles(&edges)?;

    let linked: BTreeMap<String, LinkedSourceFile> = files
        .into_iter()
        .map(|(path, file)| {
            let dependencies = resolved.remove(&path).unwrap_or_default();
            (path, LinkedSourceFile { file, dependencies })
        })
        .collect();
    debug!(files = linked.len(), "linked sources");
    Ok(linked)
}

fn build_lookup(files: &BTreeMap<String, IndexedSourceFile>) -> Result<BTreeMap<String, String>> {
    let mut declared: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for (path, file) in files {
        declared.entry(file.package.as_str()).or_default().push(path.clone());
    }

    if let Some((package, paths)) = declared.iter().find(|(_, paths)| paths.len() > 1) {
        return Err(link::duplicate(*package, paths.clone()));
    }

    Ok(declared
        .into_iter()
        .filter_map(|(package, mut paths)| paths.pop().map(|p| (package.to_string(), p)))
        .collect())
}

/// A bundle package the provider declares as well
fn reject_shadowed(
    packages: &BTreeMap<String, String>,
    provider: &dyn PackageProvider,
) -> Result<()> {
    for (package, path) in packages {
        if let Some(external) = provider.provide(package).filter(|f| f.package == *package) {
            return Err(link::duplicate(
                package.as_str(),
                vec![path.clone(), external.raw.path],
            ));
        }
    }
    Ok(())
}

/// Compiler input: path → source text
pub fn modules(linked: &BTreeMap<String, LinkedSourceFile>) -> BTreeMap<String, String> {
    linked
        .iter()
        .map(|(path, file)| (path.clone(), file.file.raw.text().into_owned()))
        .collect()
}
