//! Manifester: materializes every declared dependency of a bundle
//!
//! Local dependencies are loaded through [`Storage`], remote ones through the
//! [`Fetcher`]. Every dependency is attempted and all failures are reported
//! together. Dependencies of dependencies are followed transitively and
//! deduplicated by identity; a remote bundle may only depend on other remote
//! bundles.

mod dependency_set;

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use tracing::{debug, info, warn};

use crate::config::BundleFile;
use crate::domain::{Bundle, LinkedSourceFile};
use crate::error::{BpmError, Result, UnresolvedDependency};
use crate::fetch::{CancellationToken, Fetcher, VendorDescriptor};
use crate::index;
use crate::linker;
use crate::storage::{LoadOptions, Storage};

pub use dependency_set::{ResolvedDependency, ResolvedDependencySet};

enum Source {
    Local(PathBuf),
    Remote(VendorDescriptor),
}

/// Name, specifier and descriptor of a remote dependency
type RemoteDependency = (String, String, VendorDescriptor);

struct Pending {
    name: String,
    specifier: String,
    source: Source,
}

impl Pending {
    fn identity(&self) -> String {
        match &self.source {
            Source::Local(path) => format!(
                "path:{}",
                dunce::canonicalize(path)
                    .unwrap_or_else(|_| path.clone())
                    .display()
            ),
            Source::Remote(descriptor) => format!("git:{}", descriptor.cache_key()),
        }
    }
}

pub struct Manifester {
    storage: Arc<Storage>,
    fetcher: Arc<Fetcher>,
    retries: u32,
    token: CancellationToken,
}

impl Manifester {
    pub fn new(storage: Arc<Storage>, fetcher: Arc<Fetcher>) -> Self {
        Self {
            storage,
            fetcher,
            retries: 1,
            token: CancellationToken::new(),
        }
    }

    /// Extra attempts after a retryable fetch failure
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Resolve every dependency declared by `manifest`; local paths are
    /// relative to `base_dir`
    pub fn resolve(
        &self,
        manifest: &BundleFile,
        base_dir: &Path,
    ) -> Result<ResolvedDependencySet> {
        let mut failures = Vec::new();
        let mut resolved = Vec::new();
        let mut seen: HashMap<String, String> = HashMap::new();
        let mut pending = pending_for(manifest, Some(base_dir), &mut failures);

        while !pending.is_empty() {
            let round = dedupe(pending, &mut seen, &mut failures);
            pending = Vec::new();

            let mut remote = Vec::new();
            for Pending {
                name,
                specifier,
                source,
            } in round
            {
                let path = match source {
                    Source::Local(path) => path,
                    Source::Remote(descriptor) => {
                        remote.push((name, specifier, descriptor));
                        continue;
                    }
                };
                match self.storage.load(&path, &LoadOptions::default()) {
                    Ok(bundle) => {
                        let dir = if path.is_dir() {
                            path.as_path()
                        } else {
                            path.parent().unwrap_or(base_dir)
                        };
                        pending.extend(pending_for(&bundle.manifest, Some(dir), &mut failures));
                        resolved.push(ResolvedDependency {
                            name,
                            specifier,
                            bundle: Arc::new(bundle),
                        });
                    }
                    Err(e) => failures.push(failure(&specifier, &e)),
                }
            }

            for ((name, specifier, _), result) in self.fetch_all(remote) {
                match result {
                    Ok(bundle) => {
                        pending.extend(pending_for(&bundle.manifest, None, &mut failures));
                        resolved.push(ResolvedDependency {
                            name,
                            specifier,
                            bundle,
                        });
                    }
                    Err(e) => failures.push(failure(&specifier, &e)),
                }
            }
        }

        if !failures.is_empty() {
            return Err(BpmError::UnresolvedDependencies { failures });
        }
        info!(dependencies = resolved.len(), "resolved dependencies");
        ResolvedDependencySet::build(resolved)
    }

    /// Resolve, index and link a bundle whose sources live at `base_dir`
    pub fn link_bundle(
        &self,
        bundle: &Bundle,
        base_dir: &Path,
    ) -> Result<BTreeMap<String, LinkedSourceFile>> {
        let dependencies = self.resolve(&bundle.manifest, base_dir)?;
        for dep in dependencies.dependencies() {
            debug!(
                name = %dep.name,
                specifier = %dep.specifier,
                version = %dep.bundle.manifest.package.version,
                "linking against dependency"
            );
        }
        let indexed = index::index_all(bundle.files.values())?;
        linker::link_with(indexed, Some(&dependencies))
    }

    /// Fetch distinct descriptors in parallel, preserving input order
    fn fetch_all(
        &self,
        remote: Vec<RemoteDependency>,
    ) -> Vec<(RemoteDependency, Result<Arc<Bundle>>)> {
        thread::scope(|s| {
            let handles: Vec<_> = remote
                .into_iter()
                .map(|dep| {
                    s.spawn(move || {
                        let result = self.fetch_with_retry(&dep.2);
                        (dep, result)
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
                .collect()
        })
    }

    fn fetch_with_retry(&self, descriptor: &VendorDescriptor) -> Result<Arc<Bundle>> {
        let mut attempt = 0;
        loop {
            match self.fetcher.resolve(descriptor, &self.token) {
                Err(e)
                    if e.is_retryable()
                        && attempt < self.retries
                        && !self.token.is_cancelled() =>
                {
                    attempt += 1;
                    warn!(%descriptor, attempt, error = %e, "fetch failed, retrying");
                }
                result => return result,
            }
        }
    }
}

/// Pending entries for a manifest's dependencies. `base_dir` is `None` for
/// remote bundles, whose local-path dependencies cannot be resolved.
fn pending_for(
    manifest: &BundleFile,
    base_dir: Option<&Path>,
    failures: &mut Vec<UnresolvedDependency>,
) -> Vec<Pending> {
    let mut out = Vec::new();
    for dep in &manifest.dependencies {
        let specifier = dep.specifier();
        let source = match (&dep.path, base_dir) {
            (Some(path), Some(base)) => Source::Local(base.join(path)),
            (Some(_), None) => {
                failures.push(UnresolvedDependency {
                    specifier,
                    reason: format!(
                        "local path dependency declared by remote bundle '{}'",
                        manifest.package.name
                    ),
                });
                continue;
            }
            (None, _) => match VendorDescriptor::from_dependency(dep) {
                Ok(Some(descriptor)) => Source::Remote(descriptor),
                Ok(None) => {
                    failures.push(UnresolvedDependency {
                        specifier,
                        reason: "neither 'path' nor 'git' is set".to_string(),
                    });
                    continue;
                }
                Err(e) => {
                    failures.push(failure(&specifier, &e));
                    continue;
                }
            },
        };
        out.push(Pending {
            name: dep.name.clone(),
            specifier,
            source,
        });
    }
    out
}

/// Drop entries already resolved under the same identity. A different
/// identity reusing a taken name is a conflict.
fn dedupe(
    pending: Vec<Pending>,
    seen: &mut HashMap<String, String>,
    failures: &mut Vec<UnresolvedDependency>,
) -> Vec<Pending> {
    let mut names: HashMap<String, String> = seen
        .iter()
        .map(|(identity, name)| (name.clone(), identity.clone()))
        .collect();
    let mut out = Vec::new();
    for dep in pending {
        let identity = dep.identity();
        if seen.contains_key(&identity) {
            debug!(name = %dep.name, %identity, "dependency already resolved");
            continue;
        }
        if let Some(other) = names.get(&dep.name) {
            failures.push(UnresolvedDependency {
                specifier: dep.specifier,
                reason: format!("name '{}' is already used by {other}", dep.name),
            });
            continue;
        }
        seen.insert(identity.clone(), dep.name.clone());
        names.insert(dep.name.clone(), identity);
        out.push(dep);
    }
    out
}

fn failure(specifier: &str, err: &BpmError) -> UnresolvedDependency {
    UnresolvedDependency {
        specifier: specifier.to_string(),
        reason: err.to_string(),
    }
}
