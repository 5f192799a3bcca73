//! Command implementations for bpm CLI

pub mod build;
pub mod cache;
pub mod completions;
pub mod fetch;
pub mod inspect;
pub mod link;
pub mod validate;
pub mod version;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use console::{Style, Term};

use crate::config::Settings;
use crate::error::Result;
use crate::fetch::{Fetcher, GitRemote};
use crate::pipeline::CommandOutput;
use crate::progress::FetchProgress;
use crate::storage::Storage;

/// Settings and the store, shared by every command that touches bundles
pub struct Context {
    pub settings: Settings,
    pub storage: Arc<Storage>,
}

impl Context {
    pub fn new(storage_dir: Option<PathBuf>, fetch_retries: Option<u32>) -> Result<Self> {
        let settings = Settings::resolve(storage_dir, fetch_retries)?;
        let storage = Arc::new(Storage::open(&settings.storage_dir)?);
        Ok(Self { settings, storage })
    }

    /// Git-backed fetcher; transfers are shown when stderr is a terminal
    pub fn fetcher(&self) -> Arc<Fetcher> {
        let storage = Arc::clone(&self.storage);
        if !Term::stderr().is_term() {
            return Arc::new(Fetcher::with_git(storage));
        }
        let remote =
            GitRemote::new(Arc::clone(&storage)).with_observer(Arc::new(FetchProgress::new()));
        Arc::new(Fetcher::new(storage, Arc::new(remote)))
    }
}

/// Directory local dependency paths are relative to
pub(crate) fn base_dir(path: &Path) -> PathBuf {
    if path.is_dir() {
        path.to_path_buf()
    } else {
        path.parent().map(Path::to_path_buf).unwrap_or_default()
    }
}

/// Print what a pipeline command produced
pub(crate) fn report(output: &CommandOutput) {
    let ok = Style::new().green().bold();
    let dim = Style::new().dim();
    match output {
        CommandOutput::Validated(manifest) => {
            println!(
                "{} {} {} is valid",
                ok.apply_to("✓"),
                manifest.package.name,
                manifest.package.version
            );
        }
        CommandOutput::Built(built) => {
            println!(
                "{} Built {} ({} file{})",
                ok.apply_to("✓"),
                built.archive.display(),
                built.files,
                if built.files == 1 { "" } else { "s" }
            );
            println!("  {} {}", dim.apply_to("digest:"), built.digest);
            println!("  {} {}", dim.apply_to("lock:"), built.lockfile.display());
        }
    }
}
