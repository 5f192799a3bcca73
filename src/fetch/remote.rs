//! Retrieval of bundles from remote sources

use std::sync::Arc;

use tracing::debug;

use super::{CancellationToken, VendorDescriptor};
use crate::domain::Bundle;
use crate::error::{Result, fetch, storage};
use crate::git;
use crate::storage::{LoadOptions, Storage};

/// A bundle retrieved from a remote, with the commit it came from
#[derive(Debug, Clone)]
pub struct Retrieved {
    pub bundle: Bundle,
    pub sha: String,
}

/// A source of remote bundles
pub trait Remote: Send + Sync {
    /// Retrieve the bundle a descriptor points at. Must not touch the store's
    /// objects; the caller decides what to persist.
    fn retrieve(&self, descriptor: &VendorDescriptor, token: &CancellationToken)
    -> Result<Retrieved>;
}

/// Receives transfer progress for display
pub trait TransferObserver: Send + Sync {
    fn started(&self, descriptor: &VendorDescriptor);
    fn progress(&self, descriptor: &VendorDescriptor, received: usize, total: usize);
    fn finished(&self, descriptor: &VendorDescriptor, success: bool);
}

/// Retrieves bundles by cloning git repositories into the store's staging area
pub struct GitRemote {
    storage: Arc<Storage>,
    observer: Option<Arc<dyn TransferObserver>>,
}

impl GitRemote {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self {
            storage,
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn TransferObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    fn clone_and_load(
        &self,
        descriptor: &VendorDescriptor,
        token: &CancellationToken,
    ) -> Result<Retrieved> {
        let staging = self.storage.root().join("tmp");
        let checkout = tempfile::Builder::new()
            .prefix("fetch-")
            .tempdir_in(&staging)
            .map_err(|e| storage::write_failed(staging.display().to_string(), e.to_string()))?;

        let keep_going = |received: usize, total: usize| {
            if let Some(observer) = &self.observer {
                observer.progress(descriptor, received, total);
            }
            !token.is_cancelled()
        };
        let shallow = descriptor.git_ref.is_none();
        let repo = git::clone(&descriptor.url, checkout.path(), shallow, &keep_going)?;
        if token.is_cancelled() {
            return Err(fetch::cancelled(&descriptor.url));
        }

        let sha = git::resolve_ref(&repo, descriptor.git_ref.as_deref())?;
        git::checkout_commit(&repo, &sha)?;
        debug!(url = %descriptor.url, %sha, "checked out remote bundle");

        let root = match &descriptor.subdir {
            Some(subdir) => checkout.path().join(subdir),
            None => checkout.path().to_path_buf(),
        };
        let bundle = self.storage.load(&root, &LoadOptions::default())?;
        Ok(Retrieved { bundle, sha })
    }
}

impl Remote for GitRemote {
    fn retrieve(
        &self,
        descriptor: &VendorDescriptor,
        token: &CancellationToken,
    ) -> Result<Retrieved> {
        if token.is_cancelled() {
            return Err(fetch::cancelled(&descriptor.url));
        }
        if let Some(observer) = &self.observer {
            observer.started(descriptor);
        }
        let result = self.clone_and_load(descriptor, token);
        if let Some(observer) = &self.observer {
            observer.finished(descriptor, result.is_ok());
        }
        result
    }
}
