//! Dependency fetcher
//!
//! Resolves a [`VendorDescriptor`] to a bundle. Lookups are cache-first: by
//! expected digest when the descriptor pins one, otherwise through the
//! store's ref index. On a miss the bundle is retrieved through a [`Remote`],
//! verified, stored and indexed.
//!
//! Concurrent resolutions of the same descriptor share one retrieval. Slots
//! are dropped once complete so a failure is never cached; a later call
//! simply tries again.

mod cancel;
mod descriptor;
mod remote;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use tracing::{debug, info};

use crate::domain::Bundle;
use crate::error::{BpmError, Result, fetch};
use crate::hash;
use crate::storage::{RefEntry, Storage};

pub use cancel::CancellationToken;
pub use descriptor::VendorDescriptor;
pub use remote::{GitRemote, Remote, TransferObserver};
#[cfg(test)]
pub use remote::Retrieved;

type Slot = Arc<OnceLock<Result<Arc<Bundle>>>>;

pub struct Fetcher {
    storage: Arc<Storage>,
    remote: Arc<dyn Remote>,
    in_flight: Mutex<HashMap<String, Slot>>,
}

impl Fetcher {
    pub fn new(storage: Arc<Storage>, remote: Arc<dyn Remote>) -> Self {
        Self {
            storage,
            remote,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Fetcher backed by git retrieval
    pub fn with_git(storage: Arc<Storage>) -> Self {
        let remote = Arc::new(GitRemote::new(Arc::clone(&storage)));
        Self::new(storage, remote)
    }

    /// Resolve a descriptor to its bundle.
    ///
    /// Network failures are returned as fetch errors without retrying; a
    /// failed call leaves nothing behind, so callers may retry freely. A
    /// caller that joined a shared retrieval cancelled by someone else starts
    /// its own with its own token.
    pub fn resolve(
        &self,
        descriptor: &VendorDescriptor,
        token: &CancellationToken,
    ) -> Result<Arc<Bundle>> {
        if let Some(bundle) = self.cached(descriptor)? {
            return Ok(Arc::new(bundle));
        }

        let key = descriptor.cache_key();
        loop {
            let slot = {
                let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
                match in_flight.get(&key) {
                    Some(slot) => {
                        debug!(%key, "waiting on in-flight fetch");
                        Arc::clone(slot)
                    }
                    None => {
                        let slot: Slot = Arc::new(OnceLock::new());
                        in_flight.insert(key.clone(), Arc::clone(&slot));
                        slot
                    }
                }
            };

            let result = slot
                .get_or_init(|| self.retrieve_and_store(descriptor, token))
                .clone();

            {
                let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
                if in_flight.get(&key).is_some_and(|s| Arc::ptr_eq(s, &slot)) {
                    in_flight.remove(&key);
                }
            }

            match result {
                Err(BpmError::FetchCancelled { .. }) if !token.is_cancelled() => {
                    debug!(%key, "shared fetch cancelled by another caller, retrying");
                }
                result => {
                    let bundle = result?;
                    verify_expected(descriptor, &bundle)?;
                    return Ok(bundle);
                }
            }
        }
    }

    fn cached(&self, descriptor: &VendorDescriptor) -> Result<Option<Bundle>> {
        if let Some(digest) = &descriptor.digest {
            if let Some(bundle) = self.storage.get(digest)? {
                debug!(%descriptor, %digest, "fetch cache hit by digest");
                return Ok(Some(bundle));
            }
        }

        let Some(entry) = self.storage.lookup_ref(&descriptor.cache_key())? else {
            debug!(%descriptor, "fetch cache miss");
            return Ok(None);
        };
        if descriptor
            .digest
            .as_deref()
            .is_some_and(|expected| !hash::verify_hash(expected, &entry.digest))
        {
            debug!(%descriptor, "recorded digest differs from pinned digest, refetching");
            return Ok(None);
        }

        let bundle = self.storage.get(&entry.digest)?;
        if bundle.is_some() {
            debug!(%descriptor, sha = %entry.sha, "fetch cache hit by ref");
        }
        Ok(bundle)
    }

    fn retrieve_and_store(
        &self,
        descriptor: &VendorDescriptor,
        token: &CancellationToken,
    ) -> Result<Arc<Bundle>> {
        info!(%descriptor, "fetching bundle");
        let retrieved = self.remote.retrieve(descriptor, token)?;
        if token.is_cancelled() {
            return Err(fetch::cancelled(&descriptor.url));
        }

        let bundle = retrieved.bundle;
        verify_expected(descriptor, &bundle)?;

        let entry = self.storage.store(&bundle)?;
        self.storage.record_ref(
            &descriptor.cache_key(),
            &RefEntry {
                url: descriptor.url.clone(),
                git_ref: descriptor.git_ref.clone(),
                subdir: descriptor.subdir.clone(),
                sha: retrieved.sha,
                digest: entry.digest.clone(),
            },
        )?;
        info!(%descriptor, digest = %entry.digest, "fetched bundle");
        Ok(Arc::new(bundle))
    }
}

fn verify_expected(descriptor: &VendorDescriptor, bundle: &Bundle) -> Result<()> {
    let Some(expected) = &descriptor.digest else {
        return Ok(());
    };
    let actual = bundle.digest();
    if hash::verify_hash(expected, &actual) {
        Ok(())
    } else {
        Err(fetch::digest_mismatch(descriptor.to_string(), expected, actual))
    }
}
