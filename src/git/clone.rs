//! Repository cloning

use std::path::Path;

use git2::{FetchOptions, RemoteCallbacks, Repository, build::RepoBuilder};

use super::auth::setup_auth_callbacks;
use super::error::{interpret_git_error, is_user_abort};
use super::url::{is_local_url, normalize_file_url_for_clone, normalize_ssh_url_for_clone};
use crate::error::{Result, fetch};

/// Clone a git repository into `target`.
///
/// Remote URLs are cloned shallowly when `shallow` is set. `keep_going` is
/// polled from the transfer-progress callback with `(received, total)`
/// objects; returning `false` aborts the transfer with a cancellation error.
pub fn clone(
    url: &str,
    target: &Path,
    shallow: bool,
    keep_going: &dyn Fn(usize, usize) -> bool,
) -> Result<Repository> {
    let mut callbacks = RemoteCallbacks::new();
    setup_auth_callbacks(&mut callbacks);
    callbacks.transfer_progress(|progress| {
        keep_going(progress.received_objects(), progress.total_objects())
    });

    let mut fetch_options = FetchOptions::new();
    fetch_options.remote_callbacks(callbacks);
    if shallow && !is_local_url(url) {
        fetch_options.depth(1);
    }

    let mut builder = RepoBuilder::new();
    builder.fetch_options(fetch_options);

    let url_to_clone = normalize_ssh_url_for_clone(url);
    let url_to_clone = normalize_file_url_for_clone(&url_to_clone);
    builder.clone(url_to_clone.as_ref(), target).map_err(|e| {
        if is_user_abort(&e) {
            fetch::cancelled(url)
        } else {
            fetch::clone_failed(url, interpret_git_error(&e))
        }
    })
}
