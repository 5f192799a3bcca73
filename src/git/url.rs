//! URL normalization for libgit2

use std::borrow::Cow;

/// Normalize SCP-style SSH URLs (`git@host:path`) to `ssh://git@host/path`
pub fn normalize_ssh_url_for_clone(url: &str) -> Cow<'_, str> {
    if !url.starts_with("git@") {
        return Cow::Borrowed(url);
    }

    match url.split_once(':') {
        Some((host_part, path_part)) => {
            let path = path_part.trim_start_matches('/');
            Cow::Owned(format!("ssh://{host_part}/{path}"))
        }
        None => Cow::Borrowed(url),
    }
}

/// Normalize `file://` URLs so libgit2 resolves them on Unix
pub fn normalize_file_url_for_clone(url: &str) -> Cow<'_, str> {
    let Some(after) = url.strip_prefix("file://") else {
        return Cow::Borrowed(url);
    };
    if after.contains('\\') {
        return Cow::Owned(format!("file:///{}", after.replace('\\', "/").trim_start_matches('/')));
    }
    if !after.is_empty() && !after.starts_with('/') {
        return Cow::Owned(format!("file:///{after}"));
    }
    Cow::Borrowed(url)
}

/// Whether the URL points at the local filesystem (no shallow clones there)
pub fn is_local_url(url: &str) -> bool {
    url.starts_with("file://") || std::path::Path::new(url).is_absolute()
}
