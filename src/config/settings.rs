//! Runtime settings resolved from command-line flags and environment

use std::path::PathBuf;

use crate::error::{BpmError, Result};

/// Environment variable overriding the storage directory
pub const STORAGE_DIR_ENV: &str = "BPM_PATH";

/// Environment variable overriding the number of fetch retries
pub const FETCH_RETRIES_ENV: &str = "BPM_FETCH_RETRIES";

/// Default storage directory name under the user's cache directory
const STORAGE_DIR: &str = "bpm";

const DEFAULT_FETCH_RETRIES: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Root of the content-addressed bundle store
    pub storage_dir: PathBuf,
    /// Extra attempts after a failed remote fetch
    pub fetch_retries: u32,
}

impl Settings {
    /// Resolve settings: explicit values win over the environment, which wins
    /// over platform defaults.
    pub fn resolve(storage_dir: Option<PathBuf>, fetch_retries: Option<u32>) -> Result<Self> {
        let storage_dir = match storage_dir {
            Some(dir) => dir,
            None => default_storage_dir()?,
        };

        let fetch_retries = match fetch_retries {
            Some(n) => n,
            None => match std::env::var(FETCH_RETRIES_ENV) {
                Ok(raw) => raw.trim().parse().map_err(|_| BpmError::ConfigParseFailed {
                    path: FETCH_RETRIES_ENV.to_string(),
                    reason: format!("expected a non-negative integer, got '{raw}'"),
                })?,
                Err(_) => DEFAULT_FETCH_RETRIES,
            },
        };

        Ok(Self {
            storage_dir,
            fetch_retries,
        })
    }
}

/// Get the default storage directory path
///
/// Uses `BPM_PATH` when set, otherwise the platform's standard cache location
/// (e.g. XDG on Linux, Library/Caches on macOS) with a `bpm` subdirectory.
pub fn default_storage_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(STORAGE_DIR_ENV) {
        if !dir.is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }

    let base = dirs::cache_dir().ok_or_else(|| BpmError::StorageOperationFailed {
        message: "Could not determine cache directory".to_string(),
    })?;

    Ok(base.join(STORAGE_DIR))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_explicit_values_win() {
        unsafe {
            std::env::set_var(STORAGE_DIR_ENV, "/from/env");
            std::env::set_var(FETCH_RETRIES_ENV, "5");
        }
        let settings = Settings::resolve(Some(PathBuf::from("/from/flag")), Some(0)).unwrap();
        unsafe {
            std::env::remove_var(STORAGE_DIR_ENV);
            std::env::remove_var(FETCH_RETRIES_ENV);
        }
        assert_eq!(settings.storage_dir, PathBuf::from("/from/flag"));
        assert_eq!(settings.fetch_retries, 0);
    }

    #[test]
    #[serial]
    fn test_environment_overrides_defaults() {
        unsafe {
            std::env::set_var(STORAGE_DIR_ENV, "/from/env");
            std::env::set_var(FETCH_RETRIES_ENV, "3");
        }
        let settings = Settings::resolve(None, None).unwrap();
        unsafe {
            std::env::remove_var(STORAGE_DIR_ENV);
            std::env::remove_var(FETCH_RETRIES_ENV);
        }
        assert_eq!(settings.storage_dir, PathBuf::from("/from/env"));
        assert_eq!(settings.fetch_retries, 3);
    }

    #[test]
    #[serial]
    fn test_defaults() {
        unsafe {
            std::env::remove_var(STORAGE_DIR_ENV);
            std::env::remove_var(FETCH_RETRIES_ENV);
        }
        if dirs::cache_dir().is_none() {
            return;
        }
        let settings = Settings::resolve(None, None).unwrap();
        assert!(settings.storage_dir.ends_with(STORAGE_DIR));
        assert_eq!(settings.fetch_retries, DEFAULT_FETCH_RETRIES);
    }

    #[test]
    #[serial]
    fn test_invalid_retries_env() {
        unsafe {
            std::env::set_var(FETCH_RETRIES_ENV, "many");
        }
        let result = Settings::resolve(Some(PathBuf::from("/x")), None);
        unsafe {
            std::env::remove_var(FETCH_RETRIES_ENV);
        }
        assert!(result.is_err());
    }
}
