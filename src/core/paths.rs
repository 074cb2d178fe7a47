// src/core/paths.rs

//! Locations of runproc's configuration files.

use crate::constants::{CONFIG_DIR_NAME, CONFIG_FILENAME, CONFIG_PATH_ENV};
use lazy_static::lazy_static;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

lazy_static! {
    static ref RUNPROC_CONFIG_DIR: Mutex<Option<PathBuf>> = Mutex::new(None);
}

/// Errors raised while locating runproc files.
#[derive(Error, Debug)]
pub enum PathError {
    /// The platform reports no config directory for this user.
    #[error("Could not find system config directory.")]
    ConfigDirNotFound,
}

/// Returns the path to the runproc configuration directory (`~/.config/runproc`).
///
/// Memoized: the first call computes the path, later calls return the cached value.
/// The directory is not created.
pub fn get_config_dir() -> Result<PathBuf, PathError> {
    let mut cached_path_guard = RUNPROC_CONFIG_DIR
        .lock()
        .unwrap_or_else(PoisonError::into_inner);

    if let Some(path) = &*cached_path_guard {
        return Ok(path.clone());
    }

    let config_path = dirs::config_dir()
        .ok_or(PathError::ConfigDirNotFound)?
        .join(CONFIG_DIR_NAME);

    *cached_path_guard = Some(config_path.clone());
    Ok(config_path)
}

/// Returns the path of the configuration file.
///
/// `RUNPROC_CONFIG` overrides the location; otherwise the file lives in [`get_config_dir`].
pub fn get_config_file_path() -> Result<PathBuf, PathError> {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return Ok(PathBuf::from(path));
    }
    get_config_dir().map(|dir| dir.join(CONFIG_FILENAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_dir_is_memoized() {
        let (Ok(first), Ok(second)) = (get_config_dir(), get_config_dir()) else {
            // No config directory on this host (e.g. HOME unset); nothing to compare.
            return;
        };
        assert_eq!(first, second);
        assert!(first.ends_with(CONFIG_DIR_NAME));
    }
}
