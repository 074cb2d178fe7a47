// src/constants.rs

//! File names, environment variables and search-helper conventions.

/// The name of the runproc directory inside the system config directory.
pub const CONFIG_DIR_NAME: &str = "runproc";

/// The name of the configuration file (inside the runproc config directory).
pub const CONFIG_FILENAME: &str = "config.toml";

/// Environment variable overriding the configuration file location.
pub const CONFIG_PATH_ENV: &str = "RUNPROC_CONFIG";

/// The executable-search helper on Windows.
pub const WINDOWS_SEARCH_HELPER: &str = "where";

/// The executable-search helper on Unix.
pub const UNIX_SEARCH_HELPER: &str = "which";

/// Exit code the search helper reserves for "no match".
pub const SEARCH_HELPER_NOT_FOUND_CODE: i32 = 1;

