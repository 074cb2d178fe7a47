//! # Config Loader
//!
//! Loads the optional `config.toml` that seeds the default execution context:
//!
//! ```toml
//! [start]
//! output = "capture"        # or "ignore"
//! error_output = "ignore"
//! suppress_echo = false
//!
//! [wait]
//! expected_exit_code = 0
//! accept_any_exit_code = false
//!
//! [resolver]
//! helper = "which"
//! ```
//!
//! Every table and key is optional; missing values fall back to the built-in defaults.

use crate::{
    core::paths::{self, PathError},
    models::{self, ExecContext, StartOptions, WaitOptions},
    system::resolver::ExecutableResolver,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading the configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("Could not read config file '{}': {source}", .path.display())]
    Io {
        /// The file being read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid TOML for this schema.
    #[error("Failed to parse config file '{}': {source}", .path.display())]
    TomlParse {
        /// The file being parsed.
        path: PathBuf,
        /// The underlying parse error.
        #[source]
        source: toml::de::Error,
    },
    /// The config location could not be determined.
    #[error(transparent)]
    Path(#[from] PathError),
}

/// The `[wait]` table. TOML has no null, so "accept any code" is its own flag.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct WaitConfig {
    /// The exit code required when `accept_any_exit_code` is false.
    pub expected_exit_code: i32,
    /// Accepts every exit code.
    pub accept_any_exit_code: bool,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            expected_exit_code: 0,
            accept_any_exit_code: false,
        }
    }
}

impl From<WaitConfig> for WaitOptions {
    fn from(config: WaitConfig) -> Self {
        if config.accept_any_exit_code {
            Self::accept_any()
        } else {
            Self::expect(config.expected_exit_code)
        }
    }
}

/// The parsed configuration file.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct RunprocConfig {
    /// Default launch options.
    pub start: StartOptions,
    /// Default wait options.
    pub wait: WaitConfig,
    /// Executable resolution settings.
    pub resolver: ExecutableResolver,
}

impl RunprocConfig {
    /// The execution context described by this configuration.
    pub fn exec_context(&self) -> ExecContext {
        ExecContext {
            start: self.start,
            wait: self.wait.into(),
        }
    }

    /// Installs the configured start options as the process-wide default.
    pub fn apply_as_default(&self) {
        models::set_default_start_options(self.start);
    }
}

/// Parses configuration text. `origin` is only used in error messages.
pub fn parse_config(content: &str, origin: &Path) -> Result<RunprocConfig, ConfigError> {
    toml::from_str(content).map_err(|source| ConfigError::TomlParse {
        path: origin.to_path_buf(),
        source,
    })
}

/// Loads the configuration from an explicit file, which must exist.
pub fn load_from_path(path: &Path) -> Result<RunprocConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content, path)
}

/// Loads the configuration from its default location, or the built-in defaults if
/// there is no file.
pub fn load() -> Result<RunprocConfig, ConfigError> {
    let path = paths::get_config_file_path()?;
    if !path.is_file() {
        log::debug!("No config file at '{}'; using defaults.", path.display());
        return Ok(RunprocConfig::default());
    }
    log::debug!("Loading config from '{}'", path.display());
    load_from_path(&path)
}
