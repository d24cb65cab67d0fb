//! Environment variable utilities for roommodes
//!
//! Resolves the configuration file and the log file from, in order, an
//! explicit path, an environment variable and the current directory.

use crate::constants::{CONFIG_ENV_VAR, DEFAULT_CONFIG_FILE, DEFAULT_LOG_FILE, LOG_ENV_VAR};
use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Error type for environment and path resolution issues
#[derive(Debug, thiserror::Error)]
pub enum EnvError {
    #[error("config file does not exist: {0}")]
    ConfigNotFound(PathBuf),

    #[error("ROOMMODES_CONFIG points to a non-existent file: {0}")]
    ConfigEnvNotFound(PathBuf),

    #[error("no configuration given: pass --config, set ROOMMODES_CONFIG or add ./roommodes.toml")]
    NoConfig,

    #[error("cannot determine the current directory: {0}")]
    CurrentDir(#[from] std::io::Error),
}

/// Resolve the configuration file to read.
///
/// The lookup order is:
/// - `explicit` (usually the `--config` flag)
/// - the `ROOMMODES_CONFIG` environment variable
/// - `roommodes.toml` in the current directory
///
/// # Errors
///
/// Returns an error if the selected candidate does not exist, or if no
/// candidate is available at all.
///
/// # Example
///
/// ```no_run
/// use roommodes_env::env_utils::resolve_config_path;
///
/// let path = resolve_config_path(None)?;
/// println!("Using config {}", path.display());
/// # Ok::<(), roommodes_env::env_utils::EnvError>(())
/// ```
pub fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf, EnvError> {
    let cwd = env::current_dir()?;
    resolve_config_path_from(explicit, env::var_os(CONFIG_ENV_VAR), &cwd)
}

fn resolve_config_path_from(
    explicit: Option<&Path>,
    env_value: Option<OsString>,
    cwd: &Path,
) -> Result<PathBuf, EnvError> {
    if let Some(path) = explicit {
        if !path.is_file() {
            return Err(EnvError::ConfigNotFound(path.to_path_buf()));
        }
        return Ok(path.to_path_buf());
    }

    if let Some(value) = env_value.filter(|v| !v.is_empty()) {
        let path = PathBuf::from(value);
        if !path.is_file() {
            return Err(EnvError::ConfigEnvNotFound(path));
        }
        return Ok(path);
    }

    let local = cwd.join(DEFAULT_CONFIG_FILE);
    if local.is_file() {
        Ok(local)
    } else {
        Err(EnvError::NoConfig)
    }
}

/// Default log file: `ROOMMODES_LOG` if set, otherwise `roommodes.log` in the
/// current directory.
pub fn default_log_path() -> PathBuf {
    match env::var_os(LOG_ENV_VAR).filter(|v| !v.is_empty()) {
        Some(value) => PathBuf::from(value),
        None => env::current_dir()
            .map(|dir| dir.join(DEFAULT_LOG_FILE))
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_LOG_FILE)),
    }
}
