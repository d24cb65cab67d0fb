//! roommodes environment and constants
//!
//! This crate centralises environment variable handling and the default file
//! names shared by the roommodes library and binary.

pub mod constants;
pub mod env_utils;

// Re-export commonly used items
pub use constants::{CONFIG_ENV_VAR, DEFAULT_CONFIG_FILE, DEFAULT_LOG_FILE, LOG_ENV_VAR};
pub use env_utils::{EnvError, default_log_path, resolve_config_path};
