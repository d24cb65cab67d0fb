//! Default file names and environment variable names.

/// Config file looked up in the current directory when nothing else is given
pub const DEFAULT_CONFIG_FILE: &str = "roommodes.toml";

/// Log file used by `--logfile` when no explicit path is supplied
pub const DEFAULT_LOG_FILE: &str = "roommodes.log";

/// Environment variable pointing at a config file
pub const CONFIG_ENV_VAR: &str = "ROOMMODES_CONFIG";

/// Environment variable pointing at a log file
pub const LOG_ENV_VAR: &str = "ROOMMODES_LOG";
