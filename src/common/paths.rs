//! Configuration paths
//!
//! The config file location can be forced with `STDIO_SCRIPT_CONFIG`,
//! which test suites use to pin a per-project configuration.

use std::path::PathBuf;

/// Name used for the configuration directory
const APP_NAME: &str = "stdio-script";

/// Environment variable that overrides the config file location
pub const CONFIG_ENV: &str = "STDIO_SCRIPT_CONFIG";

/// Get the configuration directory path
///
/// Uses the directories crate for platform-appropriate locations:
/// - Linux: `~/.config/stdio-script/`
/// - macOS: `~/Library/Application Support/stdio-script/`
/// - Windows: `%APPDATA%\stdio-script\`
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the configuration file
///
/// `$STDIO_SCRIPT_CONFIG` wins over the platform directory.
pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    config_dir().map(|dir| dir.join("config.toml"))
}
