//! Platform-specific configuration paths.
//!
//! # Lookup Order
//!
//! 1. `pdkit.toml` in the working directory
//! 2. `config.toml` in the user config directory: `~/.config/pdkit/` (Linux),
//!    `~/Library/Application Support/pdkit/` (macOS), `%APPDATA%\pdkit\` (Windows)
//!
//! # Example
//!
//! ```rust,no_run
//! use pdkit_config::paths;
//!
//! if let Some(path) = paths::find_config() {
//!     println!("Using config at: {:?}", path);
//! }
//! ```

use std::path::{Path, PathBuf};

/// Application name used for directory paths.
const APP_NAME: &str = "pdkit";

/// File name looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "pdkit.toml";

/// File name inside the user config directory.
pub const USER_CONFIG_FILE: &str = "config.toml";

/// Returns the user-specific configuration directory.
///
/// Returns a fallback path if the config directory cannot be determined.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Returns the path of the user configuration file, whether or not it exists.
pub fn default_config_path() -> PathBuf {
    user_config_dir().join(USER_CONFIG_FILE)
}

/// Finds the configuration file to use, if any.
pub fn find_config() -> Option<PathBuf> {
    find_config_from(Path::new("."))
}

/// Like [`find_config`], treating `dir` as the working directory.
pub fn find_config_from(dir: &Path) -> Option<PathBuf> {
    let local = dir.join(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }

    let user = default_config_path();
    if user.is_file() {
        return Some(user);
    }

    None
}

/// Ensure the user config directory exists.
///
/// Creates the directory and any parent directories if they don't exist.
pub fn ensure_user_config_dir() -> Result<PathBuf, crate::ConfigError> {
    let dir = user_config_dir();

    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| crate::ConfigError::create_dir(&dir, e))?;
    }

    Ok(dir)
}
