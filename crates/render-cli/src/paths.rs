//! User-directory resolution.
//!
//! Priority for the user-level base directory:
//!   1. `RENDER_COMMAND_HOME` env var (if set and non-empty)
//!   2. `dirs::config_dir().map(|d| d.join("render-command"))` (platform default)

use std::path::PathBuf;

pub const HOME_ENV: &str = "RENDER_COMMAND_HOME";

/// Returns the render-command user-level base directory.
pub fn user_dir() -> Option<PathBuf> {
    if let Ok(home) = std::env::var(HOME_ENV)
        && !home.is_empty()
    {
        return Some(PathBuf::from(home));
    }
    dirs::config_dir().map(|d| d.join("render-command"))
}

/// Returns the path of the user config file (`config.toml` under [`user_dir`]).
pub fn config_file() -> Option<PathBuf> {
    user_dir().map(|d| d.join("config.toml"))
}
