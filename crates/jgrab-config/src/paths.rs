//! Platform-specific location of deployment files.
//!
//! # Directory Structure
//!
//! - **User config**:
//!   - Linux: `~/.config/jgrab/`
//!   - macOS: `~/Library/Application Support/jgrab/`
//!   - Windows: `%APPDATA%\jgrab\`
//! - **Default deployment**: `deployment.toml` inside the user config directory
//!
//! # Example
//!
//! ```rust,no_run
//! use jgrab_config::paths;
//!
//! if let Some(path) = paths::find_config("substation-b") {
//!     println!("Found deployment at: {:?}", path);
//! }
//! ```

use std::path::PathBuf;

/// Application name used for directory paths.
pub const APP_NAME: &str = "jgrab";

/// File name of the default deployment.
const DEFAULT_FILE: &str = "deployment.toml";

/// Per-user directory holding deployment files, or `./jgrab` when the
/// platform has no config directory.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Path of the deployment used when none is given explicitly.
pub fn default_config_path() -> PathBuf {
    user_config_dir().join(DEFAULT_FILE)
}

/// Find a deployment file by name.
///
/// `name` may be a path to an existing file, or a deployment name (with or
/// without `.toml`) looked up in the user config directory.
pub fn find_config(name: &str) -> Option<PathBuf> {
    let path = PathBuf::from(name);
    if path.is_file() {
        return Some(path);
    }

    let filename = if name.ends_with(".toml") {
        name.to_string()
    } else {
        format!("{name}.toml")
    };

    let user_path = user_config_dir().join(filename);
    user_path.is_file().then_some(user_path)
}
