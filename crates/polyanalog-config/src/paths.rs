//! Platform-specific paths for presets and banks.
//!
//! - **User config**: `~/.config/polyanalog/` (Linux),
//!   `~/Library/Application Support/polyanalog/` (macOS), `%APPDATA%\polyanalog\` (Windows)
//! - **User presets**: the `presets/` subdirectory of the user config directory
//! - **Default bank**: `bank.toml` in the user config directory
//!
//! ```rust,no_run
//! use polyanalog_config::paths;
//!
//! let presets_dir = paths::user_presets_dir();
//! println!("User presets: {:?}", presets_dir);
//!
//! if let Some(path) = paths::find_preset("warm_pad") {
//!     println!("Found preset at: {:?}", path);
//! }
//! ```

use std::path::{Path, PathBuf};

use crate::ConfigError;

const APP_NAME: &str = "polyanalog";
const PRESETS_SUBDIR: &str = "presets";
const BANK_FILE: &str = "bank.toml";

/// The user configuration directory.
///
/// Falls back to the current directory if the platform has none.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// The user presets directory.
pub fn user_presets_dir() -> PathBuf {
    user_config_dir().join(PRESETS_SUBDIR)
}

/// Where the default preset bank lives.
pub fn default_bank_path() -> PathBuf {
    user_config_dir().join(BANK_FILE)
}

/// Find a preset file by path or by name.
///
/// `name` may be a path to an existing file, or a preset name with or
/// without the `.toml` extension, looked up in the user presets directory.
pub fn find_preset(name: &str) -> Option<PathBuf> {
    let path = PathBuf::from(name);
    if path.is_file() {
        return Some(path);
    }

    let filename = if name.ends_with(".toml") {
        name.to_string()
    } else {
        format!("{name}.toml")
    };

    let user_path = user_presets_dir().join(filename);
    user_path.is_file().then_some(user_path)
}

/// Create the user presets directory if needed.
///
/// # Errors
///
/// Returns [`ConfigError::CreateDir`] if the directory cannot be created.
pub fn ensure_user_presets_dir() -> Result<PathBuf, ConfigError> {
    ensure_dir(user_presets_dir())
}

/// Create the user config directory if needed.
///
/// # Errors
///
/// Returns [`ConfigError::CreateDir`] if the directory cannot be created.
pub fn ensure_user_config_dir() -> Result<PathBuf, ConfigError> {
    ensure_dir(user_config_dir())
}

fn ensure_dir(dir: PathBuf) -> Result<PathBuf, ConfigError> {
    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| ConfigError::create_dir(&dir, e))?;
    }
    Ok(dir)
}

/// Preset files in the user presets directory.
///
/// Empty when the directory is missing or unreadable.
pub fn list_user_presets() -> Vec<PathBuf> {
    list_presets_in_dir(&user_presets_dir())
}

fn list_presets_in_dir(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut presets: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    presets.sort();
    presets
}

/// Preset name from a file path (the file stem).
///
/// ```rust
/// use polyanalog_config::paths::preset_name_from_path;
/// use std::path::Path;
///
/// let name = preset_name_from_path(Path::new("/path/to/warm_pad.toml"));
/// assert_eq!(name, Some("warm_pad".to_string()));
/// ```
pub fn preset_name_from_path(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(ToString::to_string)
}
