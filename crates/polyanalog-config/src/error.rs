//! Error types for preset and bank operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading, writing or validating presets.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    ReadFile {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file
    #[error("failed to write file '{path}': {source}")]
    WriteFile {
        /// Path of the file that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to create directory
    #[error("failed to create directory '{path}': {source}")]
    CreateDir {
        /// Path of the directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to serialize TOML
    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// Preset not found
    #[error("preset not found: {0}")]
    PresetNotFound(String),

    /// Preset content does not fit the parameter table
    #[error("invalid preset '{name}': {reason}")]
    InvalidPreset {
        /// Name of the offending preset.
        name: String,
        /// Description of what is wrong.
        reason: String,
    },

    /// Bank slot outside the bank
    #[error("slot {slot} out of range (bank has {slots} slots)")]
    SlotOutOfRange {
        /// Requested slot.
        slot: usize,
        /// Number of slots in the bank.
        slots: usize,
    },
}

impl ConfigError {
    /// Create a read file error.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// Create a write file error.
    pub fn write_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::WriteFile {
            path: path.into(),
            source,
        }
    }

    /// Create a create directory error.
    pub fn create_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::CreateDir {
            path: path.into(),
            source,
        }
    }

    /// Create an invalid preset error.
    pub fn invalid_preset(name: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidPreset {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a slot out of range error.
    pub fn slot_out_of_range(slot: usize, slots: usize) -> Self {
        ConfigError::SlotOutOfRange { slot, slots }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    fn mock_io_err() -> std::io::Error {
        std::io::Error::new(std::io::ErrorKind::NotFound, "mock")
    }

    // --- factory methods ---

    #[test]
    fn read_file_factory_produces_correct_variant() {
        let err = ConfigError::read_file("/some/path", mock_io_err());
        assert!(
            matches!(err, ConfigError::ReadFile { ref path, .. } if path == std::path::Path::new("/some/path"))
        );
    }

    #[test]
    fn create_dir_factory_produces_correct_variant() {
        let err = ConfigError::create_dir("/dir/path", mock_io_err());
        assert!(matches!(err, ConfigError::CreateDir { .. }));
    }

    // --- Display formatting ---

    #[test]
    fn write_file_display() {
        let err = ConfigError::write_file("/a/bank.toml", mock_io_err());
        let msg = err.to_string();
        assert!(msg.contains("failed to write file"), "got: {msg}");
        assert!(msg.contains("/a/bank.toml"), "got: {msg}");
    }

    #[test]
    fn invalid_preset_display() {
        let err = ConfigError::invalid_preset("Bass", "expected 29 values, found 3");
        assert_eq!(
            err.to_string(),
            "invalid preset 'Bass': expected 29 values, found 3"
        );
    }

    #[test]
    fn slot_out_of_range_display() {
        let err = ConfigError::slot_out_of_range(16, 16);
        assert_eq!(err.to_string(), "slot 16 out of range (bank has 16 slots)");
    }

    // --- Error::source() chain ---

    #[test]
    fn io_variants_expose_source() {
        assert!(ConfigError::read_file("/x", mock_io_err()).source().is_some());
        assert!(ConfigError::write_file("/x", mock_io_err()).source().is_some());
        assert!(ConfigError::create_dir("/x", mock_io_err()).source().is_some());
    }

    #[test]
    fn plain_variants_have_no_source() {
        assert!(ConfigError::PresetNotFound("p".to_string()).source().is_none());
        assert!(ConfigError::slot_out_of_range(1, 1).source().is_none());
    }
}
