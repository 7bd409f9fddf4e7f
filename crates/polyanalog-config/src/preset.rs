//! Preset file format and operations.

use polyanalog_synth::{PARAM_COUNT, PARAMS, default_values};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// One complete sound: a normalized value for every engine parameter.
///
/// Values are stored in parameter-index order, the same flat layout the
/// engine's `snapshot` and `load_preset` use.
///
/// # TOML Format
///
/// ```toml
/// name = "Warm Pad"
/// description = "Slow attack, unison"
/// values = [0.5, 0.1, 0.8, ...]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Preset {
    /// Name of the preset.
    pub name: String,

    /// Optional description of the preset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Normalized parameter values in index order.
    pub values: Vec<f32>,
}

impl Preset {
    /// A preset holding every parameter default.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            values: default_values().to_vec(),
        }
    }

    /// A preset from an engine snapshot.
    pub fn from_values(name: impl Into<String>, values: &[f32]) -> Self {
        Self {
            name: name.into(),
            description: None,
            values: values.to_vec(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set a parameter by its string id (e.g. `"filter_cutoff"`).
    ///
    /// Unknown ids are ignored; the value is clamped to 0..1.
    pub fn with_value(mut self, string_id: &str, value: f32) -> Self {
        self.set_value(string_id, value);
        self
    }

    /// Set a parameter by its string id. Returns `false` for unknown ids.
    pub fn set_value(&mut self, string_id: &str, value: f32) -> bool {
        let Some(index) = param_index(string_id) else {
            return false;
        };
        if self.values.len() <= index {
            self.values.resize(index + 1, 0.0);
        }
        self.values[index] = value.clamp(0.0, 1.0);
        true
    }

    /// Normalized value of a parameter by its string id.
    pub fn value(&self, string_id: &str) -> Option<f32> {
        param_index(string_id).and_then(|i| self.values.get(i).copied())
    }

    /// Check the value count and range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.values.len() != PARAM_COUNT {
            return Err(ConfigError::invalid_preset(
                &self.name,
                format!(
                    "expected {} values, found {}",
                    PARAM_COUNT,
                    self.values.len()
                ),
            ));
        }
        if let Some((i, v)) = self
            .values
            .iter()
            .enumerate()
            .find(|(_, v)| !(0.0..=1.0).contains(*v))
        {
            return Err(ConfigError::invalid_preset(
                &self.name,
                format!("{} = {} is outside 0..1", PARAMS[i].string_id, v),
            ));
        }
        Ok(())
    }

    /// Load a preset from a TOML file and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Parse and validate a preset from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let preset: Preset = toml::from_str(toml_str)?;
        preset.validate()?;
        Ok(preset)
    }

    /// Save the preset to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Find a preset by factory name, file path or user preset name.
    pub fn resolve(name: &str) -> Result<Self, ConfigError> {
        if let Some(preset) = crate::get_factory_preset(name) {
            return Ok(preset);
        }
        match crate::find_preset(name) {
            Some(path) => Self::load(path),
            None => Err(ConfigError::PresetNotFound(name.to_string())),
        }
    }

    /// Convert the preset to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

fn param_index(string_id: &str) -> Option<usize> {
    PARAMS.iter().position(|p| p.string_id == string_id)
}
