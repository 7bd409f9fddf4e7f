//! Sixteen-slot preset banks.
//!
//! The instrument stores presets in numbered slots and browses them with a
//! clamped cursor. Storage sits behind [`PresetStore`], whose save/load pair
//! reports success as a `bool` so a front panel can show "Saved" or
//! "Failed" without caring why. [`MemoryStore`] keeps everything in RAM;
//! [`FileStore`] writes the bank to a TOML file after every save.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::preset::Preset;

/// Number of slots in a bank.
pub const PRESET_SLOTS: usize = 16;

/// Slot storage with bool-reporting save and load.
pub trait PresetStore {
    /// Store `values` in `slot`. Returns `false` on a bad slot, bad values,
    /// or a storage failure.
    fn save(&mut self, slot: usize, values: &[f32]) -> bool;

    /// Copy the preset in `slot` into `values`. Returns `false` when the
    /// slot is empty or out of range; `values` is untouched in that case.
    fn load(&self, slot: usize, values: &mut [f32]) -> bool;
}

/// One occupied bank slot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SlotEntry {
    /// Slot index, 0-based.
    pub slot: usize,
    /// Stored preset.
    pub preset: Preset,
}

/// A bank of up to [`PRESET_SLOTS`] presets.
///
/// # TOML Format
///
/// ```toml
/// [[slots]]
/// slot = 0
///
/// [slots.preset]
/// name = "Init 00"
/// values = [0.0, 0.0, 0.8, ...]
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PresetBank {
    /// Occupied slots, in slot order.
    #[serde(default)]
    pub slots: Vec<SlotEntry>,
}

impl PresetBank {
    /// An empty bank.
    pub fn new() -> Self {
        Self::default()
    }

    /// A bank with the init sound in every slot.
    pub fn initialized() -> Self {
        let slots = (0..PRESET_SLOTS)
            .map(|slot| SlotEntry {
                slot,
                preset: Preset::new(format!("Init {slot:02}")),
            })
            .collect();
        Self { slots }
    }

    /// Preset in `slot`, `Ok(None)` when the slot is empty.
    pub fn get(&self, slot: usize) -> Result<Option<&Preset>, ConfigError> {
        check_slot(slot)?;
        Ok(self
            .slots
            .iter()
            .find(|e| e.slot == slot)
            .map(|e| &e.preset))
    }

    /// Store a validated preset in `slot`, replacing what was there.
    pub fn set(&mut self, slot: usize, preset: Preset) -> Result<(), ConfigError> {
        check_slot(slot)?;
        preset.validate()?;
        match self.slots.iter_mut().find(|e| e.slot == slot) {
            Some(entry) => entry.preset = preset,
            None => {
                self.slots.push(SlotEntry { slot, preset });
                self.slots.sort_by_key(|e| e.slot);
            }
        }
        Ok(())
    }

    /// Empty `slot`. Returns the preset that was there.
    pub fn clear(&mut self, slot: usize) -> Result<Option<Preset>, ConfigError> {
        check_slot(slot)?;
        Ok(self
            .slots
            .iter()
            .position(|e| e.slot == slot)
            .map(|i| self.slots.remove(i).preset))
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True when no slot is occupied.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Occupied slots in order.
    pub fn iter(&self) -> impl Iterator<Item = &SlotEntry> {
        self.slots.iter()
    }

    /// Check slot numbers, duplicates and every preset.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (i, entry) in self.slots.iter().enumerate() {
            check_slot(entry.slot)?;
            if self.slots[..i].iter().any(|e| e.slot == entry.slot) {
                return Err(ConfigError::invalid_preset(
                    &entry.preset.name,
                    format!("slot {} appears twice", entry.slot),
                ));
            }
            entry.preset.validate()?;
        }
        Ok(())
    }

    /// Load and validate a bank from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Parse and validate a bank from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let mut bank: PresetBank = toml::from_str(toml_str)?;
        bank.validate()?;
        bank.slots.sort_by_key(|e| e.slot);
        Ok(bank)
    }

    /// Save the bank to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }
        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))
    }

    /// Convert the bank to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    fn store(&mut self, slot: usize, values: &[f32]) -> Result<(), ConfigError> {
        let name = self
            .get(slot)?
            .map_or_else(|| format!("Slot {slot:02}"), |p| p.name.clone());
        self.set(slot, Preset::from_values(name, values))
    }

    fn fetch(&self, slot: usize, values: &mut [f32]) -> bool {
        match self.get(slot) {
            Ok(Some(preset)) => {
                let n = preset.values.len().min(values.len());
                values[..n].copy_from_slice(&preset.values[..n]);
                true
            }
            _ => false,
        }
    }
}

fn check_slot(slot: usize) -> Result<(), ConfigError> {
    if slot < PRESET_SLOTS {
        Ok(())
    } else {
        Err(ConfigError::slot_out_of_range(slot, PRESET_SLOTS))
    }
}

/// In-memory preset storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    bank: PresetBank,
}

impl MemoryStore {
    /// Wrap a bank.
    pub fn new(bank: PresetBank) -> Self {
        Self { bank }
    }

    /// The stored bank.
    pub fn bank(&self) -> &PresetBank {
        &self.bank
    }
}

impl PresetStore for MemoryStore {
    fn save(&mut self, slot: usize, values: &[f32]) -> bool {
        self.bank.store(slot, values).is_ok()
    }

    fn load(&self, slot: usize, values: &mut [f32]) -> bool {
        self.bank.fetch(slot, values)
    }
}

/// Preset storage backed by a bank file.
///
/// The whole bank is rewritten on every successful save.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    bank: PresetBank,
}

impl FileStore {
    /// Open `path`, or start an empty bank if the file does not exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let bank = if path.exists() {
            PresetBank::load(&path)?
        } else {
            PresetBank::new()
        };
        Ok(Self { path, bank })
    }

    /// Bank file location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The stored bank.
    pub fn bank(&self) -> &PresetBank {
        &self.bank
    }
}

impl PresetStore for FileStore {
    fn save(&mut self, slot: usize, values: &[f32]) -> bool {
        let mut next = self.bank.clone();
        let result = next.store(slot, values).and_then(|()| next.save(&self.path));
        match result {
            Ok(()) => {
                self.bank = next;
                true
            }
            Err(e) => {
                tracing::warn!("preset save to slot {slot} failed: {e}");
                false
            }
        }
    }

    fn load(&self, slot: usize, values: &mut [f32]) -> bool {
        self.bank.fetch(slot, values)
    }
}

/// Slot cursor clamped to the bank.
///
/// ```rust
/// use polyanalog_config::{PRESET_SLOTS, PresetCursor};
///
/// let mut cursor = PresetCursor::new();
/// cursor.decrement();
/// assert_eq!(cursor.get(), 0);
/// for _ in 0..40 {
///     cursor.increment();
/// }
/// assert_eq!(cursor.get(), PRESET_SLOTS - 1);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PresetCursor {
    slot: usize,
}

impl PresetCursor {
    /// Cursor at slot 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cursor at `slot`, clamped.
    pub fn at(slot: usize) -> Self {
        Self {
            slot: slot.min(PRESET_SLOTS - 1),
        }
    }

    /// Current slot.
    pub fn get(&self) -> usize {
        self.slot
    }

    /// Move to the next slot, stopping at the last.
    pub fn increment(&mut self) {
        self.slot = (self.slot + 1).min(PRESET_SLOTS - 1);
    }

    /// Move to the previous slot, stopping at 0.
    pub fn decrement(&mut self) {
        self.slot = self.slot.saturating_sub(1);
    }
}
