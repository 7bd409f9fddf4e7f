//! Presets and preset banks for the polyanalog synth engine.
//!
//! - **Presets**: one complete sound as a TOML file of normalized parameter values
//! - **Banks**: sixteen numbered slots behind the bool-reporting [`PresetStore`] trait
//! - **Factory presets**: built-in sounds that need no files
//! - **Paths**: platform-specific preset and bank locations
//!
//! # Example
//!
//! ```rust,no_run
//! use polyanalog_config::{FileStore, Preset, PresetStore, default_bank_path};
//! use polyanalog_synth::{Capabilities, SynthKernel};
//!
//! let preset = Preset::load("warm_pad.toml").unwrap();
//! let mut kernel: SynthKernel = SynthKernel::new(48000.0, Capabilities::firmware());
//! kernel.load_preset(&preset.values);
//!
//! let mut store = FileStore::open(default_bank_path()).unwrap();
//! assert!(store.save(0, &kernel.snapshot()));
//! ```

mod bank;
mod error;
mod preset;

/// Platform-specific paths for presets and banks.
pub mod paths;

/// Factory presets bundled with the library.
pub mod factory_presets;

pub use bank::{
    FileStore, MemoryStore, PRESET_SLOTS, PresetBank, PresetCursor, PresetStore, SlotEntry,
};
pub use error::ConfigError;
pub use factory_presets::{
    FACTORY_PRESET_NAMES, factory_preset_names, factory_presets, get_factory_preset,
    is_factory_preset,
};
pub use paths::{
    default_bank_path, ensure_user_config_dir, ensure_user_presets_dir, find_preset,
    list_user_presets, preset_name_from_path, user_config_dir, user_presets_dir,
};
pub use preset::Preset;
