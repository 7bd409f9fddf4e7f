//! Integration tests for polyanalog-config.
//!
//! Presets and banks on disk, driven through the synth engine.

use polyanalog_config::{
    ConfigError, FileStore, MemoryStore, PRESET_SLOTS, Preset, PresetBank, PresetCursor,
    PresetStore, factory_presets, get_factory_preset,
};
use polyanalog_synth::{Capabilities, PARAM_COUNT, Param, PlayMode, SynthEvent, SynthKernel};
use tempfile::TempDir;

fn render_peak(kernel: &mut SynthKernel, frames: usize) -> f32 {
    let mut out = vec![0.0f32; frames];
    kernel.process(&mut [out.as_mut_slice()]);
    out.iter().fold(0.0f32, |m, s| m.max(s.abs()))
}

// ---------------------------------------------------------------------------
// 1. Presets through the engine
// ---------------------------------------------------------------------------

#[test]
fn test_factory_presets_drive_kernel() {
    for preset in factory_presets() {
        let mut kernel: SynthKernel = SynthKernel::new(48000.0, Capabilities::full());
        kernel.load_preset(&preset.values);
        assert_eq!(kernel.snapshot().to_vec(), preset.values, "{}", preset.name);

        kernel.handle_event(SynthEvent::NoteOn {
            pitch: 48,
            velocity: 100,
        });
        let peak = render_peak(&mut kernel, 9600);
        assert!(peak.is_finite() && peak <= 1.0, "{}: {}", preset.name, peak);
        assert!(peak > 0.001, "{} is silent", preset.name);
    }
}

#[test]
fn test_preset_play_mode_reaches_kernel() {
    let pad = get_factory_preset("pad").unwrap();
    let mut kernel: SynthKernel = SynthKernel::new(48000.0, Capabilities::firmware());
    kernel.load_preset(&pad.values);
    assert_eq!(kernel.play_mode(), PlayMode::Poly);
}

#[test]
fn test_snapshot_saved_and_reloaded() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("patch.toml");

    let mut kernel: SynthKernel = SynthKernel::new(48000.0, Capabilities::firmware());
    kernel.update_parameter(Param::FilterCutoff.index(), 0.42);
    kernel.update_parameter(Param::Glide.index(), 0.3);
    Preset::from_values("Patch", &kernel.snapshot())
        .save(&path)
        .unwrap();

    let loaded = Preset::load(&path).unwrap();
    let mut other: SynthKernel = SynthKernel::new(48000.0, Capabilities::firmware());
    other.load_preset(&loaded.values);
    assert_eq!(other.snapshot(), kernel.snapshot());
}

#[test]
fn test_invalid_preset_file_rejected() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("bad.toml");
    std::fs::write(&path, "name = \"Bad\"\nvalues = [0.5, 0.5]\n").unwrap();

    let err = Preset::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidPreset { .. }));

    std::fs::write(&path, "this is not toml =").unwrap();
    assert!(matches!(
        Preset::load(&path).unwrap_err(),
        ConfigError::TomlParse(_)
    ));

    assert!(matches!(
        Preset::load(temp.path().join("missing.toml")).unwrap_err(),
        ConfigError::ReadFile { .. }
    ));
}

// ---------------------------------------------------------------------------
// 2. Bank files
// ---------------------------------------------------------------------------

#[test]
fn test_bank_file_round_trip() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested").join("bank.toml");

    let mut bank = PresetBank::new();
    for (slot, preset) in factory_presets().into_iter().enumerate() {
        bank.set(slot, preset).unwrap();
    }
    bank.save(&path).unwrap();

    let loaded = PresetBank::load(&path).unwrap();
    assert_eq!(loaded, bank);
    assert_eq!(loaded.get(1).unwrap().unwrap().name, "Bass");
}

#[test]
fn test_file_store_persists_saves() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("bank.toml");

    let mut values = [0.0f32; PARAM_COUNT];
    values[Param::Volume.index()] = 0.6;
    {
        let mut store = FileStore::open(&path).unwrap();
        assert!(store.bank().is_empty());
        assert!(store.save(7, &values));
    }

    let store = FileStore::open(&path).unwrap();
    let mut loaded = [1.0f32; PARAM_COUNT];
    assert!(store.load(7, &mut loaded));
    assert_eq!(loaded, values);
    assert!(!store.load(8, &mut loaded));
}

#[test]
fn test_file_store_rejects_bad_values() {
    let temp = TempDir::new().unwrap();
    let mut store = FileStore::open(temp.path().join("bank.toml")).unwrap();
    let mut values = [0.5f32; PARAM_COUNT];
    values[0] = 3.0;
    assert!(!store.save(0, &values));
    assert!(!store.path().exists());
}

// ---------------------------------------------------------------------------
// 3. Slot browsing
// ---------------------------------------------------------------------------

#[test]
fn test_cursor_walks_memory_bank() {
    let mut store = MemoryStore::new(PresetBank::initialized());
    let mut cursor = PresetCursor::new();
    let mut values = [0.0f32; PARAM_COUNT];

    for _ in 0..PRESET_SLOTS + 3 {
        assert!(store.load(cursor.get(), &mut values));
        cursor.increment();
    }
    assert_eq!(cursor.get(), PRESET_SLOTS - 1);

    values[Param::OscMix.index()] = 0.9;
    assert!(store.save(cursor.get(), &values));
    cursor.decrement();
    let mut check = [0.0f32; PARAM_COUNT];
    assert!(store.load(PRESET_SLOTS - 1, &mut check));
    assert!((check[Param::OscMix.index()] - 0.9).abs() < 1e-6);
}
