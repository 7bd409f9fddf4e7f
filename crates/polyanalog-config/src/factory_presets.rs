//! Factory sounds bundled with the library.
//!
//! These are always available without any files on disk and make good
//! starting points for a bank.

use crate::Preset;

/// Internal identifiers of the factory presets.
pub static FACTORY_PRESET_NAMES: &[&str] = &["init", "bass", "pad", "lead", "unison"];

fn build(id: &str) -> Option<Preset> {
    let preset = match id {
        "init" => Preset::new("Init").with_description("Default sound, mono saw pair"),
        "bass" => Preset::new("Bass")
            .with_description("Punchy mono bass with filter envelope")
            .with_value("osc_a_octave", 0.25)
            .with_value("osc_a_waveform", 0.0)
            .with_value("osc_b_waveform", 0.6)
            .with_value("osc_mix", 0.4)
            .with_value("filter_cutoff", 0.35)
            .with_value("filter_resonance", 0.4)
            .with_value("filter_env", 0.6)
            .with_value("attack", 0.0)
            .with_value("decay", 0.35)
            .with_value("sustain", 0.2)
            .with_value("glide", 0.1),
        "pad" => Preset::new("Pad")
            .with_description("Slow four-voice pad with drifting filter")
            .with_value("play_mode", 1.0)
            .with_value("osc_a_waveform", 0.2)
            .with_value("osc_b_waveform", 0.2)
            .with_value("osc_mix", 0.5)
            .with_value("filter_cutoff", 0.6)
            .with_value("filter_resonance", 0.2)
            .with_value("attack", 0.6)
            .with_value("decay", 0.7)
            .with_value("sustain", 0.8)
            .with_value("lfo_a_destination", 0.25)
            .with_value("lfo_a_rate", 0.2)
            .with_value("lfo_a_amount", 0.25),
        "lead" => Preset::new("Lead")
            .with_description("Bright mono lead with vibrato on the mod wheel")
            .with_value("osc_a_waveform", 0.8)
            .with_value("osc_b_waveform", 0.9)
            .with_value("osc_b_tune", 0.6)
            .with_value("filter_cutoff", 0.8)
            .with_value("filter_resonance", 0.5)
            .with_value("filter_env", 0.3)
            .with_value("glide", 0.3)
            .with_value("lfo_b_destination", 0.0)
            .with_value("lfo_b_rate", 0.6)
            .with_value("lfo_b_amount", 0.1),
        "unison" => Preset::new("Unison")
            .with_description("Stacked detuned voices")
            .with_value("play_mode", 0.5)
            .with_value("osc_a_waveform", 0.0)
            .with_value("osc_b_waveform", 0.0)
            .with_value("osc_mix", 0.5)
            .with_value("filter_cutoff", 0.7)
            .with_value("noise", 0.1),
        _ => return None,
    };
    Some(preset)
}

/// All factory presets in bank order.
pub fn factory_presets() -> Vec<Preset> {
    FACTORY_PRESET_NAMES.iter().filter_map(|id| build(id)).collect()
}

/// Get a factory preset by internal id or display name, case-insensitively.
///
/// ```rust
/// use polyanalog_config::get_factory_preset;
///
/// let pad = get_factory_preset("PAD").unwrap();
/// assert_eq!(pad.name, "Pad");
/// ```
pub fn get_factory_preset(name: &str) -> Option<Preset> {
    let name_lower = name.to_lowercase();
    if let Some(preset) = build(&name_lower) {
        return Some(preset);
    }
    factory_presets()
        .into_iter()
        .find(|p| p.name.to_lowercase() == name_lower)
}

/// Internal identifiers of the factory presets.
pub fn factory_preset_names() -> Vec<&'static str> {
    FACTORY_PRESET_NAMES.to_vec()
}

/// True when `name` matches a factory preset.
pub fn is_factory_preset(name: &str) -> bool {
    get_factory_preset(name).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_factory_preset_valid() {
        let presets = factory_presets();
        assert_eq!(presets.len(), FACTORY_PRESET_NAMES.len());
        for preset in &presets {
            assert!(preset.validate().is_ok(), "{} invalid", preset.name);
            assert!(preset.description.is_some());
        }
    }

    #[test]
    fn test_lookup_by_id_and_name() {
        assert_eq!(get_factory_preset("bass").unwrap().name, "Bass");
        assert_eq!(get_factory_preset("Unison").unwrap().name, "Unison");
        assert!(get_factory_preset("missing").is_none());
        assert!(is_factory_preset("LEAD"));
        assert!(!is_factory_preset("my_patch"));
    }

    #[test]
    fn test_play_modes_differ() {
        assert_eq!(get_factory_preset("init").unwrap().value("play_mode"), Some(0.0));
        assert_eq!(get_factory_preset("unison").unwrap().value("play_mode"), Some(0.5));
        assert_eq!(get_factory_preset("pad").unwrap().value("play_mode"), Some(1.0));
    }

    #[test]
    fn test_names_listed_in_order() {
        assert_eq!(factory_preset_names()[0], "init");
        assert!(factory_preset_names().contains(&"pad"));
    }
}
