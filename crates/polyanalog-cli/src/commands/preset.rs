//! Preset bank commands.

use anyhow::Context;
use clap::{Args, Subcommand};
use polyanalog_config::{PRESET_SLOTS, Preset, PresetBank, default_bank_path, factory_presets};
use polyanalog_synth::{PARAMS, default_values};
use std::path::{Path, PathBuf};

#[derive(Args)]
pub struct PresetArgs {
    /// Bank file (defaults to the user config directory)
    #[arg(long, global = true)]
    bank: Option<PathBuf>,

    #[command(subcommand)]
    command: PresetCommand,
}

#[derive(Subcommand)]
enum PresetCommand {
    /// Create a bank: factory sounds first, init sound in the rest
    Init {
        /// Overwrite an existing bank
        #[arg(long)]
        force: bool,
    },

    /// Show the bank, or one slot in detail
    Show {
        /// Slot to show
        slot: Option<usize>,
    },

    /// Write the default sound into a slot
    SaveDefaults {
        /// Target slot
        slot: usize,

        /// Name for the stored preset
        #[arg(short, long, default_value = "Init")]
        name: String,
    },
}

pub fn run(args: PresetArgs) -> anyhow::Result<()> {
    let path = args.bank.unwrap_or_else(default_bank_path);
    match args.command {
        PresetCommand::Init { force } => init_bank(&path, force),
        PresetCommand::Show { slot } => show_bank(&path, slot),
        PresetCommand::SaveDefaults { slot, name } => save_defaults(&path, slot, &name),
    }
}

fn load_bank(path: &Path) -> anyhow::Result<PresetBank> {
    PresetBank::load(path).with_context(|| format!("failed to load bank '{}'", path.display()))
}

fn init_bank(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Bank '{}' already exists. Use --force to overwrite.",
            path.display()
        );
    }

    let mut bank = PresetBank::initialized();
    for (slot, preset) in factory_presets().into_iter().enumerate() {
        bank.set(slot, preset)?;
    }
    bank.save(path)?;

    tracing::info!("initialized bank with {} slots", bank.len());
    println!("Created bank: {}", path.display());
    Ok(())
}

fn show_bank(path: &Path, slot: Option<usize>) -> anyhow::Result<()> {
    let bank = load_bank(path)?;

    let Some(slot) = slot else {
        println!("Bank: {}", path.display());
        println!();
        for slot in 0..PRESET_SLOTS {
            match bank.get(slot)? {
                Some(preset) => {
                    let desc = preset.description.as_deref().unwrap_or("");
                    println!("  {slot:2}  {:20}  {desc}", preset.name);
                }
                None => println!("  {slot:2}  (empty)"),
            }
        }
        return Ok(());
    };

    let preset = bank
        .get(slot)?
        .with_context(|| format!("slot {slot} is empty"))?;
    print_preset(slot, preset);
    Ok(())
}

fn print_preset(slot: usize, preset: &Preset) {
    println!("Slot {slot}: {}", preset.name);
    println!("{}", "=".repeat(8 + preset.name.len() + slot.to_string().len()));
    if let Some(desc) = &preset.description {
        println!("{desc}");
    }
    println!();
    for (desc, value) in PARAMS.iter().zip(&preset.values) {
        let physical = desc.denormalize(*value);
        println!(
            "  {:22}  {:.3}  ({:.3}{})",
            desc.string_id,
            value,
            physical,
            desc.unit.suffix()
        );
    }
}

fn save_defaults(path: &Path, slot: usize, name: &str) -> anyhow::Result<()> {
    let mut bank = if path.exists() {
        load_bank(path)?
    } else {
        PresetBank::new()
    };
    bank.set(slot, Preset::from_values(name, &default_values()))?;
    bank.save(path)?;

    println!("Saved '{name}' to slot {slot} of {}", path.display());
    Ok(())
}
