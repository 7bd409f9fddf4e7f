//! Parameter table listing.

#![allow(clippy::print_literal)]

use clap::Args;
use polyanalog_core::ParamFlags;
use polyanalog_synth::{MIDI_CC_START, PARAMS, ParamDescriptor};

#[derive(Args)]
pub struct ParamsArgs {
    /// Print the table as JSON
    #[arg(long)]
    json: bool,

    /// Only list parameters in this group (e.g. "filter", "lfo_a")
    #[arg(long)]
    group: Option<String>,
}

pub fn run(args: ParamsArgs) -> anyhow::Result<()> {
    let rows: Vec<(usize, &ParamDescriptor)> = PARAMS
        .iter()
        .enumerate()
        .filter(|(_, p)| {
            args.group
                .as_deref()
                .is_none_or(|g| p.group.eq_ignore_ascii_case(g))
        })
        .collect();

    if args.json {
        let json: Vec<serde_json::Value> = rows
            .iter()
            .map(|(index, p)| {
                serde_json::json!({
                    "index": index,
                    "id": p.string_id,
                    "name": p.name,
                    "short_name": p.short_name,
                    "group": p.group,
                    "unit": p.unit.suffix().trim(),
                    "min": p.min,
                    "max": p.max,
                    "default": p.default,
                    "default_normalized": p.default_normalized(),
                    "stepped": p.flags.contains(ParamFlags::STEPPED),
                    "cc": cc_number(*index),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(());
    }

    println!("Parameters");
    println!("==========");
    println!();
    println!(
        "  {:>3}  {:4}  {:20}  {:10}  {:24}  {}",
        "#", "CC", "ID", "Group", "Range", "Default"
    );
    println!(
        "  {:>3}  {:4}  {:20}  {:10}  {:24}  {}",
        "-", "--", "--", "-----", "-----", "-------"
    );
    for (index, p) in rows {
        let suffix = p.unit.suffix();
        let range = format!("{}{suffix} .. {}{suffix}", trim(p.min), trim(p.max));
        println!(
            "  {:>3}  {:4}  {:20}  {:10}  {:24}  {}{}",
            index,
            cc_number(index),
            p.string_id,
            p.group,
            range,
            trim(p.default),
            suffix
        );
    }
    println!();
    println!("CC 1 drives the mod wheel.");

    Ok(())
}

fn cc_number(index: usize) -> usize {
    usize::from(MIDI_CC_START) + index
}

fn trim(value: f32) -> String {
    let s = format!("{value:.3}");
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}
