//! Port classification and binding report.

#![allow(clippy::print_literal)]

use clap::Args;
use porthost_core::{BindingMap, PortRegion, PortTable, UnsupportedPortPolicy};
use serde::Serialize;

use super::common::{WorldKind, format_value, open_world, resolve_plugin};

#[derive(Args)]
pub struct PortsArgs {
    /// Plugin URI
    #[arg(value_name = "URI")]
    uri: String,

    /// Classify with required unsupported ports treated as errors
    #[arg(long)]
    strict_ports: bool,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct PortRow {
    index: u32,
    symbol: Option<String>,
    direction: Option<String>,
    kind: String,
    optional: bool,
    value: f32,
    min: Option<f32>,
    max: Option<f32>,
    binding: String,
}

#[derive(Serialize)]
struct PortReport {
    uri: String,
    name: String,
    audio_inputs: usize,
    audio_outputs: usize,
    ports: Vec<PortRow>,
}

fn describe(region: PortRegion) -> String {
    match region {
        PortRegion::Control(index) => format!("control[{index}]"),
        PortRegion::AudioIn(channel) => format!("in[{channel}]"),
        PortRegion::AudioOut(channel) => format!("out[{channel}]"),
        PortRegion::Unbound => "unbound".to_owned(),
    }
}

fn defined(value: f32) -> Option<f32> {
    (!value.is_nan()).then_some(value)
}

pub fn run(args: PortsArgs, kind: WorldKind) -> anyhow::Result<()> {
    let mut world = open_world(kind)?;
    world.load_all();
    let plugin = resolve_plugin(&*world, &args.uri)?;

    let policy = if args.strict_ports {
        UnsupportedPortPolicy::Reject
    } else {
        UnsupportedPortPolicy::Skip
    };
    let table = PortTable::classify(plugin, policy)?;
    let bindings = BindingMap::plan(&table);
    let ranges = plugin.port_ranges();

    let ports = table
        .ports()
        .iter()
        .map(|port| {
            let range = ranges.get(port.index as usize);
            PortRow {
                index: port.index,
                symbol: port.symbol.clone(),
                direction: port.direction.map(|d| d.to_string()),
                kind: port.kind.to_string(),
                optional: port.optional,
                value: port.value,
                min: range.and_then(|r| defined(r.min)),
                max: range.and_then(|r| defined(r.max)),
                binding: describe(bindings.region(port.index).unwrap_or_default()),
            }
        })
        .collect();
    let report = PortReport {
        uri: plugin.uri().to_owned(),
        name: plugin.name().to_owned(),
        audio_inputs: table.n_audio_in(),
        audio_outputs: table.n_audio_out(),
        ports,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{} <{}>", report.name, report.uri);
    println!(
        "{} audio input(s), {} audio output(s)",
        report.audio_inputs, report.audio_outputs
    );
    println!();
    println!(
        "  {:>3}  {:12}  {:6}  {:11}  {:8}  {:>10}  {:>10}  {:>10}  {}",
        "#", "Symbol", "Dir", "Kind", "Optional", "Value", "Min", "Max", "Binding"
    );
    for row in &report.ports {
        println!(
            "  {:>3}  {:12}  {:6}  {:11}  {:8}  {:>10}  {:>10}  {:>10}  {}",
            row.index,
            row.symbol.as_deref().unwrap_or("-"),
            row.direction.as_deref().unwrap_or("-"),
            row.kind,
            if row.optional { "yes" } else { "no" },
            format_value(row.value),
            format_value(row.min.unwrap_or(f32::NAN)),
            format_value(row.max.unwrap_or(f32::NAN)),
            row.binding,
        );
    }
    Ok(())
}
