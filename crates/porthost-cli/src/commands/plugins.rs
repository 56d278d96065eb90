//! Plugin catalog listing.

#![allow(clippy::print_literal)] // Table headers use literal strings intentionally

use clap::Args;
use porthost_core::Plugin;
use porthost_registry::{BuiltinWorld, PluginCategory, PluginManifest};
use serde::Serialize;

use super::common::{WorldKind, open_world};

#[derive(Args)]
pub struct PluginsArgs {
    /// Only list plugins in this category (generator, utility, analysis)
    #[arg(long, value_parser = parse_category)]
    category: Option<PluginCategory>,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct PluginRow<'a> {
    uri: &'a str,
    name: &'a str,
    category: &'a str,
    description: &'a str,
    ports: usize,
}

impl<'a> From<&'a PluginManifest> for PluginRow<'a> {
    fn from(m: &'a PluginManifest) -> Self {
        Self {
            uri: m.uri,
            name: m.name,
            category: m.category.name(),
            description: m.description,
            ports: m.ports.len(),
        }
    }
}

impl<'a> PluginRow<'a> {
    /// Row for a plugin outside the built-in catalog.
    fn installed(plugin: &'a dyn Plugin) -> Self {
        Self {
            uri: plugin.uri(),
            name: plugin.name(),
            category: "LV2",
            description: "",
            ports: plugin.port_count() as usize,
        }
    }
}

fn parse_category(s: &str) -> Result<PluginCategory, String> {
    [
        PluginCategory::Generator,
        PluginCategory::Utility,
        PluginCategory::Analysis,
    ]
    .into_iter()
    .find(|c| c.name().eq_ignore_ascii_case(s))
    .ok_or_else(|| format!("unknown category '{s}' (expected generator, utility or analysis)"))
}

pub fn run(args: PluginsArgs, kind: WorldKind) -> anyhow::Result<()> {
    if kind == WorldKind::Builtin {
        let world = BuiltinWorld::loaded();
        let manifests = match args.category {
            Some(category) => world.plugins_in_category(category),
            None => world.all_plugins(),
        };
        let rows: Vec<PluginRow<'_>> = manifests.into_iter().map(PluginRow::from).collect();
        return print_rows(&rows, args.json);
    }

    if args.category.is_some() {
        anyhow::bail!("--category only applies to the built-in plugins");
    }
    let mut world = open_world(kind)?;
    world.load_all();
    let plugins = world.plugins();
    let rows: Vec<PluginRow<'_>> = plugins.into_iter().map(PluginRow::installed).collect();
    print_rows(&rows, args.json)
}

fn print_rows(rows: &[PluginRow<'_>], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(rows)?);
        return Ok(());
    }

    println!("Available Plugins");
    println!("=================");
    println!();
    println!("  {:24}  {:18}  {:10}  {}", "URI", "Name", "Category", "Description");
    println!("  {:24}  {:18}  {:10}  {}", "---", "----", "--------", "-----------");
    for row in rows {
        println!(
            "  {:24}  {:18}  {:10}  {}",
            row.uri, row.name, row.category, row.description
        );
    }
    println!();
    println!("Use 'porthost ports <URI>' to see a plugin's ports.");
    Ok(())
}
