//! porthost CLI - render a single audio plugin offline to a WAV file.

mod commands;

use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use commands::common::WorldKind;
use porthost_core::HostError;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "porthost")]
#[command(author, version, about = "Offline single-plugin audio host", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Where to look plugins up
    #[arg(long, value_enum, global = true, default_value_t = WorldKind::Builtin)]
    world: WorldKind,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a plugin to a WAV file
    Render(commands::render::RenderArgs),

    /// List the available plugins
    Plugins(commands::plugins::PluginsArgs),

    /// Show how a plugin's ports are classified and bound
    Ports(commands::ports::PortsArgs),

    /// Display WAV file metadata
    Info(commands::info::InfoArgs),
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // Usage errors exit 1; status 2 belongs to invalid plugin URIs.
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Render(args) => commands::render::run(args, cli.world),
        Commands::Plugins(args) => commands::plugins::run(args, cli.world),
        Commands::Ports(args) => commands::ports::run(args, cli.world),
        Commands::Info(args) => commands::info::run(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(exit_status(&err))
        }
    }
}

/// Stage-specific status for host errors, 1 for everything else.
fn exit_status(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<HostError>()
        .map_or(1, |e| u8::try_from(e.exit_code()).unwrap_or(1))
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| level.into()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
