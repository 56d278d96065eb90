//! Render a plugin to a WAV file.

use std::path::PathBuf;

use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use porthost_config::{RenderConfig, paths};
use porthost_core::{Host, ParamOverride, RenderReport};
use porthost_io::WavFiles;

use super::common::{WorldKind, default_plugin, open_world, parse_param};

/// Render a plugin offline to a WAV file.
#[derive(Args)]
pub struct RenderArgs {
    /// Plugin URI (e.g. urn:porthost:sine; with --world lv2 defaults to http://tytel.org/helm)
    #[arg(value_name = "URI")]
    pub plugin: Option<String>,

    /// Control override as symbol=value (repeatable)
    #[arg(short, long = "param", value_name = "SYMBOL=VALUE", value_parser = parse_param)]
    pub params: Vec<ParamOverride>,

    /// Output WAV path [default: out.wav]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Input WAV feeding the plugin's audio inputs
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Render length in seconds [default: input length, or 4]
    #[arg(short, long)]
    pub duration: Option<f64>,

    /// Sample rate in Hz [default: 44100]
    #[arg(long)]
    pub sample_rate: Option<u32>,

    /// Frames per plugin run [default: 1]
    #[arg(long)]
    pub block_size: Option<usize>,

    /// Output bit depth: 16, 24, or 32 (float) [default: 24]
    #[arg(long)]
    pub bit_depth: Option<u16>,

    /// Fail on required ports that are neither control nor audio
    #[arg(long)]
    pub strict_ports: bool,

    /// Settings file [default: <config dir>/porthost/render.toml if present]
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Also write the effective settings, -p overrides included, to this TOML file
    #[arg(long, value_name = "FILE")]
    pub save_config: Option<PathBuf>,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

/// Run the render command.
pub fn run(args: RenderArgs, kind: WorldKind) -> anyhow::Result<()> {
    let mut config = load_config(&args)?;
    if config.plugin.is_none() {
        config.plugin = default_plugin(kind).map(str::to_owned);
    }
    let request = config.to_request(&args.params)?;

    if let Some(path) = &args.save_config {
        let mut saved = config.clone();
        for param in &args.params {
            saved.params.insert(param.symbol.clone(), param.value);
        }
        saved.save(path)?;
        tracing::info!(path = %path.display(), "settings saved");
    }

    let progress = if args.no_progress {
        ProgressBar::hidden()
    } else {
        progress_bar()?
    };

    let mut world = open_world(kind)?;
    let mut files = WavFiles::new();
    let result = Host::new(world.as_mut(), &mut files).run_with(&request, &mut |done: u64, total: u64| {
        if progress.length() != Some(total) {
            progress.set_length(total);
        }
        progress.set_position(done);
    });
    progress.finish_and_clear();

    let report = result?;
    print_report(&report);
    if let Some(err) = &report.close_error {
        eprintln!("warning: {err}");
    }
    Ok(())
}

/// Defaults, then the settings file, then flags.
fn load_config(args: &RenderArgs) -> anyhow::Result<RenderConfig> {
    let mut config = match &args.config {
        Some(path) => RenderConfig::load(path)?,
        None => RenderConfig::load_or_default(paths::default_config_path())?,
    };

    if let Some(plugin) = &args.plugin {
        config.plugin = Some(plugin.clone());
    }
    if let Some(output) = &args.output {
        config.output = Some(output.clone());
    }
    if let Some(input) = &args.input {
        config.input = Some(input.clone());
    }
    if let Some(duration) = args.duration {
        config.duration_secs = Some(duration);
    }
    if let Some(rate) = args.sample_rate {
        config.sample_rate = rate;
    }
    if let Some(block) = args.block_size {
        config.block_size = block;
    }
    if let Some(bits) = args.bit_depth {
        config.bit_depth = bits;
    }
    config.strict_ports |= args.strict_ports;

    tracing::debug!(?config, "render settings");
    Ok(config)
}

fn progress_bar() -> anyhow::Result<ProgressBar> {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} frames ({eta})")?
            .progress_chars("##-"),
    );
    Ok(pb)
}

fn print_report(report: &RenderReport) {
    let secs = report.stats.frames as f64 / f64::from(report.sample_rate);
    println!("Rendered {} -> {}", report.plugin_uri, report.output.display());
    println!("  Channels:    {}", report.channels);
    println!("  Sample Rate: {} Hz", report.sample_rate);
    println!("  Frames:      {} ({secs:.3}s)", report.stats.frames);
    println!("  Blocks:      {}", report.stats.blocks);
    println!("  Runs:        {}", report.stats.runs);
}
