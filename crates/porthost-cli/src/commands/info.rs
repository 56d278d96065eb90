//! Display metadata of a rendered WAV file.

use clap::Args;
use porthost_io::{WavFormat, read_wav, read_wav_info};

/// Display WAV file information.
#[derive(Args)]
pub struct InfoArgs {
    /// Path to the WAV file
    pub file: std::path::PathBuf,

    /// Also scan the samples and report the peak level per channel
    #[arg(long)]
    pub peak: bool,
}

/// Run the info command.
pub fn run(args: InfoArgs) -> anyhow::Result<()> {
    let info = read_wav_info(&args.file)?;

    let format_str = match info.format {
        WavFormat::Pcm => "PCM",
        WavFormat::IeeeFloat => "IEEE Float",
    };

    println!("File:        {}", args.file.display());
    println!("Format:      {} {}-bit", format_str, info.bits_per_sample);
    println!("Channels:    {}", info.channels);
    println!("Sample Rate: {} Hz", info.sample_rate);
    println!(
        "Duration:    {:.3}s ({} frames)",
        info.duration_secs, info.num_frames
    );

    let file_size = std::fs::metadata(&args.file)?.len();
    println!("File Size:   {}", format_bytes(file_size));

    if args.peak {
        let (samples, spec) = read_wav(&args.file)?;
        for (channel, peak) in channel_peaks(&samples, spec.channels as usize).iter().enumerate() {
            println!("Peak ch{channel}:    {:.1} dBFS", 20.0 * peak.max(1e-9).log10());
        }
    }

    Ok(())
}

/// Absolute peak of each channel of interleaved samples.
fn channel_peaks(samples: &[f32], channels: usize) -> Vec<f32> {
    let mut peaks = vec![0.0f32; channels];
    if channels == 0 {
        return peaks;
    }
    for frame in samples.chunks(channels) {
        for (peak, x) in peaks.iter_mut().zip(frame) {
            *peak = peak.max(x.abs());
        }
    }
    peaks
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
