//! File-based processing command.

use std::path::PathBuf;

use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use inflator_core::{ChannelBuffer, ProcessSpec};
use inflator_dsp::{InflatorProcessor, MeterSource};
use serde::Serialize;

use crate::settings::{self, ParamOverrides};
use crate::wav::{read_wav, write_wav};

#[derive(Args)]
pub struct ProcessArgs {
    /// Input WAV file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Settings file (TOML); flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    params: ParamOverrides,

    /// Processing block size
    #[arg(long, default_value = "512")]
    block_size: usize,

    /// Output bit depth (16, 24, or 32)
    #[arg(long, default_value = "32")]
    bit_depth: u16,

    /// Print the meter report as JSON instead of text
    #[arg(long)]
    json: bool,
}

/// Levels of one channel in dBFS.
#[derive(Debug, Serialize)]
struct ChannelLevels {
    rms_db: f32,
    peak_db: f32,
    peak_hold_db: f32,
}

/// Summary printed after rendering.
#[derive(Debug, Serialize)]
struct Report {
    sample_rate: u32,
    channels: u16,
    frames: usize,
    over_sample: &'static str,
    latency_samples: usize,
    input: Vec<ChannelLevels>,
    output: Vec<ChannelLevels>,
}

fn levels(meter: &MeterSource) -> Vec<ChannelLevels> {
    meter
        .display_rms()
        .into_iter()
        .zip(meter.display_peak())
        .zip(meter.peak_max())
        .map(|((rms_db, peak_db), peak_hold_db)| ChannelLevels {
            rms_db,
            peak_db,
            peak_hold_db,
        })
        .collect()
}

pub fn run(args: ProcessArgs) -> anyhow::Result<()> {
    if !matches!(args.bit_depth, 16 | 24 | 32) {
        anyhow::bail!("unsupported bit depth {} (expected 16, 24 or 32)", args.bit_depth);
    }
    let params = settings::resolve(args.config.as_deref(), &args.params)?;

    let (input, spec) = read_wav(&args.input)?;
    let channels = input.num_channels();
    let frames = input.capacity();
    if frames == 0 {
        anyhow::bail!("{} contains no audio", args.input.display());
    }
    if !args.json {
        println!(
            "Reading {}: {} frames, {} ch, {} Hz",
            args.input.display(),
            frames,
            channels,
            spec.sample_rate
        );
    }

    let mut processor = InflatorProcessor::new();
    let handle = processor.handle();
    params.apply(&handle);
    processor.prepare(ProcessSpec::new(
        spec.sample_rate as f32,
        args.block_size,
        channels,
    ))?;

    // Run past the end by the latency so the trimmed output keeps every frame.
    let latency = processor.latency_samples();
    let total = frames + latency;
    let mut buffer = ChannelBuffer::new(channels, total);
    for ch in 0..channels {
        buffer.channel_mut(ch)[..frames].copy_from_slice(input.channel(ch));
    }

    tracing::info!(
        over_sample = params.over_sample.label(),
        latency,
        block_size = args.block_size,
        "rendering"
    );

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("##-"),
    );
    let mut start = 0;
    while start < total {
        let len = args.block_size.min(total - start);
        processor.process(&mut buffer.block_range(start, len));
        start += len;
        pb.set_position(start as u64);
    }
    pb.finish_and_clear();

    let mut interleaved = Vec::with_capacity(frames * channels);
    for frame in latency..total {
        for ch in 0..channels {
            interleaved.push(buffer.channel(ch)[frame]);
        }
    }
    write_wav(
        &args.output,
        &interleaved,
        spec.channels,
        spec.sample_rate,
        args.bit_depth,
    )?;

    let report = Report {
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        frames,
        over_sample: params.over_sample.label(),
        latency_samples: latency,
        input: levels(handle.input_meter()),
        output: levels(handle.output_meter()),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "Oversampling {} (latency {} samples, trimmed)",
            report.over_sample, report.latency_samples
        );
        for (name, meters) in [("Input", &report.input), ("Output", &report.output)] {
            for (ch, level) in meters.iter().enumerate() {
                println!(
                    "  {name:<6} ch{ch}: RMS {:.1} dB, Peak {:.1} dB, Hold {:.1} dB",
                    level.rms_db, level.peak_db, level.peak_hold_db
                );
            }
        }
        println!("Wrote {}", args.output.display());
    }

    Ok(())
}
