//! Oversampling latency table.

use clap::Args;
use inflator_core::OversampleRatio;

#[derive(Args)]
pub struct LatencyArgs {
    /// Host sample rate used for the millisecond column
    #[arg(long, default_value = "48000")]
    sample_rate: f32,
}

pub fn run(args: LatencyArgs) -> anyhow::Result<()> {
    if !(args.sample_rate.is_finite() && args.sample_rate > 0.0) {
        anyhow::bail!("sample rate must be positive, got {}", args.sample_rate);
    }
    println!("{:<6} {:>8} {:>10} {:>8}", "ratio", "samples", "exact", "ms");
    println!("{}", "-".repeat(35));
    for ratio in OversampleRatio::ALL {
        let samples = ratio.latency_samples();
        println!(
            "{:<6} {:>8} {:>10.3} {:>8.3}",
            ratio.label(),
            samples,
            ratio.latency(),
            samples as f32 * 1000.0 / args.sample_rate
        );
    }
    Ok(())
}
