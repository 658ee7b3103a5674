//! Transfer curve inspection.

use std::path::PathBuf;

use clap::Args;
use inflator_dsp::ShaperMixer;

use crate::settings::{self, ParamOverrides};

#[derive(Args)]
pub struct CurvesArgs {
    /// Settings file (TOML); flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    params: ParamOverrides,

    /// Number of points between 0 and 1
    #[arg(long, default_value = "11")]
    points: usize,
}

pub fn run(args: CurvesArgs) -> anyhow::Result<()> {
    if args.points < 2 {
        anyhow::bail!("need at least 2 points, got {}", args.points);
    }
    let params = settings::resolve(args.config.as_deref(), &args.params)?;

    let mixer = ShaperMixer::new();
    mixer.set_types(params.style1, params.style2);
    mixer.set_shapes(
        params.curve1 / 100.0,
        params.curve2 / 100.0,
        params.weight / 100.0,
        params.auto_gain,
    );
    let state = mixer.snapshot();

    println!(
        "{} {:.0}% / {} {:.0}%, weight {:.0}%, auto gain {}",
        params.style1,
        params.curve1,
        params.style2,
        params.curve2,
        params.weight,
        if params.auto_gain { "on" } else { "off" }
    );
    println!(
        "compensation gains: {:.4} / {:.4}\n",
        state.slot1.gain(),
        state.slot2.gain()
    );
    println!("{:>8}  {:>8}", "in", "out");
    println!("{}", "-".repeat(18));
    for (x, y) in mixer.sample_curve(args.points) {
        println!("{x:>8.4}  {y:>8.4}");
    }
    Ok(())
}
