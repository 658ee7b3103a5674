//! Default settings dump.

use clap::Args;
use inflator_dsp::InflatorParams;

#[derive(Args)]
pub struct ConfigArgs {}

pub fn run(_args: ConfigArgs) -> anyhow::Result<()> {
    print!("{}", toml::to_string_pretty(&InflatorParams::default())?);
    Ok(())
}
