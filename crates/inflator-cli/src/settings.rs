//! Settings file loading and command-line overrides.

use std::path::{Path, PathBuf};

use clap::Args;
use inflator_core::{CurveKind, OversampleRatio};
use inflator_dsp::{InflatorParams, parse_over_sample, parse_style};
use thiserror::Error;

/// Errors while loading a settings file.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Failed to read the file.
    #[error("failed to read settings '{path}': {source}")]
    ReadFile {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// File is not valid settings TOML.
    #[error("invalid settings TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Load a TOML settings file. Missing keys keep their defaults.
pub fn load(path: &Path) -> Result<InflatorParams, SettingsError> {
    let content = std::fs::read_to_string(path).map_err(|source| SettingsError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    let params: InflatorParams = toml::from_str(&content)?;
    tracing::debug!(path = %path.display(), "settings loaded");
    Ok(params)
}

/// Per-parameter flags shared by `process` and `curves`.
#[derive(Args, Debug, Default, Clone)]
pub struct ParamOverrides {
    /// Input gain in dB (-6 to 6)
    #[arg(long, allow_hyphen_values = true)]
    pub input_gain: Option<f32>,

    /// Output gain in dB (-10 to 2)
    #[arg(long, allow_hyphen_values = true)]
    pub output_gain: Option<f32>,

    /// Wet amount in percent
    #[arg(long)]
    pub wet: Option<f32>,

    /// First curve amount in percent
    #[arg(long)]
    pub curve1: Option<f32>,

    /// Second curve amount in percent
    #[arg(long)]
    pub curve2: Option<f32>,

    /// Weight of the second curve in percent
    #[arg(long)]
    pub weight: Option<f32>,

    /// Low crossover frequency in Hz
    #[arg(long)]
    pub low_split: Option<f32>,

    /// High crossover frequency in Hz
    #[arg(long)]
    pub high_split: Option<f32>,

    /// Enable shaping (true/false)
    #[arg(long)]
    pub effect_in: Option<bool>,

    /// Shape low/mid/high bands separately (true/false)
    #[arg(long)]
    pub band_split: Option<bool>,

    /// Loudness compensation (true/false)
    #[arg(long)]
    pub auto_gain: Option<bool>,

    /// Oversampling: OFF, 2x, 4x, 8x or 16x
    #[arg(long, value_parser = parse_over_sample)]
    pub over_sample: Option<OversampleRatio>,

    /// First curve style (Identity, Quadratic, Cubic, Quartic, Sigmoid, Sin)
    #[arg(long, value_parser = parse_style)]
    pub style1: Option<CurveKind>,

    /// Second curve style
    #[arg(long, value_parser = parse_style)]
    pub style2: Option<CurveKind>,
}

impl ParamOverrides {
    /// Overwrite every field that was given on the command line.
    pub fn apply_to(&self, params: &mut InflatorParams) {
        macro_rules! set {
            ($($field:ident),*) => {
                $(if let Some(value) = self.$field {
                    params.$field = value;
                })*
            };
        }
        set!(
            input_gain,
            output_gain,
            wet,
            curve1,
            curve2,
            weight,
            low_split,
            high_split,
            effect_in,
            band_split,
            auto_gain,
            over_sample,
            style1,
            style2
        );
    }
}

/// Settings file (if any) with overrides applied, clamped to valid ranges.
pub fn resolve(config: Option<&Path>, overrides: &ParamOverrides) -> Result<InflatorParams, SettingsError> {
    let mut params = match config {
        Some(path) => load(path)?,
        None => InflatorParams::default(),
    };
    overrides.apply_to(&mut params);
    Ok(params.clamped())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn overrides_win_over_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "wet = 30.0\nstyle1 = \"Sigmoid\"\nover_sample = \"2x\"").unwrap();

        let overrides = ParamOverrides {
            wet: Some(70.0),
            band_split: Some(true),
            ..Default::default()
        };
        let params = resolve(Some(file.path()), &overrides).unwrap();
        assert_eq!(params.wet, 70.0);
        assert!(params.band_split);
        assert_eq!(params.style1, CurveKind::Sigmoid);
        assert_eq!(params.over_sample, OversampleRatio::X2);
    }

    #[test]
    fn values_are_clamped() {
        let overrides = ParamOverrides {
            input_gain: Some(20.0),
            low_split: Some(5.0),
            ..Default::default()
        };
        let params = resolve(None, &overrides).unwrap();
        assert_eq!(params.input_gain, 6.0);
        assert_eq!(params.low_split, 20.0);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load(Path::new("/nonexistent/inflator.toml")).unwrap_err();
        assert!(matches!(err, SettingsError::ReadFile { .. }));
        assert!(err.to_string().contains("inflator.toml"));
    }

    #[test]
    fn bad_style_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "style2 = \"Triangle\"").unwrap();
        assert!(matches!(
            load(file.path()),
            Err(SettingsError::TomlParse(_))
        ));
    }
}
