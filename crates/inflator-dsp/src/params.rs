//! Host-facing parameters and their translation into engine calls.
//!
//! Hosts and configuration files speak in host units: dB for gains, percent
//! for wet/curve/weight, Hz for the split points, menu entries for styles and
//! oversampling. [`ParamChange`] carries one such value; the
//! [`InflatorHandle`](crate::InflatorHandle) normalises it and calls the right
//! setter. [`InflatorParams`] is the full set, with defaults and (behind the
//! `serde` feature) TOML/JSON support.
//!
//! | Id | Range | Default |
//! |----|-------|---------|
//! | `input_gain`  | −6 … 6 dB       | 0 |
//! | `output_gain` | −10 … 2 dB      | 0 |
//! | `wet`         | 0 … 100 %       | 100 |
//! | `curve1`      | 0 … 100 %       | 50 |
//! | `curve2`      | 0 … 100 %       | 50 |
//! | `weight`      | 0 … 100 %       | 50 |
//! | `low_split`   | 20 … 20000 Hz   | 240 |
//! | `high_split`  | 20 … 20000 Hz   | 2400 |
//! | `effect_in`   | bool            | on |
//! | `band_split`  | bool            | off |
//! | `auto_gain`   | bool            | off |
//! | `over_sample` | OFF/2x/4x/8x/16x | OFF |
//! | `style1`      | curve family    | Quadratic |
//! | `style2`      | curve family    | Cubic |

use inflator_core::{CurveKind, OversampleRatio};

use crate::crossover::{DEFAULT_HIGH_CUTOFF, DEFAULT_LOW_CUTOFF, MAX_CUTOFF, MIN_CUTOFF};
use crate::error::ParamError;
use crate::gain::{INPUT_GAIN_RANGE, OUTPUT_GAIN_RANGE};

/// Every parameter id, in host registration order.
pub const PARAM_IDS: [&str; 14] = [
    "input_gain",
    "output_gain",
    "wet",
    "curve1",
    "curve2",
    "weight",
    "low_split",
    "high_split",
    "effect_in",
    "band_split",
    "auto_gain",
    "over_sample",
    "style1",
    "style2",
];

/// One parameter change in host units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamChange {
    /// Input gain in dB.
    InputGain(f32),
    /// Output gain in dB.
    OutputGain(f32),
    /// Wet amount in percent.
    Wet(f32),
    /// First curve amount in percent.
    Curve1(f32),
    /// Second curve amount in percent.
    Curve2(f32),
    /// Blend weight of the second curve in percent.
    Weight(f32),
    /// Low crossover frequency in Hz.
    LowSplit(f32),
    /// High crossover frequency in Hz.
    HighSplit(f32),
    /// Shaping on/off.
    EffectIn(bool),
    /// Band split on/off.
    BandSplit(bool),
    /// Loudness compensation on/off.
    AutoGain(bool),
    /// Oversampling ratio.
    OverSample(OversampleRatio),
    /// Curve family of the first slot.
    Style1(CurveKind),
    /// Curve family of the second slot.
    Style2(CurveKind),
}

impl ParamChange {
    /// Parameter id of this change.
    pub fn id(&self) -> &'static str {
        match self {
            Self::InputGain(_) => "input_gain",
            Self::OutputGain(_) => "output_gain",
            Self::Wet(_) => "wet",
            Self::Curve1(_) => "curve1",
            Self::Curve2(_) => "curve2",
            Self::Weight(_) => "weight",
            Self::LowSplit(_) => "low_split",
            Self::HighSplit(_) => "high_split",
            Self::EffectIn(_) => "effect_in",
            Self::BandSplit(_) => "band_split",
            Self::AutoGain(_) => "auto_gain",
            Self::OverSample(_) => "over_sample",
            Self::Style1(_) => "style1",
            Self::Style2(_) => "style2",
        }
    }

    /// Decode a raw host value: plain units for floats, `>= 0.5` for
    /// booleans, menu index for choices.
    pub fn from_raw(id: &str, value: f32) -> Result<Self, ParamError> {
        let param = PARAM_IDS
            .iter()
            .copied()
            .find(|p| p.eq_ignore_ascii_case(id))
            .ok_or_else(|| ParamError::UnknownParameter(id.to_string()))?;
        if !value.is_finite() {
            return Err(ParamError::NonFinite { param, value });
        }
        let flag = value >= 0.5;
        let index = value.round().max(0.0) as usize;
        Ok(match param {
            "input_gain" => Self::InputGain(value),
            "output_gain" => Self::OutputGain(value),
            "wet" => Self::Wet(value),
            "curve1" => Self::Curve1(value),
            "curve2" => Self::Curve2(value),
            "weight" => Self::Weight(value),
            "low_split" => Self::LowSplit(value),
            "high_split" => Self::HighSplit(value),
            "effect_in" => Self::EffectIn(flag),
            "band_split" => Self::BandSplit(flag),
            "auto_gain" => Self::AutoGain(flag),
            "over_sample" => Self::OverSample(OversampleRatio::from_index(index)),
            "style1" => Self::Style1(CurveKind::from_index(index)),
            _ => Self::Style2(CurveKind::from_index(index)),
        })
    }
}

/// Parse a curve style name such as `"Quadratic"` or `"sin"`.
pub fn parse_style(name: &str) -> Result<CurveKind, ParamError> {
    name.parse()
        .map_err(|_| ParamError::UnknownStyle(name.to_string()))
}

/// Parse an oversampling choice: `OFF`, `1x`, `2x`, `4x`, `8x`, `16x`, or
/// the bare factor.
pub fn parse_over_sample(name: &str) -> Result<OversampleRatio, ParamError> {
    let trimmed = name.trim();
    if trimmed.eq_ignore_ascii_case("off") {
        return Ok(OversampleRatio::X1);
    }
    let digits = trimmed.strip_suffix(['x', 'X']).unwrap_or(trimmed);
    let factor: usize = digits
        .parse()
        .map_err(|_| ParamError::UnknownOversampling(name.to_string()))?;
    OversampleRatio::ALL
        .into_iter()
        .find(|r| r.factor() == factor)
        .ok_or_else(|| ParamError::UnknownOversampling(name.to_string()))
}

/// Complete parameter set in host units.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct InflatorParams {
    /// Input gain in dB.
    pub input_gain: f32,
    /// Output gain in dB.
    pub output_gain: f32,
    /// Wet amount in percent.
    pub wet: f32,
    /// First curve amount in percent.
    pub curve1: f32,
    /// Second curve amount in percent.
    pub curve2: f32,
    /// Weight of the second curve in percent.
    pub weight: f32,
    /// Low crossover in Hz.
    pub low_split: f32,
    /// High crossover in Hz.
    pub high_split: f32,
    /// Shaping on/off.
    pub effect_in: bool,
    /// Band split on/off.
    pub band_split: bool,
    /// Loudness compensation on/off.
    pub auto_gain: bool,
    /// Oversampling ratio.
    #[cfg_attr(feature = "serde", serde(with = "over_sample_name"))]
    pub over_sample: OversampleRatio,
    /// First curve family.
    #[cfg_attr(feature = "serde", serde(with = "style_name"))]
    pub style1: CurveKind,
    /// Second curve family.
    #[cfg_attr(feature = "serde", serde(with = "style_name"))]
    pub style2: CurveKind,
}

impl Default for InflatorParams {
    fn default() -> Self {
        Self {
            input_gain: 0.0,
            output_gain: 0.0,
            wet: 100.0,
            curve1: 50.0,
            curve2: 50.0,
            weight: 50.0,
            low_split: DEFAULT_LOW_CUTOFF,
            high_split: DEFAULT_HIGH_CUTOFF,
            effect_in: true,
            band_split: false,
            auto_gain: false,
            over_sample: OversampleRatio::X1,
            style1: CurveKind::Quadratic,
            style2: CurveKind::Cubic,
        }
    }
}

impl InflatorParams {
    /// Record one change.
    pub fn update(&mut self, change: ParamChange) {
        match change {
            ParamChange::InputGain(v) => self.input_gain = v,
            ParamChange::OutputGain(v) => self.output_gain = v,
            ParamChange::Wet(v) => self.wet = v,
            ParamChange::Curve1(v) => self.curve1 = v,
            ParamChange::Curve2(v) => self.curve2 = v,
            ParamChange::Weight(v) => self.weight = v,
            ParamChange::LowSplit(v) => self.low_split = v,
            ParamChange::HighSplit(v) => self.high_split = v,
            ParamChange::EffectIn(v) => self.effect_in = v,
            ParamChange::BandSplit(v) => self.band_split = v,
            ParamChange::AutoGain(v) => self.auto_gain = v,
            ParamChange::OverSample(v) => self.over_sample = v,
            ParamChange::Style1(v) => self.style1 = v,
            ParamChange::Style2(v) => self.style2 = v,
        }
    }

    /// Clamp every value into its documented range.
    pub fn clamped(mut self) -> Self {
        self.input_gain = self.input_gain.clamp(INPUT_GAIN_RANGE.0, INPUT_GAIN_RANGE.1);
        self.output_gain = self.output_gain.clamp(OUTPUT_GAIN_RANGE.0, OUTPUT_GAIN_RANGE.1);
        for percent in [&mut self.wet, &mut self.curve1, &mut self.curve2, &mut self.weight] {
            *percent = percent.clamp(0.0, 100.0);
        }
        self.low_split = self.low_split.clamp(MIN_CUTOFF, MAX_CUTOFF);
        self.high_split = self.high_split.clamp(MIN_CUTOFF, MAX_CUTOFF);
        self
    }

    /// The whole set as individual changes, in [`PARAM_IDS`] order.
    pub fn changes(&self) -> [ParamChange; 14] {
        [
            ParamChange::InputGain(self.input_gain),
            ParamChange::OutputGain(self.output_gain),
            ParamChange::Wet(self.wet),
            ParamChange::Curve1(self.curve1),
            ParamChange::Curve2(self.curve2),
            ParamChange::Weight(self.weight),
            ParamChange::LowSplit(self.low_split),
            ParamChange::HighSplit(self.high_split),
            ParamChange::EffectIn(self.effect_in),
            ParamChange::BandSplit(self.band_split),
            ParamChange::AutoGain(self.auto_gain),
            ParamChange::OverSample(self.over_sample),
            ParamChange::Style1(self.style1),
            ParamChange::Style2(self.style2),
        ]
    }

    /// Push every value through `handle`.
    pub fn apply(&self, handle: &crate::InflatorHandle) {
        handle.apply_all(self);
    }
}

#[cfg(feature = "serde")]
mod style_name {
    use inflator_core::CurveKind;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(kind: &CurveKind, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(kind.label())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<CurveKind, D::Error> {
        let name = String::deserialize(deserializer)?;
        super::parse_style(&name).map_err(D::Error::custom)
    }
}

#[cfg(feature = "serde")]
mod over_sample_name {
    use inflator_core::OversampleRatio;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(
        ratio: &OversampleRatio,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(ratio.label())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<OversampleRatio, D::Error> {
        let name = String::deserialize(deserializer)?;
        super::parse_over_sample(&name).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_decoding() {
        assert_eq!(ParamChange::from_raw("wet", 40.0), Ok(ParamChange::Wet(40.0)));
        assert_eq!(ParamChange::from_raw("BAND_SPLIT", 1.0), Ok(ParamChange::BandSplit(true)));
        assert_eq!(
            ParamChange::from_raw("over_sample", 2.0),
            Ok(ParamChange::OverSample(OversampleRatio::X4))
        );
        assert_eq!(
            ParamChange::from_raw("style2", 4.0),
            Ok(ParamChange::Style2(CurveKind::Sigmoid))
        );
        assert_eq!(
            ParamChange::from_raw("drive", 1.0),
            Err(ParamError::UnknownParameter("drive".to_string()))
        );
        assert!(matches!(
            ParamChange::from_raw("curve1", f32::NAN),
            Err(ParamError::NonFinite { param: "curve1", .. })
        ));
    }

    #[test]
    fn ids_round_trip() {
        for (change, id) in InflatorParams::default().changes().iter().zip(PARAM_IDS) {
            assert_eq!(change.id(), id);
        }
    }

    #[test]
    fn oversample_names() {
        assert_eq!(parse_over_sample("OFF"), Ok(OversampleRatio::X1));
        assert_eq!(parse_over_sample("4x"), Ok(OversampleRatio::X4));
        assert_eq!(parse_over_sample("16"), Ok(OversampleRatio::X16));
        assert!(parse_over_sample("3x").is_err());
        assert!(parse_over_sample("lots").is_err());
    }

    #[test]
    fn update_and_clamp() {
        let mut params = InflatorParams::default();
        params.update(ParamChange::Wet(150.0));
        params.update(ParamChange::InputGain(-20.0));
        params.update(ParamChange::Style1(CurveKind::Sine));
        let params = params.clamped();
        assert_eq!(params.wet, 100.0);
        assert_eq!(params.input_gain, -6.0);
        assert_eq!(params.style1, CurveKind::Sine);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn toml_uses_names() {
        let params = InflatorParams {
            over_sample: OversampleRatio::X8,
            style2: CurveKind::Sine,
            ..InflatorParams::default()
        };
        let text = toml::to_string(&params).expect("serialize");
        assert!(text.contains("over_sample = \"8x\""), "{text}");
        assert!(text.contains("style2 = \"Sin\""), "{text}");
        let back: InflatorParams = toml::from_str(&text).expect("deserialize");
        assert_eq!(back, params);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn partial_toml_fills_defaults() {
        let params: InflatorParams = toml::from_str("wet = 25.0\nstyle1 = \"sigmod\"\n").expect("parse");
        assert_eq!(params.wet, 25.0);
        assert_eq!(params.style1, CurveKind::Sigmoid);
        assert_eq!(params.curve1, 50.0);
    }
}
