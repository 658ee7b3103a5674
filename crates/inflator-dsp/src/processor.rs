//! The complete inflator chain and its control-thread handle.
//!
//! ```text
//! input ─▶ input gain ─▶ input meter ─▶ waveshaper ─▶ output gain ─▶ output meter ─▶ output
//! ```
//!
//! [`InflatorProcessor`] lives on the audio thread. [`InflatorHandle`] is a
//! cheap clone that any other thread can use to change parameters, read the
//! meters, inspect the shaper curve and query latency.

use std::sync::Arc;

use inflator_core::{AudioBlock, ProcessSpec};
use parking_lot::Mutex;

use crate::error::{ParamError, PrepareError};
use crate::gain::{GainControl, GainStage, INPUT_GAIN_RANGE, OUTPUT_GAIN_RANGE};
use crate::meter::MeterSource;
use crate::mixer::ShaperMixer;
use crate::params::{InflatorParams, ParamChange};
use crate::waveshaper::WaveShaperEngine;

/// Audio-thread owner of the full signal chain.
///
/// # Example
///
/// ```rust
/// use inflator_core::{AudioBlock, ProcessSpec};
/// use inflator_dsp::{InflatorProcessor, ParamChange};
/// use inflator_core::OversampleRatio;
///
/// let mut processor = InflatorProcessor::new();
/// processor.prepare(ProcessSpec::new(48000.0, 256, 2)).unwrap();
///
/// let handle = processor.handle();
/// handle.apply(ParamChange::OverSample(OversampleRatio::X2));
/// assert_eq!(handle.latency_samples(), 31);
///
/// let mut data = vec![0.1f32; 512];
/// processor.process(&mut AudioBlock::new(&mut data, 2, 256));
/// ```
#[derive(Debug)]
pub struct InflatorProcessor {
    input_gain: GainStage,
    output_gain: GainStage,
    input_meter: Arc<MeterSource>,
    output_meter: Arc<MeterSource>,
    shaper: Arc<WaveShaperEngine>,
    handle: InflatorHandle,
    spec: Option<ProcessSpec>,
}

impl InflatorProcessor {
    /// Chain with default parameters. Call [`prepare`](Self::prepare) before
    /// processing.
    pub fn new() -> Self {
        let input_gain = GainStage::new(INPUT_GAIN_RANGE.0, INPUT_GAIN_RANGE.1);
        let output_gain = GainStage::new(OUTPUT_GAIN_RANGE.0, OUTPUT_GAIN_RANGE.1);
        let input_meter = Arc::new(MeterSource::new());
        let output_meter = Arc::new(MeterSource::new());
        let shaper = Arc::new(WaveShaperEngine::new());
        let handle = InflatorHandle {
            shaper: Arc::clone(&shaper),
            input_gain: input_gain.control(),
            output_gain: output_gain.control(),
            input_meter: Arc::clone(&input_meter),
            output_meter: Arc::clone(&output_meter),
            params: Arc::new(Mutex::new(InflatorParams::default())),
        };
        Self {
            input_gain,
            output_gain,
            input_meter,
            output_meter,
            shaper,
            handle,
            spec: None,
        }
    }

    /// Validate `spec` and (re)allocate every buffer in the chain.
    ///
    /// Safe to call repeatedly; each call clears all history.
    pub fn prepare(&mut self, spec: ProcessSpec) -> Result<(), PrepareError> {
        PrepareError::check(&spec)?;
        self.input_gain.prepare(spec.sample_rate);
        self.output_gain.prepare(spec.sample_rate);
        self.input_meter.prepare(spec.num_channels);
        self.output_meter.prepare(spec.num_channels);
        self.shaper.prepare(&spec);
        self.spec = Some(spec);
        Ok(())
    }

    /// The [`ProcessSpec`] from the last successful [`prepare`](Self::prepare).
    pub fn spec(&self) -> Option<ProcessSpec> {
        self.spec
    }

    /// Clear filter, oversampler and ramp state.
    pub fn reset(&mut self) {
        self.input_gain.reset();
        self.output_gain.reset();
        self.shaper.reset();
        tracing::debug!("inflator reset");
    }

    /// Process one block in place.
    pub fn process(&mut self, block: &mut AudioBlock<'_>) {
        if block.is_empty() {
            return;
        }
        self.input_gain.process(block);
        self.input_meter.process(block);
        self.shaper.process(block);
        self.output_gain.process(block);
        self.output_meter.process(block);
    }

    /// Process `input` into a distinct `output` block.
    pub fn process_separate(&mut self, input: &AudioBlock<'_>, output: &mut AudioBlock<'_>) {
        output.copy_from(input);
        self.process(output);
    }

    /// Latency the host should report, in samples.
    pub fn latency_samples(&self) -> usize {
        self.shaper.latency_samples()
    }

    /// Control-thread handle sharing this chain's state.
    pub fn handle(&self) -> InflatorHandle {
        self.handle.clone()
    }

    /// The waveshaper stage.
    pub fn shaper(&self) -> &WaveShaperEngine {
        &self.shaper
    }

    /// Meter after the input gain.
    pub fn input_meter(&self) -> &MeterSource {
        &self.input_meter
    }

    /// Meter after the output gain.
    pub fn output_meter(&self) -> &MeterSource {
        &self.output_meter
    }
}

impl Default for InflatorProcessor {
    fn default() -> Self {
        Self::new()
    }
}

/// Thread-safe control surface of an [`InflatorProcessor`].
///
/// Remembers the last value of every parameter, so a change to one member of
/// a grouped setter (curve amounts, crossover pair, style pair) is completed
/// with the others before it is forwarded.
#[derive(Debug, Clone)]
pub struct InflatorHandle {
    shaper: Arc<WaveShaperEngine>,
    input_gain: Arc<GainControl>,
    output_gain: Arc<GainControl>,
    input_meter: Arc<MeterSource>,
    output_meter: Arc<MeterSource>,
    params: Arc<Mutex<InflatorParams>>,
}

impl InflatorHandle {
    /// Normalise one host-unit change and forward it.
    pub fn apply(&self, change: ParamChange) {
        let mut params = self.params.lock();
        params.update(change);
        let p = *params;
        match change {
            ParamChange::InputGain(db) => self.input_gain.set_gain_db(db),
            ParamChange::OutputGain(db) => self.output_gain.set_gain_db(db),
            ParamChange::Wet(percent) => self.shaper.set_wet(percent / 100.0),
            ParamChange::Curve1(_)
            | ParamChange::Curve2(_)
            | ParamChange::Weight(_)
            | ParamChange::AutoGain(_) => self.shaper.set_shapes(
                p.curve1 / 100.0,
                p.curve2 / 100.0,
                p.weight / 100.0,
                p.auto_gain,
            ),
            ParamChange::LowSplit(_) | ParamChange::HighSplit(_) => {
                self.shaper.set_cutoff_frequency(p.low_split, p.high_split);
            }
            ParamChange::EffectIn(on) => self.shaper.set_effect_flag(on),
            ParamChange::BandSplit(on) => self.shaper.set_split_flag(on),
            ParamChange::OverSample(ratio) => {
                self.shaper.set_over_sample_factor(ratio.index());
            }
            ParamChange::Style1(_) | ParamChange::Style2(_) => {
                self.shaper.set_types(p.style1, p.style2);
            }
        }
    }

    /// Decode a raw host value with [`ParamChange::from_raw`] and apply it.
    pub fn apply_raw(&self, id: &str, value: f32) -> Result<(), ParamError> {
        let change = ParamChange::from_raw(id, value)?;
        self.apply(change);
        Ok(())
    }

    /// Forward a complete parameter set.
    pub fn apply_all(&self, params: &InflatorParams) {
        for change in params.changes() {
            self.apply(change);
        }
    }

    /// Last value forwarded for every parameter.
    pub fn params(&self) -> InflatorParams {
        *self.params.lock()
    }

    /// Latency the host should report, in samples. Re-read after changing
    /// [`ParamChange::OverSample`].
    pub fn latency_samples(&self) -> usize {
        self.shaper.latency_samples()
    }

    /// Bypass the shaper.
    pub fn set_bypass(&self, bypass: bool) {
        self.shaper.set_bypass(bypass);
    }

    /// Read-only view of the shaping function.
    pub fn mixer(&self) -> &ShaperMixer {
        self.shaper.mixer()
    }

    /// Meter after the input gain.
    pub fn input_meter(&self) -> &MeterSource {
        &self.input_meter
    }

    /// Meter after the output gain.
    pub fn output_meter(&self) -> &MeterSource {
        &self.output_meter
    }
}
