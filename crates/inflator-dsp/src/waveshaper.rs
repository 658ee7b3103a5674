//! Oversampled, optionally band-split waveshaper.
//!
//! Per block, [`WaveShaperEngine::process`] runs:
//!
//! 1. **Bypass**: leave the block untouched and stop.
//! 2. **Upsample** through the active ratio. This happens even with the effect
//!    switched off, so toggling the effect never changes the latency.
//! 3. **Split** into low/mid/high when band split is on.
//! 4. **Shape** each band (or the whole block) with the [`WaveHelper`] when the
//!    effect is on.
//! 5. **Recombine** the bands.
//! 6. **Downsample** back into the caller's block.
//!
//! # Threading
//!
//! Wet, the effect/split/bypass flags and the mixer are lock-free and may be
//! changed from any thread while audio runs. The crossover cutoffs and the
//! oversampling ratio change filter topology; their setters take the same
//! [`parking_lot::Mutex`] that `process` holds for the whole block, so a
//! change can only land between blocks.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use inflator_core::{
    AtomicF32, AudioBlock, ChannelBuffer, CurveKind, MAX_OVERSAMPLE_FACTOR, OversampleRatio,
    OversamplingEngine, ProcessSpec,
};
use parking_lot::Mutex;

use crate::crossover::CrossoverSplitter;
use crate::mixer::{MixerState, ShaperMixer};

/// Number of crossover bands.
pub const NUM_BANDS: usize = 3;

/// Per-sample odd-symmetric waveshaping with a linear wet/dry blend.
///
/// `y = mixer(min(1, |x|)) · wet · sgn(x) + x · (1 − wet)`
#[derive(Debug, Clone, Copy)]
pub struct WaveHelper {
    wet: f32,
    dry: f32,
    mixer: MixerState,
}

impl WaveHelper {
    /// Freeze a wet amount and mixer snapshot for one block.
    pub fn new(wet: f32, mixer: MixerState) -> Self {
        Self {
            wet,
            dry: 1.0 - wet,
            mixer,
        }
    }

    /// Shape one sample.
    #[inline]
    pub fn process(&self, x: f32) -> f32 {
        let magnitude = x.abs().min(1.0);
        self.mixer.shape(magnitude) * self.wet * sgn(x) + x * self.dry
    }
}

/// `+1` for positive input, `-1` otherwise. The shaped magnitude at zero is
/// zero, so the sign chosen there never matters.
#[inline]
fn sgn(x: f32) -> f32 {
    if x > 0.0 { 1.0 } else { -1.0 }
}

/// Topology-affecting state, guarded by the callback lock.
#[derive(Debug)]
struct EngineCore {
    oversampler: OversamplingEngine,
    crossover: CrossoverSplitter,
    bands: [ChannelBuffer; NUM_BANDS],
}

/// The inflator's nonlinear core.
///
/// All methods take `&self`, so the engine can live in an [`Arc`] shared by
/// the audio thread and the control thread.
#[derive(Debug)]
pub struct WaveShaperEngine {
    mixer: Arc<ShaperMixer>,
    wet: AtomicF32,
    effect: AtomicBool,
    split: AtomicBool,
    bypass: AtomicBool,
    latency: AtomicUsize,
    core: Mutex<EngineCore>,
}

impl WaveShaperEngine {
    /// Engine with product defaults: 100 % wet, effect on, no split, no
    /// oversampling, splits at 240 Hz / 2.4 kHz.
    pub fn new() -> Self {
        Self {
            mixer: Arc::new(ShaperMixer::new()),
            wet: AtomicF32::new(1.0),
            effect: AtomicBool::new(true),
            split: AtomicBool::new(false),
            bypass: AtomicBool::new(false),
            latency: AtomicUsize::new(0),
            core: Mutex::new(EngineCore {
                oversampler: OversamplingEngine::new(),
                crossover: CrossoverSplitter::new(),
                bands: Default::default(),
            }),
        }
    }

    /// Allocate everything the audio path will touch: all oversampling ratios
    /// and band buffers large enough for 16×.
    pub fn prepare(&self, spec: &ProcessSpec) {
        let mut core = self.core.lock();
        core.oversampler
            .prepare(spec.max_block_size, spec.num_channels, spec.sample_rate);
        core.crossover.prepare(spec.sample_rate, spec.num_channels);
        let wide = spec.max_block_size * MAX_OVERSAMPLE_FACTOR;
        core.bands = std::array::from_fn(|_| ChannelBuffer::new(spec.num_channels, wide));
        core.oversampler.reset();
        core.crossover.reset();
        self.latency
            .store(core.oversampler.latency_samples(), Ordering::Release);
        tracing::info!(
            sample_rate = spec.sample_rate,
            max_block_size = spec.max_block_size,
            num_channels = spec.num_channels,
            ratio = core.oversampler.active_ratio().label(),
            "waveshaper prepared"
        );
    }

    /// Clear filter and oversampler history. Must not overlap `process`.
    pub fn reset(&self) {
        let mut core = self.core.lock();
        core.oversampler.reset();
        core.crossover.reset();
    }

    /// Wet amount in `[0, 1]`.
    pub fn set_wet(&self, wet: f32) {
        self.wet.store(wet.clamp(0.0, 1.0));
    }

    /// Curve amounts, weight and compensation, applied as one update.
    pub fn set_shapes(&self, curve1: f32, curve2: f32, weight: f32, compensation: bool) {
        self.mixer.set_shapes(curve1, curve2, weight, compensation);
    }

    /// Curve family of each slot.
    pub fn set_types(&self, kind1: CurveKind, kind2: CurveKind) {
        self.mixer.set_types(kind1, kind2);
    }

    /// Crossover frequencies in Hz. Waits for the current block to finish.
    pub fn set_cutoff_frequency(&self, low: f32, high: f32) {
        let mut core = self.core.lock();
        core.crossover.set_cutoff_frequency(low, high);
    }

    /// Shape the signal (`true`) or pass it through the oversampler unshaped.
    pub fn set_effect_flag(&self, effect: bool) {
        self.effect.store(effect, Ordering::Release);
    }

    /// Shape low/mid/high separately (`true`) or the full band at once.
    pub fn set_split_flag(&self, split: bool) {
        self.split.store(split, Ordering::Release);
    }

    /// Skip all processing.
    pub fn set_bypass(&self, bypass: bool) {
        self.bypass.store(bypass, Ordering::Release);
    }

    /// Select oversampling by index (0 = off … 4 = 16×, clamped) and return
    /// the new latency for the host.
    ///
    /// Waits for the current block to finish, then switches the ratio,
    /// re-prepares the crossover for the new internal rate and publishes the
    /// latency before releasing the lock.
    pub fn set_over_sample_factor(&self, index: usize) -> usize {
        let ratio = OversampleRatio::from_index(index);
        let mut core = self.core.lock();
        core.oversampler.set_active_ratio(ratio);
        core.crossover.update(ratio.order());
        let latency = core.oversampler.latency_samples();
        self.latency.store(latency, Ordering::Release);
        tracing::info!(ratio = ratio.label(), latency, "oversampling changed");
        latency
    }

    /// Round-trip latency of the active ratio in host samples.
    pub fn latency_samples(&self) -> usize {
        self.latency.load(Ordering::Acquire)
    }

    /// Active oversampling ratio.
    pub fn over_sample_ratio(&self) -> OversampleRatio {
        self.core.lock().oversampler.active_ratio()
    }

    /// Current `(low, high)` crossover frequencies.
    pub fn cutoff_frequency(&self) -> (f32, f32) {
        self.core.lock().crossover.cutoffs()
    }

    /// Current wet amount.
    pub fn wet(&self) -> f32 {
        self.wet.load()
    }

    /// Whether shaping is enabled.
    pub fn effect_flag(&self) -> bool {
        self.effect.load(Ordering::Acquire)
    }

    /// Whether band split is enabled.
    pub fn split_flag(&self) -> bool {
        self.split.load(Ordering::Acquire)
    }

    /// Whether the engine is bypassed.
    pub fn bypass(&self) -> bool {
        self.bypass.load(Ordering::Acquire)
    }

    /// The blend this engine shapes with, for read-only inspection.
    pub fn mixer(&self) -> &ShaperMixer {
        &self.mixer
    }

    /// Owned handle to the mixer for a plotting thread.
    pub fn mixer_handle(&self) -> Arc<ShaperMixer> {
        Arc::clone(&self.mixer)
    }

    /// Process a block in place.
    ///
    /// The block must not be longer than the prepared maximum. Zero-length
    /// blocks are a no-op. NaN/Inf input is not sanitised.
    pub fn process(&self, block: &mut AudioBlock<'_>) {
        if block.is_empty() || self.bypass.load(Ordering::Acquire) {
            return;
        }

        let mut guard = self.core.lock();
        let core = &mut *guard;
        if !core.oversampler.is_prepared() {
            return;
        }

        let helper = WaveHelper::new(self.wet.load(), self.mixer.snapshot());
        let effect = self.effect.load(Ordering::Acquire);
        let split = self.split.load(Ordering::Acquire);

        let mut wide = core.oversampler.process_up(block);
        if split {
            let len = wide.num_samples();
            let [low, mid, high] = &mut core.bands;
            let mut low = low.block(len);
            let mut mid = mid.block(len);
            let mut high = high.block(len);
            core.crossover.split(&wide, &mut low, &mut mid, &mut high);
            if effect {
                for band in [&mut low, &mut mid, &mut high] {
                    band.map_in_place(|x| helper.process(x));
                }
            }
            wide.copy_from(&low);
            wide.add_from(&mid);
            wide.add_from(&high);
        } else if effect {
            wide.map_in_place(|x| helper.process(x));
        }
        core.oversampler.process_down(block);
    }

    /// Process `input` into a distinct `output` block of the same shape.
    pub fn process_separate(&self, input: &AudioBlock<'_>, output: &mut AudioBlock<'_>) {
        output.copy_from(input);
        self.process(output);
    }
}

impl Default for WaveShaperEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inflator_core::ShaperCurve;

    fn prepared(channels: usize) -> WaveShaperEngine {
        let engine = WaveShaperEngine::new();
        engine.prepare(&ProcessSpec::new(48000.0, 256, channels));
        engine
    }

    fn ramp_buffer(channels: usize, len: usize) -> ChannelBuffer {
        let mut buffer = ChannelBuffer::new(channels, len);
        for ch in 0..channels {
            for (i, s) in buffer.channel_mut(ch).iter_mut().enumerate() {
                *s = (i as f32 / len as f32) * 2.0 - 1.0;
            }
        }
        buffer
    }

    #[test]
    fn helper_is_odd_symmetric() {
        let helper = WaveHelper::new(0.7, MixerState::default());
        for x in [0.1f32, 0.4, 0.9, 1.5] {
            assert_eq!(helper.process(-x), -helper.process(x));
        }
    }

    #[test]
    fn helper_dry_is_identity() {
        let helper = WaveHelper::new(0.0, MixerState::default());
        for x in [-2.0f32, -0.5, 0.0, 0.3, 1.7] {
            assert_eq!(helper.process(x), x);
        }
    }

    #[test]
    fn helper_clips_magnitude_before_the_curve() {
        let identity = ShaperCurve::new(CurveKind::Identity, 0.0, false);
        let state = MixerState {
            slot1: identity,
            slot2: identity,
            weight: 0.5,
        };
        let helper = WaveHelper::new(1.0, state);
        assert_eq!(helper.process(3.0), 1.0);
        assert_eq!(helper.process(-3.0), -1.0);
        assert_eq!(helper.process(0.0), 0.0);
    }

    #[test]
    fn bypass_leaves_block_untouched() {
        let engine = prepared(2);
        engine.set_bypass(true);
        engine.set_over_sample_factor(2);
        let mut buffer = ramp_buffer(2, 256);
        let before = buffer.clone();
        engine.process(&mut buffer.block(256));
        assert_eq!(buffer.channel(0), before.channel(0));
        assert_eq!(buffer.channel(1), before.channel(1));
    }

    #[test]
    fn latency_follows_factor_and_clamps() {
        let engine = prepared(1);
        assert_eq!(engine.latency_samples(), 0);
        assert_eq!(engine.set_over_sample_factor(1), 31);
        assert_eq!(engine.latency_samples(), 31);
        assert_eq!(engine.set_over_sample_factor(17), 44);
        assert_eq!(engine.over_sample_ratio(), OversampleRatio::X16);
        assert_eq!(engine.set_over_sample_factor(0), 0);
    }

    #[test]
    fn effect_off_at_unity_ratio_is_transparent() {
        let engine = prepared(2);
        engine.set_effect_flag(false);
        let mut buffer = ramp_buffer(2, 200);
        let before = buffer.clone();
        engine.process(&mut buffer.block(200));
        assert_eq!(buffer.channel(0), before.channel(0));
    }

    #[test]
    fn shaping_without_oversampling_matches_helper() {
        let engine = prepared(1);
        engine.set_wet(0.6);
        let helper = WaveHelper::new(0.6, engine.mixer().snapshot());
        let mut buffer = ramp_buffer(1, 128);
        let expected: Vec<f32> = buffer.channel(0).iter().map(|&x| helper.process(x)).collect();
        engine.process(&mut buffer.block(128));
        assert_eq!(&buffer.channel(0)[..128], expected.as_slice());
    }

    #[test]
    fn zero_length_block_is_noop() {
        let engine = prepared(2);
        let mut data: [f32; 0] = [];
        engine.process(&mut AudioBlock::new(&mut data, 2, 0));
    }

    #[test]
    fn unprepared_engine_passes_through() {
        let engine = WaveShaperEngine::new();
        let mut buffer = ramp_buffer(1, 16);
        let before = buffer.clone();
        engine.process(&mut buffer.block(16));
        assert_eq!(buffer.channel(0), before.channel(0));
    }

    #[test]
    fn separate_blocks_match_in_place() {
        let engine_a = prepared(1);
        let engine_b = prepared(1);
        let mut input = ramp_buffer(1, 64);
        let mut in_place = input.clone();
        let mut output = ChannelBuffer::new(1, 64);

        engine_a.process_separate(&input.block(64), &mut output.block(64));
        engine_b.process(&mut in_place.block(64));
        assert_eq!(output.channel(0), in_place.channel(0));
    }
}
