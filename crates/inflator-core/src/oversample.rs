//! Multi-ratio oversampling engine for anti-aliased nonlinear processing.
//!
//! Nonlinear waveshaping creates harmonics above Nyquist that fold back into
//! the audible band. The [`OversamplingEngine`] raises the sample rate by a
//! power of two before the nonlinearity and brings it back down afterwards:
//!
//! ```text
//! input ─▶ [½-band ↑2] ─▶ [½-band ↑2] ─▶ … ─▶ nonlinear ─▶ … ─▶ [½-band ↓2] ─▶ [½-band ↓2] ─▶ output
//!          steep          relaxed                               relaxed        steep
//! ```
//!
//! Each doubling is a [`HalfbandStage`]; ratio `2^k` chains `k` of them.
//!
//! ## Arena allocation
//!
//! [`prepare`](OversamplingEngine::prepare) builds the filter state and scratch
//! buffers of every ratio up front. Switching ratios later only changes an
//! index, so it never allocates.
//!
//! ## Latency
//!
//! Stage `j` (between `2^j·fs` and `2^(j+1)·fs`) delays by its group delay `c_j`
//! at the high rate in each direction, i.e. `c_j / 2^j` host samples per round
//! trip. With a 63-tap first stage and 31-tap later stages:
//!
//! | Ratio | Round-trip latency (host samples) | Reported |
//! |-------|-----------------------------------|----------|
//! | 1×    | 0                                 | 0        |
//! | 2×    | 31                                | 31       |
//! | 4×    | 31 + 7.5 = 38.5                   | 39       |
//! | 8×    | 38.5 + 3.75 = 42.25               | 42       |
//! | 16×   | 42.25 + 1.875 = 44.125            | 44       |

use crate::block::{AudioBlock, ChannelBuffer};
use crate::halfband::{HalfbandDesign, HalfbandStage};
use libm::roundf;

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

/// Highest oversampling factor.
pub const MAX_OVERSAMPLE_FACTOR: usize = 16;

/// Supported oversampling ratios, indexed 0..=4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OversampleRatio {
    /// No oversampling; the engine is a plain copy.
    #[default]
    X1,
    /// 2× oversampling.
    X2,
    /// 4× oversampling.
    X4,
    /// 8× oversampling.
    X8,
    /// 16× oversampling.
    X16,
}

impl OversampleRatio {
    /// Every ratio in index order.
    pub const ALL: [Self; 5] = [Self::X1, Self::X2, Self::X4, Self::X8, Self::X16];

    /// Ratio for an index, clamped to the supported range.
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index.min(Self::ALL.len() - 1)]
    }

    /// Index of this ratio (its base-2 logarithm).
    pub fn index(self) -> usize {
        self as usize
    }

    /// Number of 2× stages.
    pub fn order(self) -> usize {
        self.index()
    }

    /// Multiplication factor of the sample rate.
    pub fn factor(self) -> usize {
        1 << self.order()
    }

    /// Display label as used by host parameter menus.
    pub fn label(self) -> &'static str {
        match self {
            Self::X1 => "OFF",
            Self::X2 => "2x",
            Self::X4 => "4x",
            Self::X8 => "8x",
            Self::X16 => "16x",
        }
    }

    /// Exact round-trip FIR delay in host samples (may be fractional).
    pub fn latency(self) -> f32 {
        (0..self.order())
            .map(|j| stage_design(j).group_delay() as f32 / (1 << j) as f32)
            .sum()
    }

    /// Round-trip FIR delay rounded to whole host samples.
    pub fn latency_samples(self) -> usize {
        roundf(self.latency()) as usize
    }
}

fn stage_design(stage: usize) -> HalfbandDesign {
    if stage == 0 {
        HalfbandDesign::Steep
    } else {
        HalfbandDesign::Relaxed
    }
}

/// Filter state and scratch storage for one ratio.
#[derive(Debug, Clone)]
struct RatioBank {
    ratio: OversampleRatio,
    /// `stages[j][channel]`.
    stages: Vec<Vec<HalfbandStage>>,
    /// `buffers[j]` holds the signal at `2^(j+1)·fs`; for 1× a single copy buffer.
    buffers: Vec<ChannelBuffer>,
}

impl RatioBank {
    fn new(ratio: OversampleRatio, num_channels: usize, max_block_size: usize) -> Self {
        let order = ratio.order();
        let stages = (0..order)
            .map(|j| {
                (0..num_channels)
                    .map(|_| HalfbandStage::new(stage_design(j)))
                    .collect()
            })
            .collect();
        let buffers = if order == 0 {
            vec![ChannelBuffer::new(num_channels, max_block_size)]
        } else {
            (0..order)
                .map(|j| ChannelBuffer::new(num_channels, max_block_size << (j + 1)))
                .collect()
        };
        Self {
            ratio,
            stages,
            buffers,
        }
    }

    fn reset(&mut self) {
        for stage in self.stages.iter_mut().flatten() {
            stage.reset();
        }
        for buffer in &mut self.buffers {
            buffer.clear();
        }
    }

    fn process_up(&mut self, input: &AudioBlock<'_>) -> AudioBlock<'_> {
        let n = input.num_samples();
        let order = self.ratio.order();
        let last = self.buffers.len() - 1;

        if order == 0 {
            let mut out = self.buffers[0].block(n);
            out.copy_from(input);
            return out;
        }

        let channels = input.num_channels().min(self.buffers[0].num_channels());
        for ch in 0..channels {
            self.stages[0][ch].upsample(input.channel(ch), &mut self.buffers[0].channel_mut(ch)[..n << 1]);
            for j in 1..order {
                let (lower, upper) = self.buffers.split_at_mut(j);
                let src = &lower[j - 1].channel(ch)[..n << j];
                let dst = &mut upper[0].channel_mut(ch)[..n << (j + 1)];
                self.stages[j][ch].upsample(src, dst);
            }
        }

        self.buffers[last].block(n << order)
    }

    fn process_down(&mut self, output: &mut AudioBlock<'_>) {
        let n = output.num_samples();
        let order = self.ratio.order();
        let channels = output.num_channels().min(self.buffers[0].num_channels());

        if order == 0 {
            for ch in 0..channels {
                output.channel_mut(ch).copy_from_slice(&self.buffers[0].channel(ch)[..n]);
            }
            return;
        }

        for ch in 0..channels {
            for j in (1..order).rev() {
                let (lower, upper) = self.buffers.split_at_mut(j);
                let src = &upper[0].channel(ch)[..n << (j + 1)];
                let dst = &mut lower[j - 1].channel_mut(ch)[..n << j];
                self.stages[j][ch].downsample(src, dst);
            }
            self.stages[0][ch].downsample(&self.buffers[0].channel(ch)[..n << 1], output.channel_mut(ch));
        }
    }
}

/// Bank of pre-allocated oversamplers, one per [`OversampleRatio`].
///
/// # Contract
///
/// - [`prepare`](Self::prepare) must run before the first block.
/// - Blocks longer than the prepared maximum are a caller error; they are not
///   checked beyond Rust's slice bounds.
/// - [`set_active_ratio`](Self::set_active_ratio) takes `&mut self`, so it can
///   only happen between blocks, never while a block is in flight.
///
/// # Example
///
/// ```rust
/// use inflator_core::{AudioBlock, OversampleRatio, OversamplingEngine};
///
/// let mut engine = OversamplingEngine::new();
/// engine.prepare(64, 1, 48000.0);
/// engine.set_active_ratio(OversampleRatio::X4);
/// assert_eq!(engine.latency_samples(), 39);
///
/// let mut data = vec![0.0f32; 64];
/// let mut block = AudioBlock::new(&mut data, 1, 64);
/// let wide = engine.process_up(&block);
/// assert_eq!(wide.num_samples(), 256);
/// engine.process_down(&mut block);
/// ```
#[derive(Debug, Clone, Default)]
pub struct OversamplingEngine {
    banks: Vec<RatioBank>,
    active: OversampleRatio,
    sample_rate: f32,
    max_block_size: usize,
    num_channels: usize,
}

impl OversamplingEngine {
    /// Create an unprepared engine at 1×.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate state for every ratio. Keeps the active ratio.
    pub fn prepare(&mut self, max_block_size: usize, num_channels: usize, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.max_block_size = max_block_size;
        self.num_channels = num_channels;
        self.banks = OversampleRatio::ALL
            .iter()
            .map(|&ratio| RatioBank::new(ratio, num_channels, max_block_size))
            .collect();

        #[cfg(feature = "tracing")]
        tracing::debug!(
            max_block_size,
            num_channels,
            sample_rate,
            "oversampler banks allocated"
        );
    }

    /// Whether [`prepare`](Self::prepare) has run.
    pub fn is_prepared(&self) -> bool {
        !self.banks.is_empty()
    }

    /// Select the ratio used by the next block and clear its history.
    pub fn set_active_ratio(&mut self, ratio: OversampleRatio) {
        if ratio != self.active {
            if let Some(bank) = self.banks.get_mut(ratio.index()) {
                bank.reset();
            }
            self.active = ratio;

            #[cfg(feature = "tracing")]
            tracing::debug!(ratio = ratio.label(), latency = ratio.latency(), "oversampling ratio switched");
        }
    }

    /// Currently active ratio.
    pub fn active_ratio(&self) -> OversampleRatio {
        self.active
    }

    /// Round-trip latency of the active ratio in host samples.
    pub fn latency_samples(&self) -> usize {
        self.active.latency_samples()
    }

    /// Exact (possibly fractional) round-trip latency of the active ratio.
    pub fn latency(&self) -> f32 {
        self.active.latency()
    }

    /// Sample rate seen by processing between `process_up` and `process_down`.
    pub fn oversampled_rate(&self) -> f32 {
        self.sample_rate * self.active.factor() as f32
    }

    /// Largest host block the engine was prepared for.
    pub fn max_block_size(&self) -> usize {
        self.max_block_size
    }

    /// Number of prepared channels.
    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    /// Interpolate `input` into the active ratio's scratch storage.
    ///
    /// The returned view has `factor × input.num_samples()` samples per channel
    /// and may be processed in place before calling
    /// [`process_down`](Self::process_down).
    pub fn process_up(&mut self, input: &AudioBlock<'_>) -> AudioBlock<'_> {
        self.banks[self.active.index()].process_up(input)
    }

    /// Decimate the active ratio's scratch storage into `output`.
    ///
    /// `output` must have the same length as the block passed to the matching
    /// [`process_up`](Self::process_up).
    pub fn process_down(&mut self, output: &mut AudioBlock<'_>) {
        self.banks[self.active.index()].process_down(output);
    }

    /// Clear the history of every ratio.
    pub fn reset(&mut self) {
        for bank in &mut self.banks {
            bank.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::ChannelBuffer;

    const BLOCK: usize = 128;

    fn prepared(ratio: OversampleRatio, channels: usize) -> OversamplingEngine {
        let mut engine = OversamplingEngine::new();
        engine.prepare(BLOCK, channels, 48000.0);
        engine.set_active_ratio(ratio);
        engine
    }

    #[test]
    fn documented_latencies() {
        let expected = [0, 31, 39, 42, 44];
        for (ratio, &samples) in OversampleRatio::ALL.iter().zip(&expected) {
            assert_eq!(ratio.latency_samples(), samples, "{ratio:?}");
        }
        assert_eq!(OversampleRatio::X4.latency(), 38.5);
    }

    #[test]
    fn index_is_clamped() {
        assert_eq!(OversampleRatio::from_index(2), OversampleRatio::X4);
        assert_eq!(OversampleRatio::from_index(99), OversampleRatio::X16);
        assert_eq!(OversampleRatio::X16.factor(), MAX_OVERSAMPLE_FACTOR);
    }

    #[test]
    fn passthrough_is_exact_copy() {
        let mut engine = prepared(OversampleRatio::X1, 2);
        let mut buffer = ChannelBuffer::new(2, BLOCK);
        let mut block = buffer.block(BLOCK);
        block.channel_mut(0).iter_mut().enumerate().for_each(|(i, s)| *s = i as f32 * 0.01);
        block.channel_mut(1).fill(-0.3);
        let before = block.channel(0).to_vec();

        let wide = engine.process_up(&block);
        assert_eq!(wide.num_samples(), BLOCK);
        engine.process_down(&mut block);

        assert_eq!(block.channel(0), before.as_slice());
        assert!(block.channel(1).iter().all(|&s| s == -0.3));
        assert_eq!(engine.latency_samples(), 0);
    }

    #[test]
    fn upsampled_length_matches_factor() {
        for ratio in OversampleRatio::ALL {
            let mut engine = prepared(ratio, 1);
            let mut buffer = ChannelBuffer::new(1, BLOCK);
            let block = buffer.block(100);
            let wide = engine.process_up(&block);
            assert_eq!(wide.num_samples(), 100 * ratio.factor());
        }
    }

    #[test]
    fn silence_stays_silent() {
        for ratio in OversampleRatio::ALL {
            let mut engine = prepared(ratio, 2);
            let mut buffer = ChannelBuffer::new(2, BLOCK);
            for _ in 0..4 {
                let mut block = buffer.block(BLOCK);
                let _ = engine.process_up(&block);
                engine.process_down(&mut block);
                assert!(block.channel(0).iter().chain(block.channel(1)).all(|&s| s == 0.0));
            }
        }
    }

    #[test]
    fn two_x_impulse_arrives_at_reported_latency() {
        let mut engine = prepared(OversampleRatio::X2, 1);
        let mut buffer = ChannelBuffer::new(1, BLOCK);
        let mut block = buffer.block(BLOCK);
        block.channel_mut(0)[0] = 1.0;
        let _ = engine.process_up(&block);
        engine.process_down(&mut block);
        let peak = block
            .channel(0)
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.abs().total_cmp(&b.1.abs()))
            .map(|(i, _)| i);
        assert_eq!(peak, Some(engine.latency_samples()));
    }

    #[test]
    fn dc_gain_is_unity_at_every_ratio() {
        for ratio in OversampleRatio::ALL {
            let mut engine = prepared(ratio, 1);
            let mut buffer = ChannelBuffer::new(1, BLOCK);
            let mut last = 0.0;
            for _ in 0..3 {
                let mut block = buffer.block(BLOCK);
                block.channel_mut(0).fill(0.5);
                let _ = engine.process_up(&block);
                engine.process_down(&mut block);
                last = block.channel(0)[BLOCK - 1];
            }
            assert!((last - 0.5).abs() < 1e-3, "{ratio:?}: settled DC {last}");
        }
    }

    #[test]
    fn switching_ratio_clears_new_history() {
        let mut engine = prepared(OversampleRatio::X2, 1);
        let mut buffer = ChannelBuffer::new(1, BLOCK);
        {
            let mut block = buffer.block(BLOCK);
            block.channel_mut(0).fill(1.0);
            let _ = engine.process_up(&block);
            engine.process_down(&mut block);
        }
        engine.set_active_ratio(OversampleRatio::X4);
        engine.set_active_ratio(OversampleRatio::X2);
        let mut block = buffer.block(BLOCK);
        block.clear();
        let _ = engine.process_up(&block);
        engine.process_down(&mut block);
        assert!(block.channel(0).iter().all(|&s| s == 0.0));
    }
}
