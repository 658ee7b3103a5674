//! Three-band Linkwitz-Riley crossover.
//!
//! ```text
//!            ┌─ LP(low) ── AP(high) ──────▶ low band
//! input ─────┤
//!            └─ HP(low) ──┬─ LP(high) ────▶ mid band
//!                         └─ HP(high) ────▶ high band
//! ```
//!
//! The low band passes an allpass at the high cutoff so that its phase matches
//! what the other two bands picked up at that split. The three bands then sum
//! to `AP(low)·AP(high)` applied to the input: flat magnitude, no comb
//! filtering at either cutoff.
//!
//! The splitter runs on oversampled audio, so its filters are prepared at
//! `base_rate × 2^factor`. [`CrossoverSplitter::update`] must be called with the
//! new factor whenever the oversampling ratio changes.

use inflator_core::{AudioBlock, LinkwitzRiley, LrKind};

/// Lowest crossover frequency in Hz.
pub const MIN_CUTOFF: f32 = 20.0;
/// Highest crossover frequency in Hz.
pub const MAX_CUTOFF: f32 = 20000.0;
/// Default low split in Hz.
pub const DEFAULT_LOW_CUTOFF: f32 = 240.0;
/// Default high split in Hz.
pub const DEFAULT_HIGH_CUTOFF: f32 = 2400.0;

/// Lowpass, highpass and allpass at one shared cutoff.
#[derive(Debug, Clone)]
struct SplitPoint {
    lowpass: LinkwitzRiley,
    highpass: LinkwitzRiley,
    allpass: LinkwitzRiley,
}

impl SplitPoint {
    fn new(cutoff: f32) -> Self {
        let mut point = Self {
            lowpass: LinkwitzRiley::new(LrKind::Lowpass),
            highpass: LinkwitzRiley::new(LrKind::Highpass),
            allpass: LinkwitzRiley::new(LrKind::Allpass),
        };
        point.set_cutoff(cutoff);
        point
    }

    fn filters_mut(&mut self) -> [&mut LinkwitzRiley; 3] {
        [&mut self.lowpass, &mut self.highpass, &mut self.allpass]
    }

    fn cutoff(&self) -> f32 {
        self.lowpass.cutoff()
    }

    /// Returns whether the cutoff actually moved.
    fn set_cutoff(&mut self, cutoff: f32) -> bool {
        if (cutoff - self.cutoff()).abs() <= f32::EPSILON * cutoff {
            return false;
        }
        for filter in self.filters_mut() {
            filter.set_cutoff(cutoff);
        }
        true
    }

    fn prepare(&mut self, sample_rate: f32, num_channels: usize) {
        for filter in self.filters_mut() {
            filter.prepare(sample_rate, num_channels);
        }
    }

    fn reset(&mut self) {
        for filter in self.filters_mut() {
            filter.reset();
        }
    }
}

/// Splits a block into low, mid and high bands that sum back coherently.
#[derive(Debug, Clone)]
pub struct CrossoverSplitter {
    low: SplitPoint,
    high: SplitPoint,
    base_rate: f32,
    num_channels: usize,
    factor: usize,
}

impl CrossoverSplitter {
    /// Unprepared splitter at the default cutoffs.
    pub fn new() -> Self {
        Self {
            low: SplitPoint::new(DEFAULT_LOW_CUTOFF),
            high: SplitPoint::new(DEFAULT_HIGH_CUTOFF),
            base_rate: 48000.0,
            num_channels: 0,
            factor: 0,
        }
    }

    /// Size the filters for `num_channels` at the host rate. Keeps the
    /// current oversampling factor.
    pub fn prepare(&mut self, base_rate: f32, num_channels: usize) {
        self.base_rate = base_rate;
        self.num_channels = num_channels;
        self.update(self.factor);
    }

    /// Re-derive every filter for `base_rate × 2^factor` and clear history.
    pub fn update(&mut self, factor: usize) {
        self.factor = factor;
        let rate = self.sample_rate();
        self.low.prepare(rate, self.num_channels);
        self.high.prepare(rate, self.num_channels);
        tracing::debug!(sample_rate = rate, factor, "crossover re-prepared");
    }

    /// Set both split frequencies.
    ///
    /// Each is clamped to [`MIN_CUTOFF`]..=[`MAX_CUTOFF`]; if they arrive in the
    /// wrong order they are swapped so the low split is never above the high one.
    pub fn set_cutoff_frequency(&mut self, low: f32, high: f32) {
        let low = low.clamp(MIN_CUTOFF, MAX_CUTOFF);
        let high = high.clamp(MIN_CUTOFF, MAX_CUTOFF);
        let (low, high) = if low <= high { (low, high) } else { (high, low) };
        let moved = self.low.set_cutoff(low) | self.high.set_cutoff(high);
        if moved {
            tracing::debug!(low, high, "crossover cutoffs changed");
        }
    }

    /// Current `(low, high)` split frequencies in Hz.
    pub fn cutoffs(&self) -> (f32, f32) {
        (self.low.cutoff(), self.high.cutoff())
    }

    /// Rate the filters are running at.
    pub fn sample_rate(&self) -> f32 {
        self.base_rate * (1usize << self.factor) as f32
    }

    /// Oversampling order the filters were last prepared for.
    pub fn factor(&self) -> usize {
        self.factor
    }

    /// Clear all filter history without reallocating.
    pub fn reset(&mut self) {
        self.low.reset();
        self.high.reset();
    }

    /// Write the three bands of `input` into `low`, `mid` and `high`.
    ///
    /// All four blocks must have the same length.
    pub fn split(
        &mut self,
        input: &AudioBlock<'_>,
        low: &mut AudioBlock<'_>,
        mid: &mut AudioBlock<'_>,
        high: &mut AudioBlock<'_>,
    ) {
        low.copy_from(input);
        mid.copy_from(input);

        let channels = input.num_channels().min(self.num_channels);
        for ch in 0..channels {
            self.low.lowpass.process_slice(ch, low.channel_mut(ch));
            self.high.allpass.process_slice(ch, low.channel_mut(ch));

            self.low.highpass.process_slice(ch, mid.channel_mut(ch));
        }

        high.copy_from(mid);
        for ch in 0..channels {
            self.high.lowpass.process_slice(ch, mid.channel_mut(ch));
            self.high.highpass.process_slice(ch, high.channel_mut(ch));
        }
    }
}

impl Default for CrossoverSplitter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inflator_core::ChannelBuffer;

    #[test]
    fn cutoffs_are_clamped_and_ordered() {
        let mut splitter = CrossoverSplitter::new();
        splitter.set_cutoff_frequency(30000.0, 5.0);
        assert_eq!(splitter.cutoffs(), (MIN_CUTOFF, MAX_CUTOFF));
        splitter.set_cutoff_frequency(3000.0, 300.0);
        assert_eq!(splitter.cutoffs(), (300.0, 3000.0));
    }

    #[test]
    fn update_tracks_oversampling_rate() {
        let mut splitter = CrossoverSplitter::new();
        splitter.prepare(44100.0, 2);
        assert_eq!(splitter.sample_rate(), 44100.0);
        splitter.update(3);
        assert_eq!(splitter.sample_rate(), 44100.0 * 8.0);
        splitter.prepare(48000.0, 2);
        assert_eq!(splitter.factor(), 3);
        assert_eq!(splitter.sample_rate(), 48000.0 * 8.0);
    }

    #[test]
    fn bands_separate_by_frequency() {
        let sr = 48000.0;
        let n = 4800;
        let mut splitter = CrossoverSplitter::new();
        splitter.prepare(sr, 1);
        splitter.set_cutoff_frequency(240.0, 2400.0);

        let mut input = ChannelBuffer::new(1, n);
        let mut bands = [ChannelBuffer::new(1, n), ChannelBuffer::new(1, n), ChannelBuffer::new(1, n)];
        for (i, s) in input.channel_mut(0).iter_mut().enumerate() {
            *s = (core::f32::consts::TAU * 60.0 * i as f32 / sr).sin();
        }
        let src = input.block(n);
        let [a, b, c] = &mut bands;
        splitter.split(&src, &mut a.block(n), &mut b.block(n), &mut c.block(n));

        let tail = |buf: &ChannelBuffer| inflator_core::rms(&buf.channel(0)[n / 2..]);
        assert!(tail(&bands[0]) > 0.65, "60 Hz should sit in the low band");
        assert!(tail(&bands[1]) < 0.05);
        assert!(tail(&bands[2]) < 0.001);
    }

    #[test]
    fn reset_clears_state() {
        let mut splitter = CrossoverSplitter::new();
        splitter.prepare(48000.0, 1);
        let mut input = ChannelBuffer::new(1, 64);
        input.channel_mut(0).fill(0.8);
        let mut bands = [ChannelBuffer::new(1, 64), ChannelBuffer::new(1, 64), ChannelBuffer::new(1, 64)];
        {
            let src = input.block(64);
            let [a, b, c] = &mut bands;
            splitter.split(&src, &mut a.block(64), &mut b.block(64), &mut c.block(64));
        }
        splitter.reset();
        input.clear();
        let src = input.block(64);
        let [a, b, c] = &mut bands;
        splitter.split(&src, &mut a.block(64), &mut b.block(64), &mut c.block(64));
        for band in &bands {
            assert!(band.channel(0).iter().all(|&s| s == 0.0));
        }
    }
}
