//! Level metering between the audio thread and a polling display.
//!
//! Three threads touch a [`MeterSource`]:
//!
//! - the audio thread calls [`process`](MeterSource::process) once per block,
//!   folding each channel's RMS and peak into running maxima;
//! - the display polls [`display_rms`](MeterSource::display_rms) /
//!   [`display_peak`](MeterSource::display_peak) at its refresh rate, which
//!   lets the shown value fall by the decay rate per poll but never below
//!   what was measured since the last [`reset_buffer`](MeterSource::reset_buffer);
//! - user actions clear the peak hold with
//!   [`reset_peak_max`](MeterSource::reset_peak_max).
//!
//! All values are dBFS floored at [`SILENCE_DB`]. Every field is an atomic,
//! so reads and writes never block. While a reset is running the audio thread
//! skips its update for that block instead of racing it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use arc_swap::ArcSwap;
use inflator_core::{AtomicF32, AudioBlock, SILENCE_DB, gain_to_db, peak, rms};

/// Display refresh rate the default decay is tuned for.
pub const DEFAULT_REFRESH_HZ: f32 = 120.0;
/// Default display fall-off in dB per second.
pub const DEFAULT_DECAY_DB_PER_SECOND: f32 = 27.0;

/// Atomic meter state of one channel.
#[derive(Debug)]
struct ChannelMeter {
    buffer_rms: AtomicF32,
    buffer_peak: AtomicF32,
    peak_max: AtomicF32,
    display_rms: AtomicF32,
    display_peak: AtomicF32,
}

impl ChannelMeter {
    fn new() -> Self {
        Self {
            buffer_rms: AtomicF32::new(SILENCE_DB),
            buffer_peak: AtomicF32::new(SILENCE_DB),
            peak_max: AtomicF32::new(SILENCE_DB),
            display_rms: AtomicF32::new(SILENCE_DB),
            display_peak: AtomicF32::new(SILENCE_DB),
        }
    }
}

/// Raise `cell` to `value` if `value` is larger.
#[inline]
fn store_max(cell: &AtomicF32, value: f32) {
    if value > cell.load() {
        cell.store(value);
    }
}

/// Per-channel RMS/peak meter with decaying display values and a peak hold.
#[derive(Debug)]
pub struct MeterSource {
    channels: ArcSwap<Vec<ChannelMeter>>,
    resetting: AtomicBool,
    decay_db: AtomicF32,
}

impl MeterSource {
    /// Meter with no channels; call [`prepare`](Self::prepare) first.
    pub fn new() -> Self {
        Self {
            channels: ArcSwap::from_pointee(Vec::new()),
            resetting: AtomicBool::new(false),
            decay_db: AtomicF32::new(DEFAULT_DECAY_DB_PER_SECOND / DEFAULT_REFRESH_HZ),
        }
    }

    /// Allocate `num_channels` meters, all at the silence floor.
    pub fn prepare(&self, num_channels: usize) {
        let meters = (0..num_channels).map(|_| ChannelMeter::new()).collect();
        self.channels.store(Arc::new(meters));
    }

    /// Number of metered channels.
    pub fn num_channels(&self) -> usize {
        self.channels.load().len()
    }

    /// Fold one block into the running maxima.
    pub fn process(&self, block: &AudioBlock<'_>) {
        if block.is_empty() || self.resetting.load(Ordering::Acquire) {
            return;
        }
        let meters = self.channels.load();
        for (ch, meter) in meters.iter().enumerate().take(block.num_channels()) {
            let samples = block.channel(ch);
            let block_rms = gain_to_db(rms(samples));
            let block_peak = gain_to_db(peak(samples));
            store_max(&meter.buffer_rms, block_rms);
            store_max(&meter.buffer_peak, block_peak);
            store_max(&meter.peak_max, block_peak);
        }
    }

    /// Decay the displayed RMS one step towards the buffered maximum and return it.
    pub fn display_rms(&self) -> Vec<f32> {
        self.decay_display(|m| (&m.display_rms, &m.buffer_rms))
    }

    /// Decay the displayed peak one step towards the buffered maximum and return it.
    pub fn display_peak(&self) -> Vec<f32> {
        self.decay_display(|m| (&m.display_peak, &m.buffer_peak))
    }

    fn decay_display(&self, select: impl Fn(&ChannelMeter) -> (&AtomicF32, &AtomicF32)) -> Vec<f32> {
        let decay = self.decay_db.load();
        self.channels
            .load()
            .iter()
            .map(|meter| {
                let (display, buffer) = select(meter);
                let value = (display.load() - decay).max(buffer.load()).max(SILENCE_DB);
                display.store(value);
                value
            })
            .collect()
    }

    /// Peak hold per channel since the last [`reset_peak_max`](Self::reset_peak_max).
    pub fn peak_max(&self) -> Vec<f32> {
        self.channels.load().iter().map(|m| m.peak_max.load()).collect()
    }

    /// Clear the running maxima the display decays towards.
    pub fn reset_buffer(&self) {
        self.with_reset_guard(|meter| {
            meter.buffer_rms.store(SILENCE_DB);
            meter.buffer_peak.store(SILENCE_DB);
        });
    }

    /// Clear the peak hold.
    pub fn reset_peak_max(&self) {
        self.with_reset_guard(|meter| meter.peak_max.store(SILENCE_DB));
    }

    fn with_reset_guard(&self, reset: impl Fn(&ChannelMeter)) {
        self.resetting.store(true, Ordering::Release);
        for meter in self.channels.load().iter() {
            reset(meter);
        }
        self.resetting.store(false, Ordering::Release);
    }

    /// Display fall-off per poll in dB.
    pub fn set_decay_rate(&self, db_per_poll: f32) {
        self.decay_db.store(db_per_poll.max(0.0));
    }

    /// Display fall-off for a given refresh rate.
    pub fn set_decay_for_refresh(&self, db_per_second: f32, refresh_hz: f32) {
        if refresh_hz > 0.0 {
            self.set_decay_rate(db_per_second / refresh_hz);
        }
    }

    /// Current fall-off per poll in dB.
    pub fn decay_rate(&self) -> f32 {
        self.decay_db.load()
    }
}

impl Default for MeterSource {
    fn default() -> Self {
        Self::new()
    }
}
