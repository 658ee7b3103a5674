//! Smoothed input/output gain.
//!
//! The control side writes a dB value into a shared [`GainControl`]; the
//! [`GainStage`] picks it up at the start of each block and ramps linearly to
//! the new linear gain over [`GAIN_RAMP_SECONDS`].

use std::sync::Arc;

use inflator_core::{AtomicF32, AudioBlock, LinearRamp, db_to_linear};

/// Gain ramp length.
pub const GAIN_RAMP_SECONDS: f32 = 0.05;

/// Input gain range in dB.
pub const INPUT_GAIN_RANGE: (f32, f32) = (-6.0, 6.0);
/// Output gain range in dB.
pub const OUTPUT_GAIN_RANGE: (f32, f32) = (-10.0, 2.0);

/// Cross-thread gain setting in dB.
#[derive(Debug)]
pub struct GainControl {
    gain_db: AtomicF32,
    min_db: f32,
    max_db: f32,
}

impl GainControl {
    /// 0 dB within `[min_db, max_db]`.
    pub fn new(min_db: f32, max_db: f32) -> Self {
        Self {
            gain_db: AtomicF32::new(0.0f32.clamp(min_db, max_db)),
            min_db,
            max_db,
        }
    }

    /// Publish a new gain, clamped to the range.
    pub fn set_gain_db(&self, db: f32) {
        self.gain_db.store(db.clamp(self.min_db, self.max_db));
    }

    /// Latest gain in dB.
    pub fn gain_db(&self) -> f32 {
        self.gain_db.load()
    }

    /// `(min, max)` in dB.
    pub fn range(&self) -> (f32, f32) {
        (self.min_db, self.max_db)
    }
}

/// Per-block gain with a click-free ramp.
#[derive(Debug)]
pub struct GainStage {
    control: Arc<GainControl>,
    ramp: LinearRamp,
}

impl GainStage {
    /// Unity gain stage limited to `[min_db, max_db]`.
    pub fn new(min_db: f32, max_db: f32) -> Self {
        Self {
            control: Arc::new(GainControl::new(min_db, max_db)),
            ramp: LinearRamp::new(1.0),
        }
    }

    /// Handle for the control thread.
    pub fn control(&self) -> Arc<GainControl> {
        Arc::clone(&self.control)
    }

    /// Configure the ramp for `sample_rate` and jump to the current setting.
    pub fn prepare(&mut self, sample_rate: f32) {
        self.ramp.set_target(db_to_linear(self.control.gain_db()));
        self.ramp.reset(sample_rate, GAIN_RAMP_SECONDS);
    }

    /// Drop any ramp in progress.
    pub fn reset(&mut self) {
        self.ramp.snap_to_target();
    }

    /// Current linear gain (mid-ramp value while smoothing).
    pub fn current_gain(&self) -> f32 {
        self.ramp.current()
    }

    /// Apply the gain in place.
    pub fn process(&mut self, block: &mut AudioBlock<'_>) {
        self.ramp.set_target(db_to_linear(self.control.gain_db()));

        if !self.ramp.is_smoothing() {
            let gain = self.ramp.current();
            if gain != 1.0 {
                block.scale(gain);
            }
            return;
        }

        let channels = block.num_channels();
        for i in 0..block.num_samples() {
            let gain = self.ramp.next_value();
            for ch in 0..channels {
                block.channel_mut(ch)[i] *= gain;
            }
        }
    }
}
