//! Parameter plumbing between the control thread and the audio thread.
//!
//! - [`AtomicF32`] publishes a scalar from the control thread with a single
//!   atomic store; the audio thread picks it up with a single atomic load.
//! - [`LinearRamp`] turns a stepped target into a click-free per-sample ramp
//!   on the audio thread.
//!
//! ## Usage
//!
//! ```rust
//! use inflator_core::{AtomicF32, LinearRamp};
//!
//! let target = AtomicF32::new(1.0);
//! let mut ramp = LinearRamp::new(1.0);
//! ramp.reset(48000.0, 0.05);
//!
//! // Control thread
//! target.store(0.5);
//!
//! // Audio thread, once per block
//! ramp.set_target(target.load());
//! for _ in 0..2400 {
//!     let _gain = ramp.next_value();
//! }
//! assert!(!ramp.is_smoothing());
//! ```

use core::sync::atomic::{AtomicU32, Ordering};

/// An `f32` stored as its bit pattern in an [`AtomicU32`].
///
/// Lock-free on every target with 32-bit atomics. Stores use `Release` and
/// loads use `Acquire`, so anything written before a store is visible to the
/// thread that observes it.
#[derive(Debug)]
pub struct AtomicF32 {
    bits: AtomicU32,
}

impl AtomicF32 {
    /// Create a new atomic float.
    pub const fn new(value: f32) -> Self {
        Self {
            bits: AtomicU32::new(value.to_bits()),
        }
    }

    /// Publish a new value.
    #[inline]
    pub fn store(&self, value: f32) {
        self.bits.store(value.to_bits(), Ordering::Release);
    }

    /// Read the latest published value.
    #[inline]
    pub fn load(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Acquire))
    }
}

impl Default for AtomicF32 {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// Linear ramp towards a target value.
///
/// A new target restarts the ramp from the current value and reaches it in
/// exactly the configured number of samples. With a ramp length of zero the
/// value jumps immediately.
#[derive(Debug, Clone)]
pub struct LinearRamp {
    current: f32,
    target: f32,
    step: f32,
    remaining: u32,
    ramp_samples: u32,
}

impl LinearRamp {
    /// Create a ramp resting at `initial` with no smoothing configured.
    pub fn new(initial: f32) -> Self {
        Self {
            current: initial,
            target: initial,
            step: 0.0,
            remaining: 0,
            ramp_samples: 0,
        }
    }

    /// Configure the ramp length and snap to the current target.
    pub fn reset(&mut self, sample_rate: f32, ramp_seconds: f32) {
        self.ramp_samples = (sample_rate * ramp_seconds).max(0.0) as u32;
        self.snap_to_target();
    }

    /// Set a new target. Repeating the current target does not restart the ramp.
    #[inline]
    pub fn set_target(&mut self, target: f32) {
        if target == self.target {
            return;
        }
        self.target = target;
        if self.ramp_samples == 0 {
            self.current = target;
            self.remaining = 0;
        } else {
            self.remaining = self.ramp_samples;
            self.step = (target - self.current) / self.ramp_samples as f32;
        }
    }

    /// Jump straight to the target.
    #[inline]
    pub fn snap_to_target(&mut self) {
        self.current = self.target;
        self.remaining = 0;
    }

    /// Advance one sample and return the new value.
    #[inline]
    pub fn next_value(&mut self) -> f32 {
        if self.remaining > 0 {
            self.remaining -= 1;
            self.current = if self.remaining == 0 {
                self.target
            } else {
                self.current + self.step
            };
        }
        self.current
    }

    /// Current value without advancing.
    #[inline]
    pub fn current(&self) -> f32 {
        self.current
    }

    /// Target value.
    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Whether the ramp is still moving.
    #[inline]
    pub fn is_smoothing(&self) -> bool {
        self.remaining > 0
    }
}

impl Default for LinearRamp {
    fn default() -> Self {
        Self::new(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atomic_roundtrip() {
        let value = AtomicF32::new(0.25);
        assert_eq!(value.load(), 0.25);
        value.store(-3.5);
        assert_eq!(value.load(), -3.5);
    }

    #[test]
    fn ramp_reaches_target_exactly() {
        let mut ramp = LinearRamp::new(0.0);
        ramp.reset(1000.0, 0.01); // 10 samples
        ramp.set_target(1.0);
        let mut last = 0.0;
        for i in 0..10 {
            let v = ramp.next_value();
            assert!(v > last, "ramp must rise at step {i}");
            last = v;
        }
        assert_eq!(ramp.current(), 1.0);
        assert!(!ramp.is_smoothing());
    }

    #[test]
    fn zero_length_ramp_jumps() {
        let mut ramp = LinearRamp::new(1.0);
        ramp.set_target(0.5);
        assert_eq!(ramp.next_value(), 0.5);
    }

    #[test]
    fn same_target_does_not_restart() {
        let mut ramp = LinearRamp::new(0.0);
        ramp.reset(1000.0, 0.01);
        ramp.set_target(1.0);
        for _ in 0..5 {
            ramp.next_value();
        }
        ramp.set_target(1.0);
        for _ in 0..5 {
            ramp.next_value();
        }
        assert_eq!(ramp.current(), 1.0);
    }
}
