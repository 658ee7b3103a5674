//! Fourth-order Linkwitz-Riley crossover sections.
//!
//! A Linkwitz-Riley lowpass/highpass pair is two cascaded Butterworth
//! (Q = 1/√2) sections per side. The two outputs are in phase at every
//! frequency and sum to a second-order allpass:
//!
//! ```text
//! LP4(s) + HP4(s) = (s² − √2·s + 1) / (s² + √2·s + 1) = AP2(s)
//! ```
//!
//! [`LinkwitzRiley`] in [`LrKind::Allpass`] mode produces exactly that AP2,
//! which is what a band needs to be phase-aligned with the other side of a
//! split it did not pass through.
//!
//! # Topology
//!
//! Each second-order section is a TPT state-variable filter (Zavalishin,
//! "The Art of VA Filter Design", ch. 3). Trapezoidal integration keeps the
//! coefficients well conditioned even for very low cutoffs at 16× oversampled
//! rates, where a direct-form biquad in `f32` loses most of its precision.

use core::f32::consts::{PI, SQRT_2};
use libm::tanf;

use crate::math::flush_denormal;

#[cfg(not(feature = "std"))]
use alloc::vec;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// Damping of a Butterworth section (`k = 1/Q`).
const DAMPING: f32 = SQRT_2;

/// Which response a [`LinkwitzRiley`] filter produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LrKind {
    /// 24 dB/oct lowpass (two cascaded Butterworth lowpass sections).
    Lowpass,
    /// 24 dB/oct highpass (two cascaded Butterworth highpass sections).
    Highpass,
    /// Second-order allpass equal to `Lowpass + Highpass`.
    Allpass,
}

/// Integrator state of one channel: two sections, two integrators each.
#[derive(Debug, Clone, Copy, Default)]
struct ChannelState {
    s1: f32,
    s2: f32,
    s3: f32,
    s4: f32,
}

/// Multi-channel fourth-order Linkwitz-Riley filter.
///
/// Coefficients are shared by all channels; each channel keeps its own
/// integrator state. Call [`prepare`](Self::prepare) to size the state and
/// set the sample rate, then [`set_cutoff`](Self::set_cutoff).
#[derive(Debug, Clone)]
pub struct LinkwitzRiley {
    kind: LrKind,
    sample_rate: f32,
    cutoff: f32,
    g: f32,
    h: f32,
    state: Vec<ChannelState>,
}

impl LinkwitzRiley {
    /// Create a filter of the given kind. It has no channels until prepared.
    pub fn new(kind: LrKind) -> Self {
        let mut filter = Self {
            kind,
            sample_rate: 48000.0,
            cutoff: 1000.0,
            g: 0.0,
            h: 0.0,
            state: Vec::new(),
        };
        filter.update_coefficients();
        filter
    }

    /// Response type.
    pub fn kind(&self) -> LrKind {
        self.kind
    }

    /// Size the state for `num_channels`, set the sample rate and clear history.
    ///
    /// Allocates when the channel count grows; call from the control path only.
    pub fn prepare(&mut self, sample_rate: f32, num_channels: usize) {
        self.sample_rate = sample_rate;
        if self.state.len() != num_channels {
            self.state = vec![ChannelState::default(); num_channels];
        }
        self.update_coefficients();
        self.reset();
    }

    /// Set the crossover frequency in Hz, clamped below Nyquist.
    pub fn set_cutoff(&mut self, cutoff: f32) {
        self.cutoff = cutoff;
        self.update_coefficients();
    }

    /// Current crossover frequency in Hz.
    pub fn cutoff(&self) -> f32 {
        self.cutoff
    }

    /// Sample rate the coefficients were derived for.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Clear all integrator state without touching coefficients.
    pub fn reset(&mut self) {
        self.state.fill(ChannelState::default());
    }

    fn update_coefficients(&mut self) {
        let freq = self.cutoff.clamp(1.0, self.sample_rate * 0.49);
        self.g = tanf(PI * freq / self.sample_rate);
        self.h = 1.0 / (1.0 + self.g * (self.g + DAMPING));
    }

    /// Filter one sample of `channel`.
    #[inline]
    pub fn process_sample(&mut self, channel: usize, input: f32) -> f32 {
        let (g, h, kind) = (self.g, self.h, self.kind);
        let st = &mut self.state[channel];

        let (lp, bp, hp) = tpt_section(input, g, h, &mut st.s1, &mut st.s2);
        match kind {
            LrKind::Allpass => lp - DAMPING * bp + hp,
            LrKind::Lowpass => tpt_section(lp, g, h, &mut st.s3, &mut st.s4).0,
            LrKind::Highpass => tpt_section(hp, g, h, &mut st.s3, &mut st.s4).2,
        }
    }

    /// Filter a slice of `channel` in place.
    pub fn process_slice(&mut self, channel: usize, samples: &mut [f32]) {
        for sample in samples.iter_mut() {
            *sample = self.process_sample(channel, *sample);
        }
    }
}

/// One trapezoidal SVF step; returns `(lowpass, bandpass, highpass)`.
#[inline]
fn tpt_section(x: f32, g: f32, h: f32, s1: &mut f32, s2: &mut f32) -> (f32, f32, f32) {
    let hp = (x - (DAMPING + g) * *s1 - *s2) * h;
    let bp = g * hp + *s1;
    *s1 = flush_denormal(g * hp + bp);
    let lp = g * bp + *s2;
    *s2 = flush_denormal(g * bp + lp);
    (lp, bp, hp)
}
