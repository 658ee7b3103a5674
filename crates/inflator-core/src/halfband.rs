//! Half-band FIR stages for 2× interpolation and decimation.
//!
//! A half-band lowpass has its cutoff at a quarter of the (high) sample rate.
//! Every second tap away from the centre is exactly zero and the centre tap
//! is exactly 0.5, so a 2× stage splits into two polyphase branches:
//!
//! ```text
//! up:   y[2n]   = 2 · Σ h[2i] · x[n−i]        (FIR branch)
//!       y[2n+1] = x[n − m]                      (pure delay, centre tap)
//!
//! down: y[n]    = Σ h[2i] · v[2n−2i] + ½ · v[2n−c]
//! ```
//!
//! where `c = (N−1)/2` is the centre index and `m = (c−1)/2`. Only the FIR
//! branch taps are stored. Each stage delays the signal by `c` samples at the
//! high rate in each direction, so an up/down round trip through one stage
//! costs `c / 2` samples at the low rate per direction.
//!
//! # Filter design
//!
//! Kaiser-windowed sinc, constrained to the exact half-band structure and
//! normalised to unity DC gain:
//!
//! | Stage | Taps | Kaiser β | Passband (−0.01 dB) | Stopband |
//! |-------|------|----------|---------------------|----------|
//! | [`HalfbandDesign::Steep`]   | 63 | 8.96 | 0.20 · fs_high | < −93 dB from 0.30 · fs_high |
//! | [`HalfbandDesign::Relaxed`] | 31 | 6.76 | 0.15 · fs_high | < −69 dB from 0.35 · fs_high |
//!
//! The steep design sits between the host rate and 2× and protects the audio
//! band. Later stages only have to reject images/aliases that land far above
//! the original Nyquist, so the cheaper relaxed design is enough.

#[cfg(not(feature = "std"))]
use alloc::vec;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// FIR-branch taps of the 63-tap steep half-band (`h[0], h[2], …, h[62]`).
#[allow(clippy::excessive_precision)]
#[rustfmt::skip]
static STEEP_BRANCH: [f32; 32] = [
    -0.0000097500,  0.0000582569, -0.0001796079,  0.0004302316,
    -0.0008895563,  0.0016633943, -0.0028877137,  0.0047349287,
    -0.0074275485,  0.0112699331, -0.0167237621,  0.0245966232,
    -0.0365689404,  0.0570011079, -0.1019804672,  0.3169128704,
     0.3169128704, -0.1019804672,  0.0570011079, -0.0365689404,
     0.0245966232, -0.0167237621,  0.0112699331, -0.0074275485,
     0.0047349287, -0.0028877137,  0.0016633943, -0.0008895563,
     0.0004302316, -0.0001796079,  0.0000582569, -0.0000097500,
];

/// FIR-branch taps of the 31-tap relaxed half-band (`h[0], h[2], …, h[30]`).
#[allow(clippy::excessive_precision)]
#[rustfmt::skip]
static RELAXED_BRANCH: [f32; 16] = [
    -0.0001571049,  0.0012019786, -0.0040755627,  0.0102880884,
    -0.0222005421,  0.0445966120, -0.0935387821,  0.3138853127,
     0.3138853127, -0.0935387821,  0.0445966120, -0.0222005421,
     0.0102880884, -0.0040755627,  0.0012019786, -0.0001571049,
];

/// Which half-band prototype a stage uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalfbandDesign {
    /// 63 taps, for the stage adjacent to the host rate.
    Steep,
    /// 31 taps, for every further doubling.
    Relaxed,
}

impl HalfbandDesign {
    /// FIR-branch coefficients (every even tap of the full filter).
    #[inline]
    pub fn branch(self) -> &'static [f32] {
        match self {
            Self::Steep => &STEEP_BRANCH,
            Self::Relaxed => &RELAXED_BRANCH,
        }
    }

    /// Full filter length `N`.
    pub fn taps(self) -> usize {
        self.branch().len() * 2 - 1
    }

    /// Group delay in samples at the high rate (`(N−1)/2`).
    pub fn group_delay(self) -> usize {
        (self.taps() - 1) / 2
    }

    /// Lag of the centre-tap branch inside a low-rate history.
    fn centre_lag(self) -> usize {
        (self.group_delay() - 1) / 2
    }
}

/// Fixed-length history with the newest sample at index 0.
///
/// Storage is doubled so [`window`](Self::window) is always one contiguous
/// slice, which keeps the convolution a plain dot product.
#[derive(Debug, Clone)]
struct History {
    buf: Vec<f32>,
    pos: usize,
    len: usize,
}

impl History {
    fn new(len: usize) -> Self {
        Self {
            buf: vec![0.0; len * 2],
            pos: 0,
            len,
        }
    }

    #[inline]
    fn push(&mut self, x: f32) {
        self.pos = if self.pos == 0 { self.len - 1 } else { self.pos - 1 };
        self.buf[self.pos] = x;
        self.buf[self.pos + self.len] = x;
    }

    /// `window()[i]` is the sample pushed `i` pushes ago.
    #[inline]
    fn window(&self) -> &[f32] {
        &self.buf[self.pos..self.pos + self.len]
    }

    fn clear(&mut self) {
        self.buf.fill(0.0);
        self.pos = 0;
    }
}

#[inline]
fn dot(coeffs: &[f32], window: &[f32]) -> f32 {
    coeffs.iter().zip(window).map(|(c, x)| c * x).sum()
}

/// One 2× interpolation/decimation stage for a single channel.
///
/// The interpolator and decimator keep independent histories so the same
/// stage can be used for the up and the down path of an oversampler.
#[derive(Debug, Clone)]
pub struct HalfbandStage {
    design: HalfbandDesign,
    up: History,
    down_even: History,
    down_odd: History,
}

impl HalfbandStage {
    /// Create a stage with cleared state.
    pub fn new(design: HalfbandDesign) -> Self {
        let branch_len = design.branch().len();
        Self {
            design,
            up: History::new(branch_len),
            down_even: History::new(branch_len),
            down_odd: History::new(design.centre_lag() + 1),
        }
    }

    /// Prototype used by this stage.
    pub fn design(&self) -> HalfbandDesign {
        self.design
    }

    /// Interpolate `input` into `output`, which must be exactly twice as long.
    pub fn upsample(&mut self, input: &[f32], output: &mut [f32]) {
        debug_assert_eq!(output.len(), input.len() * 2);
        let branch = self.design.branch();
        let lag = self.design.centre_lag();
        for (&x, pair) in input.iter().zip(output.chunks_exact_mut(2)) {
            self.up.push(x);
            let window = self.up.window();
            pair[0] = 2.0 * dot(branch, window);
            pair[1] = window[lag];
        }
    }

    /// Decimate `input` into `output`, which must be exactly half as long.
    pub fn downsample(&mut self, input: &[f32], output: &mut [f32]) {
        debug_assert_eq!(input.len(), output.len() * 2);
        let branch = self.design.branch();
        let lag = self.design.centre_lag();
        for (pair, y) in input.chunks_exact(2).zip(output.iter_mut()) {
            self.down_even.push(pair[0]);
            *y = dot(branch, self.down_even.window()) + 0.5 * self.down_odd.window()[lag];
            self.down_odd.push(pair[1]);
        }
    }

    /// Clear both histories.
    pub fn reset(&mut self) {
        self.up.clear();
        self.down_even.clear();
        self.down_odd.clear();
    }
}
