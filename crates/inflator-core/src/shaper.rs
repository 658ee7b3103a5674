//! Static waveshaping curves on the normalised magnitude domain `[0, 1]`.
//!
//! Every curve maps `0 → 0` and `1 → 1` before gain compensation, so blending
//! it with the dry signal never adds DC or a step at full scale. The caller
//! strips the sign, clamps the magnitude to `[0, 1]` and restores the sign
//! afterwards; curves only ever see non-negative input.
//!
//! | Kind | Transfer `f(x)` | Amount dependence |
//! |------|-----------------|-------------------|
//! | Identity  | `x` | none |
//! | Quadratic | `x(2 − x)` | none |
//! | Cubic     | `x(1 + x(1 − x))` | none |
//! | Quartic   | `x(1 + x(c + x(b + a·x)))` | `t = 6·amount − 6`, `a = (4+t)/2`, `b = −5−t`, `c = (6+t)/2` |
//! | Sigmoid   | `k(σ(s·x) − ½)` | `s = 2.5·amount + 0.5` |
//! | Sine      | `k·sin(θ·x)` | `θ = (amount^0.427 · 0.999 + 0.001) · π/2` |
//!
//! ## Gain compensation
//!
//! With compensation enabled the curve is scaled by `½ / mean(f)` where
//! `mean(f)` is the exact integral of the curve over `[0, 1]`. The identity
//! has mean `½`, so compensated curves keep the average level of a linear
//! transfer regardless of how hard they bend.

use core::f64::consts::FRAC_PI_2;
use core::fmt;
use core::str::FromStr;
use libm::{exp, expf, log, pow, sin, sinf};

/// Exponent of the amount-to-angle mapping of [`CurveKind::Sine`].
pub const SINE_AMOUNT_EXPONENT: f64 = 0.427;

/// Family of a [`ShaperCurve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CurveKind {
    /// Straight line; no distortion.
    Identity,
    /// Second-order polynomial.
    #[default]
    Quadratic,
    /// Third-order polynomial.
    Cubic,
    /// Fourth-order polynomial whose bend follows the curve amount.
    Quartic,
    /// Logistic curve, re-centred and normalised.
    Sigmoid,
    /// Quarter sine segment whose span follows the curve amount.
    Sine,
}

impl CurveKind {
    /// All kinds in menu order.
    pub const ALL: [Self; 6] = [
        Self::Identity,
        Self::Quadratic,
        Self::Cubic,
        Self::Quartic,
        Self::Sigmoid,
        Self::Sine,
    ];

    /// Kind at a menu index, clamped to the last entry.
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index.min(Self::ALL.len() - 1)]
    }

    /// Menu index.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Display name.
    pub fn label(self) -> &'static str {
        match self {
            Self::Identity => "Identity",
            Self::Quadratic => "Quadratic",
            Self::Cubic => "Cubic",
            Self::Quartic => "Quartic",
            Self::Sigmoid => "Sigmoid",
            Self::Sine => "Sin",
        }
    }
}

impl fmt::Display for CurveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when a curve name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCurve;

impl fmt::Display for UnknownCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("unknown curve style")
    }
}

impl FromStr for CurveKind {
    type Err = UnknownCurve;

    /// Case-insensitive; accepts `sin`/`sine` and `sigmod`/`sigmoid`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        let matches = |candidate: &str| name.eq_ignore_ascii_case(candidate);
        if matches("identity") {
            Ok(Self::Identity)
        } else if matches("quadratic") {
            Ok(Self::Quadratic)
        } else if matches("cubic") {
            Ok(Self::Cubic)
        } else if matches("quartic") {
            Ok(Self::Quartic)
        } else if matches("sigmoid") || matches("sigmod") {
            Ok(Self::Sigmoid)
        } else if matches("sine") || matches("sin") {
            Ok(Self::Sine)
        } else {
            Err(UnknownCurve)
        }
    }
}

/// Derived coefficients per family.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Shape {
    Identity,
    Quadratic,
    Cubic,
    Quartic { a: f32, b: f32, c: f32 },
    Sigmoid { slope: f32, k: f32 },
    Sine { angle: f32, k: f32 },
}

impl Shape {
    fn derive(kind: CurveKind, amount: f32) -> Self {
        let amount = f64::from(amount);
        match kind {
            CurveKind::Identity => Self::Identity,
            CurveKind::Quadratic => Self::Quadratic,
            CurveKind::Cubic => Self::Cubic,
            CurveKind::Quartic => {
                let t = 6.0 * amount - 6.0;
                Self::Quartic {
                    a: ((4.0 + t) / 2.0) as f32,
                    b: (-5.0 - t) as f32,
                    c: ((6.0 + t) / 2.0) as f32,
                }
            }
            CurveKind::Sigmoid => {
                let slope = sigmoid_slope(amount);
                Self::Sigmoid {
                    slope: slope as f32,
                    k: (1.0 / (logistic(slope) - 0.5)) as f32,
                }
            }
            CurveKind::Sine => {
                let angle = sine_angle(amount);
                Self::Sine {
                    angle: angle as f32,
                    k: (1.0 / sin(angle)) as f32,
                }
            }
        }
    }

    /// Exact integral of the normalised curve over `[0, 1]`.
    fn mean(kind: CurveKind, amount: f64) -> f64 {
        match kind {
            CurveKind::Identity => 0.5,
            CurveKind::Quadratic => 2.0 / 3.0,
            CurveKind::Cubic => 7.0 / 12.0,
            // 1/2 + c/3 + b/4 + a/5 with t = 6·amount − 6
            CurveKind::Quartic => 0.65 + (6.0 * amount - 6.0) / 60.0,
            CurveKind::Sigmoid => {
                let s = sigmoid_slope(amount);
                let k = 1.0 / (logistic(s) - 0.5);
                k * (log((1.0 + exp(s)) / 2.0) / s - 0.5)
            }
            CurveKind::Sine => {
                // (1 − cos θ) / (θ sin θ), with 1 − cos θ = 2 sin²(θ/2) for small θ
                let theta = sine_angle(amount);
                let half = sin(theta / 2.0);
                2.0 * half * half / (theta * sin(theta))
            }
        }
    }

    #[inline]
    fn eval(self, x: f32) -> f32 {
        match self {
            Self::Identity => x,
            Self::Quadratic => x * (2.0 - x),
            Self::Cubic => x * (1.0 + x * (1.0 - x)),
            Self::Quartic { a, b, c } => x * (1.0 + x * (c + x * (b + a * x))),
            Self::Sigmoid { slope, k } => k * (1.0 / (1.0 + expf(-slope * x)) - 0.5),
            Self::Sine { angle, k } => k * sinf(angle * x),
        }
    }
}

fn sigmoid_slope(amount: f64) -> f64 {
    amount * 2.5 + 0.5
}

fn logistic(x: f64) -> f64 {
    1.0 / (1.0 + exp(-x))
}

fn sine_angle(amount: f64) -> f64 {
    (pow(amount, SINE_AMOUNT_EXPONENT) * 0.999 + 0.001) * FRAC_PI_2
}

/// Loudness-compensation factor for a curve (`1.0` for the identity).
pub fn compensation_gain(kind: CurveKind, amount: f32) -> f32 {
    (0.5 / Shape::mean(kind, f64::from(amount))) as f32
}

/// One configured waveshaping curve.
///
/// Coefficients are derived in [`set_parameters`](Self::set_parameters),
/// which belongs on the control path. [`shape`](Self::shape) is pure and
/// cheap enough to run per sample at 16× oversampling.
///
/// ```rust
/// use inflator_core::{CurveKind, ShaperCurve};
///
/// let curve = ShaperCurve::new(CurveKind::Sine, 0.5, false);
/// assert!(curve.shape(0.0).abs() < 1e-6);
/// assert!((curve.shape(1.0) - 1.0).abs() < 1e-5);
/// assert!(curve.shape(0.5) > 0.5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShaperCurve {
    kind: CurveKind,
    amount: f32,
    compensation: bool,
    shape: Shape,
    gain: f32,
}

impl ShaperCurve {
    /// Build a curve. `amount` must already be in `[0, 1]`.
    pub fn new(kind: CurveKind, amount: f32, compensation: bool) -> Self {
        let mut curve = Self {
            kind,
            amount,
            compensation,
            shape: Shape::Identity,
            gain: 1.0,
        };
        curve.set_parameters(amount, compensation);
        curve
    }

    /// Re-derive coefficients for a new amount and compensation setting.
    pub fn set_parameters(&mut self, amount: f32, compensation: bool) {
        self.amount = amount;
        self.compensation = compensation;
        self.shape = Shape::derive(self.kind, amount);
        self.gain = if compensation {
            compensation_gain(self.kind, amount)
        } else {
            1.0
        };
    }

    /// Family of this curve.
    pub fn kind(&self) -> CurveKind {
        self.kind
    }

    /// Curve amount the coefficients were derived from.
    pub fn amount(&self) -> f32 {
        self.amount
    }

    /// Whether loudness compensation is applied.
    pub fn compensation(&self) -> bool {
        self.compensation
    }

    /// Output scale (1.0 unless compensation is on).
    pub fn gain(&self) -> f32 {
        self.gain
    }

    /// Map a magnitude in `[0, 1]`.
    #[inline]
    pub fn shape(&self, x: f32) -> f32 {
        self.gain * self.shape.eval(x)
    }
}

impl Default for ShaperCurve {
    fn default() -> Self {
        Self::new(CurveKind::Identity, 0.0, false)
    }
}
