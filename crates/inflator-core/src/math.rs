//! Level conversions and block statistics.
//!
//! All functions are allocation-free and `no_std` compatible. Decibel values
//! follow the metering convention used throughout the crate: silence maps to
//! [`SILENCE_DB`] rather than negative infinity, so display code never has to
//! special-case an empty signal.

use libm::{expf, log10f, sqrt};

/// Level reported for silence (and anything quieter), in dBFS.
pub const SILENCE_DB: f32 = -100.0;

/// Convert decibels to linear gain.
///
/// # Example
/// ```rust
/// use inflator_core::db_to_linear;
///
/// assert!((db_to_linear(0.0) - 1.0).abs() < 1e-6);
/// assert!((db_to_linear(-6.0206) - 0.5).abs() < 1e-4);
/// ```
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    // 10^(dB/20) = e^(dB * ln(10)/20)
    const FACTOR: f32 = core::f32::consts::LN_10 / 20.0;
    expf(db * FACTOR)
}

/// Convert a linear gain to decibels, floored at [`SILENCE_DB`].
///
/// # Example
/// ```rust
/// use inflator_core::{gain_to_db, SILENCE_DB};
///
/// assert!((gain_to_db(1.0) - 0.0).abs() < 1e-6);
/// assert_eq!(gain_to_db(0.0), SILENCE_DB);
/// ```
#[inline]
pub fn gain_to_db(gain: f32) -> f32 {
    if gain > 0.0 {
        (20.0 * log10f(gain)).max(SILENCE_DB)
    } else {
        SILENCE_DB
    }
}

/// Root-mean-square level of a slice (linear).
///
/// The sum of squares is accumulated in `f64` so long oversampled blocks do
/// not lose precision. Returns 0 for an empty slice.
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f64 = samples.iter().map(|&s| f64::from(s) * f64::from(s)).sum();
    sqrt(sum / samples.len() as f64) as f32
}

/// Largest absolute sample value of a slice (linear).
pub fn peak(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0_f32, |acc, &s| acc.max(s.abs()))
}

/// Flush denormals to zero.
///
/// Filter integrators decaying towards silence can drift into the subnormal
/// range, which is very slow on most FPUs.
#[inline]
pub fn flush_denormal(x: f32) -> f32 {
    if x.abs() < 1e-20 { 0.0 } else { x }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_roundtrip() {
        for db in [-60.0, -12.0, -3.0, 0.0, 2.0, 6.0] {
            let back = gain_to_db(db_to_linear(db));
            assert!((back - db).abs() < 1e-3, "{db} dB came back as {back}");
        }
    }

    #[test]
    fn silence_floor() {
        assert_eq!(gain_to_db(0.0), SILENCE_DB);
        assert_eq!(gain_to_db(-1.0), SILENCE_DB);
        assert_eq!(gain_to_db(1e-9), SILENCE_DB);
    }

    #[test]
    fn rms_of_square_wave() {
        let samples = [0.5, -0.5, 0.5, -0.5];
        assert!((rms(&samples) - 0.5).abs() < 1e-6);
        assert_eq!(rms(&[]), 0.0);
    }

    #[test]
    fn peak_uses_magnitude() {
        assert_eq!(peak(&[0.1, -0.8, 0.3]), 0.8);
        assert_eq!(peak(&[]), 0.0);
    }

    #[test]
    fn denormals_flushed() {
        assert_eq!(flush_denormal(1e-30), 0.0);
        assert_eq!(flush_denormal(0.25), 0.25);
    }
}
