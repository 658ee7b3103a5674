//! Error types for the control path.
//!
//! Nothing on the audio path can fail. Errors only surface when a host hands
//! the processor an unusable configuration, or when the parameter bridge is
//! given an id or value it cannot interpret.

use inflator_core::ProcessSpec;
use thiserror::Error;

/// A processing configuration the chain cannot run with.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PrepareError {
    /// Zero channels requested.
    #[error("channel count must be at least 1")]
    NoChannels,

    /// Zero-length maximum block.
    #[error("maximum block size must be at least 1")]
    EmptyBlock,

    /// Sample rate is zero, negative, or not finite.
    #[error("sample rate must be finite and positive, got {0}")]
    InvalidSampleRate(f32),
}

impl PrepareError {
    /// Check a [`ProcessSpec`] before any allocation happens.
    pub fn check(spec: &ProcessSpec) -> Result<(), Self> {
        if spec.num_channels == 0 {
            Err(Self::NoChannels)
        } else if spec.max_block_size == 0 {
            Err(Self::EmptyBlock)
        } else if !spec.sample_rate.is_finite() || spec.sample_rate <= 0.0 {
            Err(Self::InvalidSampleRate(spec.sample_rate))
        } else {
            Ok(())
        }
    }
}

/// A parameter change the bridge cannot translate.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParamError {
    /// No parameter has this id.
    #[error("unknown parameter: {0}")]
    UnknownParameter(String),

    /// Style name is not one of the curve families.
    #[error("unknown curve style: {0}")]
    UnknownStyle(String),

    /// Oversampling choice is not one of OFF/2x/4x/8x/16x.
    #[error("unknown oversampling choice: {0}")]
    UnknownOversampling(String),

    /// NaN or infinite value.
    #[error("parameter '{param}' received non-finite value {value}")]
    NonFinite {
        /// Parameter id.
        param: &'static str,
        /// Offending value.
        value: f32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_spec() {
        assert_eq!(PrepareError::check(&ProcessSpec::new(48000.0, 512, 2)), Ok(()));
    }

    #[test]
    fn rejects_zero_channels() {
        let err = PrepareError::check(&ProcessSpec::new(48000.0, 512, 0));
        assert_eq!(err, Err(PrepareError::NoChannels));
    }

    #[test]
    fn rejects_empty_block() {
        let err = PrepareError::check(&ProcessSpec::new(48000.0, 0, 2));
        assert_eq!(err, Err(PrepareError::EmptyBlock));
    }

    #[test]
    fn rejects_bad_sample_rate() {
        for rate in [0.0, -44100.0, f32::NAN, f32::INFINITY] {
            let err = PrepareError::check(&ProcessSpec::new(rate, 512, 2));
            assert!(matches!(err, Err(PrepareError::InvalidSampleRate(_))), "{rate}");
        }
    }

    #[test]
    fn display_messages() {
        assert_eq!(
            PrepareError::InvalidSampleRate(-1.0).to_string(),
            "sample rate must be finite and positive, got -1"
        );
        assert_eq!(
            ParamError::UnknownStyle("tanh".to_string()).to_string(),
            "unknown curve style: tanh"
        );
        let err = ParamError::NonFinite {
            param: "wet",
            value: f32::NAN,
        };
        assert_eq!(err.to_string(), "parameter 'wet' received non-finite value NaN");
    }
}
