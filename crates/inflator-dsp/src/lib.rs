//! Inflator DSP - the real-time inflator signal chain
//!
//! Builds the product-level processing chain on top of `inflator-core`:
//!
//! - [`ShaperMixer`] - Two-slot curve blend published lock-free to the audio
//!   thread
//! - [`CrossoverSplitter`] - 3-band Linkwitz-Riley split whose bands sum back
//!   to an allpass of the input
//! - [`WaveShaperEngine`] - Oversampled, optionally band-split waveshaper
//! - [`MeterSource`] - RMS/peak meters with decaying display values
//! - [`GainStage`] - Ramped input/output gain
//! - [`InflatorProcessor`] - The whole chain, with an [`InflatorHandle`] for
//!   the control thread
//!
//! Parameters arrive in host units through [`ParamChange`] or as a complete
//! [`InflatorParams`] set (serializable with the default `serde` feature).
//!
//! ## Example
//!
//! ```rust
//! use inflator_core::{ChannelBuffer, CurveKind, ProcessSpec};
//! use inflator_dsp::{InflatorProcessor, ParamChange};
//!
//! let mut processor = InflatorProcessor::new();
//! processor.prepare(ProcessSpec::new(44100.0, 128, 2)).unwrap();
//!
//! let handle = processor.handle();
//! handle.apply(ParamChange::Style1(CurveKind::Sigmoid));
//! handle.apply(ParamChange::Curve1(80.0));
//! handle.apply(ParamChange::BandSplit(true));
//!
//! let mut buffer = ChannelBuffer::new(2, 128);
//! buffer.channel_mut(0).fill(0.5);
//! processor.process(&mut buffer.block(128));
//!
//! let levels = handle.output_meter().display_rms();
//! assert_eq!(levels.len(), 2);
//! ```

pub mod crossover;
pub mod error;
pub mod gain;
pub mod meter;
pub mod mixer;
pub mod params;
pub mod processor;
pub mod waveshaper;

pub use crossover::{
    CrossoverSplitter, DEFAULT_HIGH_CUTOFF, DEFAULT_LOW_CUTOFF, MAX_CUTOFF, MIN_CUTOFF,
};
pub use error::{ParamError, PrepareError};
pub use gain::{GAIN_RAMP_SECONDS, GainControl, GainStage, INPUT_GAIN_RANGE, OUTPUT_GAIN_RANGE};
pub use meter::{DEFAULT_DECAY_DB_PER_SECOND, DEFAULT_REFRESH_HZ, MeterSource};
pub use mixer::{DEFAULT_CURVE, DEFAULT_WEIGHT, MixerState, ShaperMixer};
pub use params::{InflatorParams, PARAM_IDS, ParamChange, parse_over_sample, parse_style};
pub use processor::{InflatorHandle, InflatorProcessor};
pub use waveshaper::{NUM_BANDS, WaveHelper, WaveShaperEngine};
