//! Inflator Core - DSP primitives for the inflator signal chain
//!
//! Everything in this crate is allocation-free once prepared and builds
//! without `std`, so the same primitives run in a desktop host, an offline
//! renderer, or on an embedded target.
//!
//! # Building Blocks
//!
//! ## Waveshaping
//!
//! - [`ShaperCurve`] - One configured curve from the [`CurveKind`] family,
//!   pinned to `0 → 0` and `1 → 1`, with optional loudness compensation
//!
//! ## Anti-Aliasing
//!
//! - [`OversamplingEngine`] - Pre-allocated bank of 1×/2×/4×/8×/16× half-band
//!   ladders, switched by index without allocating
//! - [`HalfbandStage`] - A single polyphase 2× interpolator/decimator
//!
//! ## Crossover
//!
//! - [`LinkwitzRiley`] - 4th-order Linkwitz-Riley lowpass/highpass/allpass
//!   sections on a TPT state-variable topology
//!
//! ## Buffers
//!
//! - [`AudioBlock`] - Non-owning planar view handed to every `process` call
//! - [`ChannelBuffer`] - Owned planar scratch storage sized at prepare time
//! - [`ProcessSpec`] - Sample rate, maximum block size and channel count
//!
//! ## Parameters
//!
//! - [`AtomicF32`] - Lock-free scalar published by the control thread
//! - [`LinearRamp`] - Click-free per-sample ramp towards a target
//!
//! ## Utilities
//!
//! - Level math: [`db_to_linear`], [`gain_to_db`], [`rms`], [`peak`]
//!
//! # no_std Support
//!
//! Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! inflator-core = { version = "0.1", default-features = false }
//! ```
//!
//! The optional `tracing` feature logs control-path events such as
//! oversampling ratio switches.
//!
//! # Example
//!
//! ```rust
//! use inflator_core::{AudioBlock, CurveKind, OversampleRatio, OversamplingEngine, ShaperCurve};
//!
//! let curve = ShaperCurve::new(CurveKind::Cubic, 0.5, false);
//! let mut engine = OversamplingEngine::new();
//! engine.prepare(256, 2, 48000.0);
//! engine.set_active_ratio(OversampleRatio::X4);
//!
//! let mut data = vec![0.25f32; 512];
//! let mut block = AudioBlock::new(&mut data, 2, 256);
//! let mut wide = engine.process_up(&block);
//! wide.map_in_place(|x| x.signum() * curve.shape(x.abs().min(1.0)));
//! engine.process_down(&mut block);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod block;
pub mod halfband;
pub mod linkwitz_riley;
pub mod math;
pub mod oversample;
pub mod param;
pub mod shaper;

pub use block::{AudioBlock, ChannelBuffer, ProcessSpec};
pub use halfband::{HalfbandDesign, HalfbandStage};
pub use linkwitz_riley::{LinkwitzRiley, LrKind};
pub use math::{SILENCE_DB, db_to_linear, flush_denormal, gain_to_db, peak, rms};
pub use oversample::{MAX_OVERSAMPLE_FACTOR, OversampleRatio, OversamplingEngine};
pub use param::{AtomicF32, LinearRamp};
pub use shaper::{CurveKind, SINE_AMOUNT_EXPONENT, ShaperCurve, UnknownCurve, compensation_gain};
