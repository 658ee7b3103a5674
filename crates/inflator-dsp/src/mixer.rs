//! Two-slot curve blend shared between the control, audio and plot threads.
//!
//! [`ShaperMixer`] publishes its whole configuration as one immutable
//! [`MixerState`] through an [`ArcSwap`]. A writer builds the next state and
//! swaps it in; a reader copies out whichever state is current. Slot types,
//! curve amounts, weight and compensation therefore always change together,
//! and the audio thread never sees half of an update.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use arc_swap::ArcSwap;
use inflator_core::{CurveKind, ShaperCurve};

/// Default curve amount of both slots.
pub const DEFAULT_CURVE: f32 = 0.5;
/// Default blend weight.
pub const DEFAULT_WEIGHT: f32 = 0.5;

/// Immutable snapshot of both slots and the blend weight.
///
/// The blended magnitude is `(1 − w)·slot1(x) + w·slot2(x)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MixerState {
    /// First curve.
    pub slot1: ShaperCurve,
    /// Second curve.
    pub slot2: ShaperCurve,
    /// Weight of the second curve in `[0, 1]`.
    pub weight: f32,
}

impl MixerState {
    /// Evaluate the blend for a magnitude in `[0, 1]`.
    #[inline]
    pub fn shape(&self, x: f32) -> f32 {
        self.slot1.shape(x) * (1.0 - self.weight) + self.slot2.shape(x) * self.weight
    }

    /// Whether loudness compensation is enabled.
    pub fn compensation(&self) -> bool {
        self.slot1.compensation()
    }
}

impl Default for MixerState {
    fn default() -> Self {
        Self {
            slot1: ShaperCurve::new(CurveKind::Quadratic, DEFAULT_CURVE, false),
            slot2: ShaperCurve::new(CurveKind::Cubic, DEFAULT_CURVE, false),
            weight: DEFAULT_WEIGHT,
        }
    }
}

/// Blend of two [`ShaperCurve`]s with lock-free coherent updates.
///
/// Mutators take `&self` and are meant for the control thread. The audio
/// thread calls [`snapshot`](Self::snapshot) once per block; a plotting
/// collaborator polls [`has_new_function`](Self::has_new_function) and then
/// reads [`sample_curve`](Self::sample_curve).
///
/// ```rust
/// use inflator_core::CurveKind;
/// use inflator_dsp::ShaperMixer;
///
/// let mixer = ShaperMixer::new();
/// mixer.set_types(CurveKind::Sine, CurveKind::Identity);
/// mixer.set_shapes(1.0, 0.0, 0.0, false);
/// assert!(mixer.has_new_function());
/// assert!(!mixer.has_new_function());
/// assert!(mixer.shape(0.5) > 0.5);
/// ```
#[derive(Debug)]
pub struct ShaperMixer {
    state: ArcSwap<MixerState>,
    changed: AtomicBool,
}

impl ShaperMixer {
    /// Quadratic/Cubic at 50 % each, equal weight, no compensation.
    pub fn new() -> Self {
        Self::with_state(MixerState::default())
    }

    /// Start from an explicit state.
    pub fn with_state(state: MixerState) -> Self {
        Self {
            state: ArcSwap::from_pointee(state),
            changed: AtomicBool::new(true),
        }
    }

    /// Set both curve amounts, the blend weight and compensation as one update.
    ///
    /// Amounts and weight are clamped to `[0, 1]` here, so the curves never
    /// see an out-of-range value.
    pub fn set_shapes(&self, curve1: f32, curve2: f32, weight: f32, compensation: bool) {
        let curve1 = curve1.clamp(0.0, 1.0);
        let curve2 = curve2.clamp(0.0, 1.0);
        let weight = weight.clamp(0.0, 1.0);
        self.state.rcu(|current| {
            let mut next = **current;
            next.slot1.set_parameters(curve1, compensation);
            next.slot2.set_parameters(curve2, compensation);
            next.weight = weight;
            next
        });
        self.changed.store(true, Ordering::Release);
    }

    /// Select the curve family of each slot, keeping amounts and compensation.
    pub fn set_types(&self, kind1: CurveKind, kind2: CurveKind) {
        self.state.rcu(|current| {
            let mut next = **current;
            next.slot1 = ShaperCurve::new(kind1, current.slot1.amount(), current.slot1.compensation());
            next.slot2 = ShaperCurve::new(kind2, current.slot2.amount(), current.slot2.compensation());
            next
        });
        self.changed.store(true, Ordering::Release);
    }

    /// Copy of the current configuration.
    #[inline]
    pub fn snapshot(&self) -> MixerState {
        **self.state.load()
    }

    /// Shared pointer to the current configuration.
    pub fn load_full(&self) -> Arc<MixerState> {
        self.state.load_full()
    }

    /// Evaluate the current blend at one magnitude.
    pub fn shape(&self, x: f32) -> f32 {
        self.state.load().shape(x)
    }

    /// True once after every change. Consumes the flag.
    pub fn has_new_function(&self) -> bool {
        self.changed.swap(false, Ordering::AcqRel)
    }

    /// `points` evenly spaced `(x, f(x))` pairs of the blend over `[0, 1]`.
    ///
    /// Evaluated against a single snapshot, so a concurrent update never
    /// produces a curve that is half old and half new.
    pub fn sample_curve(&self, points: usize) -> Vec<(f32, f32)> {
        let state = self.snapshot();
        match points {
            0 => Vec::new(),
            1 => vec![(0.0, state.shape(0.0))],
            _ => {
                let last = (points - 1) as f32;
                (0..points)
                    .map(|i| {
                        let x = i as f32 / last;
                        (x, state.shape(x))
                    })
                    .collect()
            }
        }
    }
}

impl Default for ShaperMixer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_product_defaults() {
        let state = ShaperMixer::new().snapshot();
        assert_eq!(state.slot1.kind(), CurveKind::Quadratic);
        assert_eq!(state.slot2.kind(), CurveKind::Cubic);
        assert_eq!(state.slot1.amount(), DEFAULT_CURVE);
        assert_eq!(state.weight, DEFAULT_WEIGHT);
        assert!(!state.compensation());
    }

    #[test]
    fn weight_zero_is_slot_one() {
        let mixer = ShaperMixer::new();
        mixer.set_types(CurveKind::Sigmoid, CurveKind::Quartic);
        mixer.set_shapes(0.3, 0.9, 0.0, false);
        let state = mixer.snapshot();
        for i in 0..=20 {
            let x = i as f32 / 20.0;
            assert_eq!(state.shape(x), state.slot1.shape(x));
        }
    }

    #[test]
    fn weight_one_is_slot_two() {
        let mixer = ShaperMixer::new();
        mixer.set_shapes(0.3, 0.9, 1.0, true);
        let state = mixer.snapshot();
        for i in 0..=20 {
            let x = i as f32 / 20.0;
            assert_eq!(state.shape(x), state.slot2.shape(x));
        }
    }

    #[test]
    fn types_keep_amounts() {
        let mixer = ShaperMixer::new();
        mixer.set_shapes(0.2, 0.7, 0.4, true);
        mixer.set_types(CurveKind::Sine, CurveKind::Sigmoid);
        let state = mixer.snapshot();
        assert_eq!(state.slot1.kind(), CurveKind::Sine);
        assert_eq!(state.slot1.amount(), 0.2);
        assert_eq!(state.slot2.amount(), 0.7);
        assert!(state.slot2.compensation());
        assert_eq!(state.weight, 0.4);
    }

    #[test]
    fn shapes_are_clamped() {
        let mixer = ShaperMixer::new();
        mixer.set_shapes(-1.0, 3.0, 1.5, false);
        let state = mixer.snapshot();
        assert_eq!(state.slot1.amount(), 0.0);
        assert_eq!(state.slot2.amount(), 1.0);
        assert_eq!(state.weight, 1.0);
    }

    #[test]
    fn change_flag_is_consumed_once() {
        let mixer = ShaperMixer::new();
        assert!(mixer.has_new_function());
        assert!(!mixer.has_new_function());
        mixer.set_types(CurveKind::Identity, CurveKind::Identity);
        assert!(mixer.has_new_function());
        assert!(!mixer.has_new_function());
    }

    #[test]
    fn sampled_curve_spans_unit_interval() {
        let mixer = ShaperMixer::new();
        let points = mixer.sample_curve(101);
        assert_eq!(points.len(), 101);
        assert_eq!(points[0].0, 0.0);
        assert_eq!(points[100].0, 1.0);
        assert!(points[0].1.abs() < 1e-6);
        assert!((points[100].1 - 1.0).abs() < 1e-5);
        assert!(mixer.sample_curve(0).is_empty());
    }
}
