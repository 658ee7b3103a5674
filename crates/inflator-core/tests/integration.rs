//! Integration tests for inflator-core.
//!
//! Signal-level checks of the oversampling bank: silence in, silence out at
//! every ratio, reported latency against the measured delay, passband level,
//! and a waveshaper running between the up and down paths.

use inflator_core::{
    AudioBlock, ChannelBuffer, CurveKind, OversampleRatio, OversamplingEngine, ShaperCurve, rms,
};

const SAMPLE_RATE: f32 = 48000.0;
const TAU: f32 = core::f32::consts::TAU;

fn generate_sine(freq_hz: f32, num_samples: usize) -> Vec<f32> {
    (0..num_samples)
        .map(|n| 0.5 * libm::sinf(TAU * freq_hz * n as f32 / SAMPLE_RATE))
        .collect()
}

/// Run `signal` through the engine in `block`-sized chunks, optionally shaping
/// at the oversampled rate.
fn run(engine: &mut OversamplingEngine, signal: &[f32], block: usize, curve: Option<ShaperCurve>) -> Vec<f32> {
    let mut out = Vec::with_capacity(signal.len());
    let mut buffer = ChannelBuffer::new(1, block);
    for chunk in signal.chunks(block) {
        let mut view = buffer.block(chunk.len());
        view.channel_mut(0).copy_from_slice(chunk);
        let mut wide = engine.process_up(&view);
        if let Some(curve) = curve {
            wide.map_in_place(|x| x.signum() * curve.shape(x.abs().min(1.0)));
        }
        engine.process_down(&mut view);
        out.extend_from_slice(view.channel(0));
    }
    out
}

#[test]
fn silence_at_every_ratio() {
    for ratio in OversampleRatio::ALL {
        let mut engine = OversamplingEngine::new();
        engine.prepare(512, 2, SAMPLE_RATE);
        engine.set_active_ratio(ratio);

        let mut data = vec![0.0f32; 1024];
        for _ in 0..3 {
            let mut block = AudioBlock::new(&mut data, 2, 512);
            let _ = engine.process_up(&block);
            engine.process_down(&mut block);
        }
        assert!(data.iter().all(|&s| s == 0.0), "{ratio:?} injected signal into silence");
    }
}

#[test]
fn latency_is_fixed_per_ratio() {
    let mut engine = OversamplingEngine::new();
    engine.prepare(64, 1, SAMPLE_RATE);
    for (ratio, expected) in OversampleRatio::ALL.into_iter().zip([0, 31, 39, 42, 44]) {
        engine.set_active_ratio(ratio);
        assert_eq!(engine.latency_samples(), expected);
        assert_eq!(engine.oversampled_rate(), SAMPLE_RATE * ratio.factor() as f32);
    }
}

#[test]
fn two_x_round_trip_is_a_pure_delay_in_the_passband() {
    let mut engine = OversamplingEngine::new();
    engine.prepare(256, 1, SAMPLE_RATE);
    engine.set_active_ratio(OversampleRatio::X2);
    let latency = engine.latency_samples();

    let input = generate_sine(1000.0, 4096);
    let output = run(&mut engine, &input, 256, None);
    let worst = (latency..input.len())
        .map(|n| (output[n] - input[n - latency]).abs())
        .fold(0.0f32, f32::max);
    assert!(worst < 1e-3, "2x round trip deviates from delayed input by {worst}");
}

#[test]
fn passband_level_is_preserved() {
    let input = generate_sine(3000.0, 8192);
    let reference = rms(&input[4096..]);
    for ratio in OversampleRatio::ALL {
        let mut engine = OversamplingEngine::new();
        engine.prepare(333, 1, SAMPLE_RATE);
        engine.set_active_ratio(ratio);
        let output = run(&mut engine, &input, 333, None);
        let level = rms(&output[4096..]);
        let db = 20.0 * libm::log10f(level / reference);
        assert!(db.abs() < 0.05, "{ratio:?}: passband level changed by {db} dB");
    }
}

#[test]
fn uneven_host_blocks_match_one_big_block() {
    let input = generate_sine(440.0, 1200);
    let mut whole = OversamplingEngine::new();
    whole.prepare(1200, 1, SAMPLE_RATE);
    whole.set_active_ratio(OversampleRatio::X8);
    let expected = run(&mut whole, &input, 1200, None);

    let mut chunked = OversamplingEngine::new();
    chunked.prepare(1200, 1, SAMPLE_RATE);
    chunked.set_active_ratio(OversampleRatio::X8);
    let mut actual = Vec::new();
    let mut start = 0;
    for len in [7, 64, 129, 500, 500] {
        let end = (start + len).min(input.len());
        actual.extend(run(&mut chunked, &input[start..end], len, None));
        start = end;
    }

    assert_eq!(actual.len(), expected.len());
    for (a, b) in actual.iter().zip(&expected) {
        assert!((a - b).abs() < 1e-6);
    }
}

#[test]
fn shaped_signal_stays_bounded() {
    let curve = ShaperCurve::new(CurveKind::Sigmoid, 1.0, false);
    let input: Vec<f32> = generate_sine(5000.0, 4096).iter().map(|s| s * 2.0).collect();
    for ratio in [OversampleRatio::X1, OversampleRatio::X4, OversampleRatio::X16] {
        let mut engine = OversamplingEngine::new();
        engine.prepare(256, 1, SAMPLE_RATE);
        engine.set_active_ratio(ratio);
        let output = run(&mut engine, &input, 256, Some(curve));
        let peak = output.iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(peak <= 1.2, "{ratio:?}: shaped peak {peak}");
        assert!(peak > 0.8, "{ratio:?}: shaped signal vanished ({peak})");
    }
}
