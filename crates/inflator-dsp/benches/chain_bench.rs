//! Criterion benchmarks for the full inflator chain
//!
//! Run with: cargo bench -p inflator-dsp
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use inflator_core::{ChannelBuffer, OversampleRatio, ProcessSpec};
use inflator_dsp::{InflatorProcessor, ParamChange};

const SAMPLE_RATE: f32 = 48000.0;
const BLOCK_SIZE: usize = 512;

fn generate_test_signal(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE;
            (2.0 * std::f32::consts::PI * 440.0 * t).sin() * 0.7
        })
        .collect()
}

fn bench_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("InflatorProcessor");
    let input = generate_test_signal(BLOCK_SIZE);

    for split in [false, true] {
        for ratio in OversampleRatio::ALL {
            let name = if split { "split" } else { "full_band" };
            group.bench_with_input(BenchmarkId::new(name, ratio.label()), &ratio, |b, &ratio| {
                let mut processor = InflatorProcessor::new();
                processor
                    .prepare(ProcessSpec::new(SAMPLE_RATE, BLOCK_SIZE, 2))
                    .unwrap();
                let handle = processor.handle();
                handle.apply(ParamChange::OverSample(ratio));
                handle.apply(ParamChange::BandSplit(split));
                let mut buffer = ChannelBuffer::new(2, BLOCK_SIZE);
                b.iter(|| {
                    let mut block = buffer.block(BLOCK_SIZE);
                    block.channel_mut(0).copy_from_slice(&input);
                    block.channel_mut(1).copy_from_slice(&input);
                    processor.process(&mut block);
                    black_box(block.channel(0)[0]);
                });
            });
        }
    }

    group.finish();
}

fn bench_meter(c: &mut Criterion) {
    let input = generate_test_signal(BLOCK_SIZE);
    let meter = inflator_dsp::MeterSource::new();
    meter.prepare(2);
    let mut buffer = ChannelBuffer::new(2, BLOCK_SIZE);
    buffer.channel_mut(0).copy_from_slice(&input);
    buffer.channel_mut(1).copy_from_slice(&input);

    c.bench_function("MeterSource/process", |b| {
        b.iter(|| meter.process(black_box(&buffer.block(BLOCK_SIZE))));
    });
}

criterion_group!(benches, bench_chain, bench_meter);
criterion_main!(benches);
