//! Benchmarks for BrainVision sample decoding.
//!
//! Run with: cargo bench

use brainvision_core::decoder::decode_buffer;
use brainvision_core::parser::tokenize;
use brainvision_core::BinaryFormat;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

const N_CHANNELS: usize = 64;
const N_SAMPLES: usize = 50_000;

fn decode_buffer_benchmark(c: &mut Criterion) {
    let resolutions: Vec<f64> = (0..N_CHANNELS).map(|ch| 0.1 + ch as f64 * 0.01).collect();

    let int16: Vec<u8> = (0..N_SAMPLES * N_CHANNELS)
        .flat_map(|i| ((i % 4096) as i16 - 2048).to_le_bytes())
        .collect();
    let float32: Vec<u8> = (0..N_SAMPLES * N_CHANNELS)
        .flat_map(|i| ((i % 4096) as f32 * 0.25).to_le_bytes())
        .collect();

    let mut group = c.benchmark_group("decode_buffer");
    group.throughput(Throughput::Elements((N_SAMPLES * N_CHANNELS) as u64));

    group.bench_function("int16_64ch", |b| {
        b.iter(|| {
            let samples = decode_buffer(
                black_box(&int16),
                BinaryFormat::Int16,
                N_CHANNELS,
                &resolutions,
            );
            black_box(samples.len())
        })
    });

    group.bench_function("float32_64ch", |b| {
        b.iter(|| {
            let samples = decode_buffer(
                black_box(&float32),
                BinaryFormat::IeeeFloat32,
                N_CHANNELS,
                &resolutions,
            );
            black_box(samples.len())
        })
    });

    group.finish();
}

fn tokenize_benchmark(c: &mut Criterion) {
    let lines: Vec<String> = (0..10_000)
        .map(|i| format!("Stimulus,S{:3}\\1x,{},1,0,20240101120000000000", i % 255, i * 10))
        .collect();

    c.bench_function("tokenize_marker_lines", |b| {
        b.iter(|| {
            let mut fields = 0;
            for line in &lines {
                fields += tokenize(black_box(line), ',').len();
            }
            black_box(fields)
        })
    });
}

criterion_group!(benches, decode_buffer_benchmark, tokenize_benchmark);
criterion_main!(benches);
