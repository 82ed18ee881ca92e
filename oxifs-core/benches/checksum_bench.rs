//! Benchmarks for the block checksum.
//!
//! The checksum works bit by bit, so the interesting range is block-sized
//! input: from a few bytes up to a full 1 KiB block and slightly beyond.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use oxifs_core::checksum::BlockChecksum;
use std::hint::black_box;

/// Type alias for pattern generator functions
type PatternGenerator = fn(usize) -> Vec<u8>;

/// Generate test data patterns for benchmarking
mod test_data {
    /// Uniform data - all bytes are the same
    pub fn uniform(size: usize) -> Vec<u8> {
        vec![0xAA; size]
    }

    /// Random data - varied byte values
    pub fn random(size: usize) -> Vec<u8> {
        let mut data = Vec::with_capacity(size);
        let mut seed: u64 = 0x123456789ABCDEF0;
        for _ in 0..size {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
            data.push((seed >> 32) as u8);
        }
        data
    }

    /// Zero data - the division never XORs
    pub fn zeros(size: usize) -> Vec<u8> {
        vec![0; size]
    }

    /// Text-like data
    pub fn text_like(size: usize) -> Vec<u8> {
        let text = b"The quick brown fox jumps over the lazy dog. ";
        text.iter().copied().cycle().take(size).collect()
    }
}

fn bench_checksum_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("checksum_sizes");

    let sizes = [("16B", 16), ("256B", 256), ("1KB", 1024), ("4KB", 4096)];

    for (size_name, size) in sizes {
        let data = test_data::text_like(size);

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size_name), &data, |b, data| {
            b.iter(|| {
                let checksum = BlockChecksum::compute(black_box(data));
                black_box(checksum);
            });
        });
    }

    group.finish();
}

fn bench_checksum_patterns(c: &mut Criterion) {
    let mut group = c.benchmark_group("checksum_patterns");

    let patterns: [(&str, PatternGenerator); 4] = [
        ("uniform", test_data::uniform as PatternGenerator),
        ("random", test_data::random as PatternGenerator),
        ("zeros", test_data::zeros as PatternGenerator),
        ("text", test_data::text_like as PatternGenerator),
    ];

    let size = 1024;

    for (pattern_name, generator) in patterns {
        let data = generator(size);

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(pattern_name),
            &data,
            |b, data| {
                b.iter(|| {
                    let checksum = BlockChecksum::compute(black_box(data));
                    black_box(checksum);
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_checksum_sizes, bench_checksum_patterns);
criterion_main!(benches);
