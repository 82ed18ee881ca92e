//! Benchmarks for the per-block Huffman codec.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use oxifs_huffman::HuffmanTree;
use std::hint::black_box;

/// Type alias for pattern generator functions
type PatternGenerator = fn(usize) -> Vec<u8>;

mod test_data {
    /// Random data - close to incompressible
    pub fn random(size: usize) -> Vec<u8> {
        let mut data = Vec::with_capacity(size);
        let mut seed: u64 = 0x123456789ABCDEF0;
        for _ in 0..size {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
            data.push((seed >> 32) as u8);
        }
        data
    }

    /// Text-like data
    pub fn text_like(size: usize) -> Vec<u8> {
        let text = b"The quick brown fox jumps over the lazy dog. ";
        text.iter().copied().cycle().take(size).collect()
    }

    /// Skewed data - one dominant byte
    pub fn skewed(size: usize) -> Vec<u8> {
        (0..size)
            .map(|i| if i % 10 == 0 { (i % 7) as u8 } else { b'e' })
            .collect()
    }
}

const BLOCK: usize = 1024;

fn patterns() -> [(&'static str, PatternGenerator); 3] {
    [
        ("random", test_data::random as PatternGenerator),
        ("text", test_data::text_like as PatternGenerator),
        ("skewed", test_data::skewed as PatternGenerator),
    ]
}

fn bench_build_tree(c: &mut Criterion) {
    let mut group = c.benchmark_group("huffman_build");

    for (name, generator) in patterns() {
        let data = generator(BLOCK);
        group.throughput(Throughput::Bytes(BLOCK as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &data, |b, data| {
            b.iter(|| black_box(HuffmanTree::build(black_box(data))));
        });
    }

    group.finish();
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("huffman_encode");

    for (name, generator) in patterns() {
        let data = generator(BLOCK);
        let tree = HuffmanTree::build(&data);
        group.throughput(Throughput::Bytes(BLOCK as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &data, |b, data| {
            b.iter(|| black_box(tree.encode(black_box(data)).expect("encode")));
        });
    }

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("huffman_decode");

    for (name, generator) in patterns() {
        let data = generator(BLOCK);
        let tree = HuffmanTree::build(&data);
        let packed = tree.encode(&data).expect("encode");
        group.throughput(Throughput::Bytes(BLOCK as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &packed, |b, packed| {
            b.iter(|| black_box(tree.decode(black_box(packed), BLOCK).expect("decode")));
        });
    }

    group.finish();
}

fn bench_tree_serialization(c: &mut Criterion) {
    let tree = HuffmanTree::build(&test_data::random(BLOCK));
    let bytes = tree.to_bytes();

    c.bench_function("huffman_tree_to_bytes", |b| {
        b.iter(|| black_box(black_box(&tree).to_bytes()))
    });
    c.bench_function("huffman_tree_from_bytes", |b| {
        b.iter(|| black_box(HuffmanTree::from_bytes(black_box(&bytes)).expect("tree")))
    });
}

criterion_group!(
    benches,
    bench_build_tree,
    bench_encode,
    bench_decode,
    bench_tree_serialization
);
criterion_main!(benches);
