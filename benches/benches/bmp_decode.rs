//! Benchmark suite for BMP file decoding
//!
//! Measures the RLE8 and RLE4 command loops and the uncompressed 24-bit
//! row reader over synthetic files of increasing size.
//!
//! Run with: cargo bench --manifest-path benches/Cargo.toml

use bmpio_benches::{generate_rgb_bmp, generate_rle4_bmp, generate_rle8_bmp, sizes};
use bmpio_types::file::bmp::BmpDecoder;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::{hint::black_box, io::Cursor};

fn decode_len(data: &[u8]) -> usize {
	let mut decoder = BmpDecoder::from_reader(Cursor::new(data.to_vec())).unwrap();
	decoder.pixels().unwrap().len()
}

/// Benchmark RLE decompression across image sizes
fn bench_rle_decode(c: &mut Criterion) {
	let mut group = c.benchmark_group("bmp_rle_decode");

	for &(width, height) in &[sizes::TINY, sizes::SMALL, sizes::MEDIUM] {
		let rle8 = generate_rle8_bmp(width, height);
		group.throughput(Throughput::Bytes(rle8.len() as u64));
		group.bench_with_input(
			BenchmarkId::new("rle8", format!("{width}x{height}")),
			&rle8,
			|b, data| b.iter(|| black_box(decode_len(data))),
		);

		let rle4 = generate_rle4_bmp(width, height);
		group.throughput(Throughput::Bytes(rle4.len() as u64));
		group.bench_with_input(
			BenchmarkId::new("rle4", format!("{width}x{height}")),
			&rle4,
			|b, data| b.iter(|| black_box(decode_len(data))),
		);
	}

	group.finish();
}

/// Benchmark the uncompressed 24-bit reader
fn bench_rgb_decode(c: &mut Criterion) {
	let mut group = c.benchmark_group("bmp_rgb_decode");

	for &(width, height) in &[sizes::SMALL, sizes::MEDIUM, sizes::LARGE] {
		let data = generate_rgb_bmp(width, height);
		group.throughput(Throughput::Bytes(data.len() as u64));
		group.bench_with_input(
			BenchmarkId::new("rgb24", format!("{width}x{height}")),
			&data,
			|b, data| b.iter(|| black_box(decode_len(data))),
		);
	}

	group.finish();
}

criterion_group!(benches, bench_rle_decode, bench_rgb_decode);
criterion_main!(benches);
