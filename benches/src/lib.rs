//! Benchmark helper utilities for bmpio-rs
//!
//! This module generates synthetic BMP files of configurable size so the
//! decoder benchmarks run without fixtures on disk. The RLE generators
//! mix encoded runs, absolute runs and end-of-line markers to exercise
//! the whole command loop, not just the fast path.

/// Generates an RLE8-compressed BMP file with the specified dimensions.
pub fn generate_rle8_bmp(width: usize, height: usize) -> Vec<u8> {
	let mut body = Vec::new();

	for row in 0..height {
		let mut x = 0;

		while x < width {
			let remaining = width - x;

			if x % 3 == 0 && remaining >= 4 {
				// absolute run of four literal indices
				body.push(0);
				body.push(4);
				for i in 0..4u8 {
					body.push((row as u8).wrapping_add(i));
				}
				x += 4;
			} else {
				// encoded run
				let run = remaining.min(100);
				body.push(run as u8);
				body.push((row + x) as u8);
				x += run;
			}
		}

		// end of line
		body.push(0);
		body.push(0);
	}

	// end of bitmap
	body.push(0);
	body.push(1);

	build_indexed_file(8, 1, width, height, &body)
}

/// Generates an RLE4-compressed BMP file with the specified dimensions.
pub fn generate_rle4_bmp(width: usize, height: usize) -> Vec<u8> {
	let mut body = Vec::new();

	for row in 0..height {
		let mut x = 0;

		while x < width {
			let run = (width - x).min(80);
			body.push(run as u8);
			body.push((row % 256) as u8); // two packed nibbles
			x += run;
		}

		body.push(0);
		body.push(0);
	}

	body.push(0);
	body.push(1);

	build_indexed_file(4, 2, width, height, &body)
}

/// Generates an uncompressed 24-bit BMP file with the specified
/// dimensions and a deterministic gradient body.
pub fn generate_rgb_bmp(width: usize, height: usize) -> Vec<u8> {
	let padded_row = (3 * width).next_multiple_of(4);
	let mut body = Vec::with_capacity(padded_row * height);

	for row in 0..height {
		for x in 0..width {
			body.push((x % 256) as u8);
			body.push((row % 256) as u8);
			body.push(((x + row) % 256) as u8);
		}
		body.resize(body.len() + padded_row - 3 * width, 0);
	}

	build_file(24, 0, width, height, 0, &body)
}

fn build_indexed_file(
	bit_count: u16,
	compression: u32,
	width: usize,
	height: usize,
	body: &[u8],
) -> Vec<u8> {
	build_file(bit_count, compression, width, height, 1usize << bit_count, body)
}

fn build_file(
	bit_count: u16,
	compression: u32,
	width: usize,
	height: usize,
	palette_entries: usize,
	body: &[u8],
) -> Vec<u8> {
	let offset = 14 + 40 + palette_entries * 4;
	let mut data = Vec::with_capacity(offset + body.len());

	// file header
	data.extend_from_slice(b"BM");
	data.extend_from_slice(&((offset + body.len()) as u32).to_le_bytes());
	data.extend_from_slice(&[0u8; 4]);
	data.extend_from_slice(&(offset as u32).to_le_bytes());

	// info header
	data.extend_from_slice(&40u32.to_le_bytes());
	data.extend_from_slice(&(width as i32).to_le_bytes());
	data.extend_from_slice(&(height as i32).to_le_bytes());
	data.extend_from_slice(&1u16.to_le_bytes());
	data.extend_from_slice(&bit_count.to_le_bytes());
	data.extend_from_slice(&compression.to_le_bytes());
	data.extend_from_slice(&(body.len() as u32).to_le_bytes());
	data.extend_from_slice(&0i32.to_le_bytes());
	data.extend_from_slice(&0i32.to_le_bytes());
	data.extend_from_slice(&(palette_entries as u32).to_le_bytes());
	data.extend_from_slice(&0u32.to_le_bytes());

	// colormap with a couple of colored entries so the decoder takes
	// the three-band path
	for i in 0..palette_entries {
		let v = (i % 256) as u8;
		data.extend_from_slice(&[v, v.wrapping_mul(2), v, 0]);
	}

	data.extend_from_slice(body);
	data
}

/// Common benchmark sizes for synthetic test data
pub mod sizes {
	/// Tiny image: 64x64 (4,096 pixels)
	pub const TINY: (usize, usize) = (64, 64);
	/// Small image: 256x256 (65,536 pixels)
	pub const SMALL: (usize, usize) = (256, 256);
	/// Medium image: 512x512 (262,144 pixels)
	pub const MEDIUM: (usize, usize) = (512, 512);
	/// Large image: 1024x768 (786,432 pixels)
	pub const LARGE: (usize, usize) = (1024, 768);
}

#[cfg(test)]
mod tests {
	use super::*;
	use bmpio_types::file::bmp::BmpDecoder;
	use std::io::Cursor;

	#[test]
	fn test_generated_files_decode() {
		for (width, height) in [(16, 16), (33, 7)] {
			for data in [
				generate_rle8_bmp(width, height),
				generate_rle4_bmp(width, height),
				generate_rgb_bmp(width, height),
			] {
				let mut decoder = BmpDecoder::from_reader(Cursor::new(data)).unwrap();
				assert_eq!(decoder.width() as usize, width);
				assert_eq!(decoder.height() as usize, height);
				let ncomp = decoder.num_bands();
				assert_eq!(decoder.pixels().unwrap().len(), width * height * ncomp);
			}
		}
	}
}
