//! RLE8 and RLE4 decompression for BMP pixel data.
//!
//! ## Command stream
//!
//! The compressed body is a sequence of two-byte commands `(c1, c2)`,
//! optionally followed by inline payload:
//!
//! | c1   | c2    | Meaning                                              |
//! |------|-------|------------------------------------------------------|
//! | > 0  | value | Encoded run: repeat `value` for `c1` output pixels   |
//! | 0    | 0     | End of line: cursor moves to the next row up         |
//! | 0    | 1     | End of bitmap                                        |
//! | 0    | 2     | Delta: two more bytes `(dx, dy)` move the cursor     |
//! | 0    | k ≥ 3 | Absolute run: `k` literal indices follow             |
//!
//! For RLE8 an encoded `value` is a palette index and an absolute run is
//! `k` index bytes. For RLE4 an encoded `value` packs two nibbles painted
//! alternately, and an absolute run is `k` nibbles held in `⌈k/2⌉` bytes.
//! In both variants an absolute run with an odd `k` is followed by one
//! padding byte.
//!
//! RLE paints rows bottom-to-top into the top-to-bottom output buffer.
//! The buffer is zero-filled before decoding starts (palette index 0,
//! the conventional black background), since a stream need not cover
//! every pixel.

use std::io::{self, Read};

use crate::file::BmpError;
use crate::file::bmp::colormap::Colormap;
use crate::file::bmp::escapes;
use crate::file::bmp::header::InfoHeader;

/// The two run-length variants defined by BMP 3.0
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RleKind {
	/// One palette index per pixel
	Rle8,
	/// One nibble per pixel
	Rle4,
}

/// Decodes a complete RLE4 or RLE8 pixel stream.
///
/// The reader must be positioned at the start of the pixel data. Returns
/// the reconstructed top-to-bottom pixel buffer, palette-expanded to one
/// band (grayscale) or three (RGB).
pub(crate) fn read_rle_data<R: Read>(
	reader: &mut R,
	info: &InfoHeader,
	map: &Colormap,
	grayscale: bool,
	kind: RleKind,
) -> Result<Vec<u8>, BmpError> {
	RleCanvas::new(reader, info, map, grayscale).decode(kind)
}

/// Decoding state: the output buffer plus a paint cursor.
///
/// `x` is the column within the current row, `y` the number of rows
/// painted so far counted from the bottom of the image. The write offset
/// is derived from both on every paint, which keeps cursor movement and
/// buffer access in range by construction.
struct RleCanvas<'a, R> {
	reader: &'a mut R,
	map: &'a Colormap,
	width: usize,
	height: usize,
	ncomp: usize,
	line_size: usize,
	pixels: Vec<u8>,
	x: usize,
	y: usize,
}

impl<'a, R: Read> RleCanvas<'a, R> {
	fn new(reader: &'a mut R, info: &InfoHeader, map: &'a Colormap, grayscale: bool) -> Self {
		let ncomp = if grayscale {
			1
		} else {
			3
		};
		let width = info.width as usize;
		let height = info.height as usize;
		let line_size = width * ncomp;

		Self {
			reader,
			map,
			width,
			height,
			ncomp,
			line_size,
			// black background, streams need not cover every pixel
			pixels: vec![0; height * line_size],
			x: 0,
			y: 0,
		}
	}

	fn decode(mut self, kind: RleKind) -> Result<Vec<u8>, BmpError> {
		loop {
			let c1 = self.next_byte()?;
			let c2 = self.next_byte()?;

			if c1 > 0 {
				match kind {
					RleKind::Rle8 => self.encoded_rle8(c1, c2)?,
					RleKind::Rle4 => self.encoded_rle4(c1, c2)?,
				}
				continue;
			}

			match c2 {
				escapes::END_OF_LINE => self.end_of_line(),
				escapes::END_OF_BITMAP => break,
				escapes::DELTA => self.delta()?,
				count => match kind {
					RleKind::Rle8 => self.absolute_rle8(count)?,
					RleKind::Rle4 => self.absolute_rle4(count)?,
				},
			}
		}

		Ok(self.pixels)
	}

	/// Reads one payload byte, treating end-of-stream as a truncated
	/// RLE stream rather than a bare IO error.
	fn next_byte(&mut self) -> Result<u8, BmpError> {
		let mut buffer = [0u8; 1];
		self.reader.read_exact(&mut buffer).map_err(|e| {
			if e.kind() == io::ErrorKind::UnexpectedEof {
				BmpError::TruncatedStream {
					message: "RLE stream ends before the end-of-bitmap marker".to_string(),
				}
			} else {
				BmpError::IOError(e)
			}
		})?;
		Ok(buffer[0])
	}

	/// Palette-expands `index` into the cell under the cursor and moves
	/// the cursor one pixel right.
	fn put_pixel(&mut self, index: u8) -> Result<(), BmpError> {
		if self.y >= self.height || self.x >= self.width {
			return Err(BmpError::TruncatedStream {
				message: format!(
					"RLE run paints outside the image at column {}, row {} from the bottom",
					self.x, self.y
				),
			});
		}

		let row = self.height - 1 - self.y;
		let at = row * self.line_size + self.x * self.ncomp;
		let color = self.map.get(index);

		if self.ncomp == 1 {
			self.pixels[at] = color.r;
		} else {
			self.pixels[at] = color.r;
			self.pixels[at + 1] = color.g;
			self.pixels[at + 2] = color.b;
		}

		self.x += 1;
		Ok(())
	}

	/// Encoded mode: repeat the palette index `value` for `count` pixels.
	/// A run may not cross the row boundary.
	fn encoded_rle8(&mut self, count: u8, value: u8) -> Result<(), BmpError> {
		for _ in 0..count {
			self.put_pixel(value)?;
		}
		Ok(())
	}

	/// Encoded mode: paint the two nibbles of `packed` alternately,
	/// high nibble first, for exactly `count` pixels.
	fn encoded_rle4(&mut self, count: u8, packed: u8) -> Result<(), BmpError> {
		let high = (packed & 0xF0) >> 4;
		let low = packed & 0x0F;

		for i in 0..count {
			self.put_pixel(if i % 2 == 0 {
				high
			} else {
				low
			})?;
		}
		Ok(())
	}

	/// Absolute mode: `count` literal index bytes, followed by one
	/// alignment byte when `count` is odd.
	fn absolute_rle8(&mut self, count: u8) -> Result<(), BmpError> {
		for _ in 0..count {
			let index = self.next_byte()?;
			self.put_pixel(index)?;
		}

		if count % 2 == 1 {
			self.next_byte()?;
		}
		Ok(())
	}

	/// Absolute mode: `count` literal nibbles held in `⌈count/2⌉` bytes,
	/// high nibble first, followed by one alignment byte when `count`
	/// is odd.
	fn absolute_rle4(&mut self, count: u8) -> Result<(), BmpError> {
		let count = count as usize;
		let payload_bytes = count.div_ceil(2);
		let mut emitted = 0;

		for _ in 0..payload_bytes {
			let byte = self.next_byte()?;
			self.put_pixel((byte & 0xF0) >> 4)?;
			emitted += 1;
			if emitted == count {
				break;
			}

			self.put_pixel(byte & 0x0F)?;
			emitted += 1;
		}

		if count % 2 == 1 {
			self.next_byte()?;
		}
		Ok(())
	}

	/// End of line: move the cursor to the start of the next row up.
	fn end_of_line(&mut self) {
		self.x = 0;
		self.y += 1;
	}

	/// Delta movement: advance the cursor by `(dx, dy)` without painting.
	/// Horizontal overflow folds into additional vertical movement.
	fn delta(&mut self) -> Result<(), BmpError> {
		// a cursor parked at the right edge wraps to the next row first
		if self.x == self.width {
			self.x = 0;
			self.y += 1;
		}

		let dx = self.next_byte()? as usize;
		let mut dy = self.next_byte()? as usize;

		let mut nx = self.x + dx;
		if nx > self.width {
			dy += nx / self.width + 1;
			nx %= self.width;
		}

		self.x = nx;
		self.y += dy;
		Ok(())
	}
}
