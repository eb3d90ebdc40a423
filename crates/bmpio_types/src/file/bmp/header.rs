//! File header and info header records for BMP 3.0 files.
//!
//! Both records are fixed-layout little-endian structures. The file header
//! occupies the first 14 bytes of the file, the info header
//! (`BITMAPINFOHEADER`) the next 40. Info headers may declare a larger
//! `info_size`; the surplus is padding and is skipped on read.

use std::fmt::Display;
use std::io::{self, Read, Write};

use serde::Serialize;

use crate::file::BmpError;
use crate::file::bmp::constants::{FILE_HEADER_SIZE, INFO_HEADER_SIZE, MAGIC};

/// Compression schemes defined by the BMP 3.0 format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u32)]
pub enum Compression {
	/// Uncompressed pixel data
	None = 0,

	/// Run-length encoding for 8-bit images
	Rle8 = 1,

	/// Run-length encoding for 4-bit images
	Rle4 = 2,
}

impl Display for Compression {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Compression::None => write!(f, "none"),
			Compression::Rle8 => write!(f, "RLE8"),
			Compression::Rle4 => write!(f, "RLE4"),
		}
	}
}

/// The 14-byte file header at the start of every BMP file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FileHeader {
	/// Magic bytes, always `"BM"`
	pub magic: [u8; 2],

	/// Total file size in bytes
	pub size: u32,

	/// Offset from the start of the file to the pixel data
	pub offset: u32,
}

impl Default for FileHeader {
	fn default() -> Self {
		Self {
			magic: MAGIC,
			size: 0,
			offset: 0,
		}
	}
}

impl FileHeader {
	/// Size of the file header in bytes
	pub const SIZE: usize = FILE_HEADER_SIZE;

	/// Parses a file header from the given byte slice.
	///
	/// The four reserved bytes at offset 6 are ignored.
	pub fn from_bytes(data: &[u8]) -> Result<Self, BmpError> {
		if data.len() < Self::SIZE {
			return Err(BmpError::MalformedHeader {
				message: format!(
					"file header needs {} bytes, got {}",
					Self::SIZE,
					data.len()
				),
			});
		}

		let magic = [data[0], data[1]];
		if magic != MAGIC {
			return Err(BmpError::MalformedHeader {
				message: format!("magic value {magic:02X?} is incorrect"),
			});
		}

		let size = u32::from_le_bytes([data[2], data[3], data[4], data[5]]);
		let offset = u32::from_le_bytes([data[10], data[11], data[12], data[13]]);

		Ok(Self {
			magic,
			size,
			offset,
		})
	}

	/// Reads a file header from any reader.
	pub fn from_reader<R: Read>(reader: &mut R) -> Result<Self, BmpError> {
		let mut buffer = [0u8; Self::SIZE];
		read_exact_or_malformed(reader, &mut buffer)?;
		Self::from_bytes(&buffer)
	}

	/// Converts the header to its on-disk byte representation.
	///
	/// The reserved bytes are written as zero.
	pub fn to_bytes(&self) -> [u8; Self::SIZE] {
		let mut bytes = [0u8; Self::SIZE];

		bytes[0..2].copy_from_slice(&self.magic);
		bytes[2..6].copy_from_slice(&self.size.to_le_bytes());
		bytes[10..14].copy_from_slice(&self.offset.to_le_bytes());

		bytes
	}

	/// Writes the header to the given writer.
	pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), BmpError> {
		writer.write_all(&self.to_bytes())?;
		Ok(())
	}
}

impl Display for FileHeader {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"BMP File Header:\n\
			- Magic: {:02X?}\n\
			- File Size: {} bytes\n\
			- Pixel Data Offset: {} bytes",
			self.magic, self.size, self.offset,
		)
	}
}

/// The 40-byte `BITMAPINFOHEADER` record following the file header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct InfoHeader {
	/// Declared size of this header in the file, at least 40
	pub info_size: u32,

	/// Image width in pixels, strictly positive
	pub width: i32,

	/// Image height in pixels, strictly positive
	/// (top-down storage via negative heights is not supported)
	pub height: i32,

	/// Number of planes, always 1
	pub planes: u16,

	/// Bits per pixel, one of 1, 4, 8 or 24
	pub bit_count: u16,

	/// Compression scheme of the pixel data
	pub compression: Compression,

	/// Size of the pixel data in bytes, may be 0 for 24-bit images
	pub image_size: u32,

	/// Horizontal resolution in pixels per meter, informational
	pub x_pixels_per_meter: i32,

	/// Vertical resolution in pixels per meter, informational
	pub y_pixels_per_meter: i32,

	/// Number of colormap entries actually used, 0 meaning all
	pub clr_used: u32,

	/// Number of colormap entries required to display the image
	pub clr_important: u32,
}

impl Default for InfoHeader {
	fn default() -> Self {
		Self {
			info_size: INFO_HEADER_SIZE as u32,
			width: 0,
			height: 0,
			planes: 1,
			bit_count: 24,
			compression: Compression::None,
			image_size: 0,
			x_pixels_per_meter: 0,
			y_pixels_per_meter: 0,
			clr_used: 0,
			clr_important: 0,
		}
	}
}

impl InfoHeader {
	/// Size of the info header as this codec writes it
	pub const SIZE: usize = INFO_HEADER_SIZE;

	/// Parses and validates an info header from the given byte slice.
	///
	/// Every field invariant of the format is checked here; the first
	/// violation is reported as [`BmpError::InvalidField`] naming the
	/// offending field.
	pub fn from_bytes(data: &[u8]) -> Result<Self, BmpError> {
		if data.len() < Self::SIZE {
			return Err(BmpError::MalformedHeader {
				message: format!(
					"info header needs {} bytes, got {}",
					Self::SIZE,
					data.len()
				),
			});
		}

		let info_size = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);
		if (info_size as usize) < Self::SIZE {
			return Err(BmpError::InvalidField {
				field: "info_size",
				message: format!("must be at least {}, got {}", Self::SIZE, info_size),
			});
		}

		let width = i32::from_le_bytes([data[4], data[5], data[6], data[7]]);
		if width <= 0 {
			return Err(BmpError::InvalidField {
				field: "width",
				message: format!("must be > 0, got {width}"),
			});
		}

		let height = i32::from_le_bytes([data[8], data[9], data[10], data[11]]);
		if height <= 0 {
			return Err(BmpError::InvalidField {
				field: "height",
				message: format!("must be > 0, got {height}"),
			});
		}

		let planes = u16::from_le_bytes([data[12], data[13]]);
		if planes != 1 {
			return Err(BmpError::InvalidField {
				field: "planes",
				message: format!("must be 1, got {planes}"),
			});
		}

		let bit_count = u16::from_le_bytes([data[14], data[15]]);
		if !matches!(bit_count, 1 | 4 | 8 | 24) {
			return Err(BmpError::InvalidField {
				field: "bit_count",
				message: format!("must be 1, 4, 8 or 24, got {bit_count}"),
			});
		}

		let raw_compression = u32::from_le_bytes([data[16], data[17], data[18], data[19]]);
		let compression = match raw_compression {
			0 => Compression::None,
			1 => {
				if bit_count != 8 {
					return Err(BmpError::InvalidField {
						field: "compression",
						message: format!("RLE8 requires bit_count 8, got {bit_count}"),
					});
				}
				Compression::Rle8
			}
			2 => {
				if bit_count != 4 {
					return Err(BmpError::InvalidField {
						field: "compression",
						message: format!("RLE4 requires bit_count 4, got {bit_count}"),
					});
				}
				Compression::Rle4
			}
			other => {
				return Err(BmpError::Unsupported {
					message: format!("compression type {other}"),
				});
			}
		};

		let image_size = u32::from_le_bytes([data[20], data[21], data[22], data[23]]);
		if image_size == 0 && bit_count != 24 {
			return Err(BmpError::InvalidField {
				field: "image_size",
				message: "may be 0 only for 24-bit images".to_string(),
			});
		}

		let x_pixels_per_meter = i32::from_le_bytes([data[24], data[25], data[26], data[27]]);
		let y_pixels_per_meter = i32::from_le_bytes([data[28], data[29], data[30], data[31]]);

		let max_colors = 1u32 << bit_count;
		let clr_used = u32::from_le_bytes([data[32], data[33], data[34], data[35]]);
		if clr_used > max_colors {
			return Err(BmpError::InvalidField {
				field: "clr_used",
				message: format!("must be at most {max_colors}, got {clr_used}"),
			});
		}

		let clr_important = u32::from_le_bytes([data[36], data[37], data[38], data[39]]);
		if clr_important > max_colors {
			return Err(BmpError::InvalidField {
				field: "clr_important",
				message: format!("must be at most {max_colors}, got {clr_important}"),
			});
		}

		Ok(Self {
			info_size,
			width,
			height,
			planes,
			bit_count,
			compression,
			image_size,
			x_pixels_per_meter,
			y_pixels_per_meter,
			clr_used,
			clr_important,
		})
	}

	/// Reads an info header from any reader.
	///
	/// When the declared `info_size` exceeds 40 bytes the surplus is
	/// consumed and discarded, leaving the reader positioned after the
	/// whole header.
	pub fn from_reader<R: Read>(reader: &mut R) -> Result<Self, BmpError> {
		let mut buffer = [0u8; Self::SIZE];
		read_exact_or_malformed(reader, &mut buffer)?;
		let header = Self::from_bytes(&buffer)?;

		// skip any padding
		let surplus = u64::from(header.info_size) - Self::SIZE as u64;
		if surplus > 0 {
			let skipped = io::copy(&mut reader.take(surplus), &mut io::sink())?;
			if skipped != surplus {
				return Err(BmpError::MalformedHeader {
					message: format!(
						"info header padding ends prematurely, expected {surplus} bytes, got {skipped}"
					),
				});
			}
		}

		Ok(header)
	}

	/// Converts the header to its on-disk byte representation.
	pub fn to_bytes(&self) -> [u8; Self::SIZE] {
		let mut bytes = [0u8; Self::SIZE];

		bytes[0..4].copy_from_slice(&self.info_size.to_le_bytes());
		bytes[4..8].copy_from_slice(&self.width.to_le_bytes());
		bytes[8..12].copy_from_slice(&self.height.to_le_bytes());
		bytes[12..14].copy_from_slice(&self.planes.to_le_bytes());
		bytes[14..16].copy_from_slice(&self.bit_count.to_le_bytes());
		bytes[16..20].copy_from_slice(&(self.compression as u32).to_le_bytes());
		bytes[20..24].copy_from_slice(&self.image_size.to_le_bytes());
		bytes[24..28].copy_from_slice(&self.x_pixels_per_meter.to_le_bytes());
		bytes[28..32].copy_from_slice(&self.y_pixels_per_meter.to_le_bytes());
		bytes[32..36].copy_from_slice(&self.clr_used.to_le_bytes());
		bytes[36..40].copy_from_slice(&self.clr_important.to_le_bytes());

		bytes
	}

	/// Writes the header to the given writer.
	pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), BmpError> {
		writer.write_all(&self.to_bytes())?;
		Ok(())
	}

	/// Number of bytes occupied by one packed pixel row, without padding.
	pub fn row_bytes(&self) -> usize {
		(self.width as usize * self.bit_count as usize).div_ceil(8)
	}

	/// Number of bytes occupied by one pixel row on disk, padded to a
	/// 32-bit boundary.
	pub fn padded_row_bytes(&self) -> usize {
		self.row_bytes().next_multiple_of(4)
	}

	/// Number of colormap entries an indexed image of this depth carries.
	pub fn palette_len(&self) -> usize {
		1 << self.bit_count
	}
}

impl Display for InfoHeader {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"BMP Info Header:\n\
			- Header Size: {} bytes\n\
			- Width: {} pixels\n\
			- Height: {} pixels\n\
			- Planes: {}\n\
			- Bit Count: {}\n\
			- Compression: {}\n\
			- Image Size: {} bytes\n\
			- Resolution: {}x{} pixels/meter\n\
			- Colors Used: {}\n\
			- Colors Important: {}",
			self.info_size,
			self.width,
			self.height,
			self.planes,
			self.bit_count,
			self.compression,
			self.image_size,
			self.x_pixels_per_meter,
			self.y_pixels_per_meter,
			self.clr_used,
			self.clr_important,
		)
	}
}

/// Reads exactly `buffer.len()` bytes, reporting a premature end of the
/// stream as a malformed header rather than a bare IO error.
fn read_exact_or_malformed<R: Read>(reader: &mut R, buffer: &mut [u8]) -> Result<(), BmpError> {
	reader.read_exact(buffer).map_err(|e| {
		if e.kind() == io::ErrorKind::UnexpectedEof {
			BmpError::MalformedHeader {
				message: "header ends prematurely".to_string(),
			}
		} else {
			BmpError::IOError(e)
		}
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Cursor;

	fn sample_info_header() -> InfoHeader {
		InfoHeader {
			info_size: 40,
			width: 17,
			height: 9,
			planes: 1,
			bit_count: 8,
			compression: Compression::None,
			image_size: 180,
			x_pixels_per_meter: 2835,
			y_pixels_per_meter: 2835,
			clr_used: 256,
			clr_important: 0,
		}
	}

	#[test]
	fn test_file_header_roundtrip() {
		let header = FileHeader {
			magic: MAGIC,
			size: 1082,
			offset: 1078,
		};

		let bytes = header.to_bytes();
		let parsed = FileHeader::from_bytes(&bytes).unwrap();
		assert_eq!(parsed, header);
	}

	#[test]
	fn test_file_header_rejects_bad_magic() {
		let mut bytes = FileHeader::default().to_bytes();
		bytes[0] = b'P';

		let result = FileHeader::from_bytes(&bytes);
		assert!(matches!(result, Err(BmpError::MalformedHeader { .. })));
	}

	#[test]
	fn test_file_header_reserved_bytes_ignored() {
		let mut bytes = FileHeader {
			magic: MAGIC,
			size: 100,
			offset: 54,
		}
		.to_bytes();
		bytes[6..10].copy_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]);

		let parsed = FileHeader::from_bytes(&bytes).unwrap();
		assert_eq!(parsed.size, 100);
		assert_eq!(parsed.offset, 54);
	}

	#[test]
	fn test_info_header_roundtrip() {
		let header = sample_info_header();
		let parsed = InfoHeader::from_bytes(&header.to_bytes()).unwrap();
		assert_eq!(parsed, header);
	}

	#[test]
	fn test_info_header_rejects_small_info_size() {
		let mut header = sample_info_header();
		header.info_size = 12;

		let result = InfoHeader::from_bytes(&header.to_bytes());
		assert!(matches!(
			result,
			Err(BmpError::InvalidField {
				field: "info_size",
				..
			})
		));
	}

	#[test]
	fn test_info_header_validates_both_dimensions() {
		let mut header = sample_info_header();
		header.width = -3;
		assert!(matches!(
			InfoHeader::from_bytes(&header.to_bytes()),
			Err(BmpError::InvalidField { field: "width", .. })
		));

		let mut header = sample_info_header();
		header.height = 0;
		assert!(matches!(
			InfoHeader::from_bytes(&header.to_bytes()),
			Err(BmpError::InvalidField {
				field: "height",
				..
			})
		));
	}

	#[test]
	fn test_info_header_rejects_bad_planes() {
		let mut header = sample_info_header();
		header.planes = 2;

		assert!(matches!(
			InfoHeader::from_bytes(&header.to_bytes()),
			Err(BmpError::InvalidField {
				field: "planes",
				..
			})
		));
	}

	#[test]
	fn test_info_header_rejects_bad_bit_count() {
		let mut bytes = sample_info_header().to_bytes();
		bytes[14..16].copy_from_slice(&16u16.to_le_bytes());

		assert!(matches!(
			InfoHeader::from_bytes(&bytes),
			Err(BmpError::InvalidField {
				field: "bit_count",
				..
			})
		));
	}

	#[test]
	fn test_info_header_rejects_compression_mismatch() {
		// RLE8 with a 4-bit image
		let mut bytes = sample_info_header().to_bytes();
		bytes[14..16].copy_from_slice(&4u16.to_le_bytes());
		bytes[16..20].copy_from_slice(&1u32.to_le_bytes());

		assert!(matches!(
			InfoHeader::from_bytes(&bytes),
			Err(BmpError::InvalidField {
				field: "compression",
				..
			})
		));
	}

	#[test]
	fn test_info_header_rejects_unknown_compression() {
		// 3 is BI_BITFIELDS, which this codec does not implement
		let mut bytes = sample_info_header().to_bytes();
		bytes[16..20].copy_from_slice(&3u32.to_le_bytes());

		assert!(matches!(
			InfoHeader::from_bytes(&bytes),
			Err(BmpError::Unsupported { .. })
		));
	}

	#[test]
	fn test_info_header_rejects_zero_image_size_for_indexed() {
		let mut header = sample_info_header();
		header.image_size = 0;

		assert!(matches!(
			InfoHeader::from_bytes(&header.to_bytes()),
			Err(BmpError::InvalidField {
				field: "image_size",
				..
			})
		));
	}

	#[test]
	fn test_info_header_allows_zero_image_size_for_rgb() {
		let header = InfoHeader {
			bit_count: 24,
			width: 2,
			height: 2,
			clr_used: 0,
			clr_important: 0,
			image_size: 0,
			..sample_info_header()
		};

		assert!(InfoHeader::from_bytes(&header.to_bytes()).is_ok());
	}

	#[test]
	fn test_info_header_rejects_out_of_range_color_counts() {
		let mut header = sample_info_header();
		header.clr_used = 257;

		assert!(matches!(
			InfoHeader::from_bytes(&header.to_bytes()),
			Err(BmpError::InvalidField {
				field: "clr_used",
				..
			})
		));
	}

	#[test]
	fn test_info_header_skips_declared_surplus() {
		let mut header = sample_info_header();
		header.info_size = 52;

		let mut data = header.to_bytes().to_vec();
		data.extend_from_slice(&[0u8; 12]);
		data.push(0x7F); // first byte after the header

		let mut cursor = Cursor::new(data);
		let parsed = InfoHeader::from_reader(&mut cursor).unwrap();
		assert_eq!(parsed.info_size, 52);

		let mut next = [0u8; 1];
		cursor.read_exact(&mut next).unwrap();
		assert_eq!(next[0], 0x7F);
	}

	#[test]
	fn test_info_header_truncated_surplus() {
		let mut header = sample_info_header();
		header.info_size = 64;

		let mut data = header.to_bytes().to_vec();
		data.extend_from_slice(&[0u8; 3]); // declared 24 bytes of padding

		let result = InfoHeader::from_reader(&mut Cursor::new(data));
		assert!(matches!(result, Err(BmpError::MalformedHeader { .. })));
	}

	#[test]
	fn test_row_geometry() {
		let mut header = sample_info_header();

		header.bit_count = 1;
		header.width = 8;
		assert_eq!(header.row_bytes(), 1);
		assert_eq!(header.padded_row_bytes(), 4);

		header.bit_count = 4;
		header.width = 7;
		assert_eq!(header.row_bytes(), 4);
		assert_eq!(header.padded_row_bytes(), 4);

		header.bit_count = 24;
		header.width = 3;
		assert_eq!(header.row_bytes(), 9);
		assert_eq!(header.padded_row_bytes(), 12);

		header.bit_count = 8;
		header.width = 1;
		assert_eq!(header.row_bytes(), 1);
		assert_eq!(header.padded_row_bytes(), 4);
	}
}
