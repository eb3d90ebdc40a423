//! Windows BMP 3.0 file format support.
//!
//! ## File layout
//!
//! | Offset | Size     | Content                                        |
//! |--------|----------|------------------------------------------------|
//! | 0x00   | 14       | File header: magic `"BM"`, file size, data offset |
//! | 0x0E   | ≥ 40     | Info header (`BITMAPINFOHEADER`), little-endian |
//! | —      | 4 × 2^n  | Colormap, only for 1/4/8-bit images            |
//! | offset | variable | Pixel body, rows stored bottom-to-top          |
//!
//! Supported pixel depths are 1, 4, 8 and 24 bits per pixel; 4- and 8-bit
//! images may additionally be RLE-compressed. Uncompressed rows are
//! padded to a 32-bit boundary.
//!
//! The [`BmpDecoder`] and [`BmpEncoder`] types expose the scanline
//! session API the host framework drives; [`File`] wraps a full decode
//! for one-shot use.

mod colormap;
mod decoder;
mod encoder;
mod header;
mod rle;


use std::fs;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use crate::codec::{CodecDesc, PixelType};
use crate::file::BmpError;

pub use colormap::{Color, Colormap};
pub use decoder::{BmpDecoder, PayloadKind};
pub use encoder::BmpEncoder;
pub use header::{Compression, FileHeader, InfoHeader};

/// Constants used in BMP files
pub mod constants {
	/// Magic bytes at the start of every BMP file, `"BM"`
	pub const MAGIC: [u8; 2] = [0x42, 0x4D];

	/// Size of the file header in bytes
	pub const FILE_HEADER_SIZE: usize = 14;

	/// Size of the info header as written by this codec
	pub const INFO_HEADER_SIZE: usize = 40;
}

mod escapes {
	// second byte of an RLE escape command (first byte 0)
	pub const END_OF_LINE: u8 = 0;
	pub const END_OF_BITMAP: u8 = 1;
	pub const DELTA: u8 = 2;
}

/// Builds the descriptor the host framework uses to route BMP files to
/// this codec.
pub fn codec_desc() -> CodecDesc {
	CodecDesc {
		file_type: "BMP",
		pixel_types: vec![PixelType::Uint8],
		compression_types: vec!["RLE"],
		magic_strings: vec![constants::MAGIC.to_vec()],
		file_extensions: vec!["bmp"],
	}
}

/// Representation of a fully decoded BMP file
#[derive(Debug)]
pub struct File {
	file_header: FileHeader,
	info_header: InfoHeader,
	colormap: Option<Colormap>,
	num_bands: usize,
	pixels: Vec<u8>,
}

impl File {
	/// Opens and fully decodes a BMP file from the specified path.
	pub fn open(path: impl AsRef<Path>) -> Result<Self, BmpError> {
		let file = fs::File::open(path)?;
		Self::from_reader(BufReader::new(file))
	}

	/// Fully decodes a BMP file from any seekable reader.
	pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self, BmpError> {
		let mut decoder = BmpDecoder::from_reader(reader)?;
		let pixels = decoder.pixels()?.to_vec();

		Ok(Self {
			file_header: *decoder.file_header(),
			info_header: *decoder.info_header(),
			colormap: decoder.colormap().cloned(),
			num_bands: decoder.num_bands(),
			pixels,
		})
	}

	/// Returns the file header.
	pub fn file_header(&self) -> &FileHeader {
		&self.file_header
	}

	/// Returns the info header.
	pub fn info_header(&self) -> &InfoHeader {
		&self.info_header
	}

	/// Returns the colormap, present only for indexed images.
	pub fn colormap(&self) -> Option<&Colormap> {
		self.colormap.as_ref()
	}

	/// Image width in pixels.
	pub fn width(&self) -> u32 {
		self.info_header.width as u32
	}

	/// Image height in pixels.
	pub fn height(&self) -> u32 {
		self.info_header.height as u32
	}

	/// Number of bands in the pixel buffer: 1 for grayscale, 3 for RGB.
	pub fn num_bands(&self) -> usize {
		self.num_bands
	}

	/// Returns the top-to-bottom, interleaved pixel buffer.
	pub fn pixels(&self) -> &[u8] {
		&self.pixels
	}
}
