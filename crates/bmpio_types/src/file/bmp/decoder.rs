//! Decoder for BMP files.
//!
//! Headers and the colormap are read eagerly when the decoder is
//! constructed; the pixel body is decoded on the first scanline (or
//! [`BmpDecoder::pixels`]) request. The payload variant is decided once,
//! at header-read time:
//!
//! | bit count | compression | payload                 |
//! |-----------|-------------|-------------------------|
//! | 1         | none        | [`PayloadKind::OneBit`]    |
//! | 4         | none        | [`PayloadKind::FourBit`]   |
//! | 4         | RLE4        | [`PayloadKind::Rle4`]      |
//! | 8         | none        | [`PayloadKind::EightBit`]  |
//! | 8         | RLE8        | [`PayloadKind::Rle8`]      |
//! | 24        | none        | [`PayloadKind::TrueColor`] |
//!
//! The decoded buffer is stored top-to-bottom, left-to-right, with
//! interleaved per-pixel components: one component for grayscale images
//! (every colormap entry satisfies R = G = B), three otherwise.

use std::fs;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use crate::codec::PixelType;
use crate::file::BmpError;
use crate::file::bmp::colormap::Colormap;
use crate::file::bmp::header::{Compression, FileHeader, InfoHeader};
use crate::file::bmp::rle::{self, RleKind};

/// The six pixel payload variants a BMP 3.0 file can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadKind {
	/// 1 bit per pixel, uncompressed
	OneBit,
	/// 4 bits per pixel, uncompressed
	FourBit,
	/// 4 bits per pixel, run-length encoded
	Rle4,
	/// 8 bits per pixel, uncompressed
	EightBit,
	/// 8 bits per pixel, run-length encoded
	Rle8,
	/// 24 bits per pixel, uncompressed
	TrueColor,
}

impl PayloadKind {
	/// Derives the payload variant from a validated info header.
	pub fn from_header(info: &InfoHeader) -> Result<Self, BmpError> {
		match (info.bit_count, info.compression) {
			(1, Compression::None) => Ok(PayloadKind::OneBit),
			(4, Compression::None) => Ok(PayloadKind::FourBit),
			(4, Compression::Rle4) => Ok(PayloadKind::Rle4),
			(8, Compression::None) => Ok(PayloadKind::EightBit),
			(8, Compression::Rle8) => Ok(PayloadKind::Rle8),
			(24, Compression::None) => Ok(PayloadKind::TrueColor),
			(bits, compression) => Err(BmpError::Unsupported {
				message: format!("bit_count {bits} with {compression} compression"),
			}),
		}
	}
}

/// Streaming BMP decoder with a row cursor.
///
/// The decoder owns its input stream, headers, colormap and pixel buffer
/// until it is dropped. Dimensions and band count are available right
/// after construction; pixel data is reconstructed lazily.
#[derive(Debug)]
pub struct BmpDecoder<R> {
	reader: R,
	file_header: FileHeader,
	info_header: InfoHeader,
	colormap: Option<Colormap>,
	payload: PayloadKind,
	grayscale: bool,
	pixels: Option<Vec<u8>>,
	scanline: usize,
}

impl BmpDecoder<BufReader<fs::File>> {
	/// Opens and parses the headers of a BMP file at the given path.
	pub fn open(path: impl AsRef<Path>) -> Result<Self, BmpError> {
		let file = fs::File::open(path)?;
		Self::from_reader(BufReader::new(file))
	}
}

impl<R: Read + Seek> BmpDecoder<R> {
	/// Creates a decoder from any seekable reader.
	///
	/// Reads and validates both headers and, for indexed images, the
	/// colormap. The pixel body itself is not touched yet.
	pub fn from_reader(mut reader: R) -> Result<Self, BmpError> {
		let file_header = FileHeader::from_reader(&mut reader)?;
		let info_header = InfoHeader::from_reader(&mut reader)?;
		let payload = PayloadKind::from_header(&info_header)?;

		// the colormap decides whether this is a grayscale or RGB image
		let (colormap, grayscale) = if info_header.bit_count == 24 {
			(None, false)
		} else {
			let map = Colormap::from_reader(&mut reader, info_header.palette_len())?;
			let grayscale = map.is_grayscale();
			(Some(map), grayscale)
		};

		Ok(Self {
			reader,
			file_header,
			info_header,
			colormap,
			payload,
			grayscale,
			pixels: None,
			scanline: 0,
		})
	}

	/// File type tag of this codec.
	pub fn file_type(&self) -> &'static str {
		"BMP"
	}

	/// Image width in pixels.
	pub fn width(&self) -> u32 {
		self.info_header.width as u32
	}

	/// Image height in pixels.
	pub fn height(&self) -> u32 {
		self.info_header.height as u32
	}

	/// Number of bands in the decoded buffer: 1 for grayscale, 3 for RGB.
	pub fn num_bands(&self) -> usize {
		self.ncomp()
	}

	/// Sample type of the decoded buffer.
	pub fn pixel_type(&self) -> PixelType {
		PixelType::Uint8
	}

	/// Per-pixel stride for band indexing, equal to the band count.
	pub fn offset(&self) -> usize {
		self.ncomp()
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

	/// Returns the payload variant selected at header-read time.
	pub fn payload_kind(&self) -> PayloadKind {
		self.payload
	}

	/// Returns the decoded top-to-bottom pixel buffer, decoding the
	/// body on the first call.
	pub fn pixels(&mut self) -> Result<&[u8], BmpError> {
		self.ensure_decoded()?;
		Ok(self.pixels.as_deref().unwrap_or(&[]))
	}

	/// Returns the current row starting at the given band, with a
	/// per-pixel stride of [`Self::offset`]. The first call triggers
	/// the full decode.
	pub fn current_scanline_of_band(&mut self, band: usize) -> Result<&[u8], BmpError> {
		let ncomp = self.ncomp();
		if band >= ncomp {
			return Err(BmpError::StateViolation {
				message: format!("band {band} out of range, image has {ncomp} bands"),
			});
		}

		let height = self.info_header.height as usize;
		if self.scanline >= height {
			return Err(BmpError::StateViolation {
				message: format!("scanline cursor {} is past the last row", self.scanline),
			});
		}

		self.ensure_decoded()?;
		let line_size = self.info_header.width as usize * ncomp;
		let start = self.scanline * line_size;
		let pixels = self.pixels.as_deref().unwrap_or(&[]);
		Ok(&pixels[start + band..start + line_size])
	}

	/// Advances the scanline cursor by one row.
	pub fn next_scanline(&mut self) {
		self.scanline += 1;
	}

	/// Releases the input stream and any decoded pixel data.
	pub fn close(self) {}

	/// Abandons the decode, discarding any partially read state.
	pub fn abort(self) {}

	fn ncomp(&self) -> usize {
		if self.grayscale {
			1
		} else {
			3
		}
	}

	fn ensure_decoded(&mut self) -> Result<(), BmpError> {
		if self.pixels.is_some() {
			return Ok(());
		}

		// body parsing starts at the declared offset, regardless of
		// where the header area ended
		self.reader.seek(SeekFrom::Start(u64::from(self.file_header.offset)))?;

		let pixels = match self.payload {
			PayloadKind::TrueColor => read_rgb_data(&mut self.reader, &self.info_header)?,
			kind => {
				let Some(map) = self.colormap.as_ref() else {
					return Err(BmpError::MalformedHeader {
						message: "indexed image without a colormap".to_string(),
					});
				};

				match kind {
					PayloadKind::Rle8 => rle::read_rle_data(
						&mut self.reader,
						&self.info_header,
						map,
						self.grayscale,
						RleKind::Rle8,
					)?,
					PayloadKind::Rle4 => rle::read_rle_data(
						&mut self.reader,
						&self.info_header,
						map,
						self.grayscale,
						RleKind::Rle4,
					)?,
					_ => read_indexed_data(
						&mut self.reader,
						&self.info_header,
						map,
						self.grayscale,
					)?,
				}
			}
		};

		self.pixels = Some(pixels);
		Ok(())
	}
}

/// Reads the uncompressed bit-packed payloads (1, 4 and 8 bpp).
///
/// Rows are stored bottom-to-top on disk, each padded to a 32-bit
/// boundary. Every extracted index is palette-expanded to one component
/// (grayscale) or three (RGB).
fn read_indexed_data<R: Read + Seek>(
	reader: &mut R,
	info: &InfoHeader,
	map: &Colormap,
	grayscale: bool,
) -> Result<Vec<u8>, BmpError> {
	let ncomp = if grayscale {
		1
	} else {
		3
	};
	let width = info.width as usize;
	let height = info.height as usize;
	let line_size = width * ncomp;
	let row_bytes = info.row_bytes();
	let pad = info.padded_row_bytes() - row_bytes;

	let mut pixels = vec![0u8; height * line_size];
	let mut row = vec![0u8; row_bytes];

	for disk_row in 0..height {
		read_row(reader, &mut row, disk_row)?;

		// the first disk row is the bottom row of the image
		let base = (height - 1 - disk_row) * line_size;

		for x in 0..width {
			let index = match info.bit_count {
				1 => (row[x / 8] >> (7 - (x % 8))) & 0x01,
				4 => {
					// high nibble holds the leftmost of the two pixels
					if x % 2 == 0 {
						(row[x / 2] & 0xF0) >> 4
					} else {
						row[x / 2] & 0x0F
					}
				}
				_ => row[x],
			};

			let color = map.get(index);
			let at = base + x * ncomp;
			if ncomp == 1 {
				pixels[at] = color.r;
			} else {
				pixels[at] = color.r;
				pixels[at + 1] = color.g;
				pixels[at + 2] = color.b;
			}
		}

		skip_padding(reader, pad)?;
	}

	Ok(pixels)
}

/// Reads the uncompressed 24-bit payload, converting the on-disk
/// B, G, R sample order to R, G, B.
fn read_rgb_data<R: Read + Seek>(reader: &mut R, info: &InfoHeader) -> Result<Vec<u8>, BmpError> {
	let width = info.width as usize;
	let height = info.height as usize;
	let line_size = 3 * width;
	let pad = info.padded_row_bytes() - info.row_bytes();

	let mut pixels = vec![0u8; height * line_size];
	let mut row = vec![0u8; line_size];

	for disk_row in 0..height {
		read_row(reader, &mut row, disk_row)?;

		let base = (height - 1 - disk_row) * line_size;
		for x in 0..width {
			let at = base + 3 * x;
			pixels[at] = row[3 * x + 2];
			pixels[at + 1] = row[3 * x + 1];
			pixels[at + 2] = row[3 * x];
		}

		skip_padding(reader, pad)?;
	}

	Ok(pixels)
}

/// Reads one packed disk row, reporting a premature end of the stream
/// as a truncated pixel stream.
fn read_row<R: Read>(reader: &mut R, row: &mut [u8], disk_row: usize) -> Result<(), BmpError> {
	reader.read_exact(row).map_err(|e| {
		if e.kind() == std::io::ErrorKind::UnexpectedEof {
			BmpError::TruncatedStream {
				message: format!("pixel row {disk_row} is incomplete"),
			}
		} else {
			BmpError::IOError(e)
		}
	})
}

/// Skips the zero padding that aligns each disk row to 32 bits.
fn skip_padding<R: Read + Seek>(reader: &mut R, pad: usize) -> Result<(), BmpError> {
	if pad > 0 {
		reader.seek(SeekFrom::Current(pad as i64))?;
	}
	Ok(())
}
