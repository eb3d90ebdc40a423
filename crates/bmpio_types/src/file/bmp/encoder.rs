//! Encoder for BMP files.
//!
//! The encoder writes one of two file layouts, chosen by the configured
//! band count:
//!
//! | bands | file produced                                              |
//! |-------|------------------------------------------------------------|
//! | 1     | 8-bit palettized, 256-entry identity ramp colormap         |
//! | 3     | 24-bit true color, no colormap                             |
//!
//! Usage follows the host framework's session protocol: configure the
//! settings, call [`BmpEncoder::finalize_settings`] (after which every
//! setter fails), fill the image through the scanline cursor, then
//! [`BmpEncoder::close`]. Nothing is written before `close`, so an
//! aborted session leaves a path destination absent or untouched.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::codec::PixelType;
use crate::file::BmpError;
use crate::file::bmp::colormap::Colormap;
use crate::file::bmp::constants::{FILE_HEADER_SIZE, INFO_HEADER_SIZE};
use crate::file::bmp::header::{Compression, FileHeader, InfoHeader};

/// BMP encoder with a row cursor.
///
/// The encoder owns its pixel buffer from `finalize_settings` until the
/// emitted bytes leave through `close`, [`BmpEncoder::write_to`] or
/// [`BmpEncoder::to_bytes`]. The in-memory buffer is top-to-bottom; the
/// body is flipped to the file's bottom-to-top row order while writing.
#[derive(Debug)]
pub struct BmpEncoder {
	dest: Option<PathBuf>,
	file_header: FileHeader,
	info_header: InfoHeader,
	grayscale: bool,
	pixels: Vec<u8>,
	scanline: usize,
	finalized: bool,
	done: bool,
}

impl Default for BmpEncoder {
	fn default() -> Self {
		Self::new()
	}
}

impl BmpEncoder {
	/// Creates an encoder with no destination, for use with
	/// [`BmpEncoder::write_to`] or [`BmpEncoder::to_bytes`].
	///
	/// Output defaults to three bands (24-bit RGB).
	pub fn new() -> Self {
		Self {
			dest: None,
			file_header: FileHeader::default(),
			info_header: InfoHeader::default(),
			grayscale: false,
			pixels: Vec::new(),
			scanline: 0,
			finalized: false,
			done: false,
		}
	}

	/// Creates an encoder that will write to the given path on `close`.
	///
	/// The file is not created until `close`; an aborted session never
	/// touches it.
	pub fn create(path: impl AsRef<Path>) -> Self {
		Self {
			dest: Some(path.as_ref().to_path_buf()),
			..Self::new()
		}
	}

	/// File type tag of this codec.
	pub fn file_type(&self) -> &'static str {
		"BMP"
	}

	/// Sets the image width in pixels.
	pub fn set_width(&mut self, width: u32) -> Result<(), BmpError> {
		self.ensure_configurable()?;
		self.info_header.width = width as i32;
		Ok(())
	}

	/// Sets the image height in pixels.
	pub fn set_height(&mut self, height: u32) -> Result<(), BmpError> {
		self.ensure_configurable()?;
		self.info_header.height = height as i32;
		Ok(())
	}

	/// Sets the band count: 1 for grayscale output, 3 for RGB.
	pub fn set_num_bands(&mut self, bands: usize) -> Result<(), BmpError> {
		self.ensure_configurable()?;
		if bands != 1 && bands != 3 {
			return Err(BmpError::StateViolation {
				message: format!("bmp supports only rgb and grayscale images, got {bands} bands"),
			});
		}

		self.grayscale = bands == 1;
		Ok(())
	}

	/// Sets the sample type of the pixel buffer.
	pub fn set_pixel_type(&mut self, pixel_type: PixelType) -> Result<(), BmpError> {
		self.ensure_configurable()?;
		let PixelType::Uint8 = pixel_type;
		Ok(())
	}

	/// Accepts a compression request. BMP output is always uncompressed,
	/// so the value is ignored.
	pub fn set_compression_type(&mut self, _compression: &str) -> Result<(), BmpError> {
		self.ensure_configurable()?;
		Ok(())
	}

	/// Per-pixel stride for band indexing, equal to the band count.
	pub fn offset(&self) -> usize {
		self.ncomp()
	}

	/// Freezes the settings, fills in both headers and allocates the
	/// pixel buffer. Every setter fails from here on.
	pub fn finalize_settings(&mut self) -> Result<(), BmpError> {
		self.ensure_configurable()?;

		if self.info_header.width <= 0 {
			return Err(BmpError::InvalidField {
				field: "width",
				message: "must be set to a positive value before finalizing".to_string(),
			});
		}
		if self.info_header.height <= 0 {
			return Err(BmpError::InvalidField {
				field: "height",
				message: "must be set to a positive value before finalizing".to_string(),
			});
		}

		let height = self.info_header.height as usize;

		self.info_header.info_size = INFO_HEADER_SIZE as u32;
		self.info_header.planes = 1;
		self.info_header.compression = Compression::None;
		self.info_header.x_pixels_per_meter = 0;
		self.info_header.y_pixels_per_meter = 0;

		if self.grayscale {
			self.info_header.bit_count = 8;
			self.info_header.clr_used = 256;
			self.info_header.clr_important = 256;

			let body_size = self.info_header.padded_row_bytes() * height;
			let palette_size = 256 * Colormap::ENTRY_SIZE;
			self.info_header.image_size = body_size as u32;
			self.file_header.offset = (FILE_HEADER_SIZE + INFO_HEADER_SIZE + palette_size) as u32;
			self.file_header.size = self.file_header.offset + body_size as u32;
		} else {
			self.info_header.bit_count = 24;
			self.info_header.clr_used = 0;
			self.info_header.clr_important = 0;

			// image_size may be 0 for uncompressed true color
			let body_size = self.info_header.padded_row_bytes() * height;
			self.info_header.image_size = 0;
			self.file_header.offset = (FILE_HEADER_SIZE + INFO_HEADER_SIZE) as u32;
			self.file_header.size = self.file_header.offset + body_size as u32;
		}

		self.pixels = vec![0; self.info_header.width as usize * height * self.ncomp()];
		self.finalized = true;
		Ok(())
	}

	/// Returns the file header as populated by `finalize_settings`.
	pub fn file_header(&self) -> &FileHeader {
		&self.file_header
	}

	/// Returns the info header as populated by `finalize_settings`.
	pub fn info_header(&self) -> &InfoHeader {
		&self.info_header
	}

	/// Returns the current row of the in-memory buffer starting at the
	/// given band, with a per-pixel stride of [`Self::offset`].
	pub fn current_scanline_of_band(&mut self, band: usize) -> Result<&mut [u8], BmpError> {
		self.ensure_writable()?;

		let ncomp = self.ncomp();
		if band >= ncomp {
			return Err(BmpError::StateViolation {
				message: format!("band {band} out of range, output has {ncomp} bands"),
			});
		}

		let height = self.info_header.height as usize;
		if self.scanline >= height {
			return Err(BmpError::StateViolation {
				message: format!("scanline cursor {} is past the last row", self.scanline),
			});
		}

		let line_size = self.info_header.width as usize * ncomp;
		let start = self.scanline * line_size;
		Ok(&mut self.pixels[start + band..start + line_size])
	}

	/// Advances the scanline cursor by one row.
	pub fn next_scanline(&mut self) {
		self.scanline += 1;
	}

	/// Serializes the complete file to bytes.
	pub fn to_bytes(&self) -> Result<Vec<u8>, BmpError> {
		let mut buffer = Vec::with_capacity(self.file_header.size as usize);
		self.write_to(&mut buffer)?;
		Ok(buffer)
	}

	/// Writes the complete file to the given writer: file header, info
	/// header, the colormap for grayscale output, then the body rows
	/// bottom-to-top.
	pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), BmpError> {
		if !self.finalized {
			return Err(BmpError::StateViolation {
				message: "settings must be finalized before writing".to_string(),
			});
		}

		self.file_header.write_to(writer)?;
		self.info_header.write_to(writer)?;

		if self.grayscale {
			Colormap::identity_ramp().write_to(writer)?;
			self.write_8bit_data(writer)?;
		} else {
			self.write_rgb_data(writer)?;
		}

		Ok(())
	}

	/// Saves the complete file to the given path.
	pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), BmpError> {
		let mut writer = BufWriter::new(fs::File::create(path)?);
		self.write_to(&mut writer)?;
		writer.flush()?;
		Ok(())
	}

	/// Flushes the session to the destination configured with
	/// [`BmpEncoder::create`] and ends it.
	pub fn close(&mut self) -> Result<(), BmpError> {
		if self.done {
			return Err(BmpError::StateViolation {
				message: "encoder is already closed or aborted".to_string(),
			});
		}

		let Some(path) = self.dest.as_ref() else {
			return Err(BmpError::StateViolation {
				message: "encoder has no output destination".to_string(),
			});
		};

		self.save_to_file(path)?;
		self.done = true;
		Ok(())
	}

	/// Ends the session without writing anything. A path destination is
	/// left absent or untouched.
	pub fn abort(&mut self) {
		self.pixels = Vec::new();
		self.done = true;
	}

	fn ncomp(&self) -> usize {
		if self.grayscale {
			1
		} else {
			3
		}
	}

	fn ensure_configurable(&self) -> Result<(), BmpError> {
		if self.finalized {
			return Err(BmpError::StateViolation {
				message: "settings are finalized".to_string(),
			});
		}
		Ok(())
	}

	fn ensure_writable(&self) -> Result<(), BmpError> {
		if !self.finalized {
			return Err(BmpError::StateViolation {
				message: "settings must be finalized before writing scanlines".to_string(),
			});
		}
		if self.done {
			return Err(BmpError::StateViolation {
				message: "encoder is already closed or aborted".to_string(),
			});
		}
		Ok(())
	}

	fn write_8bit_data<W: Write>(&self, writer: &mut W) -> Result<(), BmpError> {
		let width = self.info_header.width as usize;
		let height = self.info_header.height as usize;
		let pad = self.info_header.padded_row_bytes() - width;
		let padding = [0u8; 3];

		for row in (0..height).rev() {
			let start = row * width;
			writer.write_all(&self.pixels[start..start + width])?;
			writer.write_all(&padding[..pad])?;
		}

		Ok(())
	}

	fn write_rgb_data<W: Write>(&self, writer: &mut W) -> Result<(), BmpError> {
		let width = self.info_header.width as usize;
		let height = self.info_header.height as usize;
		let line_size = 3 * width;
		let pad = self.info_header.padded_row_bytes() - line_size;
		let mut disk_row = vec![0u8; line_size + pad];

		for row in (0..height).rev() {
			let start = row * line_size;
			let src = &self.pixels[start..start + line_size];

			// on-disk sample order is B, G, R
			for x in 0..width {
				disk_row[3 * x] = src[3 * x + 2];
				disk_row[3 * x + 1] = src[3 * x + 1];
				disk_row[3 * x + 2] = src[3 * x];
			}

			writer.write_all(&disk_row)?;
		}

		Ok(())
	}
}
