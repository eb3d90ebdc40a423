//! Colormap support for indexed BMP images.
//!
//! Images with 1, 4 or 8 bits per pixel carry a colormap directly after the
//! info header, one four-byte entry (B, G, R, reserved) per representable
//! index. Entries are held in memory as R,G,B triples. While reading the
//! map the handler classifies the image: when every entry satisfies
//! R = G = B the image is grayscale and decodes to a single band.

use std::fmt;
use std::io::{self, Read, Write};

use crate::file::BmpError;

/// RGB color representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
	/// Red component (0-255)
	pub r: u8,
	/// Green component (0-255)
	pub g: u8,
	/// Blue component (0-255)
	pub b: u8,
}

impl Color {
	/// Creates a new RGB color.
	pub const fn new(r: u8, g: u8, b: u8) -> Self {
		Self {
			r,
			g,
			b,
		}
	}

	/// Creates a new grayscale color.
	pub const fn gray(value: u8) -> Self {
		Self::new(value, value, value)
	}

	/// Returns true when all three components are equal.
	pub const fn is_gray(&self) -> bool {
		self.r == self.g && self.g == self.b
	}
}

impl fmt::Display for Color {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "RGB({}, {}, {})", self.r, self.g, self.b)
	}
}

/// An ordered colormap read from (or written to) a BMP file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Colormap {
	colors: Vec<Color>,
	grayscale: bool,
}

impl Colormap {
	/// Size of one on-disk colormap entry in bytes
	pub const ENTRY_SIZE: usize = 4;

	/// Reads `num_colors` entries from the given reader.
	///
	/// On-disk entry order is B, G, R followed by one reserved byte which
	/// is discarded. Grayscale classification happens on the fly.
	pub fn from_reader<R: Read>(reader: &mut R, num_colors: usize) -> Result<Self, BmpError> {
		let mut colors = Vec::with_capacity(num_colors);
		let mut grayscale = true;

		for _ in 0..num_colors {
			let mut entry = [0u8; Self::ENTRY_SIZE];
			reader.read_exact(&mut entry).map_err(|e| {
				if e.kind() == io::ErrorKind::UnexpectedEof {
					BmpError::MalformedHeader {
						message: format!("colormap ends before {num_colors} entries"),
					}
				} else {
					BmpError::IOError(e)
				}
			})?;

			let color = Color::new(entry[2], entry[1], entry[0]);
			grayscale = grayscale && color.is_gray();
			colors.push(color);
		}

		Ok(Self {
			colors,
			grayscale,
		})
	}

	/// Creates the 256-entry identity ramp the encoder writes for
	/// grayscale output, entry `i` being `(i, i, i)`.
	pub fn identity_ramp() -> Self {
		let colors = (0..=255u8).map(Color::gray).collect();
		Self {
			colors,
			grayscale: true,
		}
	}

	/// True when every entry satisfies R = G = B.
	pub fn is_grayscale(&self) -> bool {
		self.grayscale
	}

	/// Number of entries in the colormap.
	pub fn len(&self) -> usize {
		self.colors.len()
	}

	/// True when the colormap has no entries.
	pub fn is_empty(&self) -> bool {
		self.colors.is_empty()
	}

	/// Gets the entry for the given pixel index.
	#[inline]
	pub fn get(&self, index: u8) -> Color {
		self.colors[index as usize]
	}

	/// Returns the entries in index order.
	pub fn colors(&self) -> &[Color] {
		&self.colors
	}

	/// Converts the colormap to its on-disk byte representation,
	/// four bytes per entry in B, G, R, 0 order.
	pub fn to_bytes(&self) -> Vec<u8> {
		let mut data = Vec::with_capacity(self.colors.len() * Self::ENTRY_SIZE);

		for color in &self.colors {
			data.push(color.b);
			data.push(color.g);
			data.push(color.r);
			data.push(0);
		}

		data
	}

	/// Writes the colormap to the given writer.
	pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), BmpError> {
		writer.write_all(&self.to_bytes())?;
		Ok(())
	}
}

impl fmt::Display for Colormap {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"Colormap: {} entries ({})",
			self.colors.len(),
			if self.grayscale {
				"grayscale"
			} else {
				"RGB"
			}
		)
	}
}
