//! Codec descriptor types shared with the host image-I/O framework.
//!
//! The host framework selects a codec by probing file magic bytes and
//! extensions against the descriptors the registered codecs publish.
//! The descriptor for the BMP codec itself is built by
//! [`crate::file::bmp::codec_desc`].

use std::fmt;

use serde::Serialize;

/// Sample types a codec can produce or consume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PixelType {
	/// Unsigned 8-bit samples
	#[serde(rename = "UINT8")]
	Uint8,
}

impl fmt::Display for PixelType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			PixelType::Uint8 => write!(f, "UINT8"),
		}
	}
}

/// Capabilities a codec publishes to the host framework
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodecDesc {
	/// File type tag, e.g. `"BMP"`
	pub file_type: &'static str,
	/// Sample types the codec can handle
	pub pixel_types: Vec<PixelType>,
	/// Compression schemes the codec can read
	pub compression_types: Vec<&'static str>,
	/// Magic byte prefixes identifying the format
	pub magic_strings: Vec<Vec<u8>>,
	/// File extensions associated with the format
	pub file_extensions: Vec<&'static str>,
}

impl fmt::Display for CodecDesc {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} codec ({} pixel types)", self.file_type, self.pixel_types.len())
	}
}
