//! Prelude module for `bmpio_types`.
//!
//! This module provides a convenient way to import commonly used types,
//! traits, and constants.
//!
//! # Examples
//!
//! ```no_run
//! use bmpio_types::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let file = BmpFile::open("image.bmp")?;
//! println!("{} bands", file.num_bands());
//! # Ok(())
//! # }
//! ```

// Codec descriptor types
#[doc(inline)]
pub use crate::codec::{CodecDesc, PixelType};

// BMP types
#[doc(inline)]
pub use crate::file::{
	BmpDecoder,
	BmpEncoder,
	BmpError,
	BmpFile,
	Color,
	Colormap,
	Compression,
	FileHeader,
	InfoHeader,
	PayloadKind,
};

// Re-export the file module for advanced usage
#[doc(inline)]
pub use crate::file;
