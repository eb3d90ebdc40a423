//! This crate provides the core data types and BMP file format support
//! for the `bmpio-rs` project.
//!
//! # Features
//!
//! - **Decoding**: 1-, 4-, 8- and 24-bit BMP 3.0 files, including the
//!   RLE4 and RLE8 compressed variants, into a top-to-bottom interleaved
//!   pixel buffer with scanline access
//! - **Encoding**: 8-bit palettized grayscale and 24-bit true-color
//!   output with correct row padding and bottom-to-top body layout
//!
//! # Examples
//!
//! ```no_run
//! use bmpio_types::file::bmp::{BmpDecoder, BmpEncoder};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut decoder = BmpDecoder::open("input.bmp")?;
//! println!("{}x{} pixels", decoder.width(), decoder.height());
//! let pixels = decoder.pixels()?.to_vec();
//!
//! let mut encoder = BmpEncoder::create("output.bmp");
//! encoder.set_width(decoder.width())?;
//! encoder.set_height(decoder.height())?;
//! encoder.set_num_bands(decoder.num_bands())?;
//! encoder.finalize_settings()?;
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod file;
pub mod prelude;

// Re-export commonly used types at crate root for convenience
pub use codec::{CodecDesc, PixelType};
pub use file::{BmpDecoder, BmpEncoder, BmpError, BmpFile, Colormap, FileHeader, InfoHeader};
