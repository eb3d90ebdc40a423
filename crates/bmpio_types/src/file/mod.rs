//! File format support for `bmpio-rs`.

mod error;

pub mod bmp;

// Re-export unified error type
pub use error::BmpError;

// Re-export main file types
pub use bmp::{
	BmpDecoder, BmpEncoder, Color, Colormap, Compression, File as BmpFile, FileHeader, InfoHeader,
	PayloadKind,
};
