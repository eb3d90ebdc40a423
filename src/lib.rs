//! `bmpio-rs` is a Windows BMP 3.0 codec: a decoder for 1-, 4-, 8- and
//! 24-bit files including the RLE4 and RLE8 compressed variants, and an
//! encoder producing 8-bit grayscale or 24-bit true-color output.
//!
//! All functionality lives in [`bmpio_types`]; this crate re-exports it
//! and carries the command line utilities.

pub use bmpio_types::*;
