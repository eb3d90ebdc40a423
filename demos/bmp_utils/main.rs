//! BMP CLI Utility
//!
//! A command-line tool for inspecting, rewriting and generating BMP files.
//!
//! # Features
//!
//! - **info**: Print the headers and colormap classification of a file
//! - **rewrite**: Decode a file and re-encode it uncompressed
//! - **gen**: Generate a test gradient image
//!
//! # Usage
//!
//! ```bash
//! # Inspect a file
//! cargo run --example bmp_utils info input.bmp
//!
//! # Normalize an RLE file to its uncompressed form
//! cargo run --example bmp_utils rewrite input.bmp output.bmp
//!
//! # Generate a 256x128 grayscale gradient
//! cargo run --example bmp_utils gen output.bmp --width 256 --height 128 --gray
//! ```

use clap::{Parser, Subcommand};
use log::info;
use std::path::{Path, PathBuf};

use bmpio_rs::file::bmp::{BmpDecoder, BmpEncoder, codec_desc};
use bmpio_rs::prelude::*;

#[derive(Parser)]
#[command(name = "bmp_utils")]
#[command(author = "bmpio-rs project")]
#[command(version = "1.0")]
#[command(about = "BMP utility - inspect, rewrite and generate BMP files", long_about = None)]
struct Cli {
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Print the headers of a BMP file
	Info {
		/// Input BMP file path
		#[arg(value_name = "INPUT_BMP")]
		input: PathBuf,

		/// Emit machine-readable JSON instead of text
		#[arg(short, long)]
		json: bool,
	},

	/// Decode a BMP file and re-encode it uncompressed
	Rewrite {
		/// Input BMP file path
		#[arg(value_name = "INPUT_BMP")]
		input: PathBuf,

		/// Output BMP file path
		#[arg(value_name = "OUTPUT_BMP")]
		output: PathBuf,
	},

	/// Generate a test gradient image
	Gen {
		/// Output BMP file path
		#[arg(value_name = "OUTPUT_BMP")]
		output: PathBuf,

		/// Image width in pixels
		#[arg(long, default_value_t = 256)]
		width: u32,

		/// Image height in pixels
		#[arg(long, default_value_t = 256)]
		height: u32,

		/// Produce a single-band grayscale file instead of RGB
		#[arg(long)]
		gray: bool,
	},
}

fn main() {
	// Initialize logger with default level set to info if RUST_LOG is not set
	env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

	let cli = Cli::parse();

	let result = match cli.command {
		Commands::Info {
			input,
			json,
		} => print_info(&input, json),
		Commands::Rewrite {
			input,
			output,
		} => rewrite(&input, &output),
		Commands::Gen {
			output,
			width,
			height,
			gray,
		} => generate(&output, width, height, gray),
	};

	if let Err(e) = result {
		eprintln!("error: {e}");
		std::process::exit(1);
	}
}

fn print_info(input: &Path, json: bool) -> Result<(), BmpError> {
	let decoder = BmpDecoder::open(input)?;

	if json {
		let value = serde_json::json!({
			"codec": codec_desc(),
			"file_header": decoder.file_header(),
			"info_header": decoder.info_header(),
			"num_bands": decoder.num_bands(),
			"pixel_type": decoder.pixel_type(),
		});
		println!("{value:#}");
		return Ok(());
	}

	println!("{}", decoder.file_header());
	println!("{}", decoder.info_header());
	if let Some(map) = decoder.colormap() {
		println!("{map}");
	}
	println!(
		"Decodes to {} band(s) of {}",
		decoder.num_bands(),
		decoder.pixel_type()
	);

	Ok(())
}

fn rewrite(input: &Path, output: &Path) -> Result<(), BmpError> {
	let mut decoder = BmpDecoder::open(input)?;
	let width = decoder.width();
	let height = decoder.height();
	let bands = decoder.num_bands();
	let pixels = decoder.pixels()?.to_vec();

	info!("decoded {input:?}: {width}x{height}, {bands} band(s)");

	let mut encoder = BmpEncoder::create(output);
	encoder.set_width(width)?;
	encoder.set_height(height)?;
	encoder.set_num_bands(bands)?;
	encoder.set_pixel_type(PixelType::Uint8)?;
	encoder.finalize_settings()?;

	let line_size = width as usize * bands;
	for row in pixels.chunks_exact(line_size) {
		encoder.current_scanline_of_band(0)?.copy_from_slice(row);
		encoder.next_scanline();
	}
	encoder.close()?;

	info!("wrote {output:?} ({} bytes)", encoder.file_header().size);
	Ok(())
}

fn generate(output: &Path, width: u32, height: u32, gray: bool) -> Result<(), BmpError> {
	let mut encoder = BmpEncoder::create(output);
	encoder.set_width(width)?;
	encoder.set_height(height)?;
	encoder.set_num_bands(if gray {
		1
	} else {
		3
	})?;
	encoder.finalize_settings()?;

	for y in 0..height {
		let row = encoder.current_scanline_of_band(0)?;
		for x in 0..width as usize {
			if gray {
				row[x] = (x as u32 + y) as u8;
			} else {
				row[3 * x] = x as u8;
				row[3 * x + 1] = y as u8;
				row[3 * x + 2] = (x as u32 ^ y) as u8;
			}
		}
		encoder.next_scanline();
	}
	encoder.close()?;

	info!("wrote {output:?}: {width}x{height}, {} band(s)", if gray { 1 } else { 3 });
	Ok(())
}
