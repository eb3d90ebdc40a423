//! Error types for file format parsing and manipulation.

use thiserror::Error;

/// Errors that can occur when decoding or encoding BMP files
#[derive(Debug, Error)]
pub enum BmpError {
	/// Magic mismatch or truncated header area
	#[error("Malformed header: {message}")]
	MalformedHeader {
		/// Description of what is wrong with the header bytes
		message: String,
	},

	/// A header field violates one of the format invariants
	#[error("Invalid field `{field}`: {message}")]
	InvalidField {
		/// Name of the offending header field
		field: &'static str,
		/// Description of the violated invariant
		message: String,
	},

	/// Pixel data ends (or goes astray) before the image is complete
	#[error("Truncated pixel stream: {message}")]
	TruncatedStream {
		/// Description of the missing or inconsistent data
		message: String,
	},

	/// Codec operation invoked outside of its legal state
	#[error("State violation: {message}")]
	StateViolation {
		/// Description of the illegal transition
		message: String,
	},

	/// Format variant the codec does not implement
	#[error("Unsupported format: {message}")]
	Unsupported {
		/// Description of the unsupported variant
		message: String,
	},

	/// IO error
	#[error(transparent)]
	IOError(#[from] std::io::Error),
}
