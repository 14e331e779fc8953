use std::fmt;
use std::io::Read;

use crate::IncsrcError;
use crate::IncsrcResult;
use crate::ProcessOptions;
use crate::engine::process;

/// The contents of a document handed over by a build pipeline.
pub enum Contents {
	/// No contents, e.g. a directory entry. Passed through untouched.
	Empty,
	/// Fully buffered contents.
	Buffer(Vec<u8>),
	/// Streamed contents. Not supported.
	Stream(Box<dyn Read>),
}

impl fmt::Debug for Contents {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Empty => f.write_str("Empty"),
			Self::Buffer(bytes) => f.debug_tuple("Buffer").field(&bytes.len()).finish(),
			Self::Stream(_) => f.write_str("Stream"),
		}
	}
}

impl From<String> for Contents {
	fn from(value: String) -> Self {
		Self::Buffer(value.into_bytes())
	}
}

impl From<&str> for Contents {
	fn from(value: &str) -> Self {
		Self::Buffer(value.as_bytes().to_vec())
	}
}

/// Rewrite pipeline contents. Empty contents pass through, buffers are
/// rewritten, and streams or non UTF-8 buffers fail before anything is
/// processed.
pub fn process_contents(contents: Contents, options: &ProcessOptions) -> IncsrcResult<Contents> {
	match contents {
		Contents::Empty => Ok(Contents::Empty),
		Contents::Stream(_) => {
			Err(IncsrcError::UnsupportedInput(
				"streaming contents are not supported".to_string(),
			))
		}
		Contents::Buffer(bytes) => {
			let text = String::from_utf8(bytes).map_err(|e| {
				IncsrcError::UnsupportedInput(format!("document is not valid UTF-8: {e}"))
			})?;
			process(&text, options).map(Contents::from)
		}
	}
}
