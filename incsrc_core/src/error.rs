use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum IncsrcError {
	#[error(transparent)]
	#[diagnostic(code(incsrc::io_error))]
	Io(#[from] std::io::Error),

	#[error("invalid options in directive `{directive}`: {reason}")]
	#[diagnostic(
		code(incsrc::syntax::invalid_options),
		help("directive options must be a JSON object with at least a `src` key")
	)]
	InvalidOptions { directive: String, reason: String },

	#[error("closing tag `{directive}` has no matching include directive")]
	#[diagnostic(
		code(incsrc::syntax::orphan_closing_tag),
		help("remove the closing tag or add an opening `<!-- include-type:name({{...}}) -->` before it")
	)]
	OrphanClosingTag { directive: String },

	#[error("include group `{group}` is declared more than once: `{directive}`")]
	#[diagnostic(
		code(incsrc::syntax::duplicate_group),
		help("each `type:groupName` pair must be unique within a document")
	)]
	DuplicateGroup { group: String, directive: String },

	#[error("directive `{inner}` is nested inside `{outer}`")]
	#[diagnostic(
		code(incsrc::syntax::overlapping_directives),
		help("close a directive before opening the next one")
	)]
	OverlappingDirectives { outer: String, inner: String },

	#[error("unsupported input: {0}")]
	#[diagnostic(
		code(incsrc::unsupported_input),
		help("pass the document as a fully buffered UTF-8 text")
	)]
	UnsupportedInput(String),

	#[error("invalid glob pattern `{pattern}`: {reason}")]
	#[diagnostic(code(incsrc::invalid_glob))]
	InvalidGlob { pattern: String, reason: String },

	#[error("failed to read `{path}` for concatenation: {reason}")]
	#[diagnostic(code(incsrc::concat_read))]
	ConcatRead { path: String, reason: String },

	#[error("failed to write concatenated file `{path}`: {reason}")]
	#[diagnostic(
		code(incsrc::concat_write),
		help("check that `concat.saveTo` points to a writable location")
	)]
	ConcatWrite { path: String, reason: String },

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(incsrc::config_parse),
		help("check that incsrc.toml is valid TOML with [templates] and/or [exclude] sections")
	)]
	ConfigParse(String),
}

impl IncsrcError {
	/// Returns true for errors caused by the directive grammar or its inline
	/// options.
	pub fn is_syntax_error(&self) -> bool {
		matches!(
			self,
			Self::InvalidOptions { .. }
				| Self::OrphanClosingTag { .. }
				| Self::DuplicateGroup { .. }
				| Self::OverlappingDirectives { .. }
		)
	}
}

pub type IncsrcResult<T> = Result<T, IncsrcError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
