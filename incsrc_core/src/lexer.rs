use logos::Logos;

use crate::AssetKind;

/// Raw tokens produced by logos for the head of an HTML comment. Only the
/// marker head is tokenized; the JSON options payload is sliced out verbatim
/// once the opening parenthesis is reached.
#[derive(Logos, Debug, PartialEq)]
enum RawToken {
	#[token("<!--")]
	HtmlCommentOpen,
	#[token("-->")]
	HtmlCommentClose,
	#[regex(r"(?i)include-[a-z0-9]+", priority = 10)]
	IncludeTag,
	#[token("/")]
	Slash,
	#[token(":")]
	Colon,
	#[token("(")]
	ParenOpen,
	#[regex(r"[ \t\r\n]+")]
	Whitespace,
}

/// A classified include marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Marker {
	/// `<!-- include-js:vendor({...}) -->`
	Open {
		kind: AssetKind,
		group_name: String,
		options: String,
	},
	/// `<!-- /include-js:vendor -->`
	Close { kind: AssetKind, group_name: String },
}

/// Length of the case-insensitive `include-` prefix.
const INCLUDE_PREFIX_LEN: usize = "include-".len();

/// Walks the token stream of a single HTML comment, accepting only the
/// include marker grammar.
struct MarkerWalker<'a> {
	source: &'a str,
	tokens: logos::SpannedIter<'a, RawToken>,
}

impl<'a> MarkerWalker<'a> {
	fn new(source: &'a str) -> Self {
		Self {
			source,
			tokens: RawToken::lexer(source).spanned(),
		}
	}

	/// Next token that isn't whitespace, along with its text.
	fn next_significant(&mut self) -> Option<(RawToken, std::ops::Range<usize>)> {
		for (result, span) in self.tokens.by_ref() {
			match result {
				Ok(RawToken::Whitespace) => {}
				Ok(token) => return Some((token, span)),
				Err(()) => return None,
			}
		}

		None
	}

	fn expect(&mut self, expected: &RawToken) -> Option<std::ops::Range<usize>> {
		let (token, span) = self.next_significant()?;
		(token == *expected).then_some(span)
	}

	fn include_tag(&mut self) -> Option<AssetKind> {
		let span = self.expect(&RawToken::IncludeTag)?;
		Some(self.kind_at(span))
	}

	fn kind_at(&self, span: std::ops::Range<usize>) -> AssetKind {
		AssetKind::from(&self.source[span.start + INCLUDE_PREFIX_LEN..span.end])
	}

	/// Group names are `[A-Za-z0-9_-]+` and may run straight into `-->`, so
	/// they are sliced from the source instead of lexed. The lexer resumes
	/// after the name.
	fn group_name(&mut self) -> Option<String> {
		let remainder = self.tokens.remainder();
		let rest = remainder.trim_start_matches([' ', '\t', '\r', '\n']);
		let leading = remainder.len() - rest.len();
		let mut len = rest
			.find(|c: char| !is_group_name_char(c))
			.unwrap_or(rest.len());
		if rest[..len].ends_with("--") && rest[len..].starts_with('>') {
			len -= 2;
		}
		if len == 0 {
			return None;
		}

		self.tokens.bump(leading + len);
		Some(rest[..len].to_string())
	}

	fn classify(mut self) -> Option<Marker> {
		self.expect(&RawToken::HtmlCommentOpen)?;

		let (token, span) = self.next_significant()?;
		match token {
			RawToken::Slash => {
				let kind = self.include_tag()?;
				self.expect(&RawToken::Colon)?;
				let group_name = self.group_name()?;
				self.expect(&RawToken::HtmlCommentClose)?;
				self.next_significant()
					.is_none()
					.then_some(Marker::Close { kind, group_name })
			}
			RawToken::IncludeTag => {
				let kind = self.kind_at(span);
				self.expect(&RawToken::Colon)?;
				let group_name = self.group_name()?;
				let paren = self.expect(&RawToken::ParenOpen)?;
				let options = self.options_payload(paren.end)?;
				Some(Marker::Open {
					kind,
					group_name,
					options,
				})
			}
			_ => None,
		}
	}

	/// Slice the JSON payload: everything between the opening parenthesis and
	/// the last `)` of the comment. Only whitespace may follow the payload.
	fn options_payload(&self, payload_start: usize) -> Option<String> {
		let body = self.source.strip_suffix("-->")?;
		let close = body.rfind(')')?;
		if close < payload_start || !body[close + 1..].trim().is_empty() {
			return None;
		}

		Some(body[payload_start..close].to_string())
	}
}

fn is_group_name_char(c: char) -> bool {
	c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Classify the text of a single HTML comment (`<!-- ... -->`) as an include
/// marker. Comments that don't follow the include grammar return `None`.
pub(crate) fn classify_comment(comment: &str) -> Option<Marker> {
	MarkerWalker::new(comment).classify()
}

pub(crate) fn memstr(haystack: &[u8], needle: &[u8]) -> Option<usize> {
	haystack
		.windows(needle.len())
		.position(|window| window == needle)
}
