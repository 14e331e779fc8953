use std::collections::HashSet;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::IncsrcError;
use crate::IncsrcResult;
use crate::Position;
use crate::lexer::Marker;
use crate::lexer::classify_comment;
use crate::lexer::memstr;
use crate::position::LineTable;

/// The asset kind named by a directive tag, e.g. `js` in `include-js`.
///
/// `css` and `js` have built-in markup templates. Any other alphanumeric kind
/// is accepted by the grammar and renders through a `template` option or a
/// configured default template.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
#[non_exhaustive]
pub enum AssetKind {
	Css,
	Js,
	Other(String),
}

impl AssetKind {
	pub fn as_str(&self) -> &str {
		match self {
			Self::Css => "css",
			Self::Js => "js",
			Self::Other(kind) => kind.as_str(),
		}
	}
}

impl From<&str> for AssetKind {
	fn from(value: &str) -> Self {
		let lower = value.to_ascii_lowercase();
		match lower.as_str() {
			"css" => Self::Css,
			"js" => Self::Js,
			_ => Self::Other(lower),
		}
	}
}

impl From<String> for AssetKind {
	fn from(value: String) -> Self {
		Self::from(value.as_str())
	}
}

impl From<AssetKind> for String {
	fn from(value: AssetKind) -> Self {
		value.as_str().to_string()
	}
}

impl fmt::Display for AssetKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Options parsed from a directive's inline JSON.
///
/// ```json
/// {
///   "src": "*.js",
///   "basePath": "lib",
///   "baseUri": "/static",
///   "concat": { "active": true, "separator": "\n" },
///   "cache": { "active": true, "type": "md5" }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectiveOptions {
	/// Glob pattern of the files to include.
	pub src: String,
	/// Root directory joined with `src`.
	#[serde(default)]
	pub base_path: Option<String>,
	/// Public path prefix substituted for `base_path` in the generated markup.
	#[serde(default)]
	pub base_uri: Option<String>,
	/// Markup template overriding the default for the directive's kind.
	#[serde(default)]
	pub template: Option<String>,
	#[serde(default)]
	pub concat: Option<ConcatOptions>,
	#[serde(default)]
	pub cache: Option<CacheOptions>,
	/// Replace the directive and its markers with the literal markup.
	#[serde(default)]
	pub remove_this_comment: bool,
}

impl DirectiveOptions {
	/// The base path with back-slashes normalized to forward slashes.
	pub fn normalized_base_path(&self) -> Option<String> {
		self.base_path
			.as_deref()
			.filter(|base| !base.is_empty())
			.map(|base| base.replace('\\', "/"))
	}

	/// Concatenation options, only when concatenation is active.
	pub fn active_concat(&self) -> Option<&ConcatOptions> {
		self.concat.as_ref().filter(|concat| concat.active)
	}

	/// Cache-busting options, only when cache-busting is active.
	pub fn active_cache(&self) -> Option<&CacheOptions> {
		self.cache.as_ref().filter(|cache| cache.active)
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConcatOptions {
	#[serde(default)]
	pub active: bool,
	/// Destination path template using `%basePath%`, `%type%` and
	/// `%groupName%`.
	#[serde(default)]
	pub save_to: Option<String>,
	/// Inserted between the contents of consecutive files.
	#[serde(default)]
	pub separator: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheOptions {
	#[serde(default)]
	pub active: bool,
	/// Append `?_v=<token>` instead of renaming the file.
	#[serde(default)]
	pub add_query_string: bool,
	#[serde(default, rename = "type")]
	pub hash: HashType,
}

/// How the cache-busting token is derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashType {
	/// MD5 of the file contents.
	Md5,
	/// Current time in milliseconds. Anything other than `md5` falls back to
	/// this.
	#[default]
	#[serde(other)]
	Date,
}

/// One include directive found in a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directive {
	pub kind: AssetKind,
	pub group_name: String,
	pub options: DirectiveOptions,
	/// Span of the start marker.
	pub opening: Position,
	/// Span of the matching end marker, if the document has one.
	pub closing: Option<Position>,
	/// The start marker exactly as written.
	pub raw: String,
}

impl Directive {
	/// The `type:groupName` pair identifying this directive.
	pub fn group(&self) -> String {
		format!("{}:{}", self.kind, self.group_name)
	}

	/// Byte offset where this directive's span ends.
	pub fn end_offset(&self) -> usize {
		self.closing
			.map_or(self.opening.end.offset, |closing| closing.end.offset)
	}

	/// Canonical end marker text for this directive.
	pub fn closing_marker(&self) -> String {
		format!("<!-- /include-{}:{} -->", self.kind, self.group_name)
	}
}

/// An HTML comment with its byte span in the document.
struct Comment<'a> {
	text: &'a str,
	start: usize,
	end: usize,
}

/// Extract HTML comments (`<!-- ... -->`) from raw text. An unterminated
/// comment ends the scan.
fn extract_html_comments(content: &str) -> Vec<Comment<'_>> {
	let bytes = content.as_bytes();
	let open_marker = b"<!--";
	let close_marker = b"-->";
	let mut comments = Vec::new();
	let mut search_from = 0;

	while search_from < bytes.len() {
		let Some(open_offset) = memstr(&bytes[search_from..], open_marker) else {
			break;
		};
		let abs_open = search_from + open_offset;
		let after_open = abs_open + open_marker.len();

		let Some(close_offset) = memstr(&bytes[after_open..], close_marker) else {
			break;
		};
		let abs_close_end = after_open + close_offset + close_marker.len();

		comments.push(Comment {
			text: &content[abs_open..abs_close_end],
			start: abs_open,
			end: abs_close_end,
		});

		search_from = abs_close_end;
	}

	comments
}

fn parse_options(raw: &str, payload: &str) -> IncsrcResult<DirectiveOptions> {
	serde_json::from_str(payload).map_err(|e| {
		IncsrcError::InvalidOptions {
			directive: raw.to_string(),
			reason: e.to_string(),
		}
	})
}

/// Scan a document and return its include directives in document order.
///
/// Each start marker is paired with the nearest following end marker of the
/// same `type:groupName`, ignoring ASCII case. A start marker without an end
/// marker is valid; the rewriter creates the end marker. The scan fails on
/// the first problem: invalid JSON options, an end marker with no open
/// directive, a group declared twice, or directives that overlap.
pub fn scan(content: &str) -> IncsrcResult<Vec<Directive>> {
	let line_table = LineTable::new(content);
	let mut directives: Vec<Directive> = Vec::new();
	let mut pending: Vec<usize> = Vec::new();
	let mut seen_groups: HashSet<(AssetKind, String)> = HashSet::new();

	for comment in extract_html_comments(content) {
		let Some(marker) = classify_comment(comment.text) else {
			continue;
		};
		let position = line_table.position(comment.start, comment.end);

		match marker {
			Marker::Open {
				kind,
				group_name,
				options,
			} => {
				let raw = comment.text.to_string();
				if !seen_groups.insert((kind.clone(), group_name.clone())) {
					return Err(IncsrcError::DuplicateGroup {
						group: format!("{kind}:{group_name}"),
						directive: raw,
					});
				}

				let options = parse_options(&raw, &options)?;
				pending.push(directives.len());
				directives.push(Directive {
					kind,
					group_name,
					options,
					opening: position,
					closing: None,
					raw,
				});
			}
			Marker::Close { kind, group_name } => {
				let matching = pending.iter().rposition(|&idx| {
					directives[idx].kind == kind
						&& directives[idx].group_name.eq_ignore_ascii_case(&group_name)
				});
				let Some(pending_idx) = matching else {
					return Err(IncsrcError::OrphanClosingTag {
						directive: comment.text.to_string(),
					});
				};

				let idx = pending.remove(pending_idx);
				directives[idx].closing = Some(position);
			}
		}
	}

	for pair in directives.windows(2) {
		let (outer, inner) = (&pair[0], &pair[1]);
		if inner.opening.start.offset < outer.end_offset() {
			return Err(IncsrcError::OverlappingDirectives {
				outer: outer.raw.clone(),
				inner: inner.raw.clone(),
			});
		}
	}

	tracing::debug!(count = directives.len(), "scanned include directives");

	Ok(directives)
}
