use std::fmt;

use serde::Serialize;

use crate::CacheBust;
use crate::Directive;
use crate::IncsrcResult;
use crate::ProcessOptions;
use crate::cache::bust;
use crate::concat::concat;
use crate::fs::AssetFs;
use crate::render::render_block;
use crate::render::template_for;
use crate::resolver::resolve;
use crate::scanner::scan;

/// A problem that didn't stop the rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RewriteWarning {
	/// The `type:groupName` of the directive.
	pub group: String,
	/// 1-indexed line number of the directive's start marker.
	pub line: usize,
	/// 1-indexed column number of the directive's start marker.
	pub column: usize,
	pub kind: WarningKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[non_exhaustive]
pub enum WarningKind {
	/// A path was rendered without its cache-busting token.
	CacheBustFallback { path: String, reason: String },
	/// No template exists for the directive's kind, so nothing was rendered.
	MissingTemplate { kind: String },
}

impl RewriteWarning {
	fn new(directive: &Directive, kind: WarningKind) -> Self {
		Self {
			group: directive.group(),
			line: directive.opening.start.line,
			column: directive.opening.start.column,
			kind,
		}
	}
}

impl fmt::Display for RewriteWarning {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.kind {
			WarningKind::CacheBustFallback { reason, .. } => {
				write!(f, "`{}`: cache busting skipped, {reason}", self.group)
			}
			WarningKind::MissingTemplate { kind } => {
				write!(
					f,
					"`{}`: no template for `{kind}` files, add a `template` option",
					self.group
				)
			}
		}
	}
}

/// Result of rewriting one document.
#[derive(Debug, Clone)]
pub struct RewriteResult {
	/// The rewritten document.
	pub content: String,
	/// Number of directives processed.
	pub directive_count: usize,
	/// Concatenated files written to disk, in directive order.
	pub written_files: Vec<String>,
	pub warnings: Vec<RewriteWarning>,
	/// Whether `content` differs from the input.
	pub changed: bool,
}

impl RewriteResult {
	pub fn has_warnings(&self) -> bool {
		!self.warnings.is_empty()
	}
}

/// Rewrite every include directive in `content` using the local disk rooted
/// at `options.root`.
pub fn process(content: &str, options: &ProcessOptions) -> IncsrcResult<String> {
	let fs = options.disk_fs()?;
	rewrite(content, options, &fs).map(|result| result.content)
}

/// Rewrite every include directive in `content`.
///
/// Directives are handled in document order: each one's files are resolved,
/// optionally concatenated and cache-busted, then rendered into a block that
/// replaces whatever sat between its markers. A directive with
/// `removeThisComment` is replaced by the bare block, markers included.
///
/// Any error aborts the whole document; no partially rewritten text is
/// returned. Text outside directive spans is never modified.
pub fn rewrite(
	content: &str,
	options: &ProcessOptions,
	fs: &dyn AssetFs,
) -> IncsrcResult<RewriteResult> {
	let directives = scan(content)?;
	let mut warnings = Vec::new();
	let mut written_files = Vec::new();
	let mut splices = Vec::with_capacity(directives.len());

	for directive in &directives {
		let block = generate_block(directive, options, fs, &mut warnings, &mut written_files)?;
		splices.push(Splice {
			start: directive.opening.start.offset,
			end: directive.end_offset(),
			replacement: expanded_directive(content, directive, &block),
		});
	}

	// Apply back to front so earlier offsets stay valid.
	let mut result = content.to_string();
	for splice in splices.iter().rev() {
		result.replace_range(splice.start..splice.end, &splice.replacement);
	}

	Ok(RewriteResult {
		changed: result != content,
		content: result,
		directive_count: directives.len(),
		written_files,
		warnings,
	})
}

struct Splice {
	start: usize,
	end: usize,
	replacement: String,
}

/// The text a directive's span is replaced with.
fn expanded_directive(source: &str, directive: &Directive, block: &str) -> String {
	if directive.options.remove_this_comment {
		return block.to_string();
	}

	let closing = directive.closing.map_or_else(
		|| directive.closing_marker(),
		|closing| source[closing.start.offset..closing.end.offset].to_string(),
	);

	if block.is_empty() {
		format!("{}\n{closing}", directive.raw)
	} else {
		format!("{}\n{block}\n{closing}", directive.raw)
	}
}

/// Resolve, concatenate, cache-bust and render the files of one directive.
fn generate_block(
	directive: &Directive,
	options: &ProcessOptions,
	fs: &dyn AssetFs,
	warnings: &mut Vec<RewriteWarning>,
	written_files: &mut Vec<String>,
) -> IncsrcResult<String> {
	let Some(template) = template_for(directive, &options.templates) else {
		tracing::warn!(group = %directive.group(), "no template for directive");
		warnings.push(RewriteWarning::new(
			directive,
			WarningKind::MissingTemplate {
				kind: directive.kind.to_string(),
			},
		));
		return Ok(String::new());
	};

	let base_path = directive.options.normalized_base_path();
	let mut files = resolve(fs, base_path.as_deref(), &directive.options.src)?.into_inner();
	tracing::debug!(group = %directive.group(), files = ?files, "resolved directive files");

	if files.is_empty() {
		return Ok(String::new());
	}

	if directive.options.active_concat().is_some() {
		let destination = concat(fs, &files, directive)?;
		written_files.push(destination.clone());
		files = vec![destination];
	}

	if let Some(cache) = directive.options.active_cache() {
		files = files
			.into_iter()
			.map(|file| {
				match bust(fs, &file, cache.add_query_string, cache.hash) {
					CacheBust::Fallback { path, reason } => {
						tracing::warn!(%path, %reason, "cache busting skipped");
						warnings.push(RewriteWarning::new(
							directive,
							WarningKind::CacheBustFallback {
								path: path.clone(),
								reason,
							},
						));
						path
					}
					busted => busted.into_path(),
				}
			})
			.collect();
	}

	Ok(render_block(template, &files, directive))
}
