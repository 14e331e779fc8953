use derive_more::Deref;
use derive_more::DerefMut;
use globset::GlobBuilder;
use globset::GlobMatcher;

use crate::IncsrcError;
use crate::IncsrcResult;
use crate::fs::AssetFs;

/// The ordered files a directive resolves to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref, DerefMut)]
pub struct ResolvedFileSet(pub Vec<String>);

impl From<Vec<String>> for ResolvedFileSet {
	fn from(files: Vec<String>) -> Self {
		Self(files)
	}
}

impl ResolvedFileSet {
	pub fn into_inner(self) -> Vec<String> {
		self.0
	}
}

/// Expand `src` (rooted at `base_path` when given) into the files it matches.
///
/// Nothing matching is not an error; the set is simply empty. The order is
/// the one produced by [`AssetFs::glob`] and duplicates are kept.
pub fn resolve(
	fs: &dyn AssetFs,
	base_path: Option<&str>,
	src: &str,
) -> IncsrcResult<ResolvedFileSet> {
	let pattern = source_pattern(base_path, src);
	let files = fs.glob(&pattern)?;
	tracing::debug!(%pattern, matched = files.len(), "resolved source pattern");

	Ok(ResolvedFileSet(files))
}

/// The glob pattern for a directive: `base_path/src` normalized when a base
/// path is set, otherwise `src` verbatim.
pub fn source_pattern(base_path: Option<&str>, src: &str) -> String {
	match base_path.filter(|base| !base.is_empty()) {
		Some(base) => join_paths(&base.replace('\\', "/"), src),
		None => src.to_string(),
	}
}

/// Join two forward-slash paths and normalize the result.
pub fn join_paths(base: &str, path: &str) -> String {
	normalize_path(&format!("{base}/{path}"))
}

/// Normalize a forward-slash path: collapse repeated separators, drop `.`
/// segments and resolve `..` against preceding segments. Back-slashes are
/// treated as separators. A leading `/` and a trailing `/` are kept, and an
/// empty result becomes `.`.
pub fn normalize_path(path: &str) -> String {
	let path = path.replace('\\', "/");
	let is_absolute = path.starts_with('/');
	let has_trailing_slash = path.len() > 1 && path.ends_with('/');
	let mut segments: Vec<&str> = Vec::new();

	for segment in path.split('/') {
		match segment {
			"" | "." => {}
			".." => {
				match segments.last() {
					Some(&last) if last != ".." => {
						segments.pop();
					}
					_ if is_absolute => {}
					_ => segments.push(".."),
				}
			}
			_ => segments.push(segment),
		}
	}

	let mut normalized = segments.join("/");
	if is_absolute {
		normalized.insert(0, '/');
	}
	if normalized.is_empty() {
		return ".".to_string();
	}
	if has_trailing_slash && !normalized.ends_with('/') {
		normalized.push('/');
	}

	normalized
}

/// Characters that make a path segment a glob rather than a literal.
const GLOB_META: &[char] = &['*', '?', '[', '{'];

/// A glob pattern split into its literal leading directory and the pattern
/// segments below it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SplitPattern {
	/// Leading segments without glob syntax, joined with `/`. Empty when the
	/// pattern starts with a glob segment.
	pub base: String,
	/// Maximum directory depth below `base` a match can sit at. `None` when
	/// the pattern contains `**`.
	pub max_depth: Option<usize>,
	/// True when the pattern has no glob syntax at all.
	pub is_literal: bool,
}

pub(crate) fn split_pattern(pattern: &str) -> SplitPattern {
	let segments: Vec<&str> = pattern.split('/').collect();
	let first_glob = segments
		.iter()
		.position(|segment| segment.contains(GLOB_META));

	let Some(first_glob) = first_glob else {
		return SplitPattern {
			base: pattern.to_string(),
			max_depth: Some(0),
			is_literal: true,
		};
	};

	let rest = &segments[first_glob..];
	let max_depth = if rest.iter().any(|segment| segment.contains("**")) {
		None
	} else {
		Some(rest.len())
	};

	SplitPattern {
		base: segments[..first_glob].join("/"),
		max_depth,
		is_literal: false,
	}
}

/// Compile a glob where `*` and `?` never cross a `/`.
pub(crate) fn build_matcher(pattern: &str) -> IncsrcResult<GlobMatcher> {
	GlobBuilder::new(pattern)
		.literal_separator(true)
		.build()
		.map(|glob| glob.compile_matcher())
		.map_err(|e| {
			IncsrcError::InvalidGlob {
				pattern: pattern.to_string(),
				reason: e.to_string(),
			}
		})
}

/// Returns true when any segment of `path` is hidden (starts with `.`) and the
/// pattern doesn't name that segment literally.
pub(crate) fn is_hidden_match(path: &str, pattern: &str) -> bool {
	let pattern_segments: Vec<&str> = pattern.split('/').collect();
	path.split('/').enumerate().any(|(idx, segment)| {
		segment.starts_with('.')
			&& segment != "."
			&& segment != ".."
			&& pattern_segments.get(idx) != Some(&segment)
	})
}
