//! Filesystem access used by the rewriter.
//!
//! All reads, writes and glob expansions go through [`AssetFs`] so the engine
//! can run against the real disk ([`DiskFs`]) or an in-memory tree
//! ([`MemoryFs`]).

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::collections::HashSet;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use ignore::gitignore::Gitignore;
use ignore::gitignore::GitignoreBuilder;

use crate::IncsrcError;
use crate::IncsrcResult;
use crate::resolver::build_matcher;
use crate::resolver::is_hidden_match;
use crate::resolver::normalize_path;
use crate::resolver::split_pattern;

/// Synchronous file access for the rewrite pipeline. Paths are forward-slash
/// strings, relative to the implementation's root unless absolute.
pub trait AssetFs {
	/// Expand a glob pattern into the matching files, sorted.
	fn glob(&self, pattern: &str) -> IncsrcResult<Vec<String>>;

	/// Read a whole file.
	fn read(&self, path: &str) -> io::Result<Vec<u8>>;

	/// Write a whole file, creating missing parent directories and replacing
	/// any existing file.
	fn write(&self, path: &str, contents: &[u8]) -> io::Result<()>;
}

/// [`AssetFs`] backed by the local disk. Relative paths resolve against
/// `root`.
#[derive(Debug, Clone)]
pub struct DiskFs {
	root: PathBuf,
	include_hidden: bool,
	exclude: Gitignore,
}

impl DiskFs {
	/// An empty `root` stands for the current directory.
	pub fn new(root: impl Into<PathBuf>) -> Self {
		let root: PathBuf = root.into();
		Self {
			root: if root.as_os_str().is_empty() {
				PathBuf::from(".")
			} else {
				root
			},
			include_hidden: false,
			exclude: Gitignore::empty(),
		}
	}

	/// Match entries whose name starts with `.`.
	#[must_use]
	pub fn with_include_hidden(mut self, include_hidden: bool) -> Self {
		self.include_hidden = include_hidden;
		self
	}

	/// Drop glob matches covered by these gitignore-style patterns.
	pub fn with_exclude_patterns(mut self, patterns: &[String]) -> IncsrcResult<Self> {
		self.exclude = build_exclude_matcher(&self.root, patterns)?;
		Ok(self)
	}

	fn full_path(&self, path: &str) -> PathBuf {
		self.root.join(path)
	}

	fn is_excluded(&self, path: &str) -> bool {
		if self.exclude.is_empty() {
			return false;
		}

		let full_path = self.full_path(path);
		// Parent lookup is only defined for paths below the matcher's root.
		if full_path.starts_with(self.exclude.path()) {
			self.exclude
				.matched_path_or_any_parents(&full_path, false)
				.is_ignore()
		} else {
			self.exclude.matched(&full_path, false).is_ignore()
		}
	}
}

/// Build a `Gitignore` matcher from exclude patterns, rooted at `root`.
fn build_exclude_matcher(root: &Path, patterns: &[String]) -> IncsrcResult<Gitignore> {
	let mut builder = GitignoreBuilder::new(root);
	for pattern in patterns {
		builder.add_line(None, pattern).map_err(|e| {
			IncsrcError::ConfigParse(format!("invalid exclude pattern `{pattern}`: {e}"))
		})?;
	}
	builder
		.build()
		.map_err(|e| IncsrcError::ConfigParse(format!("failed to build exclude rules: {e}")))
}

impl AssetFs for DiskFs {
	fn glob(&self, pattern: &str) -> IncsrcResult<Vec<String>> {
		let split = split_pattern(pattern);

		if split.is_literal {
			let exists = self.full_path(pattern).is_file();
			return Ok(if exists && !self.is_excluded(pattern) {
				vec![pattern.to_string()]
			} else {
				Vec::new()
			});
		}

		let matcher = build_matcher(pattern)?;
		let (walk_root, prefix) = if split.base.is_empty() && pattern.starts_with('/') {
			(PathBuf::from("/"), "/".to_string())
		} else if split.base.is_empty() {
			(self.root.clone(), String::new())
		} else {
			(self.full_path(&split.base), format!("{}/", split.base))
		};

		let mut candidates = Vec::new();
		let mut visited_dirs = HashSet::new();
		walk_dir(
			&walk_root,
			"",
			1,
			split.max_depth,
			&mut candidates,
			&mut visited_dirs,
		)?;

		let mut files: Vec<String> = candidates
			.into_iter()
			.map(|relative| format!("{prefix}{relative}"))
			.filter(|path| matcher.is_match(path))
			.filter(|path| self.include_hidden || !is_hidden_match(path, pattern))
			.filter(|path| !self.is_excluded(path))
			.collect();
		files.sort();

		Ok(files)
	}

	fn read(&self, path: &str) -> io::Result<Vec<u8>> {
		std::fs::read(self.full_path(path))
	}

	fn write(&self, path: &str, contents: &[u8]) -> io::Result<()> {
		let full_path = self.full_path(path);
		if let Some(parent) = full_path.parent() {
			std::fs::create_dir_all(parent)?;
		}
		std::fs::write(full_path, contents)
	}
}

/// Collect regular files below `dir` as `/`-joined paths relative to the walk
/// root, descending at most `max_depth` levels. Symlinked directories that
/// loop back are visited once.
fn walk_dir(
	dir: &Path,
	relative: &str,
	depth: usize,
	max_depth: Option<usize>,
	files: &mut Vec<String>,
	visited_dirs: &mut HashSet<PathBuf>,
) -> IncsrcResult<()> {
	if max_depth.is_some_and(|max| depth > max) || !dir.is_dir() {
		return Ok(());
	}

	let canonical = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
	if !visited_dirs.insert(canonical) {
		return Ok(());
	}

	let entries = match std::fs::read_dir(dir) {
		Ok(entries) => entries,
		Err(e) => {
			tracing::debug!(dir = %dir.display(), error = %e, "skipping unreadable directory");
			return Ok(());
		}
	};

	for entry in entries {
		let entry = match entry {
			Ok(entry) => entry,
			Err(e) => {
				tracing::debug!(dir = %dir.display(), error = %e, "skipping unreadable entry");
				continue;
			}
		};
		let path = entry.path();
		let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
			continue;
		};
		let child = if relative.is_empty() {
			name.to_string()
		} else {
			format!("{relative}/{name}")
		};

		if path.is_dir() {
			walk_dir(&path, &child, depth + 1, max_depth, files, visited_dirs)?;
		} else if path.is_file() {
			files.push(child);
		}
	}

	Ok(())
}

/// [`AssetFs`] over an in-memory map of path to contents. Paths are stored
/// normalized, so `./lib/a.js` and `lib/a.js` name the same file.
#[derive(Debug, Default)]
pub struct MemoryFs {
	files: RefCell<BTreeMap<String, Vec<u8>>>,
}

impl MemoryFs {
	pub fn new() -> Self {
		Self::default()
	}

	/// Add a file, replacing any existing contents.
	#[must_use]
	pub fn with_file(self, path: &str, contents: impl AsRef<[u8]>) -> Self {
		self.insert(path, contents);
		self
	}

	pub fn insert(&self, path: &str, contents: impl AsRef<[u8]>) {
		self.files
			.borrow_mut()
			.insert(normalize_path(path), contents.as_ref().to_vec());
	}

	/// Contents of a file as text, if it exists.
	pub fn read_to_string(&self, path: &str) -> Option<String> {
		self.files
			.borrow()
			.get(&normalize_path(path))
			.map(|contents| String::from_utf8_lossy(contents).into_owned())
	}

	pub fn contains(&self, path: &str) -> bool {
		self.files.borrow().contains_key(&normalize_path(path))
	}

	pub fn paths(&self) -> Vec<String> {
		self.files.borrow().keys().cloned().collect()
	}
}

impl AssetFs for MemoryFs {
	fn glob(&self, pattern: &str) -> IncsrcResult<Vec<String>> {
		let pattern = normalize_path(pattern);
		let matcher = build_matcher(&pattern)?;

		Ok(self
			.files
			.borrow()
			.keys()
			.filter(|path| matcher.is_match(path.as_str()))
			.filter(|path| !is_hidden_match(path, &pattern))
			.cloned()
			.collect())
	}

	fn read(&self, path: &str) -> io::Result<Vec<u8>> {
		self.files
			.borrow()
			.get(&normalize_path(path))
			.cloned()
			.ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("`{path}` not found")))
	}

	fn write(&self, path: &str, contents: &[u8]) -> io::Result<()> {
		self.insert(path, contents);
		Ok(())
	}
}

/// [`AssetFs`] that reads through to `inner` but keeps every write in memory.
/// Files written earlier in a rewrite stay visible to later reads and globs,
/// while the underlying filesystem is never modified.
#[derive(Debug)]
pub struct OverlayFs<F> {
	inner: F,
	writes: MemoryFs,
}

impl<F: AssetFs> OverlayFs<F> {
	pub fn new(inner: F) -> Self {
		Self {
			inner,
			writes: MemoryFs::new(),
		}
	}

	/// Paths that would have been written, sorted.
	pub fn pending_writes(&self) -> Vec<String> {
		self.writes.paths()
	}
}

impl<F: AssetFs> AssetFs for OverlayFs<F> {
	fn glob(&self, pattern: &str) -> IncsrcResult<Vec<String>> {
		let mut files = self.inner.glob(pattern)?;
		files.extend(self.writes.glob(pattern)?);
		files.sort();
		files.dedup();

		Ok(files)
	}

	fn read(&self, path: &str) -> io::Result<Vec<u8>> {
		if self.writes.contains(path) {
			return self.writes.read(path);
		}

		self.inner.read(path)
	}

	fn write(&self, path: &str, contents: &[u8]) -> io::Result<()> {
		self.writes.write(path, contents)
	}
}
