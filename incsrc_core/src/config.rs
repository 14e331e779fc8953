use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::IncsrcError;
use crate::IncsrcResult;
use crate::fs::DiskFs;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] =
	["incsrc.toml", ".incsrc.toml", ".config/incsrc.toml"];

/// Configuration loaded from an `incsrc.toml` file.
///
/// ```toml
/// include_hidden = false
///
/// [templates]
/// js = '<script src="%filePath%" defer></script>'
/// mjs = '<script type="module" src="%filePath%"></script>'
///
/// [exclude]
/// patterns = ["**/*.test.js", "vendor/legacy/"]
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct IncsrcConfig {
	/// Default markup templates keyed by asset kind. These replace the
	/// built-in `css` and `js` templates and add templates for other kinds.
	#[serde(default)]
	pub templates: HashMap<String, String>,
	/// Files removed from every resolved set.
	#[serde(default)]
	pub exclude: ExcludeConfig,
	/// When true, globs also match files and directories starting with `.`.
	#[serde(default)]
	pub include_hidden: bool,
}

/// Configuration for excluding files from resolved sets.
///
/// Patterns follow gitignore syntax and are relative to the project root.
#[derive(Debug, Default, Deserialize)]
pub struct ExcludeConfig {
	#[serde(default)]
	pub patterns: Vec<String>,
}

impl IncsrcConfig {
	/// Find the config file for `root`, if any.
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config for `root`. Returns `Ok(None)` when no config file
	/// exists.
	pub fn load(root: &Path) -> IncsrcResult<Option<IncsrcConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let content = std::fs::read_to_string(&config_path)?;
		Self::parse(&content).map(Some)
	}

	pub fn parse(content: &str) -> IncsrcResult<IncsrcConfig> {
		toml::from_str(content).map_err(|e| IncsrcError::ConfigParse(e.to_string()))
	}
}

/// Options applying to every directive of a processed document.
#[derive(Debug, Clone, Default)]
pub struct ProcessOptions {
	/// Directory that relative directive paths resolve against. The default
	/// empty path stands for the current directory.
	pub root: PathBuf,
	/// Default templates keyed by asset kind.
	pub templates: HashMap<String, String>,
	/// Gitignore-style patterns removed from resolved sets.
	pub exclude_patterns: Vec<String>,
	/// Let globs match hidden entries.
	pub include_hidden: bool,
}

impl ProcessOptions {
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self {
			root: root.into(),
			..Self::default()
		}
	}

	/// Construct [`ProcessOptions`] rooted at `root` from an optional config.
	pub fn from_config(root: impl Into<PathBuf>, config: Option<&IncsrcConfig>) -> Self {
		Self {
			root: root.into(),
			templates: config.map(|c| c.templates.clone()).unwrap_or_default(),
			exclude_patterns: config
				.map(|c| c.exclude.patterns.clone())
				.unwrap_or_default(),
			include_hidden: config.is_some_and(|c| c.include_hidden),
		}
	}

	/// Load the config discovered in `root` and build options from it.
	pub fn load(root: impl Into<PathBuf>) -> IncsrcResult<Self> {
		let root = root.into();
		let config = IncsrcConfig::load(&root)?;
		Ok(Self::from_config(root, config.as_ref()))
	}

	/// The disk-backed filesystem these options describe.
	pub fn disk_fs(&self) -> IncsrcResult<DiskFs> {
		DiskFs::new(self.root.clone())
			.with_include_hidden(self.include_hidden)
			.with_exclude_patterns(&self.exclude_patterns)
	}
}
