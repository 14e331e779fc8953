use std::error::Error;
use std::path::Path;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use incsrc_cli::Commands;
use incsrc_cli::IncsrcCli;
use incsrc_cli::OutputFormat;
use incsrc_core::AssetFs;
use incsrc_core::CONFIG_FILE_CANDIDATES;
use incsrc_core::IncsrcConfig;
use incsrc_core::IncsrcError;
use incsrc_core::OverlayFs;
use incsrc_core::ProcessOptions;
use incsrc_core::RewriteResult;
use incsrc_core::RewriteWarning;
use incsrc_core::rewrite;
use incsrc_core::scan;
use owo_colors::OwoColorize;
use serde::Serialize;
use similar::ChangeTag;
use similar::TextDiff;
use tracing_subscriber::EnvFilter;

/// File argument that stands for stdin.
const STDIN_PATH: &str = "-";

/// Environment variable holding the log filter.
const LOG_ENV: &str = "INCSRC_LOG";

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,yellow) => {
		if color_enabled() {
			format!("{}", $text.yellow())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = IncsrcCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	init_tracing(args.verbose);

	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	let result = match &args.command {
		Some(Commands::Init) => run_init(&args),
		Some(Commands::Update { files, dry_run }) => run_update(&args, files, *dry_run),
		Some(Commands::Check {
			files,
			diff,
			format,
		}) => run_check(&args, files, *diff, *format),
		Some(Commands::List { files }) => run_list(&args, files),
		None => {
			eprintln!("No subcommand specified. Run `incsrc --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(e) = result {
		match e.downcast::<IncsrcError>() {
			Ok(incsrc_err) => {
				let report: miette::Report = (*incsrc_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

/// `--verbose` turns on debug logs for the library. Otherwise `INCSRC_LOG`
/// decides and only errors are logged; warnings are printed by the commands.
fn init_tracing(verbose: bool) {
	let filter = if verbose {
		EnvFilter::new("incsrc_core=debug")
	} else {
		EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("error"))
	};

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.without_time()
		.init();
}

fn resolve_root(args: &IncsrcCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

fn load_options(root: &Path) -> Result<ProcessOptions, Box<dyn Error>> {
	let options = ProcessOptions::load(root)?;
	tracing::debug!(
		root = %root.display(),
		templates = options.templates.len(),
		exclude_patterns = options.exclude_patterns.len(),
		"loaded options"
	);

	Ok(options)
}

/// A document named on the command line.
struct Document {
	/// Display name, relative to the root.
	label: String,
	/// `None` when the document came from stdin.
	path: Option<PathBuf>,
	content: String,
}

fn is_stdin(file: &Path) -> bool {
	file.as_os_str() == STDIN_PATH
}

fn read_document(root: &Path, file: &Path) -> Result<Document, Box<dyn Error>> {
	if is_stdin(file) {
		let content = std::io::read_to_string(std::io::stdin())?;
		return Ok(Document {
			label: "<stdin>".to_string(),
			path: None,
			content,
		});
	}

	let path = if file.is_absolute() {
		file.to_path_buf()
	} else {
		root.join(file)
	};
	let bytes = std::fs::read(&path)
		.map_err(|e| format!("failed to read {}: {e}", path.display()))?;
	let content = String::from_utf8(bytes).map_err(|e| {
		IncsrcError::UnsupportedInput(format!("{} is not valid UTF-8: {e}", path.display()))
	})?;

	Ok(Document {
		label: make_relative(&path, root),
		path: Some(path),
		content,
	})
}

fn rewrite_document(
	document: &Document,
	options: &ProcessOptions,
	fs: &dyn AssetFs,
) -> Result<RewriteResult, Box<dyn Error>> {
	rewrite(&document.content, options, fs).map_err(|e| {
		eprintln!("{} failed to rewrite {}", colored!("error:", red), document.label);
		e.into()
	})
}

fn run_init(args: &IncsrcCli) -> Result<(), Box<dyn Error>> {
	let root = resolve_root(args);

	if let Some(existing) = IncsrcConfig::resolve_path(&root) {
		println!("Config file already exists: {}", existing.display());
		return Ok(());
	}

	let config_name = CONFIG_FILE_CANDIDATES[0];
	let sample_config = "# incsrc configuration\n\n# Default markup per asset kind. `%filePath%` \
	                     is replaced with each\n# file's path.\n# [templates]\n# js = '<script \
	                     src=\"%filePath%\" defer></script>'\n# mjs = '<script type=\"module\" \
	                     src=\"%filePath%\"></script>'\n\n# Gitignore-style patterns removed \
	                     from every glob result.\n# [exclude]\n# patterns = \
	                     [\"**/*.test.js\"]\n\n# Let globs match files and directories \
	                     starting with `.`.\n# include_hidden = false\n";

	std::fs::write(root.join(config_name), sample_config)?;
	println!("Created {config_name}");
	println!();
	println!("Next steps:");
	println!("  1. Add an include directive to a document:");
	println!("     <!-- include-js:vendor({{\"src\": \"*.js\", \"basePath\": \"lib\"}}) -->");
	println!("     <!-- /include-js:vendor -->");
	println!("  2. Run `incsrc update <FILE>` to generate the includes");

	Ok(())
}

fn run_update(args: &IncsrcCli, files: &[PathBuf], dry_run: bool) -> Result<(), Box<dyn Error>> {
	let root = resolve_root(args);
	let options = load_options(&root)?;
	let disk = options.disk_fs()?;
	let preview = OverlayFs::new(disk.clone());
	let fs: &dyn AssetFs = if dry_run { &preview } else { &disk };

	if files.iter().any(|file| is_stdin(file)) {
		if files.len() > 1 {
			return Err("`-` can't be combined with other files".into());
		}

		let document = read_document(&root, &files[0])?;
		let result = rewrite_document(&document, &options, fs)?;
		print_warnings(&document.label, &result.warnings);
		print!("{}", result.content);
		return Ok(());
	}

	let mut changed = Vec::new();
	let mut directive_count = 0;

	for file in files {
		let document = read_document(&root, file)?;
		let result = rewrite_document(&document, &options, fs)?;
		print_warnings(&document.label, &result.warnings);
		directive_count += result.directive_count;

		if args.verbose {
			for written in &result.written_files {
				println!("  concatenated {written}");
			}
		}

		if !result.changed {
			continue;
		}

		if !dry_run {
			if let Some(path) = &document.path {
				std::fs::write(path, &result.content)?;
			}
		}
		changed.push(document.label);
	}

	if changed.is_empty() {
		println!("All include directives are already up to date.");
		return Ok(());
	}

	if dry_run {
		println!("Dry run: would update {} file(s):", changed.len());
		for label in &changed {
			println!("  {label}");
		}
		for path in preview.pending_writes() {
			println!("  {path} (concatenated)");
		}
	} else {
		println!(
			"Updated {} file(s), {directive_count} directive(s) processed.",
			changed.len()
		);

		if args.verbose {
			for label in &changed {
				println!("  {label}");
			}
		}
	}

	Ok(())
}

#[derive(Serialize)]
struct CheckReport<'a> {
	ok: bool,
	stale: Vec<StaleEntry<'a>>,
	warnings: Vec<WarningEntry<'a>>,
}

#[derive(Serialize)]
struct StaleEntry<'a> {
	file: &'a str,
	directives: usize,
}

#[derive(Serialize)]
struct WarningEntry<'a> {
	file: &'a str,
	message: String,
	#[serde(flatten)]
	warning: &'a RewriteWarning,
}

struct StaleDocument {
	label: String,
	directive_count: usize,
	current: String,
	expected: String,
}

fn run_check(
	args: &IncsrcCli,
	files: &[PathBuf],
	show_diff: bool,
	format: OutputFormat,
) -> Result<(), Box<dyn Error>> {
	let root = resolve_root(args);
	let options = load_options(&root)?;
	let fs = OverlayFs::new(options.disk_fs()?);
	let mut stale = Vec::new();
	let mut warnings: Vec<(String, RewriteWarning)> = Vec::new();

	for file in files {
		let document = read_document(&root, file)?;
		let result = rewrite_document(&document, &options, &fs)?;
		warnings.extend(
			result
				.warnings
				.into_iter()
				.map(|warning| (document.label.clone(), warning)),
		);

		if result.changed {
			stale.push(StaleDocument {
				label: document.label,
				directive_count: result.directive_count,
				current: document.content,
				expected: result.content,
			});
		}
	}

	match format {
		OutputFormat::Json => {
			let report = CheckReport {
				ok: stale.is_empty(),
				stale: stale
					.iter()
					.map(|entry| {
						StaleEntry {
							file: &entry.label,
							directives: entry.directive_count,
						}
					})
					.collect(),
				warnings: warnings
					.iter()
					.map(|(file, warning)| {
						WarningEntry {
							file: file.as_str(),
							message: warning.to_string(),
							warning,
						}
					})
					.collect(),
			};
			println!("{}", serde_json::to_string(&report)?);
		}
		OutputFormat::Text => {
			for (label, warning) in &warnings {
				print_warning(label, warning);
			}

			if stale.is_empty() {
				println!("Check passed: all include directives are up to date.");
				return Ok(());
			}

			eprintln!("Check failed.");
			eprintln!();
			eprintln!("Stale files:");
			for entry in &stale {
				eprintln!("  {}", entry.label);
				if show_diff {
					print_diff(&entry.current, &entry.expected);
				}
			}
			eprintln!();
			eprintln!(
				"{} file(s) are out of date. Run `incsrc update` to fix.",
				stale.len()
			);
		}
	}

	if !stale.is_empty() {
		process::exit(1);
	}

	Ok(())
}

fn run_list(args: &IncsrcCli, files: &[PathBuf]) -> Result<(), Box<dyn Error>> {
	let root = resolve_root(args);
	let mut directive_count = 0;
	let mut file_count = 0;

	for file in files {
		let document = read_document(&root, file)?;
		let directives = scan(&document.content).inspect_err(|_| {
			eprintln!("{} failed to scan {}", colored!("error:", red), document.label);
		})?;

		if directives.is_empty() {
			continue;
		}

		if file_count > 0 {
			println!();
		}
		println!("{}", colored!(document.label.as_str(), bold));

		for directive in &directives {
			let mut flags = Vec::new();
			if directive.options.active_concat().is_some() {
				flags.push("concat");
			}
			if directive.options.active_cache().is_some() {
				flags.push("cache");
			}
			if directive.options.remove_this_comment {
				flags.push("remove");
			}
			if directive.closing.is_none() {
				flags.push("no end marker");
			}
			let flags = if flags.is_empty() {
				String::new()
			} else {
				format!(" [{}]", flags.join(", "))
			};

			println!(
				"  {} {}:{} src={}{flags}",
				directive.group(),
				directive.opening.start.line,
				directive.opening.start.column,
				directive.options.src
			);
		}

		directive_count += directives.len();
		file_count += 1;
	}

	if directive_count == 0 {
		println!("No include directives found.");
		return Ok(());
	}

	println!("\n{directive_count} directive(s) in {file_count} file(s)");

	Ok(())
}

fn print_warnings(label: &str, warnings: &[RewriteWarning]) {
	for warning in warnings {
		print_warning(label, warning);
	}
}

fn print_warning(label: &str, warning: &RewriteWarning) {
	eprintln!(
		"{} {label}:{}:{} {warning}",
		colored!("warning:", yellow),
		warning.line,
		warning.column
	);
}

/// Print a unified diff between two strings, colorized.
fn print_diff(current: &str, expected: &str) {
	let diff = TextDiff::from_lines(current, expected);
	for change in diff.iter_all_changes() {
		match change.tag() {
			ChangeTag::Delete => {
				eprint!("  {}", colored!(format!("-{change}"), red));
			}
			ChangeTag::Insert => {
				eprint!("  {}", colored!(format!("+{change}"), green));
			}
			ChangeTag::Equal => {
				eprint!("   {change}");
			}
		}
	}
}

/// Make a path relative to root for display purposes.
fn make_relative(path: &Path, root: &Path) -> String {
	path.strip_prefix(root)
		.unwrap_or(path)
		.display()
		.to_string()
}
