use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Generate script and stylesheet includes from glob patterns.",
	long_about = "incsrc keeps the asset includes of your HTML documents generated from glob \
	              patterns.\n\nAn include directive is an HTML comment naming a glob:\n  <!-- \
	              include-js:vendor({\"src\": \"*.js\", \"basePath\": \"lib\"}) -->\n  <!-- \
	              /include-js:vendor -->\n\nEvery run regenerates the markup between the \
	              markers.\n\nQuick start:\n  incsrc init                Create an incsrc.toml \
	              file\n  incsrc update index.html   Rewrite include directives\n  incsrc check \
	              index.html    Verify everything is up to date"
)]
pub struct IncsrcCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to the project root directory. Directive paths and the files
	/// passed to each command resolve against it.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Enable verbose output and debug logging.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Initialize incsrc in a project by creating a sample `incsrc.toml`.
	///
	/// If a config file already exists, this command is a no-op and exits
	/// successfully.
	Init,
	/// Rewrite the include directives of each document in place.
	///
	/// Resolves every directive's glob, writes concatenated files, and
	/// replaces the markup between each directive's markers. Pass `-` to
	/// read a document from stdin and print the result to stdout.
	Update {
		/// Documents to rewrite.
		#[arg(required = true)]
		files: Vec<PathBuf>,

		/// Preview changes without writing documents or concatenated files.
		#[arg(long, default_value_t = false)]
		dry_run: bool,
	},
	/// Check that every include directive is up to date.
	///
	/// Nothing is written. Exits with a non-zero status code if any document
	/// would change, which makes it a good fit for CI pipelines.
	Check {
		/// Documents to check.
		#[arg(required = true)]
		files: Vec<PathBuf>,

		/// Show a diff for each stale document.
		#[arg(long, default_value_t = false)]
		diff: bool,

		/// Output format for check results. Use `text` for human-readable
		/// output or `json` for programmatic consumption.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
	/// List the include directives found in each document.
	List {
		/// Documents to scan.
		#[arg(required = true)]
		files: Vec<PathBuf>,
	},
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text output with colors and formatting.
	Text,
	/// JSON output for programmatic consumption. Each stale entry includes
	/// the file path and its directive count.
	Json,
}
