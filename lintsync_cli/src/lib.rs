use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Keep a lint collection's boilerplate in sync with the lints themselves.",
	long_about = "lintsync regenerates the code and documentation that enumerate a lint \
	              collection: the module aggregator, the lint counter and documentation \
	              table, the per-hook dispatch calls and the default configuration \
	              entries.\n\nGenerated content is only ever written between sentinel \
	              comments, so everything else in a file stays hand-written.\n\nQuick \
	              start:\n  lintsync update  Regenerate every artifact\n  lintsync check   \
	              Verify everything is up to date\n  lintsync list    Show the lint catalog"
)]
pub struct LintsyncCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to the project root directory.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Regenerate every artifact from the current lint units.
	///
	/// Rebuilds the catalog from scratch, plans the new content of every
	/// target file in memory and only then writes the files that changed. A
	/// missing or duplicated sentinel in any target aborts the run before
	/// anything is written.
	Update {
		/// Print which files would change without writing them.
		#[arg(long, default_value_t = false)]
		dry_run: bool,

		/// Skip the configured formatter.
		#[arg(long, default_value_t = false)]
		no_format: bool,
	},
	/// Check that every generated artifact is up to date.
	///
	/// Exits with a non-zero status code if any target file would change.
	/// Ideal for CI pipelines. Use `--diff` to see exactly what changed and
	/// `--format` to control the output style.
	Check {
		/// Show a line diff for each stale file.
		#[arg(long, default_value_t = false)]
		diff: bool,

		/// Output format for check results. Use `text` for human-readable
		/// output, `json` for programmatic consumption, or `github` for
		/// GitHub Actions annotations.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
	/// List every lint in the catalog with its tag, level and hooks.
	List {
		#[arg(long, value_enum, default_value_t = ListOutputFormat::Text)]
		format: ListOutputFormat,
	},
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text output with colors and formatting.
	Text,
	/// JSON output for programmatic consumption. Each stale entry includes
	/// the file path and the drift observed in its regions.
	Json,
	/// GitHub Actions annotation format. Emits `::warning` annotations that
	/// appear inline on pull request diffs.
	Github,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ListOutputFormat {
	/// Human-readable text output.
	Text,
	/// JSON output for programmatic consumption.
	Json,
}
