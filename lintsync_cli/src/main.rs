use std::path::Path;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use lintsync_cli::Commands;
use lintsync_cli::LintsyncCli;
use lintsync_cli::ListOutputFormat;
use lintsync_cli::OutputFormat;
use lintsync_core::CheckResult;
use lintsync_core::DriftReport;
use lintsync_core::SyncContext;
use lintsync_core::check_project;
use lintsync_core::compute_updates;
use lintsync_core::load_context;
use lintsync_core::run_formatter;
use lintsync_core::write_updates;
use owo_colors::OwoColorize;
use serde::Serialize;
use similar::ChangeTag;
use similar::TextDiff;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

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

/// Log level is `RUST_LOG` when set, `debug` with `--verbose`, and `info`
/// for the core library otherwise.
fn init_tracing(verbose: bool, use_color: bool) {
	let filter = if verbose {
		EnvFilter::new("lintsync_core=debug,lintsync=debug")
	} else {
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lintsync_core=info"))
	};

	tracing_subscriber::registry()
		.with(
			fmt::layer()
				.with_target(false)
				.without_time()
				.with_ansi(use_color)
				.with_writer(std::io::stderr),
		)
		.with(filter)
		.init();
}

fn main() {
	let args = LintsyncCli::parse();

	// Respect NO_COLOR, --no-color and terminals without color support.
	let use_color = !args.no_color
		&& std::env::var_os("NO_COLOR").is_none()
		&& supports_color::on(supports_color::Stream::Stderr).is_some();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	init_tracing(args.verbose, use_color);

	// Install miette's fancy handler for rich error diagnostics.
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
		Some(Commands::Update { dry_run, no_format }) => run_update(&args, *dry_run, *no_format),
		Some(Commands::Check { diff, format }) => run_check(&args, *diff, *format),
		Some(Commands::List { format }) => run_list(&args, *format),
		None => {
			eprintln!("No subcommand specified. Run `lintsync --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(e) = result {
		// Render through miette for help text and error codes.
		match e.downcast::<lintsync_core::SyncError>() {
			Ok(sync_err) => {
				let report: miette::Report = (*sync_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

fn resolve_root(args: &LintsyncCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

fn load(args: &LintsyncCli) -> Result<SyncContext, Box<dyn std::error::Error>> {
	let root = resolve_root(args);
	let ctx = load_context(&root)?;
	tracing::debug!(root = %root.display(), lints = ctx.catalog.len(), "loaded project");
	Ok(ctx)
}

fn run_update(
	args: &LintsyncCli,
	dry_run: bool,
	no_format: bool,
) -> Result<(), Box<dyn std::error::Error>> {
	let ctx = load(args)?;
	let updates = compute_updates(&ctx)?;

	if dry_run {
		if updates.is_up_to_date() {
			println!(
				"Dry run: all generated content is already up to date ({} lint(s)).",
				updates.lint_count
			);
			return Ok(());
		}

		println!(
			"Dry run: would update {} file(s):",
			updates.updated_count()
		);
		for (path, _) in updates.updated_files() {
			println!("  {}", make_relative(path, &ctx.root));
		}
		return Ok(());
	}

	write_updates(&updates)?;

	// Every artifact is reported, including the ones whose content was
	// already current.
	for artifact in &updates.artifacts {
		match &artifact.region {
			Some(region) => {
				println!(
					"{} {} ({region})",
					colored!("Finished updating", green),
					artifact.file.display()
				);
			}
			None => {
				println!(
					"{} {}",
					colored!("Finished updating", green),
					artifact.file.display()
				);
			}
		}
	}

	if !no_format {
		if let Some(formatter) = &ctx.config.formatter {
			if !run_formatter(&ctx.root, formatter) {
				eprintln!(
					"{} formatter `{}` failed; files were written unformatted",
					colored!("warning:", yellow),
					formatter.command.join(" ")
				);
			}
		}
	}

	if updates.is_up_to_date() {
		println!(
			"All generated content is already up to date ({} lint(s)).",
			updates.lint_count
		);
	} else {
		println!(
			"Updated {} file(s) for {} lint(s).",
			updates.updated_count(),
			updates.lint_count
		);
	}

	Ok(())
}

fn run_check(
	args: &LintsyncCli,
	show_diff: bool,
	format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
	let ctx = load(args)?;
	let result = check_project(&ctx)?;

	if result.is_ok() {
		match format {
			OutputFormat::Json => {
				println!("{{\"ok\":true,\"stale\":[]}}");
			}
			OutputFormat::Github => {
				println!("All generated content is up to date.");
			}
			OutputFormat::Text => {
				println!("Check passed: all generated content is up to date.");
			}
		}
		return Ok(());
	}

	let root = &ctx.root;
	match format {
		OutputFormat::Json => {
			let stale: Vec<serde_json::Value> = result
				.stale
				.iter()
				.map(|entry| {
					let rel = make_relative(&entry.file, root);
					let drift: Vec<serde_json::Value> = drift_for(&result, &rel)
						.map(|report| {
							serde_json::json!({
								"region": report.region,
								"added": report.drift.added,
								"removed": report.drift.removed,
							})
						})
						.collect();
					serde_json::json!({
						"file": rel,
						"drift": drift,
					})
				})
				.collect();
			let output = serde_json::json!({
				"ok": false,
				"stale": stale,
			});
			println!("{output}");
		}
		OutputFormat::Github => {
			for entry in &result.stale {
				let rel = make_relative(&entry.file, root);
				println!("::warning file={rel}::Generated lint content in `{rel}` is out of date");
			}
			eprintln!("{}", check_summary(&result));
		}
		OutputFormat::Text => {
			eprintln!("Check failed.");
			eprintln!();
			eprintln!("Stale files:");
			for entry in &result.stale {
				let rel = make_relative(&entry.file, root);
				eprintln!("  {rel}");

				for report in drift_for(&result, &rel) {
					for name in &report.drift.added {
						eprintln!("    {} {name} ({})", colored!("+", green), report.region);
					}
					for name in &report.drift.removed {
						eprintln!("    {} {name} ({})", colored!("-", red), report.region);
					}
				}

				if show_diff {
					print_diff(&entry.current_content, &entry.expected_content);
				}
			}

			eprintln!();
			eprintln!("{}", check_summary(&result));
		}
	}

	process::exit(1);
}

fn drift_for<'a>(result: &'a CheckResult, rel: &'a str) -> impl Iterator<Item = &'a DriftReport> {
	result
		.drift
		.iter()
		.filter(move |report| report.file.display().to_string() == rel)
}

fn check_summary(result: &CheckResult) -> String {
	format!(
		"{} file(s) are out of date. Run `lintsync update` to fix.",
		result.stale.len()
	)
}

#[derive(Serialize)]
struct ListEntry<'a> {
	name: &'a str,
	tag: &'a str,
	level: String,
	explanation: &'a str,
	hooks: Vec<&'a str>,
	file: String,
}

fn run_list(args: &LintsyncCli, format: ListOutputFormat) -> Result<(), Box<dyn std::error::Error>> {
	let ctx = load(args)?;
	let entries: Vec<ListEntry<'_>> = ctx
		.catalog
		.iter()
		.map(|record| {
			ListEntry {
				name: &record.name,
				tag: &record.tag,
				level: record.default_level.to_string(),
				explanation: &record.explanation,
				hooks: record.hooks.iter().map(String::as_str).collect(),
				file: ctx.config.lints.join(&record.path).display().to_string(),
			}
		})
		.collect();

	match format {
		ListOutputFormat::Json => {
			println!("{}", serde_json::to_string(&entries)?);
		}
		ListOutputFormat::Text => {
			if entries.is_empty() {
				println!("No lints found.");
				return Ok(());
			}

			println!("{}", colored!("Lints:", bold));
			for entry in &entries {
				let hooks = if entry.hooks.is_empty() {
					String::new()
				} else {
					format!(" [{}]", entry.hooks.join(", "))
				};
				println!(
					"  {} `{}` {}{hooks} {}",
					entry.name, entry.tag, entry.level, entry.file
				);
			}
			println!("\n{} lint(s)", entries.len());
		}
	}

	Ok(())
}

/// Print a line diff between two strings, colorized.
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
