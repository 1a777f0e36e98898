//! Pure renderers turning a [`Catalog`] into generated text.
//!
//! Every renderer walks the catalog in order, so output is sorted by lint
//! name and identical across runs over the same lint units.

use std::fmt::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;

use crate::SyncError;
use crate::SyncResult;
use crate::catalog::Catalog;
use crate::catalog::LintRecord;
use crate::config::HookConfig;

/// Header row separator after which documentation rows are generated.
pub const TABLE_BOUNDARY: &str = "|---|---|---|";

/// Matches the lint counter phrase with any count, e.g. `supports [12 lints]`.
pub static COUNTER_PATTERN: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"supports \[\d+ lints?\]").expect("valid regex"));

/// How the aggregator's `mod` declarations reach the lint directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModulePaths {
	/// The lint directory relative to the directory holding the aggregator.
	/// `#[path]` attributes are resolved from there.
	pub prefix: PathBuf,
	/// Whether a bare `mod name;` in the aggregator resolves into the lint
	/// directory.
	pub implicit: bool,
}

impl ModulePaths {
	/// Work out how `aggregator` reaches `lints`. Both paths are relative to
	/// the project root.
	///
	/// `src/lint/collection.rs` and `src/lint/collection/mod.rs` both own the
	/// `src/lint/collection` directory, so flat units there need no
	/// attribute. Any other pairing gets a `#[path]` on every unit.
	pub fn new(aggregator: &Path, lints: &Path) -> SyncResult<Self> {
		let parent = aggregator.parent().unwrap_or_else(|| Path::new(""));
		let owns_directory = aggregator
			.file_name()
			.is_some_and(|name| ["mod.rs", "lib.rs", "main.rs"].iter().any(|n| name == *n));
		let module_dir = if owns_directory {
			parent.to_path_buf()
		} else {
			parent.join(aggregator.file_stem().unwrap_or_default())
		};

		let prefix = pathdiff::diff_paths(lints, parent).ok_or_else(|| {
			SyncError::ConfigParse(format!(
				"the lint directory `{}` cannot be reached from the aggregator `{}`",
				lints.display(),
				aggregator.display()
			))
		})?;

		Ok(Self {
			prefix,
			implicit: module_dir == lints,
		})
	}

	/// The `#[path]` value for `record`, if its `mod` declaration needs one.
	pub fn attribute(&self, record: &LintRecord) -> Option<String> {
		if self.implicit && !record.is_nested() {
			return None;
		}

		let path = self.prefix.join(&record.path);
		let parts: Vec<_> = path
			.components()
			.map(|component| component.as_os_str().to_string_lossy())
			.collect();
		Some(parts.join("/"))
	}
}

/// Declare and re-export every lint module.
pub fn render_aggregator(catalog: &Catalog, header: &str, paths: &ModulePaths) -> String {
	let mut output = String::new();
	if !header.is_empty() {
		output.push_str(header);
		output.push('\n');
	}

	for record in catalog.iter() {
		if let Some(path) = paths.attribute(record) {
			let _ = writeln!(output, "#[path = \"{path}\"]");
		}
		let _ = writeln!(output, "mod {};", record.source_id);
		let _ = writeln!(output, "pub use {}::{};", record.source_id, record.name);
	}

	output
}

/// The documentation table boundary followed by one row per lint.
pub fn render_doc_table(catalog: &Catalog) -> String {
	let mut output = format!("{TABLE_BOUNDARY}\n");
	for record in catalog.iter() {
		let _ = writeln!(
			output,
			"| {} | {} | {}",
			escape_table_cell(&record.tag),
			record.default_level,
			escape_table_cell(&record.explanation),
		);
	}
	output
}

/// Escape characters that would break a pipe-delimited table row.
pub fn escape_table_cell(value: &str) -> String {
	let mut escaped = String::with_capacity(value.len());
	let mut previous = None;
	for ch in value.chars() {
		match ch {
			'|' if previous != Some('\\') => escaped.push_str("\\|"),
			'\n' | '\r' => escaped.push(' '),
			_ => escaped.push(ch),
		}
		previous = Some(ch);
	}
	escaped
}

pub fn lint_count(catalog: &Catalog) -> usize {
	catalog.len()
}

/// The counter phrase for the current catalog.
pub fn render_counter(catalog: &Catalog) -> String {
	format!("supports [{} lints]", lint_count(catalog))
}

/// Dispatch calls for every lint participating in `hook`.
///
/// An empty block would be indistinguishable from a failed extraction, so a
/// placeholder comment is emitted when no lint participates.
pub fn render_calls(catalog: &Catalog, hook: &HookConfig, indent: &str) -> String {
	let id = hook.id();
	let mut output = String::new();
	for record in catalog.implementing(&id) {
		let _ = writeln!(
			output,
			"{indent}{}::<{}>({});",
			hook.function, record.name, hook.args
		);
	}

	if output.is_empty() {
		let _ = writeln!(output, "{indent}{}", placeholder(hook));
	}

	output
}

/// The comment written into a call region no lint participates in.
pub fn placeholder(hook: &HookConfig) -> String {
	format!("// No lints currently implement the {} hook.", hook.name)
}

/// Matches the lint name inside a dispatch call rendered for `hook`.
pub fn call_pattern(hook: &HookConfig) -> Regex {
	let pattern = format!(r"{}\s*::\s*<\s*(\w+)\s*>", regex::escape(&hook.function));
	Regex::new(&pattern).expect("escaped function name is a valid regex")
}

/// One `(tag, level)` pair per lint, with no filtering.
pub fn render_config_entries(catalog: &Catalog, indent: &str) -> String {
	let mut output = String::new();
	for record in catalog.iter() {
		let _ = writeln!(
			output,
			"{indent}({:?}.into(), {}),",
			record.tag, record.default_level
		);
	}
	output
}

/// Matches the tag of a rendered configuration entry.
pub static CONFIG_ENTRY_PATTERN: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r#"\(\s*"((?:[^"\\]|\\.)*)"\s*\.into\(\)"#).expect("valid regex"));
