use std::fmt::Write;
use std::path::Path;
use std::path::PathBuf;

use tempfile::TempDir;

pub const DRIVER: &str = "use crate::lint::*;

pub fn process_expr_early(expr: &Expr, config: &Config, reports: &mut Vec<Report>) {
	// @early expr calls. Do not remove this comment!
	// @end early expr calls. Do not remove this comment!
}

pub fn process_stmt_early(stmt: &Stmt, config: &Config, reports: &mut Vec<Report>) {
	// @early stmt calls. Do not remove this comment!
	// @end early stmt calls. Do not remove this comment!
}

pub fn process_expr_late(expr: &Expr, config: &Config, reports: &mut Vec<Report>) {
	// @late expr calls. Do not remove this comment!
	// @end late expr calls. Do not remove this comment!
}

pub fn process_stmt_late(stmt: &Stmt, config: &Config, reports: &mut Vec<Report>) {
	// @late stmt calls. Do not remove this comment!
	// @end late stmt calls. Do not remove this comment!
}
";

pub const CONFIG_TEMPLATE: &str = "pub fn default_levels() -> Vec<(String, LintLevel)> {
	vec![
		// @tags
		// @end tags
	]
}
";

pub const README: &str = "# Demo\n\nThe demo linter supports [0 lints] out of the box.\n";

pub const DOCS: &str = "# Lints\n\n| Tag | Default level | Explanation |\n|---|---|---|\n";

/// Source text of a lint unit implementing every pass in `passes`.
pub fn lint_unit(name: &str, tag: &str, level: &str, explanation: &str, passes: &[&str]) -> String {
	let mut unit = format!(
		"use crate::core::*;

pub struct {name};

impl Lint for {name} {{
	fn explanation() -> &'static str {{
		{explanation:?}
	}}

	fn default_level() -> LintLevel {{
		LintLevel::{level}
	}}

	fn tag() -> &'static str {{
		{tag:?}
	}}
}}
"
	);

	for pass in passes {
		let _ = write!(
			unit,
			"\nimpl {pass} for {name} {{\n\tfn visit(&self, node: &Node) {{}}\n}}\n"
		);
	}

	unit
}

/// A temporary project laid out the conventional way: lint units under
/// `src/lint/collection`, a driver with all four hook regions, a config
/// template, a readme and a lint table.
pub struct TestProject {
	dir: TempDir,
}

impl TestProject {
	pub fn new() -> Self {
		let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
		let project = Self { dir };
		project.write("src/lint/collection/.keep", "");
		project.write("src/core/driver.rs", DRIVER);
		project.write("src/core/config.rs", CONFIG_TEMPLATE);
		project.write("README.md", README);
		project.write("LINTS.md", DOCS);
		project
	}

	pub fn path(&self) -> &Path {
		self.dir.path()
	}

	pub fn join(&self, relative: &str) -> PathBuf {
		self.dir.path().join(relative)
	}

	pub fn write(&self, relative: &str, content: &str) {
		let path = self.join(relative);
		if let Some(parent) = path.parent() {
			std::fs::create_dir_all(parent).unwrap_or_else(|e| panic!("create_dir_all: {e}"));
		}
		std::fs::write(&path, content).unwrap_or_else(|e| panic!("write {relative}: {e}"));
	}

	pub fn read(&self, relative: &str) -> String {
		std::fs::read_to_string(self.join(relative))
			.unwrap_or_else(|e| panic!("read {relative}: {e}"))
	}

	/// Write a lint unit into the lint directory.
	pub fn add_lint(&self, file: &str, content: &str) {
		self.write(&format!("src/lint/collection/{file}"), content);
	}

	/// Configure the `Warning`/`Error` level set while keeping every default
	/// target.
	pub fn use_warning_levels(&self) {
		self.write(
			"lintsync.toml",
			r#"readme = "README.md"
docs = "LINTS.md"

[levels]
enum = "LintLevel"
variants = ["Warning", "Error"]

[aggregator]
path = "src/lint/collection.rs"

[config_template]
path = "src/core/config.rs"

[[hooks]]
name = "early expr"
marker = "impl EarlyExprPass for"
function = "run_early_lint_on_expr"
args = "expr, config, reports"
files = ["src/core/driver.rs"]

[[hooks]]
name = "early stmt"
marker = "impl EarlyStmtPass for"
function = "run_early_lint_on_stmt"
args = "stmt, config, reports"
files = ["src/core/driver.rs"]

[[hooks]]
name = "late expr"
marker = "impl LateExprPass for"
function = "run_late_lint_on_expr"
args = "expr, config, reports"
files = ["src/core/driver.rs"]

[[hooks]]
name = "late stmt"
marker = "impl LateStmtPass for"
function = "run_late_lint_on_stmt"
args = "stmt, config, reports"
files = ["src/core/driver.rs"]
"#,
		);
	}
}
