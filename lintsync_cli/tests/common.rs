#![allow(dead_code)]

use std::path::Path;

use assert_cmd::Command;
use insta_cmd::get_cargo_bin;

pub const DRIVER: &str = "pub fn process_expr_early(expr: &Expr, config: &Config, reports: &mut \
                          Vec<Report>) {
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

pub fn lintsync_cmd() -> Command {
	let mut cmd = Command::new(get_cargo_bin("lintsync"));
	cmd.env("NO_COLOR", "1").env_remove("RUST_LOG");
	cmd
}

pub fn lint_unit(name: &str, tag: &str, level: &str, explanation: &str, passes: &[&str]) -> String {
	let mut unit = format!(
		"pub struct {name};

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
		unit.push_str(&format!("\nimpl {pass} for {name} {{}}\n"));
	}

	unit
}

pub fn write(root: &Path, relative: &str, content: &str) -> std::io::Result<()> {
	let path = root.join(relative);
	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent)?;
	}
	std::fs::write(path, content)
}

pub fn read(root: &Path, relative: &str) -> std::io::Result<String> {
	std::fs::read_to_string(root.join(relative))
}

/// Lay out a project the conventional way with two lints, `AlphaLint`
/// running on early expressions and `BetaLint` with no hooks.
pub fn setup_project(root: &Path) -> std::io::Result<()> {
	write(root, "src/core/driver.rs", DRIVER)?;
	write(root, "src/core/config.rs", CONFIG_TEMPLATE)?;
	write(root, "README.md", README)?;
	write(root, "LINTS.md", DOCS)?;
	write(
		root,
		"src/lint/collection/alpha_lint.rs",
		&lint_unit("AlphaLint", "alpha", "Warn", "checks alpha", &["EarlyExprPass"]),
	)?;
	write(
		root,
		"src/lint/collection/beta_lint.rs",
		&lint_unit("BetaLint", "beta", "Deny", "checks beta", &[]),
	)
}
