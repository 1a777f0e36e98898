mod common;

use lintsync_cli::Commands;
use lintsync_cli::LintsyncCli;
use lintsync_cli::OutputFormat;
use lintsync_core::AnyEmptyResult;
use lintsync_core::AnyResult;
use predicates::prelude::PredicateBooleanExt;
use rstest::rstest;
use serde_json::Value;

fn synced_project() -> AnyResult<tempfile::TempDir> {
	let tmp = tempfile::tempdir()?;
	common::setup_project(tmp.path())?;
	common::lintsync_cmd()
		.arg("update")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();
	Ok(tmp)
}

#[test]
fn check_passes_when_up_to_date() -> AnyEmptyResult {
	let tmp = synced_project()?;

	common::lintsync_cmd()
		.arg("check")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("up to date"));

	Ok(())
}

#[test]
fn check_fails_when_stale() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::setup_project(tmp.path())?;

	common::lintsync_cmd()
		.arg("check")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(1)
		.stderr(
			predicates::str::contains("Check failed.")
				.and(predicates::str::contains("src/core/driver.rs"))
				.and(predicates::str::contains("+ AlphaLint (early expr calls)"))
				.and(predicates::str::contains("5 file(s) are out of date")),
		);

	Ok(())
}

#[test]
fn check_detects_new_lint_after_update() -> AnyEmptyResult {
	let tmp = synced_project()?;
	common::write(
		tmp.path(),
		"src/lint/collection/gamma_lint.rs",
		&common::lint_unit("GammaLint", "gamma", "Allow", "checks gamma", &["LateStmtPass"]),
	)?;

	common::lintsync_cmd()
		.arg("check")
		.arg("--diff")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(1)
		.stderr(
			predicates::str::contains("+ GammaLint (late stmt calls)")
				.and(predicates::str::contains(
					"-\t// No lints currently implement the late stmt hook.",
				))
				.and(predicates::str::contains(
					"+\trun_late_lint_on_stmt::<GammaLint>(stmt, config, reports);",
				))
				.and(predicates::str::contains("+| gamma | LintLevel::Allow | checks gamma")),
		);

	Ok(())
}

#[test]
fn check_json_output() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::setup_project(tmp.path())?;

	let output = common::lintsync_cmd()
		.arg("check")
		.arg("--format")
		.arg("json")
		.arg("--path")
		.arg(tmp.path())
		.output()?;
	assert_eq!(output.status.code(), Some(1));

	let json: Value = serde_json::from_slice(&output.stdout)?;
	assert_eq!(json["ok"], Value::Bool(false));
	let stale = json["stale"].as_array().cloned().unwrap_or_default();
	assert_eq!(stale.len(), 5);

	let driver = stale
		.iter()
		.find(|entry| entry["file"] == "src/core/driver.rs")
		.cloned()
		.unwrap_or(Value::Null);
	assert_eq!(driver["drift"][0]["region"], "early expr calls");
	assert_eq!(driver["drift"][0]["added"][0], "AlphaLint");

	Ok(())
}

#[test]
fn check_github_output() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::setup_project(tmp.path())?;

	common::lintsync_cmd()
		.arg("check")
		.arg("--format")
		.arg("github")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(1)
		.stdout(predicates::str::contains("::warning file=README.md::"));

	Ok(())
}

#[test]
fn check_reports_config_errors() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::setup_project(tmp.path())?;
	common::write(tmp.path(), "lintsync.toml", "[levels]\nvariants = []\n")?;

	common::lintsync_cmd()
		.arg("check")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("lintsync::config_parse"));

	Ok(())
}

#[rstest]
#[case::text(&["check"], OutputFormat::Text, false)]
#[case::json(&["check", "--format", "json"], OutputFormat::Json, false)]
#[case::github_diff(&["check", "--diff", "--format", "github"], OutputFormat::Github, true)]
fn check_arguments_parse(
	#[case] argv: &[&str],
	#[case] expected_format: OutputFormat,
	#[case] expected_diff: bool,
) {
	use clap::Parser;

	let cli = LintsyncCli::parse_from(std::iter::once("lintsync").chain(argv.iter().copied()));
	let Some(Commands::Check { diff, format }) = cli.command else {
		panic!("expected the check command");
	};
	assert_eq!(diff, expected_diff);
	assert_eq!(format, expected_format);
}
