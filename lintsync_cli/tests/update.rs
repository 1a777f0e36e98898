mod common;

use lintsync_core::AnyEmptyResult;
use predicates::prelude::PredicateBooleanExt;
use similar_asserts::assert_eq;

#[test]
fn update_generates_every_artifact() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::setup_project(tmp.path())?;

	common::lintsync_cmd()
		.arg("update")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(
			predicates::str::contains("Finished updating src/lint/collection.rs")
				.and(predicates::str::contains("Finished updating README.md"))
				.and(predicates::str::contains("Finished updating LINTS.md"))
				.and(predicates::str::contains(
					"Finished updating src/core/driver.rs (early expr calls)",
				))
				.and(predicates::str::contains("Finished updating src/core/config.rs"))
				.and(predicates::str::contains("Updated 5 file(s) for 2 lint(s).")),
		);

	assert_eq!(
		common::read(tmp.path(), "src/lint/collection.rs")?,
		"#![allow(missing_docs)]\nmod alpha_lint;\npub use alpha_lint::AlphaLint;\nmod \
		 beta_lint;\npub use beta_lint::BetaLint;\n"
	);
	assert!(common::read(tmp.path(), "README.md")?.contains("supports [2 lints]"));
	assert!(
		common::read(tmp.path(), "src/core/driver.rs")?
			.contains("\trun_early_lint_on_expr::<AlphaLint>(expr, config, reports);\n")
	);

	Ok(())
}

#[test]
fn update_noop_when_in_sync() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::setup_project(tmp.path())?;

	common::lintsync_cmd()
		.arg("update")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();

	common::lintsync_cmd()
		.arg("update")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(
			predicates::str::contains("Finished updating README.md")
				.and(predicates::str::contains(
					"Finished updating src/core/driver.rs (late stmt calls)",
				))
				.and(predicates::str::contains("already up to date (2 lint(s))"))
				.and(predicates::str::contains("Updated").not()),
		);

	Ok(())
}

#[test]
fn update_dry_run_does_not_write() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::setup_project(tmp.path())?;

	common::lintsync_cmd()
		.arg("update")
		.arg("--dry-run")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(
			predicates::str::contains("Dry run: would update 5 file(s)")
				.and(predicates::str::contains("README.md")),
		);

	assert_eq!(common::read(tmp.path(), "README.md")?, common::README);
	assert!(!tmp.path().join("src/lint/collection.rs").exists());

	Ok(())
}

#[test]
fn update_logs_drift() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::setup_project(tmp.path())?;
	common::write(
		tmp.path(),
		"src/core/driver.rs",
		&common::DRIVER.replace(
			"\t// @end late stmt calls",
			"\trun_late_lint_on_stmt::<RetiredLint>(stmt, config, reports);\n\t// @end late stmt calls",
		),
	)?;

	common::lintsync_cmd()
		.arg("update")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stderr(
			predicates::str::contains("Removing 'RetiredLint' from the late stmt calls")
				.and(predicates::str::contains("Adding 'AlphaLint' to the early expr calls")),
		);

	let driver = common::read(tmp.path(), "src/core/driver.rs")?;
	assert!(!driver.contains("RetiredLint"));
	assert!(driver.contains("\t// No lints currently implement the late stmt hook.\n"));

	Ok(())
}

#[test]
fn update_duplicate_lint_fails_without_writing() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::setup_project(tmp.path())?;
	common::write(
		tmp.path(),
		"src/lint/collection/alpha_again.rs",
		&common::lint_unit("AlphaLint", "alpha_again", "Warn", "again", &[]),
	)?;

	common::lintsync_cmd()
		.arg("update")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(
			predicates::str::contains("duplicate lint `AlphaLint`")
				.and(predicates::str::contains("lintsync::duplicate_name")),
		);

	assert_eq!(common::read(tmp.path(), "README.md")?, common::README);
	assert_eq!(common::read(tmp.path(), "src/core/driver.rs")?, common::DRIVER);

	Ok(())
}

#[test]
fn update_missing_marker_reports_file() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::setup_project(tmp.path())?;
	common::write(
		tmp.path(),
		"src/core/driver.rs",
		&common::DRIVER.replace("\t// @early stmt calls. Do not remove this comment!\n", ""),
	)?;

	common::lintsync_cmd()
		.arg("update")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(
			predicates::str::contains("// @early stmt calls")
				.and(predicates::str::contains("src/core/driver.rs")),
		);

	assert!(!tmp.path().join("src/lint/collection.rs").exists());

	Ok(())
}

#[test]
fn update_missing_target_reports_file() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::setup_project(tmp.path())?;
	std::fs::remove_file(tmp.path().join("LINTS.md"))?;

	common::lintsync_cmd()
		.arg("update")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(
			predicates::str::contains("failed to read `LINTS.md`")
				.and(predicates::str::contains("lintsync::read_file")),
		);

	assert_eq!(common::read(tmp.path(), "README.md")?, common::README);

	Ok(())
}

#[cfg(unix)]
#[test]
fn update_runs_configured_formatter() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::setup_project(tmp.path())?;
	common::write(
		tmp.path(),
		"lintsync.toml",
		"readme = \"README.md\"\n\n[formatter]\ncommand = [\"touch\", \"formatted\"]\n",
	)?;

	common::lintsync_cmd()
		.arg("update")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("Finished updating README.md"));
	assert!(tmp.path().join("formatted").exists());

	common::write(tmp.path(), "README.md", common::README)?;
	std::fs::remove_file(tmp.path().join("formatted"))?;
	common::lintsync_cmd()
		.arg("update")
		.arg("--no-format")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();
	assert!(!tmp.path().join("formatted").exists());

	Ok(())
}

#[cfg(unix)]
#[test]
fn update_formats_when_already_up_to_date() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::setup_project(tmp.path())?;
	common::write(
		tmp.path(),
		"lintsync.toml",
		"readme = \"README.md\"\n\n[formatter]\ncommand = [\"touch\", \"formatted\"]\n",
	)?;

	common::lintsync_cmd()
		.arg("update")
		.arg("--no-format")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();
	assert!(!tmp.path().join("formatted").exists());

	common::lintsync_cmd()
		.arg("update")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(
			predicates::str::contains("Finished updating README.md")
				.and(predicates::str::contains("already up to date")),
		);
	assert!(tmp.path().join("formatted").exists());

	Ok(())
}

#[cfg(unix)]
#[test]
fn update_survives_failing_formatter() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::setup_project(tmp.path())?;
	common::write(
		tmp.path(),
		"lintsync.toml",
		"readme = \"README.md\"\n\n[formatter]\ncommand = [\"false\"]\n",
	)?;

	common::lintsync_cmd()
		.arg("update")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stderr(predicates::str::contains("formatter `false` failed"));

	assert!(common::read(tmp.path(), "README.md")?.contains("supports [2 lints]"));

	Ok(())
}
