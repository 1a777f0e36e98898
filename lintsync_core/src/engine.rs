use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::time::UNIX_EPOCH;

use crate::SyncError;
use crate::SyncResult;
use crate::catalog::Catalog;
use crate::catalog::build_catalog;
use crate::config::FormatterConfig;
use crate::config::HookConfig;
use crate::config::RegionTarget;
use crate::config::SyncConfig;
use crate::extract::string_literal_value;
use crate::region::Drift;
use crate::region::referenced_names;
use crate::region::replace_from_marker;
use crate::region::replace_pattern;
use crate::region::replace_region;
use crate::render::CONFIG_ENTRY_PATTERN;
use crate::render::COUNTER_PATTERN;
use crate::render::ModulePaths;
use crate::render::TABLE_BOUNDARY;
use crate::render::call_pattern;
use crate::render::render_aggregator;
use crate::render::render_calls;
use crate::render::render_config_entries;
use crate::render::render_counter;
use crate::render::render_doc_table;

/// A loaded configuration together with the catalog it describes, ready for
/// checking or updating.
#[derive(Debug)]
pub struct SyncContext {
	/// Project root every configured path is relative to.
	pub root: PathBuf,
	pub config: SyncConfig,
	pub catalog: Catalog,
}

/// Load the project config (or the default layout) and build the catalog.
pub fn load_context(root: &Path) -> SyncResult<SyncContext> {
	let config = SyncConfig::load_or_default(root)?;
	load_context_with_config(root, config)
}

/// Build the catalog for an explicit config.
pub fn load_context_with_config(root: &Path, config: SyncConfig) -> SyncResult<SyncContext> {
	let catalog = build_catalog(root, &config)?;
	tracing::debug!(lints = catalog.len(), "built lint catalog");

	Ok(SyncContext {
		root: root.to_path_buf(),
		config,
		catalog,
	})
}

/// The kinds of generated artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ArtifactKind {
	Aggregator,
	Counter,
	DocTable,
	HookCalls,
	ConfigTemplate,
}

impl fmt::Display for ArtifactKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let text = match self {
			Self::Aggregator => "module aggregator",
			Self::Counter => "lint counter",
			Self::DocTable => "documentation table",
			Self::HookCalls => "hook calls",
			Self::ConfigTemplate => "configuration template",
		};
		f.write_str(text)
	}
}

/// One artifact rendered into one file.
#[derive(Debug, Clone)]
pub struct ArtifactReport {
	pub kind: ArtifactKind,
	/// Path relative to the project root.
	pub file: PathBuf,
	/// Region the artifact was written into, e.g. `early expr calls`.
	pub region: Option<String>,
}

/// Drift observed in one region before it was replaced.
#[derive(Debug, Clone)]
pub struct DriftReport {
	/// Path relative to the project root.
	pub file: PathBuf,
	pub region: String,
	pub drift: Drift,
}

/// The planned content of one target file.
#[derive(Debug, Clone)]
pub struct PlannedFile {
	/// Content on disk before the run, `None` for files that do not exist yet.
	pub original: Option<String>,
	pub content: String,
}

impl PlannedFile {
	pub fn is_changed(&self) -> bool {
		self.original.as_deref() != Some(self.content.as_str())
	}
}

/// Result of planning every artifact for a project.
#[derive(Debug)]
pub struct UpdateResult {
	/// Every touched target file keyed by absolute path, changed or not.
	pub files: BTreeMap<PathBuf, PlannedFile>,
	/// Artifacts in the order they were rendered.
	pub artifacts: Vec<ArtifactReport>,
	/// Regions whose referenced lints differ from the catalog.
	pub drift: Vec<DriftReport>,
	pub lint_count: usize,
}

impl UpdateResult {
	/// Files whose planned content differs from disk.
	pub fn updated_files(&self) -> impl Iterator<Item = (&PathBuf, &PlannedFile)> {
		self.files.iter().filter(|(_, file)| file.is_changed())
	}

	pub fn updated_count(&self) -> usize {
		self.updated_files().count()
	}

	pub fn is_up_to_date(&self) -> bool {
		self.updated_count() == 0
	}
}

/// A target file that is out of date.
#[derive(Debug)]
pub struct StaleEntry {
	/// Absolute path of the file.
	pub file: PathBuf,
	/// Content currently on disk (empty when missing).
	pub current_content: String,
	pub expected_content: String,
}

/// Result of checking a project for stale generated content.
#[derive(Debug)]
pub struct CheckResult {
	pub stale: Vec<StaleEntry>,
	pub drift: Vec<DriftReport>,
}

impl CheckResult {
	/// Returns true if every target file is up to date.
	pub fn is_ok(&self) -> bool {
		self.stale.is_empty()
	}
}

struct Planner<'a> {
	root: &'a Path,
	files: BTreeMap<PathBuf, PlannedFile>,
	artifacts: Vec<ArtifactReport>,
	drift: Vec<DriftReport>,
}

impl<'a> Planner<'a> {
	fn new(root: &'a Path) -> Self {
		Self {
			root,
			files: BTreeMap::new(),
			artifacts: Vec::new(),
			drift: Vec::new(),
		}
	}

	fn load(&mut self, file: &Path) -> SyncResult<&mut PlannedFile> {
		match self.files.entry(self.root.join(file)) {
			Entry::Occupied(entry) => Ok(entry.into_mut()),
			Entry::Vacant(entry) => {
				let content =
					std::fs::read_to_string(entry.key()).map_err(SyncError::read_file(file))?;
				Ok(entry.insert(PlannedFile {
					original: Some(content.clone()),
					content,
				}))
			}
		}
	}

	/// Rewrite the in-memory content of `file`, returning whatever `edit`
	/// reports alongside the new text.
	fn edit<T>(
		&mut self,
		file: &Path,
		edit: impl FnOnce(&str) -> SyncResult<(String, T)>,
	) -> SyncResult<T> {
		let planned = self.load(file)?;
		let (content, output) = edit(&planned.content)?;
		planned.content = content;
		Ok(output)
	}

	fn overwrite(&mut self, file: &Path, content: String) -> SyncResult<()> {
		let path = self.root.join(file);
		let original = match std::fs::read_to_string(&path) {
			Ok(existing) => Some(existing),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
			Err(e) => return Err(SyncError::read_file(file)(e)),
		};
		self.files.insert(path, PlannedFile { original, content });
		Ok(())
	}

	fn record(&mut self, kind: ArtifactKind, file: &Path, region: Option<String>) {
		self.artifacts.push(ArtifactReport {
			kind,
			file: file.to_path_buf(),
			region,
		});
	}

	fn record_drift(&mut self, file: &Path, region: &str, drift: Drift) {
		for name in &drift.removed {
			tracing::info!(file = %file.display(), "Removing '{name}' from the {region}");
		}
		for name in &drift.added {
			tracing::info!(file = %file.display(), "Adding '{name}' to the {region}");
		}

		if !drift.is_empty() {
			self.drift.push(DriftReport {
				file: file.to_path_buf(),
				region: region.to_string(),
				drift,
			});
		}
	}
}

/// Compute the content of every target file for the current catalog.
///
/// Nothing is written. Every target is planned before any file changes so
/// that a missing or malformed region anywhere aborts the whole run instead
/// of leaving targets out of step with each other.
pub fn compute_updates(ctx: &SyncContext) -> SyncResult<UpdateResult> {
	let SyncContext {
		root,
		config,
		catalog,
	} = ctx;
	let mut planner = Planner::new(root);

	if let Some(aggregator) = &config.aggregator {
		let paths = ModulePaths::new(&aggregator.path, &config.lints)?;
		let content = render_aggregator(catalog, &aggregator.header, &paths);
		planner.overwrite(&aggregator.path, content)?;
		planner.record(ArtifactKind::Aggregator, &aggregator.path, None);
	}

	let counter = render_counter(catalog);
	if let Some(readme) = &config.readme {
		planner.edit(readme, |text| {
			let content = replace_pattern(text, &COUNTER_PATTERN, &counter)
				.map_err(|e| e.in_file(readme.display().to_string()))?;
			Ok((content, ()))
		})?;
		planner.record(ArtifactKind::Counter, readme, None);
	}

	if let Some(docs) = &config.docs {
		let table = render_doc_table(catalog);
		let had_counter = planner.edit(docs, |text| {
			let (content, _) = replace_from_marker(text, TABLE_BOUNDARY, &table)
				.map_err(|e| e.in_file(docs.display().to_string()))?;
			if COUNTER_PATTERN.is_match(&content) {
				let content = replace_pattern(&content, &COUNTER_PATTERN, &counter)
					.map_err(|e| e.in_file(docs.display().to_string()))?;
				return Ok((content, true));
			}
			Ok((content, false))
		})?;
		planner.record(ArtifactKind::DocTable, docs, None);
		if had_counter {
			planner.record(ArtifactKind::Counter, docs, None);
		}
	}

	for hook in &config.hooks {
		for file in &hook.files {
			plan_hook(&mut planner, catalog, hook, file)?;
		}
	}

	if let Some(template) = &config.config_template {
		plan_config_template(&mut planner, catalog, template)?;
	}

	for (path, file) in &planner.files {
		tracing::debug!(file = %path.display(), changed = file.is_changed(), "planned file");
	}

	Ok(UpdateResult {
		files: planner.files,
		artifacts: planner.artifacts,
		drift: planner.drift,
		lint_count: catalog.len(),
	})
}

fn plan_hook(
	planner: &mut Planner<'_>,
	catalog: &Catalog,
	hook: &HookConfig,
	file: &Path,
) -> SyncResult<()> {
	let id = hook.id();
	let region = format!("{} calls", hook.name);
	let pattern = call_pattern(hook);
	let expected: Vec<String> = catalog
		.implementing(&id)
		.map(|record| record.name.clone())
		.collect();

	let old_body = planner.edit(file, |text| {
		replace_region(text, &hook.begin_marker(), &hook.end_marker(), |found| {
			render_calls(catalog, hook, &found.indent)
		})
		.map_err(|e| e.in_file(file.display().to_string()))
	})?;

	let drift = Drift::between(&referenced_names(&old_body, &pattern), &expected);
	planner.record_drift(file, &region, drift);
	planner.record(ArtifactKind::HookCalls, file, Some(region));
	Ok(())
}

fn plan_config_template(
	planner: &mut Planner<'_>,
	catalog: &Catalog,
	template: &RegionTarget,
) -> SyncResult<()> {
	let file = template.path.as_path();
	let expected: Vec<String> = catalog.iter().map(|record| record.tag.clone()).collect();

	let old_body = planner.edit(file, |text| {
		replace_region(text, &template.begin, &template.end, |found| {
			render_config_entries(catalog, &found.indent)
		})
		.map_err(|e| e.in_file(file.display().to_string()))
	})?;

	let previous: Vec<String> = referenced_names(&old_body, &CONFIG_ENTRY_PATTERN)
		.into_iter()
		.map(|escaped| string_literal_value(&format!("\"{escaped}\"")).unwrap_or(escaped))
		.collect();
	let drift = Drift::between(&previous, &expected);
	planner.record_drift(file, "tags", drift);
	planner.record(ArtifactKind::ConfigTemplate, file, None);
	Ok(())
}

/// Check whether every generated artifact is up to date.
pub fn check_project(ctx: &SyncContext) -> SyncResult<CheckResult> {
	let updates = compute_updates(ctx)?;
	let stale = updates
		.files
		.into_iter()
		.filter(|(_, file)| file.is_changed())
		.map(|(path, file)| {
			StaleEntry {
				file: path,
				current_content: file.original.unwrap_or_default(),
				expected_content: file.content,
			}
		})
		.collect();

	Ok(CheckResult {
		stale,
		drift: updates.drift,
	})
}

/// Write every changed file back to disk, returning the number written.
///
/// Each file is written to a temporary sibling and renamed into place so no
/// reader ever observes a partially written file.
pub fn write_updates(updates: &UpdateResult) -> SyncResult<usize> {
	let mut written = 0;
	for (path, file) in updates.updated_files() {
		write_atomic(path, &file.content)?;
		tracing::debug!(file = %path.display(), "wrote file");
		written += 1;
	}
	Ok(written)
}

fn write_atomic(path: &Path, content: &str) -> SyncResult<()> {
	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent).map_err(SyncError::write_file(path))?;
	}

	let file_name = path
		.file_name()
		.map(|name| name.to_string_lossy().into_owned())
		.unwrap_or_default();
	let temp_path = path.with_file_name(format!(
		".{file_name}.tmp-{}-{}",
		std::process::id(),
		std::time::SystemTime::now()
			.duration_since(UNIX_EPOCH)
			.map_or(0, |duration| duration.as_nanos())
	));

	std::fs::write(&temp_path, content).map_err(SyncError::write_file(path))?;
	if let Err(e) = std::fs::rename(&temp_path, path) {
		let _ = std::fs::remove_file(&temp_path);
		return Err(SyncError::write_file(path)(e));
	}

	Ok(())
}

/// Run the external formatter from the project root.
///
/// The formatter is fire-and-forget: failures are logged and reported through
/// the return value but never undo the files already written.
pub fn run_formatter(root: &Path, formatter: &FormatterConfig) -> bool {
	let Some((program, args)) = formatter.command.split_first() else {
		tracing::warn!("formatter command is empty");
		return false;
	};

	match Command::new(program).args(args).current_dir(root).status() {
		Ok(status) if status.success() => {
			tracing::debug!(command = ?formatter.command, "formatter finished");
			true
		}
		Ok(status) => {
			tracing::warn!(command = ?formatter.command, %status, "formatter exited unsuccessfully");
			false
		}
		Err(e) => {
			tracing::warn!(command = ?formatter.command, error = %e, "failed to run formatter");
			false
		}
	}
}

/// Run the whole pipeline: build the catalog, plan every artifact, write the
/// changed files and optionally run the configured formatter.
pub fn sync_project(root: &Path, format: bool) -> SyncResult<UpdateResult> {
	let ctx = load_context(root)?;
	let updates = compute_updates(&ctx)?;
	write_updates(&updates)?;

	if format {
		if let Some(formatter) = &ctx.config.formatter {
			run_formatter(&ctx.root, formatter);
		}
	}

	Ok(updates)
}
