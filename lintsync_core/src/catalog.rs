use std::collections::HashMap;
use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;

use derive_more::Deref;
use globset::Glob;
use globset::GlobSet;
use globset::GlobSetBuilder;
use ignore::gitignore::Gitignore;
use ignore::gitignore::GitignoreBuilder;

use crate::SyncError;
use crate::SyncResult;
use crate::config::SyncConfig;
use crate::extract::Extractor;
use crate::extract::LintMetadata;

/// One discovered lint unit.
#[derive(Debug, Clone, PartialEq, Eq, Deref)]
pub struct LintRecord {
	/// Module name the unit is declared under, taken from its file stem.
	pub source_id: String,
	/// Path of the unit relative to the lint directory.
	pub path: PathBuf,
	#[deref]
	pub metadata: LintMetadata,
}

impl LintRecord {
	pub fn new(path: impl Into<PathBuf>, metadata: LintMetadata) -> Self {
		let path = path.into();
		let source_id = path
			.file_stem()
			.map(|stem| stem.to_string_lossy().into_owned())
			.unwrap_or_default();

		Self {
			source_id,
			path,
			metadata,
		}
	}

	/// Whether the unit lives in a subdirectory of the lint directory.
	pub fn is_nested(&self) -> bool {
		self.path
			.parent()
			.is_some_and(|parent| !parent.as_os_str().is_empty())
	}
}

/// Every lint unit of one run, sorted by name.
///
/// The catalog is rebuilt from scratch on each run and is immutable once
/// constructed.
#[derive(Debug, Clone, Default, Deref)]
pub struct Catalog {
	records: Vec<LintRecord>,
}

impl Catalog {
	/// Validate and order a set of records.
	///
	/// Names, tags and module ids must each be unique. Records are sorted by
	/// name so the generated output does not depend on traversal order.
	pub fn from_records(mut records: Vec<LintRecord>) -> SyncResult<Self> {
		records.sort_by(|a, b| a.path.cmp(&b.path));

		let mut names: HashMap<&str, &LintRecord> = HashMap::new();
		let mut tags: HashMap<&str, &LintRecord> = HashMap::new();
		let mut modules: HashMap<&str, &LintRecord> = HashMap::new();

		for record in &records {
			if let Some(existing) = names.insert(record.name.as_str(), record) {
				return Err(SyncError::DuplicateName {
					name: record.name.clone(),
					first_file: existing.path.display().to_string(),
					second_file: record.path.display().to_string(),
				});
			}

			if let Some(existing) = tags.insert(record.tag.as_str(), record) {
				return Err(SyncError::DuplicateTag {
					tag: record.tag.clone(),
					first: existing.name.clone(),
					second: record.name.clone(),
				});
			}

			if let Some(existing) = modules.insert(record.source_id.as_str(), record) {
				return Err(SyncError::DuplicateModule {
					module: record.source_id.clone(),
					first_file: existing.path.display().to_string(),
					second_file: record.path.display().to_string(),
				});
			}
		}

		records.sort_by(|a, b| a.name.cmp(&b.name));
		Ok(Self { records })
	}

	pub fn records(&self) -> &[LintRecord] {
		&self.records
	}

	/// Records participating in the hook with the given id, in catalog order.
	pub fn implementing<'a>(&'a self, hook_id: &'a str) -> impl Iterator<Item = &'a LintRecord> {
		self.records
			.iter()
			.filter(move |record| record.implements(hook_id))
	}

	pub fn find(&self, name: &str) -> Option<&LintRecord> {
		self.records.iter().find(|record| record.name == name)
	}
}

/// Discover every lint unit below the configured lint directory and build the
/// catalog.
///
/// The first unit that fails extraction aborts the build, so no artifact is
/// ever rendered from an incomplete catalog.
pub fn build_catalog(root: &Path, config: &SyncConfig) -> SyncResult<Catalog> {
	let lint_dir = root.join(&config.lints);
	if !lint_dir.is_dir() {
		return Err(SyncError::MissingLintDirectory(
			config.lints.display().to_string(),
		));
	}

	let include = build_glob_set(&config.include)?;
	let exclude = build_exclude_matcher(&lint_dir, &config.exclude)?;
	let files = collect_lint_files(&lint_dir, &include, &exclude)?;
	let extractor = Extractor::new(config);

	let mut records = Vec::with_capacity(files.len());
	for file in files {
		let relative = file.strip_prefix(&lint_dir).unwrap_or(&file).to_path_buf();
		let shown = config.lints.join(&relative);
		let raw_content =
			std::fs::read_to_string(&file).map_err(SyncError::read_file(&shown))?;
		let content = normalize_line_endings(&raw_content);

		let metadata = extractor.extract(&content).map_err(|error| {
			SyncError::Extraction {
				file: shown.display().to_string(),
				error,
			}
		})?;

		tracing::debug!(
			lint = %metadata.name,
			tag = %metadata.tag,
			level = %metadata.default_level,
			hooks = ?metadata.hooks,
			file = %relative.display(),
			"extracted lint"
		);
		records.push(LintRecord::new(relative, metadata));
	}

	Catalog::from_records(records)
}

/// Normalize CRLF line endings to LF.
pub fn normalize_line_endings(content: &str) -> String {
	if content.contains('\r') {
		content.replace("\r\n", "\n").replace('\r', "\n")
	} else {
		content.to_string()
	}
}

fn build_glob_set(patterns: &[String]) -> SyncResult<GlobSet> {
	let mut builder = GlobSetBuilder::new();
	for pattern in patterns {
		let glob = Glob::new(pattern).map_err(|e| {
			SyncError::ConfigParse(format!("invalid include pattern `{pattern}`: {e}"))
		})?;
		builder.add(glob);
	}
	builder
		.build()
		.map_err(|e| SyncError::ConfigParse(format!("failed to build include rules: {e}")))
}

/// Build a `Gitignore` matcher from the `exclude` patterns. These follow
/// `.gitignore` syntax relative to the lint directory.
fn build_exclude_matcher(lint_dir: &Path, patterns: &[String]) -> SyncResult<Gitignore> {
	let mut builder = GitignoreBuilder::new(lint_dir);
	for pattern in patterns {
		builder.add_line(None, pattern).map_err(|e| {
			SyncError::ConfigParse(format!("invalid exclude pattern `{pattern}`: {e}"))
		})?;
	}
	builder
		.build()
		.map_err(|e| SyncError::ConfigParse(format!("failed to build exclude rules: {e}")))
}

fn collect_lint_files(
	lint_dir: &Path,
	include: &GlobSet,
	exclude: &Gitignore,
) -> SyncResult<Vec<PathBuf>> {
	let mut files = Vec::new();
	let mut visited_dirs = HashSet::new();
	walk_dir(lint_dir, include, exclude, &mut files, &mut visited_dirs)?;
	// Traversal order is platform dependent; the catalog re-sorts by name but
	// error reporting should be stable too.
	files.sort();
	Ok(files)
}

fn walk_dir(
	dir: &Path,
	include: &GlobSet,
	exclude: &Gitignore,
	files: &mut Vec<PathBuf>,
	visited_dirs: &mut HashSet<PathBuf>,
) -> SyncResult<()> {
	let canonical = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
	if !visited_dirs.insert(canonical) {
		return Err(SyncError::SymlinkCycle {
			path: dir.display().to_string(),
		});
	}

	for entry in std::fs::read_dir(dir).map_err(SyncError::read_file(dir))? {
		let path = entry.map_err(SyncError::read_file(dir))?.path();
		let is_dir = path.is_dir();

		if exclude.matched(&path, is_dir).is_ignore() {
			continue;
		}

		if is_dir {
			walk_dir(&path, include, exclude, files, visited_dirs)?;
		} else if path
			.file_name()
			.is_some_and(|name| include.is_match(Path::new(name)))
		{
			files.push(path);
		}
	}

	Ok(())
}
