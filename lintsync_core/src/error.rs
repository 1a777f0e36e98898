use std::fmt;
use std::path::Path;

use miette::Diagnostic;
use thiserror::Error;

/// A metadata field that the extractor looks for in a lint unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataField {
	/// The `impl Lint for Name` declaration.
	Declaration,
	/// The `fn tag()` accessor.
	Tag,
	/// The `fn default_level()` accessor.
	DefaultLevel,
	/// The `fn explanation()` accessor.
	Explanation,
	/// The optional `fn hooks()` capability declaration.
	Hooks,
}

impl fmt::Display for MetadataField {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let text = match self {
			Self::Declaration => "`impl Lint for <Name>` declaration",
			Self::Tag => "`fn tag() -> &'static str` accessor",
			Self::DefaultLevel => "`fn default_level()` accessor",
			Self::Explanation => "`fn explanation() -> &'static str` accessor",
			Self::Hooks => "`fn hooks()` declaration",
		};
		f.write_str(text)
	}
}

/// Failure to read the metadata of a single lint unit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ExtractionError {
	#[error("missing {0}")]
	Missing(MetadataField),

	#[error("found {count} matches for the {field}, expected exactly one")]
	Ambiguous { field: MetadataField, count: usize },

	#[error("the lint tag is empty")]
	EmptyTag,

	#[error("unknown default level `{found}`, expected one of: {expected}")]
	UnknownLevel { found: String, expected: String },

	#[error("invalid string literal in the {field}: {reason}")]
	InvalidLiteral { field: MetadataField, reason: String },

	#[error("unknown hook `{hook}`, expected one of: {expected}")]
	UnknownHook { hook: String, expected: String },
}

/// Failure to locate a sentinel region inside a target file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegionError {
	#[error("marker `{0}` not found")]
	NotFound(String),

	#[error("marker `{marker}` appears {count} times")]
	Ambiguous { marker: String, count: usize },

	#[error("marker `{begin}` must be on its own line before `{end}`")]
	Malformed { begin: String, end: String },
}

impl RegionError {
	/// Attach the target file to this error.
	pub fn in_file(self, file: impl Into<String>) -> SyncError {
		let file = file.into();
		match self {
			Self::NotFound(marker) => SyncError::RegionNotFound { file, marker },
			Self::Ambiguous { marker, count } => SyncError::AmbiguousMatch { file, marker, count },
			Self::Malformed { begin, end } => SyncError::MalformedRegion { file, begin, end },
		}
	}
}

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum SyncError {
	#[error("failed to read `{file}`: {source}")]
	#[diagnostic(
		code(lintsync::read_file),
		help("create the file or remove it from lintsync.toml")
	)]
	ReadFile {
		file: String,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to write `{file}`: {source}")]
	#[diagnostic(code(lintsync::write_file))]
	WriteFile {
		file: String,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(lintsync::config_parse),
		help("check that lintsync.toml is valid TOML")
	)]
	ConfigParse(String),

	#[error("lint directory `{0}` does not exist")]
	#[diagnostic(
		code(lintsync::missing_lint_directory),
		help("set `lints` in lintsync.toml to the directory containing your lint units")
	)]
	MissingLintDirectory(String),

	#[error("failed to extract lint metadata from `{file}`: {error}")]
	#[diagnostic(
		code(lintsync::extraction),
		help("every lint unit needs `impl Lint for <Name>`, `fn tag()`, `fn default_level()` and `fn explanation()`")
	)]
	Extraction {
		file: String,
		#[source]
		error: ExtractionError,
	},

	#[error("duplicate lint `{name}`: declared in `{first_file}` and `{second_file}`")]
	#[diagnostic(
		code(lintsync::duplicate_name),
		help("each lint name must be unique across the collection")
	)]
	DuplicateName {
		name: String,
		first_file: String,
		second_file: String,
	},

	#[error("duplicate lint tag `{tag}`: used by `{first}` and `{second}`")]
	#[diagnostic(
		code(lintsync::duplicate_tag),
		help("tags are configuration keys and must be unique")
	)]
	DuplicateTag {
		tag: String,
		first: String,
		second: String,
	},

	#[error("duplicate module `{module}`: `{first_file}` and `{second_file}` share a file stem")]
	#[diagnostic(
		code(lintsync::duplicate_module),
		help("rename one of the files so every lint module is unique")
	)]
	DuplicateModule {
		module: String,
		first_file: String,
		second_file: String,
	},

	#[error("region marker `{marker}` not found in `{file}`")]
	#[diagnostic(
		code(lintsync::region_not_found),
		help("restore the sentinel comment; generated content is only written between its begin/end pair")
	)]
	RegionNotFound { file: String, marker: String },

	#[error("region marker `{marker}` appears {count} times in `{file}`")]
	#[diagnostic(
		code(lintsync::ambiguous_match),
		help("each sentinel comment must appear exactly once per file")
	)]
	AmbiguousMatch {
		file: String,
		marker: String,
		count: usize,
	},

	#[error("malformed region in `{file}`: `{begin}` must be on a line before `{end}`")]
	#[diagnostic(code(lintsync::malformed_region))]
	MalformedRegion {
		file: String,
		begin: String,
		end: String,
	},

	#[error("symlink cycle detected at: `{path}`")]
	#[diagnostic(
		code(lintsync::symlink_cycle),
		help("remove the circular symlink or exclude this path")
	)]
	SymlinkCycle { path: String },
}

impl SyncError {
	/// Wrap a failed read of `file`, shown relative to the project root.
	pub fn read_file(file: &Path) -> impl FnOnce(std::io::Error) -> Self + '_ {
		move |source| {
			Self::ReadFile {
				file: file.display().to_string(),
				source,
			}
		}
	}
}

impl SyncError {
	pub fn write_file(file: &Path) -> impl FnOnce(std::io::Error) -> Self + '_ {
		move |source| {
			Self::WriteFile {
				file: file.display().to_string(),
				source,
			}
		}
	}
}

pub type SyncResult<T> = Result<T, SyncError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
