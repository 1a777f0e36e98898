use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::SyncError;
use crate::SyncResult;
use crate::render::ModulePaths;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] =
	["lintsync.toml", ".lintsync.toml", ".config/lintsync.toml"];

/// Default directory holding one file per lint unit.
pub const DEFAULT_LINTS_DIR: &str = "src/lint/collection";

/// Configuration loaded from a `lintsync.toml` file.
///
/// ```toml
/// lints = "src/lint/collection"
/// include = ["*.rs"]
/// exclude = ["tests/"]
/// readme = "README.md"
/// docs = "LINTS.md"
///
/// [levels]
/// enum = "LintLevel"
/// variants = ["Allow", "Warn", "Deny"]
///
/// [aggregator]
/// path = "src/lint/collection.rs"
///
/// [config_template]
/// path = "src/core/config.rs"
///
/// [[hooks]]
/// name = "early expr"
/// marker = "impl EarlyExprPass for"
/// function = "run_early_lint_on_expr"
/// args = "expr, config, reports"
/// files = ["src/core/driver.rs"]
///
/// [formatter]
/// command = ["cargo", "fmt"]
/// ```
///
/// Targets that are not listed in the file are not generated. When no config
/// file exists at all, [`SyncConfig::default`] describes the conventional
/// layout.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
	/// Directory containing the lint units, relative to the project root.
	#[serde(default = "default_lints_dir")]
	pub lints: PathBuf,
	/// Glob patterns (matched against file names) selecting lint unit files.
	#[serde(default = "default_include")]
	pub include: Vec<String>,
	/// Gitignore-style patterns for lint directory entries to skip.
	#[serde(default)]
	pub exclude: Vec<String>,
	/// The severity enum every lint's default level must resolve to.
	#[serde(default)]
	pub levels: LevelConfig,
	/// The module aggregator file, fully overwritten on every run.
	#[serde(default)]
	pub aggregator: Option<AggregatorConfig>,
	/// Summary document containing the `supports [N lints]` phrase.
	#[serde(default)]
	pub readme: Option<PathBuf>,
	/// Documentation file containing the `|---|---|---|` lint table.
	#[serde(default)]
	pub docs: Option<PathBuf>,
	/// Region listing every `(tag, level)` pair.
	#[serde(default)]
	pub config_template: Option<RegionTarget>,
	/// Hook points and the orchestrator files carrying their call regions.
	#[serde(default)]
	pub hooks: Vec<HookConfig>,
	/// External formatter run after files are written.
	#[serde(default)]
	pub formatter: Option<FormatterConfig>,
}

impl Default for SyncConfig {
	fn default() -> Self {
		let driver = PathBuf::from("src/core/driver.rs");
		let hook = |name: &str, pass: &str, function: &str, args: &str| {
			HookConfig {
				name: name.to_string(),
				marker: format!("impl {pass} for"),
				function: function.to_string(),
				args: args.to_string(),
				files: vec![driver.clone()],
			}
		};

		Self {
			lints: default_lints_dir(),
			include: default_include(),
			exclude: Vec::new(),
			levels: LevelConfig::default(),
			aggregator: Some(AggregatorConfig {
				path: PathBuf::from("src/lint/collection.rs"),
				header: default_aggregator_header(),
			}),
			readme: Some(PathBuf::from("README.md")),
			docs: Some(PathBuf::from("LINTS.md")),
			config_template: Some(RegionTarget {
				path: PathBuf::from("src/core/config.rs"),
				begin: default_tags_begin(),
				end: default_tags_end(),
			}),
			hooks: vec![
				hook(
					"early expr",
					"EarlyExprPass",
					"run_early_lint_on_expr",
					"expr, config, reports",
				),
				hook(
					"early stmt",
					"EarlyStmtPass",
					"run_early_lint_on_stmt",
					"stmt, config, reports",
				),
				hook(
					"late expr",
					"LateExprPass",
					"run_late_lint_on_expr",
					"expr, config, reports",
				),
				hook(
					"late stmt",
					"LateStmtPass",
					"run_late_lint_on_stmt",
					"stmt, config, reports",
				),
			],
			formatter: None,
		}
	}
}

impl SyncConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if no config file exists.
	pub fn load(root: &Path) -> SyncResult<Option<SyncConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let shown = config_path.strip_prefix(root).unwrap_or(&config_path);
		let content =
			std::fs::read_to_string(&config_path).map_err(SyncError::read_file(shown))?;
		let config = Self::parse(&content)?;
		tracing::debug!(path = %config_path.display(), "loaded config");

		Ok(Some(config))
	}

	/// Load the discovered config or fall back to the conventional layout.
	pub fn load_or_default(root: &Path) -> SyncResult<SyncConfig> {
		Ok(Self::load(root)?.unwrap_or_default())
	}

	/// Parse and validate config file contents.
	pub fn parse(content: &str) -> SyncResult<SyncConfig> {
		let config: SyncConfig =
			toml::from_str(content).map_err(|e| SyncError::ConfigParse(e.to_string()))?;
		config.validate()?;
		Ok(config)
	}

	fn validate(&self) -> SyncResult<()> {
		if self.levels.variants.is_empty() {
			return Err(SyncError::ConfigParse(
				"`levels.variants` must list at least one variant".to_string(),
			));
		}

		let mut seen = Vec::new();
		for hook in &self.hooks {
			let id = hook.id();
			if seen.contains(&id) {
				return Err(SyncError::ConfigParse(format!(
					"hook `{}` is configured more than once",
					hook.name
				)));
			}
			if hook.marker.trim().is_empty() || hook.function.trim().is_empty() {
				return Err(SyncError::ConfigParse(format!(
					"hook `{}` needs a non-empty `marker` and `function`",
					hook.name
				)));
			}
			seen.push(id);
		}

		if let Some(aggregator) = &self.aggregator {
			ModulePaths::new(&aggregator.path, &self.lints)?;
		}

		Ok(())
	}

	/// Identifiers of every configured hook point, in configuration order.
	pub fn hook_ids(&self) -> Vec<String> {
		self.hooks.iter().map(HookConfig::id).collect()
	}
}

/// The enum lint levels are written in, e.g. `LintLevel::Warn`.
#[derive(Debug, Clone, Deserialize)]
pub struct LevelConfig {
	/// Name of the enum type.
	#[serde(rename = "enum", default = "default_level_enum")]
	pub enum_name: String,
	/// Every accepted variant.
	#[serde(default = "default_level_variants")]
	pub variants: Vec<String>,
}

impl Default for LevelConfig {
	fn default() -> Self {
		Self {
			enum_name: default_level_enum(),
			variants: default_level_variants(),
		}
	}
}

/// The generated module aggregator.
#[derive(Debug, Clone, Deserialize)]
pub struct AggregatorConfig {
	pub path: PathBuf,
	/// First line of the generated file.
	#[serde(default = "default_aggregator_header")]
	pub header: String,
}

/// A file containing a single begin/end sentinel region.
#[derive(Debug, Clone, Deserialize)]
pub struct RegionTarget {
	pub path: PathBuf,
	#[serde(default = "default_tags_begin")]
	pub begin: String,
	#[serde(default = "default_tags_end")]
	pub end: String,
}

/// A hook point lints may participate in.
///
/// The call region for a hook named `early expr` is delimited by
/// `// @early expr calls` and `// @end early expr calls`, and each generated
/// line reads `run_early_lint_on_expr::<Name>(expr, config, reports);`.
#[derive(Debug, Clone, Deserialize)]
pub struct HookConfig {
	/// Human name used in the sentinel comments, e.g. `early expr`.
	pub name: String,
	/// Substring whose presence in a lint unit proves it implements the hook.
	pub marker: String,
	/// Dispatcher function called with the lint as its type parameter.
	pub function: String,
	/// Argument list passed to the dispatcher.
	pub args: String,
	/// Orchestrator files carrying this hook's call region.
	#[serde(default)]
	pub files: Vec<PathBuf>,
}

impl HookConfig {
	/// Stable identifier used by explicit `fn hooks()` declarations, e.g.
	/// `early_expr`.
	pub fn id(&self) -> String {
		self.name.split_whitespace().collect::<Vec<_>>().join("_")
	}

	pub fn begin_marker(&self) -> String {
		format!("// @{} calls", self.name)
	}

	pub fn end_marker(&self) -> String {
		format!("// @end {} calls", self.name)
	}
}

/// An external command run from the project root once files are written.
#[derive(Debug, Clone, Deserialize)]
pub struct FormatterConfig {
	pub command: Vec<String>,
}

fn default_lints_dir() -> PathBuf {
	PathBuf::from(DEFAULT_LINTS_DIR)
}

fn default_include() -> Vec<String> {
	vec!["*.rs".to_string()]
}

fn default_level_enum() -> String {
	"LintLevel".to_string()
}

fn default_level_variants() -> Vec<String> {
	["Allow", "Warn", "Deny"]
		.into_iter()
		.map(String::from)
		.collect()
}

fn default_aggregator_header() -> String {
	"#![allow(missing_docs)]".to_string()
}

fn default_tags_begin() -> String {
	"// @tags".to_string()
}

fn default_tags_end() -> String {
	"// @end tags".to_string()
}
