//! Metadata extraction from the text of a single lint unit.
//!
//! A lint unit is never parsed. The extractor locates a handful of known
//! signatures and reads the literal that follows each one:
//!
//! ```rust,ignore
//! pub struct CollapsableIf;
//! impl Lint for CollapsableIf {
//!     fn explanation() -> &'static str {
//!         "If statements that contain nothing more than another if statement can be collapsed."
//!     }
//!
//!     fn default_level() -> LintLevel {
//!         LintLevel::Warn
//!     }
//!
//!     fn tag() -> &'static str {
//!         "collapsable_if"
//!     }
//! }
//!
//! impl EarlyStmtPass for CollapsableIf { /* ... */ }
//! ```
//!
//! Hook participation is inferred from marker substrings such as
//! `impl EarlyStmtPass for`. A marker inside a comment or string counts too.
//! Units that want to be exact can declare their hooks explicitly, which
//! disables marker detection for that unit:
//!
//! ```rust,ignore
//! fn hooks() -> &'static [&'static str] {
//!     &["early_stmt"]
//! }
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::fmt::Write;
use std::sync::LazyLock;

use regex::Regex;

use crate::ExtractionError;
use crate::MetadataField;
use crate::config::SyncConfig;

static DECLARATION: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"impl\s+Lint\s+for\s+(\w+)").expect("valid regex"));

static TAG_SIGNATURE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"fn\s+tag\s*\(\s*\)\s*->\s*&\s*'static\s+str\s*\{").expect("valid regex")
});

static LEVEL_SIGNATURE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"fn\s+default_level\s*\(\s*\)\s*->\s*[\w:]+\s*\{").expect("valid regex")
});

static EXPLANATION_SIGNATURE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"fn\s+explanation\s*\(\s*\)\s*->\s*&\s*'static\s+str\s*\{").expect("valid regex")
});

static HOOKS_SIGNATURE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"fn\s+hooks\s*\(\s*\)\s*->\s*&\s*'static\s*\[\s*&\s*'static\s+str\s*\]\s*\{")
		.expect("valid regex")
});

/// A double quoted string literal at the start of an accessor body.
static LEADING_LITERAL: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r#"^\s*("(?:[^"\\]|\\(?s:.))*")"#).expect("valid regex"));

static LEADING_PATH: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^\s*((?:\w+\s*::\s*)*\w+)").expect("valid regex"));

static LEADING_SLICE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^\s*&\s*\[([^\]]*)\]").expect("valid regex"));

static LITERAL: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r#""(?:[^"\\]|\\(?s:.))*""#).expect("valid regex"));

/// A lint's default severity, written as a path into the configured level
/// enum (e.g. `LintLevel::Warn`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LintLevel {
	enum_name: String,
	variant: String,
}

impl LintLevel {
	pub fn new(enum_name: impl Into<String>, variant: impl Into<String>) -> Self {
		Self {
			enum_name: enum_name.into(),
			variant: variant.into(),
		}
	}

	pub fn enum_name(&self) -> &str {
		&self.enum_name
	}

	pub fn variant(&self) -> &str {
		&self.variant
	}
}

impl fmt::Display for LintLevel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}::{}", self.enum_name, self.variant)
	}
}

/// Everything a lint unit declares about itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintMetadata {
	/// The type implementing `Lint`.
	pub name: String,
	/// Configuration key, without quotes.
	pub tag: String,
	pub default_level: LintLevel,
	/// Human readable explanation, with escapes resolved.
	pub explanation: String,
	/// Ids of the hook points the lint participates in.
	pub hooks: BTreeSet<String>,
}

impl LintMetadata {
	/// Whether the lint participates in the hook with the given id.
	pub fn implements(&self, hook_id: &str) -> bool {
		self.hooks.contains(hook_id)
	}
}

#[derive(Debug, Clone)]
struct HookMarker {
	id: String,
	marker: String,
}

/// Reads [`LintMetadata`] out of lint unit source text.
#[derive(Debug, Clone)]
pub struct Extractor {
	level_enum: String,
	level_variants: Vec<String>,
	hooks: Vec<HookMarker>,
}

impl Extractor {
	pub fn new(config: &SyncConfig) -> Self {
		Self {
			level_enum: config.levels.enum_name.clone(),
			level_variants: config.levels.variants.clone(),
			hooks: config
				.hooks
				.iter()
				.map(|hook| {
					HookMarker {
						id: hook.id(),
						marker: hook.marker.clone(),
					}
				})
				.collect(),
		}
	}

	/// Extract the declared metadata of one lint unit.
	///
	/// Every required field is located independently so the error names the
	/// exact field that is missing or malformed.
	pub fn extract(&self, text: &str) -> Result<LintMetadata, ExtractionError> {
		let name = extract_name(text)?;

		let tag = string_accessor(text, &TAG_SIGNATURE, MetadataField::Tag)?;
		if tag.trim().is_empty() {
			return Err(ExtractionError::EmptyTag);
		}

		let default_level = self.extract_level(text)?;
		let explanation = string_accessor(text, &EXPLANATION_SIGNATURE, MetadataField::Explanation)?;
		let hooks = self.extract_hooks(text)?;

		Ok(LintMetadata {
			name,
			tag,
			default_level,
			explanation,
			hooks,
		})
	}

	fn extract_level(&self, text: &str) -> Result<LintLevel, ExtractionError> {
		let body = accessor_body(text, &LEVEL_SIGNATURE, MetadataField::DefaultLevel)?;
		let found = LEADING_PATH
			.captures(body)
			.and_then(|captures| captures.get(1))
			.map(|path| path.as_str().split_whitespace().collect::<String>());

		let Some(path) = found else {
			return Err(self.unknown_level(first_line(body)));
		};

		let mut segments = path.rsplit("::");
		let variant = segments.next().unwrap_or_default();
		let enum_name = segments.next().unwrap_or_default();

		if enum_name != self.level_enum || !self.level_variants.iter().any(|v| v == variant) {
			return Err(self.unknown_level(&path));
		}

		Ok(LintLevel::new(enum_name, variant))
	}

	fn unknown_level(&self, found: &str) -> ExtractionError {
		ExtractionError::UnknownLevel {
			found: found.to_string(),
			expected: self
				.level_variants
				.iter()
				.map(|variant| format!("{}::{variant}", self.level_enum))
				.collect::<Vec<_>>()
				.join(", "),
		}
	}

	fn extract_hooks(&self, text: &str) -> Result<BTreeSet<String>, ExtractionError> {
		match optional_accessor_body(text, &HOOKS_SIGNATURE, MetadataField::Hooks)? {
			Some(body) => self.declared_hooks(body),
			None => {
				Ok(self
					.hooks
					.iter()
					.filter(|hook| text.contains(hook.marker.as_str()))
					.map(|hook| hook.id.clone())
					.collect())
			}
		}
	}

	fn declared_hooks(&self, body: &str) -> Result<BTreeSet<String>, ExtractionError> {
		let Some(list) = LEADING_SLICE.captures(body).and_then(|c| c.get(1)) else {
			return Err(ExtractionError::InvalidLiteral {
				field: MetadataField::Hooks,
				reason: "expected a slice of string literals".to_string(),
			});
		};

		let mut hooks = BTreeSet::new();
		for literal in LITERAL.find_iter(list.as_str()) {
			let id = unescape(literal.as_str(), MetadataField::Hooks)?;
			if !self.hooks.iter().any(|hook| hook.id == id) {
				return Err(ExtractionError::UnknownHook {
					hook: id,
					expected: self
						.hooks
						.iter()
						.map(|hook| hook.id.as_str())
						.collect::<Vec<_>>()
						.join(", "),
				});
			}
			hooks.insert(id);
		}

		Ok(hooks)
	}
}

fn extract_name(text: &str) -> Result<String, ExtractionError> {
	let mut matches = DECLARATION.captures_iter(text);
	let Some(first) = matches.next() else {
		return Err(ExtractionError::Missing(MetadataField::Declaration));
	};

	let extra = matches.count();
	if extra > 0 {
		return Err(ExtractionError::Ambiguous {
			field: MetadataField::Declaration,
			count: extra + 1,
		});
	}

	Ok(first[1].to_string())
}

/// The text following the single occurrence of an accessor signature.
fn accessor_body<'t>(
	text: &'t str,
	signature: &Regex,
	field: MetadataField,
) -> Result<&'t str, ExtractionError> {
	optional_accessor_body(text, signature, field)?.ok_or(ExtractionError::Missing(field))
}

fn optional_accessor_body<'t>(
	text: &'t str,
	signature: &Regex,
	field: MetadataField,
) -> Result<Option<&'t str>, ExtractionError> {
	let found: Vec<_> = signature.find_iter(text).collect();
	match found.as_slice() {
		[] => Ok(None),
		[only] => Ok(Some(&text[only.end()..])),
		_ => {
			Err(ExtractionError::Ambiguous {
				field,
				count: found.len(),
			})
		}
	}
}

fn string_accessor(
	text: &str,
	signature: &Regex,
	field: MetadataField,
) -> Result<String, ExtractionError> {
	let body = accessor_body(text, signature, field)?;
	let Some(literal) = LEADING_LITERAL.captures(body).and_then(|c| c.get(1)) else {
		return Err(ExtractionError::InvalidLiteral {
			field,
			reason: format!("expected a string literal, found `{}`", first_line(body)),
		});
	};

	unescape(literal.as_str(), field)
}

/// The value of a double-quoted Rust string literal, quotes included.
pub fn string_literal_value(literal: &str) -> Result<String, snailquote::UnescapeError> {
	snailquote::unescape(&rewrite_rust_escapes(literal))
}

fn unescape(literal: &str, field: MetadataField) -> Result<String, ExtractionError> {
	string_literal_value(literal).map_err(|e| {
		ExtractionError::InvalidLiteral {
			field,
			reason: e.to_string(),
		}
	})
}

/// Rewrite the escapes Rust accepts but shell quoting does not: `\0`,
/// `\xNN` and a backslash before a line break, which swallows the break and
/// the indentation after it.
fn rewrite_rust_escapes(literal: &str) -> String {
	let mut output = String::with_capacity(literal.len());
	let mut chars = literal.chars().peekable();

	while let Some(ch) = chars.next() {
		if ch != '\\' {
			output.push(ch);
			continue;
		}

		match chars.next() {
			Some('0') => output.push_str("\\u{0}"),
			Some('x') => {
				let digits: String = chars.clone().take(2).collect();
				if digits.len() == 2 && digits.chars().all(|c| c.is_ascii_hexdigit()) {
					chars.nth(1);
					let _ = write!(output, "\\u{{{digits}}}");
				} else {
					output.push_str("\\x");
				}
			}
			Some('\n') => {
				while chars.next_if(|c| c.is_whitespace()).is_some() {}
			}
			Some(next) => {
				output.push('\\');
				output.push(next);
			}
			None => output.push('\\'),
		}
	}

	output
}

fn first_line(text: &str) -> &str {
	text.trim_start().lines().next().unwrap_or_default().trim()
}
