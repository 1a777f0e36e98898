//! Sentinel regions inside hand-authored files.
//!
//! A region is the run of whole lines strictly between the line holding the
//! begin marker and the line holding the end marker:
//!
//! ```rust,ignore
//! fn process_expr_early(expr: &mut Expr, reports: &mut Vec<Report>, config: &Config) {
//!     // @early expr calls. Do not remove this comment!
//!     run_early_lint_on_expr::<AndPreference>(expr, config, reports);
//!     // @end early expr calls. Do not remove this comment!
//! }
//! ```
//!
//! Both markers must occur exactly once in the file. Replacement only touches
//! the body, so the markers survive and every byte outside the region is
//! preserved.

use std::collections::BTreeSet;
use std::ops::Range;

use regex::Regex;

use crate::RegionError;

/// A located region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionMatch {
	/// Leading whitespace of the begin marker line, applied to generated lines.
	pub indent: String,
	/// Byte range of the body.
	pub body: Range<usize>,
}

impl RegionMatch {
	pub fn old_body<'t>(&self, text: &'t str) -> &'t str {
		&text[self.body.clone()]
	}
}

/// Locate the region delimited by `begin` and `end`.
pub fn find_region(text: &str, begin: &str, end: &str) -> Result<RegionMatch, RegionError> {
	let begin_at = unique_occurrence(text, begin)?;
	let end_at = unique_occurrence(text, end)?;
	let malformed = || {
		RegionError::Malformed {
			begin: begin.to_string(),
			end: end.to_string(),
		}
	};

	let begin_line_start = line_start(text, begin_at);
	let indent: String = text[begin_line_start..]
		.chars()
		.take_while(|ch| *ch == ' ' || *ch == '\t')
		.collect();

	let Some(newline) = text[begin_at..].find('\n') else {
		return Err(malformed());
	};
	let body_start = begin_at + newline + 1;
	let body_end = line_start(text, end_at);

	if end_at < body_start || body_end < body_start {
		return Err(malformed());
	}

	Ok(RegionMatch {
		indent,
		body: body_start..body_end,
	})
}

/// Replace the body of a region with the output of `render`.
///
/// Returns the new text and the previous body. The previous body is only
/// meant for drift reporting; it is never merged into the new body.
pub fn replace_region(
	text: &str,
	begin: &str,
	end: &str,
	render: impl FnOnce(&RegionMatch) -> String,
) -> Result<(String, String), RegionError> {
	let region = find_region(text, begin, end)?;
	let new_body = render(&region);
	let old_body = region.old_body(text).to_string();
	Ok((splice(text, region.body, &new_body), old_body))
}

/// Replace everything from the single occurrence of `marker` to the end of the
/// file. Used for trailing generated sections such as the lint table.
pub fn replace_from_marker(
	text: &str,
	marker: &str,
	content: &str,
) -> Result<(String, String), RegionError> {
	let start = unique_occurrence(text, marker)?;
	let old = text[start..].to_string();
	Ok((splice(text, start..text.len(), content), old))
}

/// Replace every match of `pattern`. At least one match is required.
pub fn replace_pattern(
	text: &str,
	pattern: &Regex,
	replacement: &str,
) -> Result<String, RegionError> {
	if !pattern.is_match(text) {
		return Err(RegionError::NotFound(pattern.as_str().to_string()));
	}

	Ok(pattern
		.replace_all(text, regex::NoExpand(replacement))
		.into_owned())
}

/// Names referenced by `pattern`'s first capture group, line by line, in order
/// of first appearance.
pub fn referenced_names(body: &str, pattern: &Regex) -> Vec<String> {
	let mut seen = BTreeSet::new();
	body.lines()
		.filter_map(|line| pattern.captures(line))
		.filter_map(|captures| captures.get(1).map(|m| m.as_str().to_string()))
		.filter(|name| seen.insert(name.clone()))
		.collect()
}

/// Difference between the names a region referenced and the names it should
/// reference now.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Drift {
	/// Expected names missing from the old body.
	pub added: Vec<String>,
	/// Names in the old body that are no longer expected.
	pub removed: Vec<String>,
}

impl Drift {
	pub fn between(old: &[String], expected: &[String]) -> Self {
		Self {
			added: expected
				.iter()
				.filter(|name| !old.contains(name))
				.cloned()
				.collect(),
			removed: old
				.iter()
				.filter(|name| !expected.contains(name))
				.cloned()
				.collect(),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.added.is_empty() && self.removed.is_empty()
	}
}

fn unique_occurrence(text: &str, marker: &str) -> Result<usize, RegionError> {
	let mut found = text.match_indices(marker).map(|(index, _)| index);
	let Some(first) = found.next() else {
		return Err(RegionError::NotFound(marker.to_string()));
	};

	let extra = found.count();
	if extra > 0 {
		return Err(RegionError::Ambiguous {
			marker: marker.to_string(),
			count: extra + 1,
		});
	}

	Ok(first)
}

fn line_start(text: &str, offset: usize) -> usize {
	text[..offset].rfind('\n').map_or(0, |index| index + 1)
}

fn splice(text: &str, range: Range<usize>, content: &str) -> String {
	let mut buf = String::with_capacity(text.len() - range.len() + content.len());
	buf.push_str(&text[..range.start]);
	buf.push_str(content);
	buf.push_str(&text[range.end..]);
	buf
}
