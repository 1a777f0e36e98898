//! `lintsync_core` keeps every piece of hand-maintained boilerplate around a
//! lint collection in step with the lints themselves. Each lint lives in its
//! own source file and declares its name, tag, default level and explanation.
//! From those files this crate regenerates the module aggregator, the lint
//! counter and documentation table, the per-hook dispatch calls and the
//! default configuration entries.
//!
//! ## Processing Pipeline
//!
//! ```text
//! lint unit files
//!   → Extractor (reads name, tag, level, explanation and hooks from each file)
//!   → Catalog (validates uniqueness, sorts by name)
//!   → Renderers (aggregator, counter, doc table, hook calls, config entries)
//!   → Region injector (replaces the body between sentinel comments)
//!   → Engine (plans every file in memory, then writes only what changed)
//! ```
//!
//! ## Modules
//!
//! - [`config`]: configuration loading from `lintsync.toml`, with a default
//!   layout used when no config file exists.
//! - [`extract`]: metadata extraction from a single lint unit.
//! - [`catalog`]: lint discovery and the validated, ordered catalog.
//! - [`render`]: pure renderers for every generated artifact.
//! - [`region`]: sentinel region lookup and replacement.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lintsync_core::{check_project, compute_updates, load_context, write_updates};
//! use std::path::Path;
//!
//! let ctx = load_context(Path::new(".")).unwrap();
//!
//! // Check for stale generated content
//! let result = check_project(&ctx).unwrap();
//! if !result.is_ok() {
//!     eprintln!("{} stale file(s) found", result.stale.len());
//! }
//!
//! // Regenerate everything
//! let updates = compute_updates(&ctx).unwrap();
//! write_updates(&updates).unwrap();
//! ```

pub use catalog::*;
pub use config::*;
pub use engine::*;
pub use error::*;
pub use extract::*;
pub use region::*;
pub use render::*;

pub mod catalog;
pub mod config;
mod engine;
mod error;
pub mod extract;
pub mod region;
pub mod render;

#[cfg(test)]
mod __fixtures;
