//! # warden-edit
//!
//! Exact-text edit engine for Warden.
//!
//! An edit batch is applied as a pure function of the original content: the
//! caller reads the file, hands the text here, and only writes back if the
//! whole batch succeeded. The diff compares the original lines with the
//! modified lines, never the original with itself.
//!
//! ## Key components
//!
//! - [`Edit`] — one `old_text` → `new_text` replacement
//! - [`apply_edits`] — ordered, all-or-nothing application
//! - [`render_unified_diff`] — fenced unified diff with three lines of context
//! - [`EditError`] — `TextNotFound` names the first edit that missed

pub mod diff;
pub mod edit;
pub mod error;

pub use diff::{render_unified_diff, CONTEXT_LINES};
pub use edit::{apply_edits, split_lines, Edit, EditOutcome};
pub use error::EditError;
