// error.rs — Error types for the edit engine.

use thiserror::Error;

/// Errors that can occur while applying a batch of edits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    /// An edit's `old_text` does not occur in the content as modified by the
    /// edits before it. The whole batch is abandoned.
    #[error("text to replace not found: {text}")]
    TextNotFound { text: String },

    /// An edit's `old_text` is empty. It would match between every character,
    /// so the batch is rejected before anything is replaced.
    #[error("edit #{index} has an empty old_text")]
    EmptyOldText { index: usize },
}
