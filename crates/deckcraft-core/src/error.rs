//! Error types for the editing core.

use crate::graphics::GraphicId;
use crate::slide::SlideId;
use thiserror::Error;

/// Errors surfaced by the editing core.
///
/// Listener misuse and unconvertible graphics are deliberately *not* errors:
/// they are logged and editing continues.
#[derive(Debug, Error)]
pub enum DeckError {
    #[error("Malformed deck data: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Unknown event kind: {0}")]
    UnknownEventKind(String),
    #[error("Slide not found: {0}")]
    SlideNotFound(SlideId),
    #[error("Graphic not found: {0}")]
    GraphicNotFound(GraphicId),
    #[error("Invalid color: {0}")]
    InvalidColor(String),
}

/// Result type for editing-core operations.
pub type DeckResult<T> = Result<T, DeckError>;
