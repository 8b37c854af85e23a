//! Clipboard functionality for copying calculator results.

use arboard::Clipboard;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("failed to access clipboard: {0}")]
    Access(arboard::Error),
    #[error("failed to copy to clipboard: {0}")]
    Copy(arboard::Error),
    #[error("nothing to copy")]
    Empty,
}

/// Copy text to the system clipboard.
pub fn copy_to_clipboard(text: &str) -> Result<(), ClipboardError> {
    if text.is_empty() {
        return Err(ClipboardError::Empty);
    }

    let mut clipboard = Clipboard::new().map_err(ClipboardError::Access)?;
    clipboard
        .set_text(text.to_string())
        .map_err(ClipboardError::Copy)
}
