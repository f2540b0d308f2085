//! # Input Validation
//!
//! Ledgers call these before any mutation so a rejected request leaves no
//! trace.

use shared_types::LedgerError;

/// Maximum document uri length in bytes.
pub const MAX_URI_LEN: usize = 2048;

/// Maximum custodial note length in bytes.
pub const MAX_ACTION_LEN: usize = 256;

/// Maximum batch note length in bytes.
pub const MAX_NOTE_LEN: usize = 256;

/// A document uri must be non-blank and at most [`MAX_URI_LEN`] bytes.
///
/// The format is otherwise opaque.
pub fn validate_uri(uri: &str) -> Result<(), LedgerError> {
    if uri.trim().is_empty() {
        return Err(LedgerError::invalid_input("document uri is empty"));
    }
    if uri.len() > MAX_URI_LEN {
        return Err(LedgerError::invalid_input(format!(
            "document uri is {} bytes, limit is {MAX_URI_LEN}",
            uri.len()
        )));
    }
    Ok(())
}

/// A logged action must be non-blank and at most [`MAX_ACTION_LEN`] bytes.
pub fn validate_action(action: &str) -> Result<(), LedgerError> {
    if action.trim().is_empty() {
        return Err(LedgerError::invalid_input("action is empty"));
    }
    if action.len() > MAX_ACTION_LEN {
        return Err(LedgerError::invalid_input(format!(
            "action is {} bytes, limit is {MAX_ACTION_LEN}",
            action.len()
        )));
    }
    Ok(())
}

/// A batch note may be empty but not longer than [`MAX_NOTE_LEN`] bytes.
pub fn validate_note(note: &str) -> Result<(), LedgerError> {
    if note.len() > MAX_NOTE_LEN {
        return Err(LedgerError::invalid_input(format!(
            "note is {} bytes, limit is {MAX_NOTE_LEN}",
            note.len()
        )));
    }
    Ok(())
}
