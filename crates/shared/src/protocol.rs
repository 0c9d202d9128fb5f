//! Request and response bodies exchanged between the notes client and server.

use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ErrorCode};

pub const NOTES_ROUTE: &str = "/notes";
pub const HEALTH_ROUTE: &str = "/healthz";

pub const MAX_TITLE_BYTES: usize = 200;
pub const MAX_CONTENT_BYTES: usize = 16 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateNoteRequest {
    pub title: String,
    pub content: String,
}

impl CreateNoteRequest {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    /// Checks the rules every stored note must satisfy. Content may be empty.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.title.trim().is_empty() {
            return Err(ApiError::new(
                ErrorCode::Validation,
                "note title cannot be empty",
            ));
        }
        if self.title.len() > MAX_TITLE_BYTES {
            return Err(ApiError::new(
                ErrorCode::Validation,
                format!("note title exceeds {MAX_TITLE_BYTES} bytes"),
            ));
        }
        if self.content.len() > MAX_CONTENT_BYTES {
            return Err(ApiError::new(
                ErrorCode::Validation,
                format!("note content exceeds {MAX_CONTENT_BYTES} bytes"),
            ));
        }
        Ok(())
    }
}

/// Path of a single note, e.g. `/notes/7`.
pub fn note_route(note_id: i64) -> String {
    format!("{NOTES_ROUTE}/{note_id}")
}

/// Router pattern matching [`note_route`], with the id captured as `note_id`.
pub fn note_route_pattern() -> String {
    format!("{NOTES_ROUTE}/:note_id")
}
