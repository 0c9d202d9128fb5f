//! Title/content input for a new note, validated before any remote call.

use shared::protocol::CreateNoteRequest;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("Make sure to give your note a title")]
    MissingTitle,
    #[error("Add some content to your note")]
    MissingContent,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("note draft is invalid ({} field errors)", .0.len())]
pub struct DraftError(pub Vec<FieldError>);

impl DraftError {
    pub fn fields(&self) -> &[FieldError] {
        &self.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct DraftField {
    value: String,
    touched: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteDraft {
    title: DraftField,
    content: DraftField,
}

impl NoteDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(&self) -> &str {
        &self.title.value
    }

    pub fn content(&self) -> &str {
        &self.content.value
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title.value = title.into();
        self.title.touched = true;
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content.value = content.into();
        self.content.touched = true;
    }

    pub fn mark_all_touched(&mut self) {
        self.title.touched = true;
        self.content.touched = true;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn errors(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if self.title.value.trim().is_empty() {
            errors.push(FieldError::MissingTitle);
        }
        if self.content.value.trim().is_empty() {
            errors.push(FieldError::MissingContent);
        }
        errors
    }

    pub fn is_valid(&self) -> bool {
        self.errors().is_empty()
    }

    /// Errors for fields the user has interacted with.
    pub fn visible_errors(&self) -> Vec<FieldError> {
        self.errors()
            .into_iter()
            .filter(|err| match err {
                FieldError::MissingTitle => self.title.touched,
                FieldError::MissingContent => self.content.touched,
            })
            .collect()
    }

    pub fn validate(&self) -> Result<CreateNoteRequest, DraftError> {
        let errors = self.errors();
        if !errors.is_empty() {
            return Err(DraftError(errors));
        }
        Ok(CreateNoteRequest::new(
            self.title.value.clone(),
            self.content.value.clone(),
        ))
    }
}
