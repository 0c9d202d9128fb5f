use shared::{
    domain::{Note, NoteId},
    error::{ApiError, ErrorCode},
    protocol::CreateNoteRequest,
};
use storage::Storage;
use tracing::info;

#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
}

pub async fn list_notes(ctx: &ApiContext) -> Result<Vec<Note>, ApiError> {
    ctx.storage.list_notes().await.map_err(internal)
}

pub async fn create_note(ctx: &ApiContext, req: CreateNoteRequest) -> Result<Note, ApiError> {
    req.validate()?;
    let note = ctx
        .storage
        .create_note(req.title.trim(), &req.content)
        .await
        .map_err(internal)?;
    info!(note_id = note.id.0, "notes: created");
    Ok(note)
}

pub async fn remove_note(ctx: &ApiContext, note_id: NoteId) -> Result<(), ApiError> {
    let removed = ctx.storage.remove_note(note_id).await.map_err(internal)?;
    if !removed {
        return Err(ApiError::new(
            ErrorCode::NotFound,
            format!("note {} not found", note_id.0),
        ));
    }
    info!(note_id = note_id.0, "notes: removed");
    Ok(())
}

fn internal(err: anyhow::Error) -> ApiError {
    ApiError::new(ErrorCode::Internal, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::protocol::MAX_CONTENT_BYTES;

    async fn setup() -> ApiContext {
        let storage = Storage::new("sqlite::memory:").await.expect("db");
        ApiContext { storage }
    }

    #[tokio::test]
    async fn create_then_list_returns_note() {
        let ctx = setup().await;
        let note = create_note(&ctx, CreateNoteRequest::new("Pay bills", ""))
            .await
            .expect("create");
        let notes = list_notes(&ctx).await.expect("list");
        assert_eq!(notes, vec![note]);
    }

    #[tokio::test]
    async fn blank_title_is_rejected() {
        let ctx = setup().await;
        let err = create_note(&ctx, CreateNoteRequest::new("   ", "content"))
            .await
            .expect_err("should fail");
        assert_eq!(err.code, ErrorCode::Validation);
        assert!(list_notes(&ctx).await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn oversized_content_is_rejected() {
        let ctx = setup().await;
        let content = "x".repeat(MAX_CONTENT_BYTES + 1);
        let err = create_note(&ctx, CreateNoteRequest::new("big", content))
            .await
            .expect_err("should fail");
        assert_eq!(err.code, ErrorCode::Validation);
    }

    #[tokio::test]
    async fn title_is_trimmed_before_storing() {
        let ctx = setup().await;
        let note = create_note(&ctx, CreateNoteRequest::new("  Call dentist ", "friday"))
            .await
            .expect("create");
        assert_eq!(note.title, "Call dentist");
    }

    #[tokio::test]
    async fn removing_missing_note_is_not_found() {
        let ctx = setup().await;
        let err = remove_note(&ctx, NoteId(99))
            .await
            .expect_err("should fail");
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
