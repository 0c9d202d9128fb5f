use super::*;
use shared::protocol::{MAX_CONTENT_BYTES, MAX_TITLE_BYTES};

async fn memory_storage() -> Storage {
    Storage::new("sqlite::memory:").await.expect("db")
}

#[tokio::test]
async fn create_trims_title_and_stores_note() {
    let storage = memory_storage().await;
    let note = create_checked(&storage, CreateNoteRequest::new("  Pay bills ", "monthly"))
        .await
        .expect("create");
    assert_eq!(note.title, "Pay bills");
    assert_eq!(storage.count_notes().await.expect("count"), 1);
}

#[tokio::test]
async fn create_rejects_notes_the_service_would_reject() {
    let storage = memory_storage().await;

    for req in [
        CreateNoteRequest::new(" ", "content"),
        CreateNoteRequest::new("t".repeat(MAX_TITLE_BYTES + 1), ""),
        CreateNoteRequest::new("big", "c".repeat(MAX_CONTENT_BYTES + 1)),
    ] {
        assert!(create_checked(&storage, req).await.is_err());
    }
    assert_eq!(storage.count_notes().await.expect("count"), 0);
}
