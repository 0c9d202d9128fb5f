use shared::domain::NoteId;
use storage::Storage;

#[tokio::test]
async fn notes_survive_create_remove_cycles_in_server_order() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");

    let groceries = storage
        .create_note("Buy groceries", "2x eggs, 1x milk")
        .await
        .expect("groceries");
    let dentist = storage
        .create_note("Call dentist", "ask about friday")
        .await
        .expect("dentist");
    let bills = storage.create_note("Pay bills", "").await.expect("bills");

    assert!(storage.remove_note(dentist.id).await.expect("remove"));

    let titles: Vec<String> = storage
        .list_notes()
        .await
        .expect("list")
        .into_iter()
        .map(|note| note.title)
        .collect();
    assert_eq!(titles, vec!["Buy groceries", "Pay bills"]);

    assert!(storage.get_note(dentist.id).await.expect("get").is_none());
    assert!(storage.get_note(groceries.id).await.expect("get").is_some());
    assert!(!storage.remove_note(NoteId(bills.id.0 + 100)).await.expect("remove"));
}
