use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use shared::{
    domain::{Note, NoteId},
    protocol::CreateNoteRequest,
};
use storage::Storage;

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, default_value = "sqlite://./data/notes.db")]
    database_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Insert the sample notes when the table is empty.
    Seed,
    List,
    Create { title: String, content: String },
    Remove { note_id: i64 },
}

const SAMPLE_NOTES: &[(&str, &str)] = &[
    ("Buy groceries", "2x eggs, 1x milk, bread"),
    ("Call dentist", "Reschedule the cleaning to next week"),
];

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let storage = Storage::new(&cli.database_url).await?;

    match cli.command {
        Command::Seed => {
            if storage.count_notes().await? > 0 {
                println!("notes table already populated; skipping seed");
                return Ok(());
            }
            for (title, content) in SAMPLE_NOTES {
                let note = storage.create_note(title, content).await?;
                println!("created note_id={} title={:?}", note.id.0, note.title);
            }
        }
        Command::List => {
            for note in storage.list_notes().await? {
                println!(
                    "{}\t{}\t{}",
                    note.id.0,
                    note.created_at.to_rfc3339(),
                    note.title
                );
            }
        }
        Command::Create { title, content } => {
            let note = create_checked(&storage, CreateNoteRequest::new(title, content)).await?;
            println!("created note_id={}", note.id.0);
        }
        Command::Remove { note_id } => {
            if !storage.remove_note(NoteId(note_id)).await? {
                bail!("note {note_id} not found");
            }
            println!("removed note_id={note_id}");
        }
    }

    Ok(())
}

/// Applies the same rules as the HTTP service before writing to the database.
async fn create_checked(storage: &Storage, req: CreateNoteRequest) -> Result<Note> {
    req.validate()?;
    storage.create_note(req.title.trim(), &req.content).await
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
