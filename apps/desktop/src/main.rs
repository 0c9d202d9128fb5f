use std::{future::Future, sync::Arc, time::Duration};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    FetchStats, HttpNotesGateway, NoteDraft, NotesController, NotesState, NotesStatus,
};
use shared::domain::NoteId;
use tokio_stream::{wrappers::WatchStream, StreamExt};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
struct Args {
    #[arg(long, default_value = "http://127.0.0.1:8443")]
    server_url: String,
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    List,
    Create {
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long, default_value = "")]
        content: String,
    },
    Delete {
        note_id: i64,
    },
    /// Reload periodically and print every state transition until interrupted.
    Watch {
        #[arg(long, default_value_t = 5)]
        interval_secs: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();
    let args = Args::parse();
    info!(server_url = %args.server_url, "notes client starting");

    let gateway =
        HttpNotesGateway::with_timeout(&args.server_url, Duration::from_secs(args.timeout_secs))?;
    let controller = NotesController::start(Arc::new(gateway));
    wait_until_settled(&controller, 1).await?;

    match args.command {
        Command::List => {
            let state = controller.state();
            ensure_loaded(&state)?;
            print_notes(&state);
        }
        Command::Create { title, content } => {
            let issued = controller.fetch_stats().issued;
            let mut draft = NoteDraft::new();
            draft.set_title(title);
            draft.set_content(content);
            if let Err(err) = controller.submit(&mut draft) {
                let messages: Vec<String> =
                    err.fields().iter().map(ToString::to_string).collect();
                return Err(anyhow!(messages.join("; ")));
            }
            finish_mutation(&controller, issued).await?;
        }
        Command::Delete { note_id } => {
            let issued = controller.fetch_stats().issued;
            controller.delete_note(NoteId(note_id));
            finish_mutation(&controller, issued).await?;
        }
        Command::Watch { interval_secs } => {
            let interrupted = async {
                if let Err(error) = tokio::signal::ctrl_c().await {
                    warn!(%error, "failed to listen for ctrl-c");
                }
            };
            watch(&controller, Duration::from_secs(interval_secs.max(1)), interrupted).await
        }
    }

    Ok(())
}

async fn wait_until_settled(
    controller: &NotesController,
    issued_at_least: u64,
) -> Result<FetchStats> {
    let mut rx = controller.subscribe_fetch_stats();
    let stats = *rx
        .wait_for(|s| s.issued >= issued_at_least && s.issued == s.applied + s.discarded)
        .await
        .context("notes controller stopped")?;
    Ok(stats)
}

async fn finish_mutation(controller: &NotesController, issued_before: u64) -> Result<()> {
    wait_until_settled(controller, issued_before + 1).await?;
    let state = controller.state();
    if let Some(failure) = &state.mutation_error {
        return Err(anyhow!("{:?} failed: {}", failure.origin, failure.error));
    }
    ensure_loaded(&state)?;
    print_notes(&state);
    Ok(())
}

fn ensure_loaded(state: &NotesState) -> Result<()> {
    match (&state.status, &state.error) {
        (NotesStatus::Error, Some(error)) => Err(anyhow!("failed to load notes: {error}")),
        _ => Ok(()),
    }
}

fn print_notes(state: &NotesState) {
    if state.is_empty() {
        println!("No notes yet.");
        return;
    }
    for note in &state.notes {
        println!(
            "#{} {}  ({})",
            note.id,
            note.title,
            note.created_at.format("%Y-%m-%d %H:%M")
        );
        if !note.content.is_empty() {
            println!("    {}", note.content.replace('\n', "\n    "));
        }
    }
}

/// Prints state transitions and reloads every `every` until `shutdown` resolves.
async fn watch(controller: &NotesController, every: Duration, shutdown: impl Future<Output = ()>) {
    let mut transitions = WatchStream::new(controller.subscribe());
    let mut ticker = tokio::time::interval(every);
    ticker.tick().await;
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            next = transitions.next() => {
                let Some(state) = next else { break };
                println!(
                    "status={:?} origin={:?} notes={} deleting={:?}",
                    state.status,
                    state.origin,
                    state.notes.len(),
                    state.delete_in_progress()
                );
            }
            _ = ticker.tick() => controller.reload(),
            _ = &mut shutdown => break,
        }
    }
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
