//! List-mutate-refresh controller for the notes view.
//!
//! Mutations flip the state to loading, call the gateway, and emit one
//! refresh once the call settles. The fetch pipeline turns every refresh
//! into exactly one `list` call and applies only the most recently issued
//! call's outcome; superseded responses are dropped on arrival.

use std::sync::Arc;

use futures::{future::BoxFuture, stream::FuturesUnordered, FutureExt, StreamExt};
use shared::domain::{Note, NoteId};
use tokio::{
    runtime::Handle,
    sync::{mpsc, watch},
};
use tracing::{debug, info, warn};

use crate::{
    draft::{DraftError, NoteDraft},
    error::GatewayError,
    gateway::NotesGateway,
    state::{MutationFailure, NotesState, UpdateOrigin},
};

/// Counters describing the fetch pipeline's history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchStats {
    pub issued: u64,
    pub applied: u64,
    pub discarded: u64,
}

/// Zero-payload emitter; each emission yields exactly one list fetch.
#[derive(Clone)]
pub struct RefreshTrigger {
    tx: mpsc::UnboundedSender<()>,
}

impl RefreshTrigger {
    pub fn emit(&self) {
        if self.tx.send(()).is_err() {
            debug!("notes: refresh dropped, fetch pipeline has stopped");
        } else {
            debug!("notes: refresh emitted");
        }
    }
}

struct Shared {
    gateway: Arc<dyn NotesGateway>,
    state: watch::Sender<NotesState>,
    stats: watch::Sender<FetchStats>,
}

impl Shared {
    fn update(&self, f: impl FnOnce(&mut NotesState)) {
        self.state.send_modify(f);
    }
}

pub struct NotesController {
    shared: Arc<Shared>,
    trigger: RefreshTrigger,
    runtime: Handle,
}

impl NotesController {
    /// Starts the fetch pipeline on the current tokio runtime and issues the
    /// initial load. Must be called from within a runtime context.
    pub fn start(gateway: Arc<dyn NotesGateway>) -> Self {
        Self::start_on(gateway, Handle::current())
    }

    pub fn start_on(gateway: Arc<dyn NotesGateway>, runtime: Handle) -> Self {
        let (state, _) = watch::channel(NotesState::default());
        let (stats, _) = watch::channel(FetchStats::default());
        let shared = Arc::new(Shared {
            gateway,
            state,
            stats,
        });
        let (tx, rx) = mpsc::unbounded_channel();
        runtime.spawn(run_fetch_pipeline(Arc::clone(&shared), rx));

        let controller = Self {
            shared,
            trigger: RefreshTrigger { tx },
            runtime,
        };
        controller.update_notes(UpdateOrigin::Initial, None);
        controller.trigger.emit();
        controller
    }

    pub fn state(&self) -> NotesState {
        self.shared.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<NotesState> {
        self.shared.state.subscribe()
    }

    pub fn fetch_stats(&self) -> FetchStats {
        *self.shared.stats.borrow()
    }

    pub fn subscribe_fetch_stats(&self) -> watch::Receiver<FetchStats> {
        self.shared.stats.subscribe()
    }

    pub fn refresh_trigger(&self) -> RefreshTrigger {
        self.trigger.clone()
    }

    /// Re-enters the initial loading transition and refetches the list.
    pub fn reload(&self) {
        self.update_notes(UpdateOrigin::Initial, None);
        self.trigger.emit();
    }

    /// Fire-and-forget create. Completion is observed through state only.
    pub fn create_note(&self, title: impl Into<String>, content: impl Into<String>) {
        let title = title.into();
        let content = content.into();
        self.update_notes(UpdateOrigin::Create, None);

        let shared = Arc::clone(&self.shared);
        let trigger = self.trigger.clone();
        self.runtime.spawn(async move {
            match shared.gateway.create(&title, &content).await {
                Ok(note) => info!(note_id = note.id.0, "notes: create settled"),
                Err(error) => {
                    warn!(%error, "notes: create failed; refreshing anyway");
                    shared.update(|state| {
                        state.record_mutation_failure(MutationFailure {
                            origin: UpdateOrigin::Create,
                            note_id: None,
                            error,
                        })
                    });
                }
            }
            trigger.emit();
        });
    }

    /// Fire-and-forget delete. Completion is observed through state only.
    pub fn delete_note(&self, note_id: NoteId) {
        self.update_notes(UpdateOrigin::Delete, Some(note_id));

        let shared = Arc::clone(&self.shared);
        let trigger = self.trigger.clone();
        self.runtime.spawn(async move {
            match shared.gateway.remove(note_id).await {
                Ok(()) => info!(note_id = note_id.0, "notes: delete settled"),
                Err(error) => {
                    warn!(note_id = note_id.0, %error, "notes: delete failed; refreshing anyway");
                    shared.update(|state| {
                        state.record_mutation_failure(MutationFailure {
                            origin: UpdateOrigin::Delete,
                            note_id: Some(note_id),
                            error,
                        })
                    });
                }
            }
            trigger.emit();
        });
    }

    /// Validates the draft and, when valid, creates the note and resets the
    /// draft. Invalid drafts are marked touched and leave the state alone.
    pub fn submit(&self, draft: &mut NoteDraft) -> Result<(), DraftError> {
        let request = match draft.validate() {
            Ok(request) => request,
            Err(err) => {
                draft.mark_all_touched();
                return Err(err);
            }
        };
        self.create_note(request.title, request.content);
        draft.reset();
        Ok(())
    }

    fn update_notes(&self, origin: UpdateOrigin, pending_delete_id: Option<NoteId>) {
        debug!(?origin, ?pending_delete_id, "notes: loading");
        self.shared
            .update(|state| state.begin_loading(origin, pending_delete_id));
    }
}

type ListFetch = BoxFuture<'static, (u64, Result<Vec<Note>, GatewayError>)>;

async fn run_fetch_pipeline(shared: Arc<Shared>, mut triggers: mpsc::UnboundedReceiver<()>) {
    let mut latest_issued: u64 = 0;
    let mut in_flight: FuturesUnordered<ListFetch> = FuturesUnordered::new();

    loop {
        tokio::select! {
            trigger = triggers.recv() => {
                if trigger.is_none() {
                    debug!("notes: fetch pipeline stopped");
                    break;
                }
                latest_issued += 1;
                let generation = latest_issued;
                shared.stats.send_modify(|stats| stats.issued += 1);
                debug!(generation, "notes: list fetch issued");

                let gateway = Arc::clone(&shared.gateway);
                in_flight.push(async move { (generation, gateway.list().await) }.boxed());
            }
            Some((generation, result)) = in_flight.next(), if !in_flight.is_empty() => {
                if generation != latest_issued {
                    debug!(generation, latest_issued, "notes: stale list result discarded");
                    shared.stats.send_modify(|stats| stats.discarded += 1);
                    continue;
                }
                match &result {
                    Ok(notes) => debug!(generation, count = notes.len(), "notes: list applied"),
                    Err(error) => warn!(generation, %error, "notes: list fetch failed"),
                }
                shared.update(|state| state.apply_fetch(result));
                shared.stats.send_modify(|stats| stats.applied += 1);
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
