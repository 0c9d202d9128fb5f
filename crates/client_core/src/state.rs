//! The observable notes state and its transitions.
//!
//! Every mutation of [`NotesState`] goes through one of the transition
//! methods below; the controller applies them atomically inside the state
//! channel. View predicates are plain getters recomputed from a snapshot.

use shared::domain::{Note, NoteId};

use crate::error::GatewayError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotesStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

/// Which operation started the current transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateOrigin {
    #[default]
    Initial,
    Create,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationFailure {
    pub origin: UpdateOrigin,
    pub note_id: Option<NoteId>,
    pub error: GatewayError,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NotesState {
    pub status: NotesStatus,
    pub notes: Vec<Note>,
    pub error: Option<GatewayError>,
    pub origin: UpdateOrigin,
    pub pending_delete_id: Option<NoteId>,
    /// Outcome of the most recent failed create/delete. Fetch results never
    /// touch this field; the next mutation clears it.
    pub mutation_error: Option<MutationFailure>,
}

impl NotesState {
    pub(crate) fn begin_loading(&mut self, origin: UpdateOrigin, pending_delete_id: Option<NoteId>) {
        self.status = NotesStatus::Loading;
        self.error = None;
        self.origin = origin;
        self.pending_delete_id = match origin {
            UpdateOrigin::Delete => pending_delete_id,
            UpdateOrigin::Initial | UpdateOrigin::Create => None,
        };
        if origin != UpdateOrigin::Initial {
            self.mutation_error = None;
        }
    }

    pub(crate) fn apply_fetch(&mut self, result: Result<Vec<Note>, GatewayError>) {
        match result {
            Ok(notes) => {
                self.status = NotesStatus::Success;
                self.notes = notes;
                self.error = None;
            }
            Err(err) => {
                self.status = NotesStatus::Error;
                self.notes = Vec::new();
                self.error = Some(err);
            }
        }
        self.pending_delete_id = None;
    }

    pub(crate) fn record_mutation_failure(&mut self, failure: MutationFailure) {
        self.mutation_error = Some(failure);
    }

    pub fn is_loading(&self) -> bool {
        self.status == NotesStatus::Loading
    }

    /// First load (or an explicit reload) is in progress.
    pub fn initial_load(&self) -> bool {
        self.is_loading() && self.origin == UpdateOrigin::Initial
    }

    pub fn create_load(&self) -> bool {
        self.is_loading() && self.origin == UpdateOrigin::Create
    }

    pub fn delete_in_progress(&self) -> Option<NoteId> {
        if self.is_loading() && self.origin == UpdateOrigin::Delete {
            self.pending_delete_id
        } else {
            None
        }
    }

    pub fn is_deleting(&self, note_id: NoteId) -> bool {
        self.delete_in_progress() == Some(note_id)
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn show_notes(&self) -> bool {
        self.origin == UpdateOrigin::Delete
            || !self.notes.is_empty()
            || self.status == NotesStatus::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn note(id: i64, title: &str) -> Note {
        Note {
            id: NoteId(id),
            title: title.to_string(),
            content: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn default_state_is_idle_initial_and_hidden() {
        let state = NotesState::default();
        assert_eq!(state.status, NotesStatus::Idle);
        assert_eq!(state.origin, UpdateOrigin::Initial);
        assert!(!state.show_notes());
        assert!(!state.initial_load());
    }

    #[test]
    fn begin_loading_keeps_notes_and_clears_error() {
        let mut state = NotesState::default();
        state.apply_fetch(Err(GatewayError::Unavailable));
        state.notes = vec![note(1, "kept")];

        state.begin_loading(UpdateOrigin::Create, None);
        assert!(state.create_load());
        assert_eq!(state.error, None);
        assert_eq!(state.notes.len(), 1);
    }

    #[test]
    fn pending_delete_id_only_set_for_delete_origin() {
        let mut state = NotesState::default();
        state.begin_loading(UpdateOrigin::Create, Some(NoteId(3)));
        assert_eq!(state.pending_delete_id, None);

        state.begin_loading(UpdateOrigin::Delete, Some(NoteId(3)));
        assert_eq!(state.delete_in_progress(), Some(NoteId(3)));
        assert!(state.is_deleting(NoteId(3)));
        assert!(!state.is_deleting(NoteId(4)));
    }

    #[test]
    fn applied_fetch_completes_delete_cycle() {
        let mut state = NotesState::default();
        state.begin_loading(UpdateOrigin::Delete, Some(NoteId(2)));
        state.apply_fetch(Ok(vec![note(1, "left")]));

        assert_eq!(state.status, NotesStatus::Success);
        assert_eq!(state.pending_delete_id, None);
        assert_eq!(state.delete_in_progress(), None);
        assert!(state.show_notes());
    }

    #[test]
    fn failed_fetch_clears_notes_and_sets_error() {
        let mut state = NotesState::default();
        state.apply_fetch(Ok(vec![note(1, "a"), note(2, "b")]));
        state.apply_fetch(Err(GatewayError::Transport("connection reset".into())));

        assert_eq!(state.status, NotesStatus::Error);
        assert!(state.is_empty());
        assert_eq!(
            state.error,
            Some(GatewayError::Transport("connection reset".into()))
        );
        assert!(!state.show_notes());
    }

    #[test]
    fn mutation_failure_survives_fetch_and_clears_on_next_mutation() {
        let mut state = NotesState::default();
        state.begin_loading(UpdateOrigin::Create, None);
        state.record_mutation_failure(MutationFailure {
            origin: UpdateOrigin::Create,
            note_id: None,
            error: GatewayError::Unavailable,
        });
        state.apply_fetch(Ok(Vec::new()));
        assert!(state.mutation_error.is_some());

        state.begin_loading(UpdateOrigin::Initial, None);
        assert!(state.mutation_error.is_some());

        state.begin_loading(UpdateOrigin::Delete, Some(NoteId(1)));
        assert!(state.mutation_error.is_none());
    }

    #[test]
    fn empty_list_after_delete_still_shows_notes_area() {
        let mut state = NotesState::default();
        state.begin_loading(UpdateOrigin::Delete, Some(NoteId(1)));
        assert!(state.show_notes());
        assert!(state.is_empty());
    }
}
