//! Client side of the notes service: the remote gateway and the
//! list-mutate-refresh controller that drives a notes view.

pub mod controller;
pub mod draft;
pub mod error;
pub mod gateway;
pub mod state;

pub use controller::{FetchStats, NotesController, RefreshTrigger};
pub use draft::{DraftError, FieldError, NoteDraft};
pub use error::GatewayError;
pub use gateway::{HttpNotesGateway, MissingNotesGateway, NotesGateway};
pub use state::{MutationFailure, NotesState, NotesStatus, UpdateOrigin};
