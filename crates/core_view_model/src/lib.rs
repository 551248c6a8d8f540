use std::sync::Arc;

use core_types::{Note, NotesGateway};
use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, info, warn};

mod state;

pub use state::{EditorState, FormDraft, Selection, sort_by_recency};

pub const LOAD_FAILED: &str = "Failed to load notes";
pub const SAVE_FAILED: &str = "Failed to save note";
pub const DELETE_FAILED: &str = "Failed to delete note";

#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum EditorError {
    #[error("Title is required.")]
    TitleRequired,
    #[error("{0}")]
    Request(String),
}

/// List and form state for the notes page.
///
/// Clones share state. The lock is only held between awaits, so a save and any number of deletes
/// can be in flight together; whichever result lands last wins.
#[derive(Clone)]
pub struct NotesViewModel {
    gateway: Arc<dyn NotesGateway>,
    state: Arc<Mutex<EditorState>>,
}

impl NotesViewModel {
    pub fn new(gateway: Arc<dyn NotesGateway>) -> Self {
        Self {
            gateway,
            state: Arc::new(Mutex::new(EditorState::default())),
        }
    }

    /// Builds the view-model and runs the initial load once.
    pub async fn attach(gateway: Arc<dyn NotesGateway>) -> Self {
        let view_model = Self::new(gateway);
        // A failed load is already in the error slot.
        let _ = view_model.load().await;
        view_model
    }

    pub fn snapshot(&self) -> EditorState {
        self.state.lock().clone()
    }

    pub async fn load(&self) -> Result<usize, EditorError> {
        self.state.lock().loading = true;
        let result = self.gateway.list().await;

        let mut state = self.state.lock();
        state.loading = false;
        match result {
            Ok(notes) => {
                info!(count = notes.len(), "notes loaded");
                state.notes = notes;
                state.error = None;
                Ok(state.notes.len())
            }
            Err(err) => {
                warn!(error = %err, "failed to load notes");
                Err(state.record_failure(&err, LOAD_FAILED))
            }
        }
    }

    pub fn start_create(&self) {
        self.state.lock().reset_form();
    }

    pub fn start_edit(&self, note: &Note) {
        let mut state = self.state.lock();
        state.selection = Selection::Existing(note.id.clone());
        state.draft = FormDraft::from_note(note);
        state.error = None;
    }

    pub fn set_title(&self, title: impl Into<String>) {
        self.state.lock().draft.title = title.into();
    }

    pub fn set_content(&self, content: impl Into<String>) {
        self.state.lock().draft.content = content.into();
    }

    /// Creates or updates depending on the selection. Blank titles never reach the gateway.
    pub async fn save(&self) -> Result<Note, EditorError> {
        let (selection, title, content) = {
            let mut state = self.state.lock();
            let title = state.draft.title.trim().to_string();
            if title.is_empty() {
                state.error = Some(EditorError::TitleRequired.to_string());
                return Err(EditorError::TitleRequired);
            }
            state.saving = true;
            (state.selection.clone(), title, state.draft.content.clone())
        };

        let result = match &selection {
            Selection::Existing(id) => self.gateway.update(id, &title, &content).await,
            Selection::New => self.gateway.create(&title, &content).await,
        };

        let mut state = self.state.lock();
        state.saving = false;
        let note = match result {
            Ok(note) => note,
            Err(err) => {
                warn!(error = %err, "failed to save note");
                return Err(state.record_failure(&err, SAVE_FAILED));
            }
        };

        match selection {
            Selection::Existing(id) => {
                match state.notes.iter_mut().find(|entry| entry.id == id) {
                    Some(entry) => *entry = note.clone(),
                    None => debug!(id = %id, "saved note is no longer listed"),
                }
                info!(id = %id, "note updated");
            }
            Selection::New => {
                state.notes.insert(0, note.clone());
                state.selection = Selection::Existing(note.id.clone());
                info!(id = %note.id, "note created");
            }
        }
        sort_by_recency(&mut state.notes);
        Ok(note)
    }

    pub async fn delete(&self, id: &str) -> Result<(), EditorError> {
        self.state.lock().deleting_id = Some(id.to_string());
        let result = self.gateway.delete(id).await;

        let mut state = self.state.lock();
        // A later delete may have taken the slot while this one was in flight.
        if state.is_deleting(id) {
            state.deleting_id = None;
        }
        if let Err(err) = result {
            warn!(id, error = %err, "failed to delete note");
            return Err(state.record_failure(&err, DELETE_FAILED));
        }

        state.notes.retain(|note| note.id != id);
        if state.selection.is(id) {
            state.reset_form();
        }
        sort_by_recency(&mut state.notes);
        info!(id, "note deleted");
        Ok(())
    }
}
