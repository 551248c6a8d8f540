use core_types::{Note, NoteId, RequestError};

use crate::EditorError;

/// Which note the form is bound to.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub enum Selection {
    /// Create mode.
    #[default]
    New,
    Existing(NoteId),
}

impl Selection {
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::New => None,
            Self::Existing(id) => Some(id),
        }
    }

    pub fn is(&self, id: &str) -> bool {
        self.id() == Some(id)
    }
}

#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct FormDraft {
    pub title: String,
    pub content: String,
}

impl FormDraft {
    pub fn from_note(note: &Note) -> Self {
        Self {
            title: note.title.clone(),
            content: note.content.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EditorState {
    pub notes: Vec<Note>,
    pub selection: Selection,
    pub draft: FormDraft,
    pub loading: bool,
    pub saving: bool,
    pub deleting_id: Option<NoteId>,
    pub error: Option<String>,
}

impl EditorState {
    pub fn find(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == id)
    }

    /// The note under edit, looked up in the current collection on every call.
    pub fn selected_note(&self) -> Option<&Note> {
        self.selection.id().and_then(|id| self.find(id))
    }

    pub fn is_deleting(&self, id: &str) -> bool {
        self.deleting_id.as_deref() == Some(id)
    }

    pub(crate) fn reset_form(&mut self) {
        self.selection = Selection::New;
        self.draft = FormDraft::default();
        self.error = None;
    }

    pub(crate) fn record_failure(&mut self, err: &RequestError, fallback: &str) -> EditorError {
        let message = if err.message().trim().is_empty() {
            fallback.to_string()
        } else {
            err.message().to_string()
        };
        self.error = Some(message.clone());
        EditorError::Request(message)
    }
}

/// Most recently updated first. Stable, so equal timestamps keep their relative order.
pub fn sort_by_recency(notes: &mut [Note]) {
    notes.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
}
