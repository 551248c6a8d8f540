use std::fmt::Write as _;

use chrono::{DateTime, Local, Utc};
use core_types::Note;
use core_view_model::{EditorState, Selection};

fn timestamp(at: &DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

pub fn list(state: &EditorState) -> String {
    let mut out = String::new();
    if state.loading {
        out.push_str("loading notes...\n");
    }
    if state.notes.is_empty() {
        out.push_str("no notes yet\n");
        return out;
    }
    for note in &state.notes {
        let marker = if state.is_deleting(&note.id) {
            'x'
        } else if state.selection.is(&note.id) {
            '>'
        } else {
            ' '
        };
        let _ = writeln!(
            out,
            "{marker} {:<12} {:<32} {}",
            note.id,
            note.title,
            timestamp(&note.updated_at)
        );
    }
    out
}

pub fn form(state: &EditorState) -> String {
    let mut out = String::new();
    match (&state.selection, state.selected_note()) {
        (Selection::New, _) => out.push_str("new note\n"),
        (Selection::Existing(_), Some(note)) => {
            let _ = writeln!(out, "{}", heading(note));
        }
        (Selection::Existing(id), None) => {
            let _ = writeln!(out, "editing {id}");
        }
    }
    let _ = writeln!(out, "  title:   {}", state.draft.title);
    for (index, line) in state.draft.content.lines().enumerate() {
        let label = if index == 0 { "content:" } else { "" };
        let _ = writeln!(out, "  {label:<8} {line}");
    }
    if state.saving {
        out.push_str("  saving...\n");
    }
    if let Some(error) = &state.error {
        let _ = writeln!(out, "! {error}");
    }
    out
}

fn heading(note: &Note) -> String {
    format!(
        "editing {} (created {}, updated {})",
        note.id,
        timestamp(&note.created_at),
        timestamp(&note.updated_at)
    )
}

pub fn page(state: &EditorState) -> String {
    format!("{}\n{}", list(state), form(state))
}
