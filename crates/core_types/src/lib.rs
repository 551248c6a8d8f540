use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type NoteId = String;

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body sent on create and update. The server owns the id and both timestamps.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct NoteInput {
    pub title: String,
    pub content: String,
}

impl NoteInput {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}

/// Failure of a single gateway call.
///
/// `status` is set when the server answered with a non-success status; transport and decode
/// failures carry only the message.
#[derive(Debug, Clone, Error, Eq, PartialEq)]
#[error("{message}")]
pub struct RequestError {
    status: Option<u16>,
    message: String,
}

impl RequestError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    /// Builds the error for a non-success response: the body text when there is one, else a
    /// status-coded fallback.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = if body.trim().is_empty() {
            format!("Request failed: {status}")
        } else {
            body.to_string()
        };
        Self {
            status: Some(status),
            message,
        }
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[async_trait]
pub trait NotesGateway: Send + Sync {
    async fn list(&self) -> Result<Vec<Note>, RequestError>;

    async fn create(&self, title: &str, content: &str) -> Result<Note, RequestError>;

    async fn update(&self, id: &str, title: &str, content: &str) -> Result<Note, RequestError>;

    async fn delete(&self, id: &str) -> Result<(), RequestError>;
}
