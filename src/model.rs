//! Data models for the note service
//!
//! This module defines the domain `Note`, the record shape persisted in the
//! database, and the request/response bodies of the HTTP API.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Shortest accepted note text, in characters
pub const MIN_TEXT_CHARS: usize = 10;

/// Longest accepted note text, in characters
pub const MAX_TEXT_CHARS: usize = 50_000;

/// A note as handed to callers of the repository and the service
///
/// `ads` and `content` are render-only payloads. They are filled per request
/// and have no counterpart in [`NoteRecord`], so they can never be written
/// back to storage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Note {
    /// Primary key, caller-supplied or generated
    pub id: String,

    /// Note body; empty means the note was deleted
    pub text: String,

    /// Edit password compared verbatim; empty means unprotected
    pub password: String,

    /// Number of successful reads
    pub views: u64,

    /// When the note was created
    pub published: DateTime<Utc>,

    /// When the note was last updated, if ever
    pub edited: Option<DateTime<Utc>>,

    /// Ad/warning payload injected when the note looks like spam
    pub ads: Option<Arc<str>>,

    /// Rendered body for alternate views (e.g. stats)
    pub content: Option<String>,
}

impl Note {
    /// Builds an unsaved note; an empty `id` asks the repository to generate one
    pub fn new(id: impl Into<String>, text: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            password: password.into(),
            ..Self::default()
        }
    }

    /// True for the tombstone state left behind by a delete
    pub fn is_deleted(&self) -> bool {
        self.text.is_empty()
    }

    pub(crate) fn from_record(id: &str, record: NoteRecord) -> Self {
        Self {
            id: id.to_string(),
            text: record.text,
            password: record.password,
            views: record.views,
            published: record.published,
            edited: record.edited,
            ads: None,
            content: None,
        }
    }
}

/// Value stored in the notes table, serialized as JSON
///
/// The key of the table is the note ID, so it is not repeated here.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct NoteRecord {
    pub text: String,

    #[serde(default)]
    pub password: String,

    /// Last flushed view count
    #[serde(default)]
    pub views: u64,

    pub published: DateTime<Utc>,

    #[serde(default)]
    pub edited: Option<DateTime<Utc>>,
}

/// Request payload for creating, updating or deleting a note
///
/// # Example
/// ```json
/// {
///   "id": "",
///   "text": "Shopping list: milk, eggs",
///   "password": "hunter2",
///   "tos": true
/// }
/// ```
///
/// - empty `id` creates a note
/// - non-empty `id` updates it (or claims that ID if it is still free)
/// - non-empty `id` with empty `text` deletes it
#[derive(Deserialize, Serialize, Debug, Default)]
pub struct SaveRequest {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub text: String,

    #[serde(default)]
    pub password: String,

    /// Terms of service acceptance; required for every write
    #[serde(default)]
    pub tos: bool,
}

/// Response body of `POST /`
///
/// On success `payload` carries the note ID, on failure a short reason.
#[derive(Serialize, Deserialize, Debug)]
pub struct SaveResponse {
    pub success: bool,
    pub payload: String,
}

/// Request payload for reporting abusive notes
#[derive(Deserialize, Serialize, Debug, Default)]
pub struct ReportRequest {
    #[serde(default)]
    pub report: String,
}

/// Response body of `GET /{id}`
#[derive(Serialize, Debug)]
pub struct NoteView {
    pub id: String,
    pub text: String,
    pub views: u64,
    pub published: DateTime<Utc>,
    pub edited: Option<DateTime<Utc>>,

    /// Whether the fraud heuristic flagged this note
    pub flagged: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ads: Option<String>,
}

/// Response body of `GET /{id}/stats`
#[derive(Serialize, Debug)]
pub struct StatsView {
    pub id: String,
    pub views: u64,
    pub published: DateTime<Utc>,
    pub edited: Option<DateTime<Utc>>,
    pub content: String,
}

/// Response body of `GET /{id}/edit`
#[derive(Serialize, Debug)]
pub struct EditView {
    pub id: String,
    pub text: String,
}
