//! Note service
//!
//! The `load`/`save` contract the HTTP layer is built on. It validates
//! input, delegates to the repository, records views and applies the fraud
//! heuristic on the primary read path.

use std::fmt::Write as _;
use std::sync::Arc;

use tracing::{debug, error};

use crate::error::{NoteError, NoteResult};
use crate::fraud::is_fraudulent;
use crate::model::Note;
use crate::repository::NoteRepository;
use crate::views::ViewCounter;

/// Outcome of a read, mapped to a transport status by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Ok,
    NotFound,
    /// The store failed; the note could not be read
    Unavailable,
}

#[derive(Clone)]
pub struct NoteService {
    repo: Arc<dyn NoteRepository>,
    views: Arc<ViewCounter>,
    ads: Option<Arc<str>>,
}

impl NoteService {
    pub fn new(repo: Arc<dyn NoteRepository>, views: Arc<ViewCounter>) -> Self {
        Self {
            repo,
            views,
            ads: None,
        }
    }

    /// Sets the payload injected into notes flagged by the fraud heuristic
    pub fn with_ads(mut self, ads: Option<Arc<str>>) -> Self {
        self.ads = ads;
        self
    }

    pub fn repository(&self) -> &Arc<dyn NoteRepository> {
        &self.repo
    }

    pub fn view_counter(&self) -> &Arc<ViewCounter> {
        &self.views
    }

    /// Reads a note and records exactly one view for it
    ///
    /// This is the only place a view is recorded; every endpoint that shows
    /// a note goes through here once per request. The returned view count
    /// includes deltas not yet flushed, this read included.
    pub fn load(&self, id: &str) -> (Note, LoadStatus) {
        match self.repo.fetch(id) {
            Ok(mut note) => {
                let pending = self.views.increment(id);
                note.views = note.views.saturating_add(pending);
                (note, LoadStatus::Ok)
            }
            Err(NoteError::NotFound) => (Note::default(), LoadStatus::NotFound),
            Err(err) => {
                error!("failed to load note {id}: {err}");
                (Note::default(), LoadStatus::Unavailable)
            }
        }
    }

    /// `load` for the primary read endpoint
    ///
    /// The third value tells whether the fraud heuristic flagged the note;
    /// flagged notes carry the ads payload.
    pub fn show(&self, id: &str) -> (Note, LoadStatus, bool) {
        let (mut note, status) = self.load(id);
        let flagged = status == LoadStatus::Ok && is_fraudulent(&note);
        if flagged {
            debug!("note {id} flagged by fraud heuristic");
            note.ads = self.ads.clone();
        }
        (note, status, flagged)
    }

    /// `load` with a plain-text stats summary rendered into `content`
    pub fn stats(&self, id: &str) -> (Note, LoadStatus) {
        let (mut note, status) = self.load(id);
        if status == LoadStatus::Ok {
            note.content = Some(render_stats(&note));
        }
        (note, status)
    }

    /// Creates, updates or deletes a note
    ///
    /// - empty `id`: create with a generated ID; empty `text` is rejected
    /// - non-empty `id`: update with the password check; empty `text` deletes.
    ///   An ID that does not exist yet is claimed by creating the note under it
    pub fn save(&self, id: &str, text: &str, password: &str) -> NoteResult<Note> {
        if id.is_empty() {
            if text.is_empty() {
                return Err(NoteError::BadRequest(
                    "note length not accepted: empty note".to_string(),
                ));
            }
            return self.repo.create(Note::new("", text, password));
        }

        match self.repo.update(id, password, text) {
            Err(NoteError::NotFound) if !text.is_empty() => {
                self.repo.create(Note::new(id, text, password))
            }
            other => other,
        }
    }
}

fn render_stats(note: &Note) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Published: {}", note.published.format("%Y-%m-%d %H:%M UTC"));
    if let Some(edited) = note.edited {
        let _ = writeln!(out, "Edited: {}", edited.format("%Y-%m-%d %H:%M UTC"));
    }
    let _ = writeln!(out, "Views: {}", note.views);
    let _ = write!(out, "Length: {} characters", note.text.chars().count());
    out
}
