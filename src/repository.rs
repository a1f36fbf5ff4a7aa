//! Note persistence
//!
//! The [`NoteRepository`] trait is the storage contract of the note core.
//! [`RedbNoteRepository`] implements it on the embedded redb database; every
//! mutation runs inside a single write transaction, and redb serializes write
//! transactions, so no two writers can interleave on the same note.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use rand::{distr::Alphanumeric, Rng};
use redb::{Database, ReadableDatabase, ReadableTable, Table};

use crate::database::TABLE_NOTES;
use crate::error::{NoteError, NoteResult};
use crate::model::{Note, NoteRecord, MAX_TEXT_CHARS, MIN_TEXT_CHARS};

/// Length of server-generated IDs
const GENERATED_ID_LEN: usize = 6;

/// Give up generating an ID after this many collisions in a row
const MAX_ID_ATTEMPTS: usize = 16;

/// Longest accepted caller-supplied ID
const MAX_ID_LEN: usize = 64;

pub trait NoteRepository: Send + Sync + 'static {
    /// Stores a new note, generating an ID when `note.id` is empty.
    ///
    /// Returns `Conflict` if a caller-supplied ID is taken (deleted notes
    /// keep their ID) and `BadRequest` if the ID or the text length is not
    /// acceptable. Empty text is accepted and stored as a deleted note.
    fn create(&self, note: Note) -> NoteResult<Note>;

    /// Returns `NotFound` for unknown and deleted notes.
    fn fetch(&self, id: &str) -> NoteResult<Note>;

    /// Replaces the text of a note; empty `new_text` deletes it.
    fn update(&self, id: &str, password: &str, new_text: &str) -> NoteResult<Note>;

    fn delete(&self, id: &str, password: &str) -> NoteResult<()>;

    /// Adds each delta to the stored view count of its note, all in one
    /// transaction. Unknown and deleted IDs are skipped.
    ///
    /// Returns how many notes were updated.
    fn flush_counts(&self, deltas: &HashMap<String, u64>) -> NoteResult<usize>;
}

/// Checks the length bounds of non-empty note text
pub fn validate_text(text: &str) -> NoteResult<()> {
    if text.is_empty() {
        return Ok(());
    }
    let chars = text.chars().count();
    if !(MIN_TEXT_CHARS..=MAX_TEXT_CHARS).contains(&chars) {
        return Err(NoteError::BadRequest(format!(
            "note length not accepted: {chars} characters, expected {MIN_TEXT_CHARS}..={MAX_TEXT_CHARS}"
        )));
    }
    Ok(())
}

/// Checks a caller-supplied ID: 1 to 64 ASCII alphanumerics, `-` or `_`
pub fn validate_id(id: &str) -> NoteResult<()> {
    let well_formed = !id.is_empty()
        && id.len() <= MAX_ID_LEN
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    if well_formed {
        Ok(())
    } else {
        Err(NoteError::BadRequest(format!("invalid note id `{id}`")))
    }
}

fn generate_id() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_ID_LEN)
        .map(char::from)
        .collect()
}

/// Repository on top of the embedded redb database
#[derive(Clone)]
pub struct RedbNoteRepository {
    db: Arc<Database>,
}

impl RedbNoteRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Reads and decodes one record from an open table
    fn read_record<T>(table: &T, id: &str) -> NoteResult<Option<NoteRecord>>
    where
        T: ReadableTable<&'static str, &'static str>,
    {
        match table.get(id)? {
            Some(guard) => Ok(Some(serde_json::from_str::<NoteRecord>(guard.value())?)),
            None => Ok(None),
        }
    }

    fn write_record(
        table: &mut Table<'_, &'static str, &'static str>,
        id: &str,
        record: &NoteRecord,
    ) -> NoteResult<()> {
        let json = serde_json::to_string(record)?;
        table.insert(id, json.as_str())?;
        Ok(())
    }
}

impl NoteRepository for RedbNoteRepository {
    fn create(&self, note: Note) -> NoteResult<Note> {
        validate_text(&note.text)?;
        if !note.id.is_empty() {
            validate_id(&note.id)?;
        }

        let record = NoteRecord {
            text: note.text,
            password: note.password,
            views: 0,
            published: Utc::now(),
            edited: None,
        };

        let write_txn = self.db.begin_write()?;
        let id = {
            let mut table = write_txn.open_table(TABLE_NOTES)?;

            let id = if note.id.is_empty() {
                // Random IDs may collide; retry a bounded number of times
                let mut free = None;
                for _ in 0..MAX_ID_ATTEMPTS {
                    let candidate = generate_id();
                    if table.get(candidate.as_str())?.is_none() {
                        free = Some(candidate);
                        break;
                    }
                }
                free.ok_or_else(|| {
                    NoteError::ServiceUnavailable("could not allocate a free note id".to_string())
                })?
            } else {
                if table.get(note.id.as_str())?.is_some() {
                    return Err(NoteError::Conflict(note.id));
                }
                note.id
            };

            Self::write_record(&mut table, &id, &record)?;
            id
        };
        write_txn.commit()?;

        Ok(Note::from_record(&id, record))
    }

    fn fetch(&self, id: &str) -> NoteResult<Note> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TABLE_NOTES)?;

        match Self::read_record(&table, id)? {
            Some(record) if !record.text.is_empty() => Ok(Note::from_record(id, record)),
            _ => Err(NoteError::NotFound),
        }
    }

    fn update(&self, id: &str, password: &str, new_text: &str) -> NoteResult<Note> {
        let write_txn = self.db.begin_write()?;
        let record = {
            let mut table = write_txn.open_table(TABLE_NOTES)?;

            let mut record = match Self::read_record(&table, id)? {
                Some(record) if !record.text.is_empty() => record,
                _ => return Err(NoteError::NotFound),
            };
            if !record.password.is_empty() && record.password != password {
                return Err(NoteError::Unauthorized);
            }
            validate_text(new_text)?;

            record.text = new_text.to_string();
            record.edited = Some(Utc::now());
            Self::write_record(&mut table, id, &record)?;
            record
        };
        write_txn.commit()?;

        Ok(Note::from_record(id, record))
    }

    fn delete(&self, id: &str, password: &str) -> NoteResult<()> {
        self.update(id, password, "").map(|_| ())
    }

    fn flush_counts(&self, deltas: &HashMap<String, u64>) -> NoteResult<usize> {
        if deltas.is_empty() {
            return Ok(0);
        }

        let write_txn = self.db.begin_write()?;
        let mut applied = 0;
        {
            let mut table = write_txn.open_table(TABLE_NOTES)?;
            for (id, delta) in deltas {
                // The note may have been deleted since it was read
                let Some(mut record) = Self::read_record(&table, id)? else {
                    continue;
                };
                if record.text.is_empty() {
                    continue;
                }
                record.views = record.views.saturating_add(*delta);
                Self::write_record(&mut table, id, &record)?;
                applied += 1;
            }
        }
        write_txn.commit()?;

        Ok(applied)
    }
}
