//! Error taxonomy shared by the repository, the service and the HTTP layer
//!
//! Every failure of the note core is one of five kinds. They propagate
//! unchanged from the repository to the HTTP layer, which is the only place
//! that maps them to status codes.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NoteError {
    /// No note with this ID, or the note was deleted
    #[error("note not found")]
    NotFound,

    /// Password does not match the one stored with the note
    #[error("password mismatch")]
    Unauthorized,

    /// Input rejected before touching storage
    #[error("{0}")]
    BadRequest(String),

    /// Caller-supplied ID is already taken
    #[error("note id `{0}` already taken")]
    Conflict(String),

    /// The store failed (I/O, transaction or corrupt record)
    #[error("storage unavailable: {0}")]
    ServiceUnavailable(String),
}

pub type NoteResult<T> = Result<T, NoteError>;

macro_rules! unavailable_from {
    ($($source:ty),+ $(,)?) => {
        $(
            impl From<$source> for NoteError {
                fn from(value: $source) -> Self {
                    Self::ServiceUnavailable(value.to_string())
                }
            }
        )+
    };
}

unavailable_from!(
    redb::Error,
    redb::DatabaseError,
    redb::TransactionError,
    redb::TableError,
    redb::StorageError,
    redb::CommitError,
    serde_json::Error,
);
