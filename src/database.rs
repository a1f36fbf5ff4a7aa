//! Database initialization and table definitions
//!
//! This module handles the setup of the embedded redb database and holds the
//! application state shared by the request handlers.

use std::sync::Arc;

use redb::{Database, TableDefinition};

use crate::repository::RedbNoteRepository;
use crate::service::NoteService;
use crate::views::ViewCounter;

/// Main table for storing notes
///
/// Key: note ID as string
/// Value: JSON-serialized `NoteRecord` as string
///
/// Example:
/// - Key: "aB3xY9"
/// - Value: '{"text":"...","password":"","views":12,"published":"...","edited":null}'
pub const TABLE_NOTES: TableDefinition<&str, &str> = TableDefinition::new("notes_v1");

/// Application state shared across all request handlers
///
/// The service is cheap to clone; every clone shares the same repository and
/// the same view counter.
#[derive(Clone)]
pub struct AppState {
    pub service: NoteService,
}

impl AppState {
    /// Builds the state over an opened database with a fresh view counter
    /// and no ads payload
    pub fn new(db: Arc<Database>) -> Self {
        let repo = Arc::new(RedbNoteRepository::new(db));
        let views = Arc::new(ViewCounter::new());
        Self {
            service: NoteService::new(repo, views),
        }
    }
}

/// Initializes the embedded database and creates required tables
///
/// # Arguments
///
/// * `db_path` - File path where the database should be stored (e.g., "notes.redb")
///
/// # Example
///
/// ```no_run
/// # use notehub::database::init_db;
/// let db = init_db("notes.redb").expect("Failed to initialize database");
/// ```
pub fn init_db(db_path: &str) -> Result<Database, redb::Error> {
    let db = Database::create(db_path)?;

    // Open (or create if not exists) the notes table so later read
    // transactions never hit a missing table
    let write_txn = db.begin_write()?;
    {
        write_txn.open_table(TABLE_NOTES)?;
    }
    write_txn.commit()?;

    Ok(db)
}
