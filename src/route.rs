//! Route definitions for the note API
//!
//! This module configures all HTTP routes and maps them to their handlers.

use axum::routing::{get, post};
use axum::Router;

use crate::database::AppState;
use crate::handler::{edit_note, export_note, note_stats, report_note, save_note, show_note};

/// Creates the application router
///
/// # Route Definitions
///
/// - `POST /` - Creates, updates or deletes a note
/// - `GET /{id}` - Shows a note
/// - `GET /{id}/export` - Raw note text
/// - `GET /{id}/stats` - View statistics
/// - `GET /{id}/edit` - Data for an edit form
/// - `POST /{id}/report` - Reports an abusive note
///
/// # Example Usage
///
/// ```no_run
/// # use std::sync::Arc;
/// # use notehub::database::{init_db, AppState};
/// # use notehub::route::create_app;
/// # let db = init_db("notes.redb").unwrap();
/// let state = AppState::new(Arc::new(db));
/// let app = create_app(state);
/// // axum::serve(listener, app).await.unwrap();
/// ```
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", post(save_note))
        .route("/{id}", get(show_note))
        .route("/{id}/export", get(export_note))
        .route("/{id}/stats", get(note_stats))
        .route("/{id}/edit", get(edit_note))
        .route("/{id}/report", post(report_note))
        .with_state(state)
}
