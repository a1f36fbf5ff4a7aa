//! HTTP request handlers for the note API
//!
//! This module maps HTTP requests onto the note service:
//! - Showing a note (with the fraud heuristic applied)
//! - Exporting, editing and viewing stats of a note
//! - Creating, updating and deleting notes
//! - Reporting abusive notes
//!
//! All business rules live in the service; handlers only translate
//! `LoadStatus` and `NoteError` into status codes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{debug, error, info};

use crate::database::AppState;
use crate::error::NoteError;
use crate::model::{EditView, NoteView, ReportRequest, SaveRequest, SaveResponse, StatsView};
use crate::service::LoadStatus;

/// Maps a service error onto the status code returned to the client
pub fn error_status(err: &NoteError) -> StatusCode {
    match err {
        NoteError::NotFound => StatusCode::NOT_FOUND,
        NoteError::Unauthorized => StatusCode::UNAUTHORIZED,
        NoteError::BadRequest(_) => StatusCode::BAD_REQUEST,
        NoteError::Conflict(_) => StatusCode::CONFLICT,
        NoteError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

fn load_status(status: LoadStatus) -> StatusCode {
    match status {
        LoadStatus::Ok => StatusCode::OK,
        LoadStatus::NotFound => StatusCode::NOT_FOUND,
        LoadStatus::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
    }
}

fn reason(code: StatusCode) -> &'static str {
    code.canonical_reason().unwrap_or("Error")
}

/// Error body shared by the read endpoints
fn read_error(code: StatusCode) -> Response {
    (code, Json(json!({ "error": reason(code) }))).into_response()
}

fn save_reply(code: StatusCode, success: bool, payload: String) -> Response {
    (code, Json(SaveResponse { success, payload })).into_response()
}

/// Shows a note
///
/// # Response
///
/// - **200 OK** - `NoteView` JSON; `flagged` is set and `ads` carries the
///   configured payload when the note looks like a link farm
/// - **404 Not Found** - Unknown or deleted note
/// - **503 Service Unavailable** - Store failure
pub async fn show_note(Path(id): Path<String>, State(state): State<AppState>) -> Response {
    let (note, status, flagged) = state.service.show(&id);
    let code = load_status(status);
    debug!("/{id} requested; response code: {}", code.as_u16());

    if status != LoadStatus::Ok {
        return read_error(code);
    }

    let view = NoteView {
        flagged,
        ads: note.ads.as_deref().map(str::to_string),
        id: note.id,
        text: note.text,
        views: note.views,
        published: note.published,
        edited: note.edited,
    };
    (code, Json(view)).into_response()
}

/// Returns the raw note text as `text/plain`
pub async fn export_note(Path(id): Path<String>, State(state): State<AppState>) -> Response {
    let (note, status) = state.service.load(&id);
    let code = load_status(status);
    debug!("/{id}/export requested; response code: {}", code.as_u16());

    if status != LoadStatus::Ok {
        return read_error(code);
    }
    (code, note.text).into_response()
}

/// Returns the view statistics of a note, with a rendered summary in `content`
pub async fn note_stats(Path(id): Path<String>, State(state): State<AppState>) -> Response {
    let (note, status) = state.service.stats(&id);
    let code = load_status(status);
    debug!("/{id}/stats requested; response code: {}", code.as_u16());

    if status != LoadStatus::Ok {
        return read_error(code);
    }

    let view = StatsView {
        id: note.id,
        views: note.views,
        published: note.published,
        edited: note.edited,
        content: note.content.unwrap_or_default(),
    };
    (code, Json(view)).into_response()
}

/// Returns what an edit form needs to prefill
pub async fn edit_note(Path(id): Path<String>, State(state): State<AppState>) -> Response {
    let (note, status) = state.service.load(&id);
    let code = load_status(status);
    debug!("/{id}/edit requested; response code: {}", code.as_u16());

    if status != LoadStatus::Ok {
        return read_error(code);
    }
    (
        code,
        Json(EditView {
            id: note.id,
            text: note.text,
        }),
    )
        .into_response()
}

/// Creates, updates or deletes a note
///
/// # Request Body
///
/// ```json
/// { "id": "", "text": "at least ten characters", "password": "", "tos": true }
/// ```
///
/// # Response
///
/// - **201 Created** - Note created, `payload` is the new ID
/// - **200 OK** - Note updated or deleted
/// - **400 Bad Request** - Text length or ID not accepted
/// - **401 Unauthorized** - Wrong password
/// - **404 Not Found** - Deleting a note that does not exist
/// - **409 Conflict** - Requested ID already taken
/// - **412 Precondition Failed** - Terms of service not accepted
/// - **503 Service Unavailable** - Store failure
pub async fn save_note(State(state): State<AppState>, Json(payload): Json<SaveRequest>) -> Response {
    debug!("POST /");

    if !payload.tos {
        let code = StatusCode::PRECONDITION_FAILED;
        error!("POST / error: {}", code.as_u16());
        return save_reply(code, false, reason(code).to_string());
    }

    let note = match state
        .service
        .save(&payload.id, &payload.text, &payload.password)
    {
        Ok(note) => note,
        Err(err) => {
            let code = error_status(&err);
            error!("POST / error: {}: {err}", code.as_u16());
            return save_reply(code, false, format!("{}: {err}", reason(code)));
        }
    };

    // Updates always stamp `edited`; a note without it was just created
    if note.edited.is_none() {
        info!("note {} created", note.id);
        save_reply(StatusCode::CREATED, true, note.id)
    } else if note.is_deleted() {
        info!("note {} deleted", note.id);
        save_reply(StatusCode::OK, true, note.id)
    } else {
        info!("note {} updated", note.id);
        save_reply(StatusCode::OK, true, note.id)
    }
}

/// Records an abuse report for a note
///
/// The report is only logged; notifying an operator is left to whatever
/// collects the logs.
pub async fn report_note(
    Path(id): Path<String>,
    Json(payload): Json<ReportRequest>,
) -> impl IntoResponse {
    let report = payload.report.trim();
    if !report.is_empty() {
        info!("note {id} was reported: {report}");
    }
    StatusCode::NO_CONTENT
}
