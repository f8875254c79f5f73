//! Note submission endpoint

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::api::auth::CurrentUser;
use crate::db::claims;
use crate::db::notes::{self, Note, NoteKind};
use crate::error::{Error, Result};
use crate::AppState;

/// Note creation request
#[derive(Debug, Deserialize)]
pub struct AddNoteRequest {
    /// "admin" (default) or "system"
    #[serde(default)]
    pub kind: Option<String>,
    pub body: String,
}

/// Note as rendered in API responses
#[derive(Debug, Serialize)]
pub struct NoteRow {
    pub id: i64,
    pub kind: &'static str,
    pub body: String,
    /// Author username; None if the account was since removed
    pub author: Option<String>,
    pub created_at: String,
}

impl From<&Note> for NoteRow {
    fn from(note: &Note) -> Self {
        NoteRow {
            id: note.id,
            kind: note.kind.as_str(),
            body: note.body.clone(),
            author: note.author.clone(),
            created_at: note.created_at.clone(),
        }
    }
}

/// POST /:id/add-note
///
/// Requires an authenticated caller; persists the note attributed to them
/// and returns a rendering of just that note.
pub async fn add_note(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(request): Json<AddNoteRequest>,
) -> Result<(StatusCode, Json<NoteRow>)> {
    let claim = claims::get_claim(&state.db, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("claim {id}")))?;

    let kind = match request.kind.as_deref() {
        None | Some("") => NoteKind::Admin,
        Some(raw) => NoteKind::parse(raw)
            .ok_or_else(|| Error::InvalidInput(format!("unknown note kind: {raw}")))?,
    };

    let body = request.body.trim();
    if body.is_empty() {
        return Err(Error::InvalidInput("note body must not be empty".to_string()));
    }

    let note = notes::insert_note(&state.db, claim.id, kind, body, user.id).await?;
    Ok((StatusCode::CREATED, Json(NoteRow::from(&note))))
}
