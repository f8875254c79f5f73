//! Bulk import upload endpoint (staff only)
//!
//! Multipart form with parts `list_file` (required), `detail_file`
//! (optional), and `mode` ("append" default, or "overwrite"). Shares the
//! merge engine with the `import-claims` batch binary.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::{Error, Result};
use crate::import::{self, ImportMode};
use crate::AppState;

/// Import result counts reported to the operator
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub created: u64,
    pub updated: u64,
    pub skipped: u64,
}

/// GET /upload-csv
///
/// Describes the expected multipart form for clients
pub async fn upload_form() -> Json<Value> {
    Json(json!({
        "method": "POST",
        "content_type": "multipart/form-data",
        "parts": {
            "list_file": "pipe '|' delimited list CSV (required)",
            "detail_file": "pipe '|' delimited detail CSV (optional)",
            "mode": "append (default) or overwrite",
        },
    }))
}

async fn text_part(field: axum::extract::multipart::Field<'_>, name: &str) -> Result<String> {
    let bytes = field
        .bytes()
        .await
        .map_err(|e| Error::InvalidInput(format!("failed to read {name}: {e}")))?;
    String::from_utf8(bytes.to_vec())
        .map_err(|_| Error::InvalidInput(format!("could not decode {name} as UTF-8")))
}

/// POST /upload-csv (staff only)
pub async fn upload_csv(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let mut list_text: Option<String> = None;
    let mut detail_text: Option<String> = None;
    let mut mode = ImportMode::Append;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::InvalidInput(format!("malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "list_file" => list_text = Some(text_part(field, "list_file").await?),
            "detail_file" => {
                let text = text_part(field, "detail_file").await?;
                if !text.trim().is_empty() {
                    detail_text = Some(text);
                }
            }
            "mode" => {
                let raw = text_part(field, "mode").await?;
                mode = ImportMode::parse(&raw)
                    .ok_or_else(|| Error::InvalidInput(format!("unknown mode: {raw}")))?;
            }
            // Unknown parts are ignored
            _ => {}
        }
    }

    let list_text =
        list_text.ok_or_else(|| Error::InvalidInput("list_file is required".to_string()))?;

    let summary = import::merge_claims(&state.db, mode, &list_text, detail_text.as_deref()).await?;

    Ok(Json(UploadResponse {
        created: summary.created,
        updated: summary.updated,
        skipped: summary.skipped,
    }))
}
