//! Claim browsing endpoints: list, incremental search, detail, and the
//! flag-for-review action

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::notes::NoteRow;
use crate::db::claims::{self, Claim, ClaimFilters, ClaimStatus};
use crate::db::notes;
use crate::error::{Error, Result};
use crate::money::format_cents;
use crate::AppState;

/// Query parameters shared by the list and search endpoints
#[derive(Debug, Deserialize, Default)]
pub struct ClaimQuery {
    /// Free-text term matched against claim id, patient name, or insurer
    #[serde(default)]
    pub q: Option<String>,
    /// Exact status filter ("denied", "paid", "review")
    #[serde(default)]
    pub status: Option<String>,
    /// Insurer substring filter
    #[serde(default)]
    pub insurer: Option<String>,
}

/// Claim fields as rendered in API responses
#[derive(Debug, Serialize)]
pub struct ClaimRow {
    pub id: i64,
    pub claim_id: i64,
    pub patient_name: String,
    pub insurer: String,
    pub status: &'static str,
    pub status_display: &'static str,
    pub billed_amount: String,
    pub paid_amount: String,
    pub underpayment: String,
    pub discharge_date: NaiveDate,
    pub cpt_codes: String,
    pub cpt_list: Vec<String>,
    pub denial_reason: String,
    pub created_at: String,
}

impl From<&Claim> for ClaimRow {
    fn from(claim: &Claim) -> Self {
        ClaimRow {
            id: claim.id,
            claim_id: claim.claim_id,
            patient_name: claim.patient_name.clone(),
            insurer: claim.insurer.clone(),
            status: claim.status.as_str(),
            status_display: claim.status.display_name(),
            billed_amount: format_cents(claim.billed_cents),
            paid_amount: format_cents(claim.paid_cents),
            underpayment: format_cents(claim.underpayment_cents()),
            discharge_date: claim.discharge_date,
            cpt_codes: claim.cpt_codes.clone(),
            cpt_list: claim.cpt_list(),
            denial_reason: claim.denial_reason.clone(),
            created_at: claim.created_at.clone(),
        }
    }
}

/// List response: rows plus filter context for the UI
#[derive(Debug, Serialize)]
pub struct ClaimListResponse {
    pub claims: Vec<ClaimRow>,
    pub insurers: Vec<String>,
    pub term: String,
    pub status: String,
    pub insurer: String,
}

/// Search response: matching rows only (incremental refresh)
#[derive(Debug, Serialize)]
pub struct ClaimRowsResponse {
    pub claims: Vec<ClaimRow>,
}

/// Run the shared filter query. An unrecognized status value matches no
/// enumerated status, so it yields an empty result rather than an error.
async fn run_search(state: &AppState, query: &ClaimQuery) -> Result<Vec<Claim>> {
    let term = query
        .q
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string);
    let insurer = query
        .insurer
        .as_deref()
        .filter(|i| !i.is_empty())
        .map(str::to_string);

    let status = match query.status.as_deref().filter(|s| !s.is_empty()) {
        Some(raw) => match ClaimStatus::parse(raw) {
            Some(status) => Some(status),
            None => return Ok(Vec::new()),
        },
        None => None,
    };

    claims::search_claims(
        &state.db,
        &ClaimFilters {
            term,
            status,
            insurer,
        },
    )
    .await
}

/// GET /
///
/// Claim list with optional `q`, `status`, `insurer` filters. At most 50
/// rows, discharge date descending, ties by claim id descending.
pub async fn claim_list(
    State(state): State<AppState>,
    Query(query): Query<ClaimQuery>,
) -> Result<Json<ClaimListResponse>> {
    let rows = run_search(&state, &query).await?;
    let insurers = claims::distinct_insurers(&state.db).await?;

    Ok(Json(ClaimListResponse {
        claims: rows.iter().map(ClaimRow::from).collect(),
        insurers,
        term: query.q.unwrap_or_default(),
        status: query.status.unwrap_or_default(),
        insurer: query.insurer.unwrap_or_default(),
    }))
}

/// GET /search
///
/// Same filter semantics as the list endpoint, rows only. Both delegate
/// to the same query so they cannot diverge.
pub async fn claim_search(
    State(state): State<AppState>,
    Query(query): Query<ClaimQuery>,
) -> Result<Json<ClaimRowsResponse>> {
    let rows = run_search(&state, &query).await?;
    Ok(Json(ClaimRowsResponse {
        claims: rows.iter().map(ClaimRow::from).collect(),
    }))
}

/// Detail response: the claim plus its notes, newest first
#[derive(Debug, Serialize)]
pub struct ClaimDetailResponse {
    pub claim: ClaimRow,
    pub notes: Vec<NoteRow>,
}

/// GET /:id
pub async fn claim_detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ClaimDetailResponse>> {
    let claim = claims::get_claim(&state.db, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("claim {id}")))?;
    let claim_notes = notes::notes_for_claim(&state.db, claim.id).await?;

    Ok(Json(ClaimDetailResponse {
        claim: ClaimRow::from(&claim),
        notes: claim_notes.iter().map(NoteRow::from).collect(),
    }))
}

/// Refreshed status payload returned by the flag action
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub id: i64,
    pub claim_id: i64,
    pub status: &'static str,
    pub status_display: &'static str,
}

/// POST /:id/flag
///
/// Unconditionally moves the claim into review, whatever its prior
/// status. Not a validated state machine.
pub async fn flag_for_review(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<StatusResponse>> {
    let claim = claims::set_status(&state.db, id, ClaimStatus::Review)
        .await?
        .ok_or_else(|| Error::NotFound(format!("claim {id}")))?;

    Ok(Json(StatusResponse {
        id: claim.id,
        claim_id: claim.claim_id,
        status: claim.status.as_str(),
        status_display: claim.status.display_name(),
    }))
}
