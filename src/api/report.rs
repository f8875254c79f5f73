//! Per-claim CSV report download

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::Utc;

use crate::db::claims::{self, Claim};
use crate::error::{Error, Result};
use crate::money::format_cents;
use crate::AppState;

const REPORT_HEADER: &[&str] = &[
    "Claim ID",
    "Patient",
    "Insurer",
    "Status",
    "Billed",
    "Paid",
    "Discharge",
    "CPT Codes",
    "Denial Reason",
];

/// Quote a CSV field when it contains a delimiter, quote, or newline
fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn csv_line(fields: &[String]) -> String {
    fields
        .iter()
        .map(|f| csv_field(f))
        .collect::<Vec<_>>()
        .join(",")
}

fn render_report(claim: &Claim) -> String {
    let header = REPORT_HEADER
        .iter()
        .map(|h| h.to_string())
        .collect::<Vec<_>>();
    let row = vec![
        claim.claim_id.to_string(),
        claim.patient_name.clone(),
        claim.insurer.clone(),
        claim.status.display_name().to_string(),
        format_cents(claim.billed_cents),
        format_cents(claim.paid_cents),
        claim.discharge_date.to_string(),
        claim.cpt_codes.clone(),
        claim.denial_reason.clone(),
    ];
    format!("{}\r\n{}\r\n", csv_line(&header), csv_line(&row))
}

/// GET /:id/report
///
/// One-row CSV of all claim fields, served as a download with a
/// timestamped filename.
pub async fn claim_report(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response> {
    let claim = claims::get_claim(&state.db, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("claim {id}")))?;

    let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
    let filename = format!("claim_{}_{}.csv", claim.claim_id, timestamp);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        render_report(&claim),
    )
        .into_response())
}
