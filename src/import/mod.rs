//! Bulk import / merge engine
//!
//! Normalizes loosely structured pipe-delimited claim files into the claim
//! schema and upserts them by external claim id. Shared by the HTTP upload
//! endpoint and the `import-claims` batch binary so the two entry points
//! cannot drift apart.
//!
//! Two input roles:
//! - list file (required): primary claim fields, header row with
//!   case-insensitive column aliases
//! - detail file (optional): positional columns
//!   `ignored | claim_id | denial_reason | cpt...`, augmenting denial
//!   reason and CPT codes only

use std::collections::HashMap;

use chrono::NaiveDate;
use clap::ValueEnum;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::db::claims::{self, ClaimStatus, ClaimUpsert};
use crate::error::Result;
use crate::money::parse_money;

/// Import mode selected by the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ImportMode {
    /// Leave existing claims untouched; upsert incoming rows
    Append,
    /// Delete every existing claim (and its notes) before importing
    Overwrite,
}

impl ImportMode {
    /// Parse the upload form value
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "append" => Some(ImportMode::Append),
            "overwrite" => Some(ImportMode::Overwrite),
            _ => None,
        }
    }
}

/// Row counts reported back to the operator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub created: u64,
    pub updated: u64,
    /// List rows dropped for a missing claim id or unparsable date
    pub skipped: u64,
}

/// Accepted date formats, tried in order: ISO, US slash, day-first slash.
/// Rows whose date matches none of these are skipped in both import paths.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d/%m/%Y"];

const CLAIM_ID_ALIASES: &[&str] = &["claim_id", "claim id", "claimid", "claim_no", "id"];
const PATIENT_ALIASES: &[&str] = &["patient_name", "patient", "patient name", "name"];
const BILLED_ALIASES: &[&str] = &["billed_amount", "billed", "billed amount"];
const PAID_ALIASES: &[&str] = &["paid_amount", "paid"];
const STATUS_ALIASES: &[&str] = &["status"];
const INSURER_ALIASES: &[&str] = &["insurer", "payer", "insurance", "insurer name"];
const DISCHARGE_ALIASES: &[&str] = &["discharge_date", "discharge date", "date", "service date"];
const CPT_ALIASES: &[&str] = &["cpt_codes", "cpt codes", "cpt"];
const DENIAL_ALIASES: &[&str] = &["denial_reason", "denial reason", "denial"];

/// Try each accepted date format in order
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Map free-text status values onto the enumerated statuses.
/// Anything unrecognized (including blank) lands in review.
pub fn normalize_status(raw: &str) -> ClaimStatus {
    match raw.trim().to_lowercase().as_str() {
        "denied" | "deny" => ClaimStatus::Denied,
        "paid" => ClaimStatus::Paid,
        "under review" | "review" | "in review" => ClaimStatus::Review,
        _ => ClaimStatus::Review,
    }
}

/// Normalized list-file row
#[derive(Debug, Clone)]
struct ListRow {
    claim_id: i64,
    patient_name: String,
    billed_cents: i64,
    paid_cents: i64,
    status: ClaimStatus,
    insurer: String,
    discharge_date: NaiveDate,
    cpt_codes: String,
    denial_reason: String,
}

/// Detail-file fields keyed by claim id
#[derive(Debug, Clone, Default)]
struct DetailRow {
    denial_reason: String,
    cpt_codes: String,
}

/// First alias whose column exists and holds a non-empty cell in this row
fn field<'a>(headers: &[String], cells: &'a [String], aliases: &[&str]) -> Option<&'a str> {
    for alias in aliases {
        if let Some(idx) = headers.iter().position(|h| h == alias) {
            if let Some(value) = cells.get(idx) {
                if !value.is_empty() {
                    return Some(value.as_str());
                }
            }
        }
    }
    None
}

/// Parse the list file into normalized rows plus a skip count
fn parse_list(text: &str) -> (Vec<ListRow>, u64) {
    let mut lines = text.lines();
    let headers: Vec<String> = match lines.next() {
        Some(header) => header
            .split('|')
            .map(|h| h.trim().to_lowercase())
            .collect(),
        None => return (Vec::new(), 0),
    };

    let mut rows = Vec::new();
    let mut skipped = 0u64;

    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        let mut cells: Vec<String> = line.split('|').map(|c| c.trim().to_string()).collect();
        // Short rows pad out to the header width; extra cells are ignored
        if cells.len() < headers.len() {
            cells.resize(headers.len(), String::new());
        }

        let claim_id = field(&headers, &cells, CLAIM_ID_ALIASES)
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|id| *id > 0);
        let claim_id = match claim_id {
            Some(id) => id,
            None => {
                skipped += 1;
                warn!("Skipping list row without a positive integer claim id: {line:?}");
                continue;
            }
        };

        let discharge_raw = field(&headers, &cells, DISCHARGE_ALIASES).unwrap_or("");
        let discharge_date = match parse_date(discharge_raw) {
            Some(date) => date,
            None => {
                skipped += 1;
                warn!("Skipping claim {claim_id}: unrecognized date {discharge_raw:?}");
                continue;
            }
        };

        rows.push(ListRow {
            claim_id,
            patient_name: field(&headers, &cells, PATIENT_ALIASES)
                .unwrap_or("")
                .to_string(),
            billed_cents: parse_money(field(&headers, &cells, BILLED_ALIASES).unwrap_or("0")),
            paid_cents: parse_money(field(&headers, &cells, PAID_ALIASES).unwrap_or("0")),
            status: normalize_status(field(&headers, &cells, STATUS_ALIASES).unwrap_or("")),
            insurer: field(&headers, &cells, INSURER_ALIASES)
                .unwrap_or("")
                .to_string(),
            discharge_date,
            cpt_codes: field(&headers, &cells, CPT_ALIASES).unwrap_or("").to_string(),
            denial_reason: field(&headers, &cells, DENIAL_ALIASES)
                .unwrap_or("")
                .to_string(),
        });
    }

    (rows, skipped)
}

/// Parse the detail file, keyed canonically by integer claim id.
///
/// Columns are positional: the first is ignored, the second is the claim
/// id, the third the denial reason, and everything after joins with commas
/// into the CPT code list. Rows with fewer than two columns or a
/// non-integer claim id are dropped.
fn parse_details(text: &str) -> HashMap<i64, DetailRow> {
    let mut out = HashMap::new();
    let mut lines = text.lines();
    lines.next(); // header row, positional format

    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        let cells: Vec<&str> = line.split('|').map(str::trim).collect();
        if cells.len() < 2 {
            continue;
        }
        let claim_id = match cells[1].parse::<i64>() {
            Ok(id) => id,
            Err(_) => continue,
        };
        let denial_reason = cells.get(2).copied().unwrap_or("").to_string();
        let cpt_codes = cells[3..]
            .iter()
            .filter(|c| !c.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(",");

        out.insert(
            claim_id,
            DetailRow {
                denial_reason,
                cpt_codes,
            },
        );
    }

    out
}

/// Merge list (and optional detail) file contents into the claims table.
///
/// One upsert per list row keyed by external claim id; detail rows augment
/// denial reason and CPT codes but never touch status, name, or amounts.
/// Overwrite mode deletes all existing claims first. There is no enclosing
/// transaction: a mid-import failure leaves earlier rows applied.
pub async fn merge_claims(
    pool: &SqlitePool,
    mode: ImportMode,
    list_text: &str,
    detail_text: Option<&str>,
) -> Result<ImportSummary> {
    let details = detail_text.map(parse_details).unwrap_or_default();
    if !details.is_empty() {
        info!("Loaded {} detail rows", details.len());
    }

    let (rows, skipped) = parse_list(list_text);
    info!("Loaded {} list rows ({} skipped)", rows.len(), skipped);

    if mode == ImportMode::Overwrite {
        let deleted = claims::delete_all_claims(pool).await?;
        info!("Overwrite mode: deleted {deleted} existing claims");
    }

    let mut summary = ImportSummary {
        skipped,
        ..Default::default()
    };

    for row in rows {
        let detail = details.get(&row.claim_id);
        let upsert = ClaimUpsert {
            claim_id: row.claim_id,
            patient_name: row.patient_name,
            billed_cents: row.billed_cents,
            paid_cents: row.paid_cents,
            status: row.status,
            insurer: row.insurer,
            discharge_date: row.discharge_date,
            cpt_codes: detail
                .map(|d| d.cpt_codes.clone())
                .unwrap_or(row.cpt_codes),
            denial_reason: detail
                .map(|d| d.denial_reason.clone())
                .unwrap_or(row.denial_reason),
        };

        if claims::upsert_claim(pool, &upsert).await? {
            summary.created += 1;
        } else {
            summary.updated += 1;
        }
    }

    info!(
        "Import complete. Created: {}, Updated: {}, Skipped: {}",
        summary.created, summary.updated, summary.skipped
    );
    Ok(summary)
}
