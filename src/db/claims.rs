//! Claim database operations
//!
//! One row per insurance claim. `claim_id` is the external claim
//! identifier (unique); `id` is the internal surrogate key used in URLs.

use crate::error::Result;
use chrono::NaiveDate;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

/// Claim workflow status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimStatus {
    Denied,
    Paid,
    Review,
}

impl ClaimStatus {
    /// Stored/wire form ("denied", "paid", "review")
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStatus::Denied => "denied",
            ClaimStatus::Paid => "paid",
            ClaimStatus::Review => "review",
        }
    }

    /// Human-readable label used in CSV reports
    pub fn display_name(&self) -> &'static str {
        match self {
            ClaimStatus::Denied => "Denied",
            ClaimStatus::Paid => "Paid",
            ClaimStatus::Review => "Under Review",
        }
    }

    /// Exact-match parse of the stored form
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "denied" => Some(ClaimStatus::Denied),
            "paid" => Some(ClaimStatus::Paid),
            "review" => Some(ClaimStatus::Review),
            _ => None,
        }
    }
}

/// Claim record
#[derive(Debug, Clone)]
pub struct Claim {
    pub id: i64,
    pub claim_id: i64,
    pub patient_name: String,
    pub billed_cents: i64,
    pub paid_cents: i64,
    pub status: ClaimStatus,
    pub insurer: String,
    pub discharge_date: NaiveDate,
    pub cpt_codes: String,
    pub denial_reason: String,
    pub created_at: String,
}

impl Claim {
    /// Billed minus paid; positive means the claim was underpaid
    pub fn underpayment_cents(&self) -> i64 {
        self.billed_cents - self.paid_cents
    }

    /// Split the comma-joined CPT code string into trimmed codes
    pub fn cpt_list(&self) -> Vec<String> {
        self.cpt_codes
            .split(',')
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .map(|c| c.to_string())
            .collect()
    }
}

/// Fields written by the import/upsert path (`created_at` is never updated)
#[derive(Debug, Clone)]
pub struct ClaimUpsert {
    pub claim_id: i64,
    pub patient_name: String,
    pub billed_cents: i64,
    pub paid_cents: i64,
    pub status: ClaimStatus,
    pub insurer: String,
    pub discharge_date: NaiveDate,
    pub cpt_codes: String,
    pub denial_reason: String,
}

/// Optional filters applied by the list and search endpoints
#[derive(Debug, Clone, Default)]
pub struct ClaimFilters {
    /// Case-insensitive substring against claim id, patient name, or insurer
    pub term: Option<String>,
    /// Exact status match
    pub status: Option<ClaimStatus>,
    /// Case-insensitive insurer substring
    pub insurer: Option<String>,
}

/// Result cap for the list/search endpoints
pub const SEARCH_CAP: i64 = 50;

/// Number of claims in the dashboard "top underpaid" list
pub const TOP_UNDERPAID_CAP: i64 = 10;

const CLAIM_COLUMNS: &str = "id, claim_id, patient_name, billed_cents, paid_cents, \
     status, insurer, discharge_date, cpt_codes, denial_reason, created_at";

/// Escape LIKE wildcards so filter terms match literally
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn claim_from_row(row: &SqliteRow) -> Claim {
    let status_raw: String = row.get("status");
    Claim {
        id: row.get("id"),
        claim_id: row.get("claim_id"),
        patient_name: row.get("patient_name"),
        billed_cents: row.get("billed_cents"),
        paid_cents: row.get("paid_cents"),
        // Schema default keeps this one of the three values; anything
        // unexpected decodes as review
        status: ClaimStatus::parse(&status_raw).unwrap_or(ClaimStatus::Review),
        insurer: row.get("insurer"),
        discharge_date: row.get("discharge_date"),
        cpt_codes: row.get("cpt_codes"),
        denial_reason: row.get("denial_reason"),
        created_at: row.get("created_at"),
    }
}

/// Search claims with optional filters.
///
/// Ordered by discharge date descending, ties broken by external claim id
/// descending, capped at [`SEARCH_CAP`] rows. Both the list page and the
/// incremental search endpoint call this, keeping the two identical.
pub async fn search_claims(pool: &SqlitePool, filters: &ClaimFilters) -> Result<Vec<Claim>> {
    let mut sql = format!("SELECT {} FROM claims", CLAIM_COLUMNS);

    let mut clauses: Vec<&str> = Vec::new();
    if filters.term.is_some() {
        clauses.push(
            "(CAST(claim_id AS TEXT) LIKE ? ESCAPE '\\' \
             OR patient_name LIKE ? ESCAPE '\\' \
             OR insurer LIKE ? ESCAPE '\\')",
        );
    }
    if filters.status.is_some() {
        clauses.push("status = ?");
    }
    if filters.insurer.is_some() {
        clauses.push("insurer LIKE ? ESCAPE '\\'");
    }
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY discharge_date DESC, claim_id DESC LIMIT ?");

    let mut query = sqlx::query(&sql);
    if let Some(term) = &filters.term {
        let pattern = format!("%{}%", escape_like(term));
        query = query
            .bind(pattern.clone())
            .bind(pattern.clone())
            .bind(pattern);
    }
    if let Some(status) = &filters.status {
        query = query.bind(status.as_str());
    }
    if let Some(insurer) = &filters.insurer {
        query = query.bind(format!("%{}%", escape_like(insurer)));
    }
    query = query.bind(SEARCH_CAP);

    let rows = query.fetch_all(pool).await?;
    Ok(rows.iter().map(claim_from_row).collect())
}

/// Load a claim by internal surrogate key
pub async fn get_claim(pool: &SqlitePool, id: i64) -> Result<Option<Claim>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM claims WHERE id = ?",
        CLAIM_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.as_ref().map(claim_from_row))
}

/// Upsert a claim keyed by external `claim_id`.
///
/// Returns `true` when the row was newly created, `false` when an existing
/// claim was updated. `created_at` is preserved across updates.
pub async fn upsert_claim(pool: &SqlitePool, claim: &ClaimUpsert) -> Result<bool> {
    let existed: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM claims WHERE claim_id = ?)")
            .bind(claim.claim_id)
            .fetch_one(pool)
            .await?;

    sqlx::query(
        r#"
        INSERT INTO claims (
            claim_id, patient_name, billed_cents, paid_cents,
            status, insurer, discharge_date, cpt_codes, denial_reason
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(claim_id) DO UPDATE SET
            patient_name = excluded.patient_name,
            billed_cents = excluded.billed_cents,
            paid_cents = excluded.paid_cents,
            status = excluded.status,
            insurer = excluded.insurer,
            discharge_date = excluded.discharge_date,
            cpt_codes = excluded.cpt_codes,
            denial_reason = excluded.denial_reason
        "#,
    )
    .bind(claim.claim_id)
    .bind(&claim.patient_name)
    .bind(claim.billed_cents)
    .bind(claim.paid_cents)
    .bind(claim.status.as_str())
    .bind(&claim.insurer)
    .bind(claim.discharge_date)
    .bind(&claim.cpt_codes)
    .bind(&claim.denial_reason)
    .execute(pool)
    .await?;

    Ok(!existed)
}

/// Force a claim's status; returns the refreshed claim or None if unknown
pub async fn set_status(
    pool: &SqlitePool,
    id: i64,
    status: ClaimStatus,
) -> Result<Option<Claim>> {
    let result = sqlx::query("UPDATE claims SET status = ? WHERE id = ?")
        .bind(status.as_str())
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    get_claim(pool, id).await
}

/// Delete every claim (overwrite-mode import); notes cascade with them
pub async fn delete_all_claims(pool: &SqlitePool) -> Result<u64> {
    let result = sqlx::query("DELETE FROM claims").execute(pool).await?;
    Ok(result.rows_affected())
}

/// Distinct non-empty insurer names, for the list page filter dropdown
pub async fn distinct_insurers(pool: &SqlitePool) -> Result<Vec<String>> {
    let rows = sqlx::query_scalar::<_, String>(
        "SELECT DISTINCT insurer FROM claims WHERE insurer <> '' ORDER BY insurer",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Aggregates backing the admin dashboard
#[derive(Debug)]
pub struct DashboardStats {
    pub total: i64,
    pub paid: i64,
    pub denied: i64,
    pub review: i64,
    /// Average of billed - paid over claims where paid < billed; 0 when none
    pub avg_underpayment_cents: i64,
    /// Up to ten claims with the largest underpayment, descending
    pub top_underpaid: Vec<Claim>,
}

/// Compute dashboard aggregates with SQL
pub async fn dashboard_stats(pool: &SqlitePool) -> Result<DashboardStats> {
    let counts = sqlx::query(
        r#"
        SELECT
            COUNT(*) AS total,
            COALESCE(SUM(CASE WHEN status = 'paid' THEN 1 ELSE 0 END), 0) AS paid,
            COALESCE(SUM(CASE WHEN status = 'denied' THEN 1 ELSE 0 END), 0) AS denied,
            COALESCE(SUM(CASE WHEN status = 'review' THEN 1 ELSE 0 END), 0) AS review
        FROM claims
        "#,
    )
    .fetch_one(pool)
    .await?;

    let avg: Option<f64> = sqlx::query_scalar(
        "SELECT AVG(billed_cents - paid_cents) FROM claims WHERE billed_cents > paid_cents",
    )
    .fetch_one(pool)
    .await?;

    let top_rows = sqlx::query(&format!(
        "SELECT {} FROM claims
         WHERE billed_cents > paid_cents
         ORDER BY (billed_cents - paid_cents) DESC
         LIMIT ?",
        CLAIM_COLUMNS
    ))
    .bind(TOP_UNDERPAID_CAP)
    .fetch_all(pool)
    .await?;

    Ok(DashboardStats {
        total: counts.get("total"),
        paid: counts.get("paid"),
        denied: counts.get("denied"),
        review: counts.get("review"),
        avg_underpayment_cents: avg.map(|v| v.round() as i64).unwrap_or(0),
        top_underpaid: top_rows.iter().map(claim_from_row).collect(),
    })
}
