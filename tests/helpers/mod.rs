//! Shared test helpers: in-memory database, seed data, request builders

#![allow(dead_code)]

use axum::body::Body;
use axum::http::Request;
use chrono::NaiveDate;
use serde_json::Value;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use claimdesk::db;
use claimdesk::db::claims::{upsert_claim, ClaimStatus, ClaimUpsert};
use claimdesk::db::users::create_user;
use claimdesk::{build_router, AppState};

/// In-memory database with schema.
///
/// Single-connection pool so every query sees the same in-memory database
/// and the foreign_keys pragma applies to all of them.
pub async fn setup_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Should connect to in-memory database");

    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await
        .expect("Should enable foreign keys");

    db::create_schema(&pool).await.expect("Should create schema");
    pool
}

/// Router over the given pool
pub fn setup_app(pool: SqlitePool) -> axum::Router {
    build_router(AppState::new(pool))
}

/// Seed a staff user ("staff-token") and a non-staff user ("clerk-token")
pub async fn seed_users(pool: &SqlitePool) -> (i64, i64) {
    let staff = create_user(pool, "admin", "staff-token", true)
        .await
        .expect("Should create staff user");
    let clerk = create_user(pool, "clerk", "clerk-token", false)
        .await
        .expect("Should create clerk user");
    (staff, clerk)
}

/// Claim upsert fixture
pub fn claim_fixture(
    claim_id: i64,
    patient: &str,
    billed_cents: i64,
    paid_cents: i64,
    status: ClaimStatus,
    insurer: &str,
    discharge: &str,
) -> ClaimUpsert {
    ClaimUpsert {
        claim_id,
        patient_name: patient.to_string(),
        billed_cents,
        paid_cents,
        status,
        insurer: insurer.to_string(),
        discharge_date: NaiveDate::parse_from_str(discharge, "%Y-%m-%d").expect("valid date"),
        cpt_codes: String::new(),
        denial_reason: String::new(),
    }
}

/// Insert a claim fixture and return its internal surrogate id
pub async fn seed_claim(pool: &SqlitePool, claim: &ClaimUpsert) -> i64 {
    upsert_claim(pool, claim).await.expect("Should upsert claim");
    sqlx::query_scalar("SELECT id FROM claims WHERE claim_id = ?")
        .bind(claim.claim_id)
        .fetch_one(pool)
        .await
        .expect("Should find seeded claim")
}

/// Plain request with no body
pub fn test_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Request with a bearer token and no body
pub fn authed_request(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

/// JSON request, optionally authenticated
pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

const BOUNDARY: &str = "claimdesk-test-boundary";

/// Multipart upload request for the bulk import endpoint
pub fn upload_request(
    token: &str,
    mode: Option<&str>,
    list: Option<&str>,
    detail: Option<&str>,
) -> Request<Body> {
    let mut body = String::new();
    if let Some(mode) = mode {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"mode\"\r\n\r\n{mode}\r\n"
        ));
    }
    if let Some(list) = list {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"list_file\"; \
             filename=\"list.csv\"\r\nContent-Type: text/csv\r\n\r\n{list}\r\n"
        ));
    }
    if let Some(detail) = detail {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"detail_file\"; \
             filename=\"detail.csv\"\r\nContent-Type: text/csv\r\n\r\n{detail}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));

    Request::builder()
        .method("POST")
        .uri("/upload-csv")
        .header("authorization", format!("Bearer {token}"))
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

/// Extract JSON body from a response body
pub async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

/// Extract a response body as text
pub async fn extract_text(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    String::from_utf8(bytes.to_vec()).expect("Should be UTF-8")
}

/// Row count helper
pub async fn count_rows(pool: &SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .expect("Should count rows")
}
