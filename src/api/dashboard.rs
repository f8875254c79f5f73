//! Staff dashboard: aggregate counts and top underpaid claims

use axum::{extract::State, Json};
use serde::Serialize;

use crate::api::claims::ClaimRow;
use crate::db::claims;
use crate::error::Result;
use crate::money::format_cents;
use crate::AppState;

/// Dashboard aggregates
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub total: i64,
    pub paid: i64,
    pub denied: i64,
    pub review: i64,
    /// Average underpayment over claims where paid < billed ("0.00" if none)
    pub avg_underpayment: String,
    /// Ten claims with the largest underpayment, descending
    pub top_underpaid: Vec<ClaimRow>,
}

/// GET /admin-dashboard (staff only)
pub async fn admin_dashboard(State(state): State<AppState>) -> Result<Json<DashboardResponse>> {
    let stats = claims::dashboard_stats(&state.db).await?;

    Ok(Json(DashboardResponse {
        total: stats.total,
        paid: stats.paid,
        denied: stats.denied,
        review: stats.review,
        avg_underpayment: format_cents(stats.avg_underpayment_cents),
        top_underpaid: stats.top_underpaid.iter().map(ClaimRow::from).collect(),
    }))
}
