//! HTTP API handlers for claimdesk

pub mod auth;
pub mod claims;
pub mod dashboard;
pub mod health;
pub mod notes;
pub mod report;
pub mod upload;

pub use auth::{require_staff, require_user, CurrentUser};
pub use claims::{claim_detail, claim_list, claim_search, flag_for_review};
pub use dashboard::admin_dashboard;
pub use health::health_routes;
pub use notes::add_note;
pub use report::claim_report;
pub use upload::{upload_csv, upload_form};
