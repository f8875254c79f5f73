//! Authentication middleware
//!
//! Requests authenticate with a bearer token resolved against the users
//! table. `require_user` gates note submission (anonymous callers are
//! rejected before any data access); `require_staff` additionally demands
//! the staff flag for the dashboard and bulk upload.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::db::users::{self, User};
use crate::error::Error;
use crate::AppState;

/// The authenticated caller, inserted into request extensions
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Pull the bearer token out of the headers as an owned string, so the
/// request is not borrowed across the database await
fn bearer_token(request: &Request) -> Option<String> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

async fn resolve_user(state: &AppState, token: Option<String>) -> Result<User, Error> {
    let token = token.ok_or(Error::Unauthorized)?;
    users::find_by_token(&state.db, &token)
        .await?
        .ok_or(Error::Unauthorized)
}

/// Reject anonymous callers; attach the resolved user to the request
pub async fn require_user(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, Error> {
    let token = bearer_token(&request);
    let user = resolve_user(&state, token).await?;
    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}

/// Reject anonymous callers and authenticated callers without staff access
pub async fn require_staff(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, Error> {
    let token = bearer_token(&request);
    let user = resolve_user(&state, token).await?;
    if !user.is_staff {
        return Err(Error::Forbidden);
    }
    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}
