//! User lookup for request authentication
//!
//! Accounts are provisioned directly in the users table; there is no
//! signup or session flow. Each user carries a bearer token and a staff
//! flag gating the dashboard and upload endpoints.

use crate::error::Result;
use sqlx::{Row, SqlitePool};

/// Authenticated user
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub is_staff: bool,
}

/// Resolve a bearer token to a user, if the token is known
pub async fn find_by_token(pool: &SqlitePool, token: &str) -> Result<Option<User>> {
    let row = sqlx::query("SELECT id, username, is_staff FROM users WHERE token = ?")
        .bind(token)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|row| User {
        id: row.get("id"),
        username: row.get("username"),
        is_staff: row.get::<i64, _>("is_staff") != 0,
    }))
}

/// Create a user account; returns its id
pub async fn create_user(
    pool: &SqlitePool,
    username: &str,
    token: &str,
    is_staff: bool,
) -> Result<i64> {
    let result = sqlx::query("INSERT INTO users (username, token, is_staff) VALUES (?, ?, ?)")
        .bind(username)
        .bind(token)
        .bind(is_staff as i64)
        .execute(pool)
        .await?;
    Ok(result.last_insert_rowid())
}

/// Delete a user; notes they authored survive with a cleared reference
pub async fn delete_user(pool: &SqlitePool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
