//! Note database operations
//!
//! Append-only annotations attached to a claim. Notes are never updated or
//! deleted through the application; they disappear only when their claim
//! is deleted (cascade). The author reference clears if the user is
//! removed, but the note survives.

use crate::error::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

/// Note category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteKind {
    Admin,
    System,
}

impl NoteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoteKind::Admin => "admin",
            NoteKind::System => "system",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(NoteKind::Admin),
            "system" => Some(NoteKind::System),
            _ => None,
        }
    }
}

/// Note record, with the author's username resolved when still present
#[derive(Debug, Clone)]
pub struct Note {
    pub id: i64,
    /// Internal surrogate key of the parent claim
    pub claim_id: i64,
    pub kind: NoteKind,
    pub body: String,
    pub created_by: Option<i64>,
    pub author: Option<String>,
    pub created_at: String,
}

fn note_from_row(row: &SqliteRow) -> Note {
    let kind_raw: String = row.get("kind");
    Note {
        id: row.get("id"),
        claim_id: row.get("claim_id"),
        kind: NoteKind::parse(&kind_raw).unwrap_or(NoteKind::Admin),
        body: row.get("body"),
        created_by: row.get("created_by"),
        author: row.get("author"),
        created_at: row.get("created_at"),
    }
}

const NOTE_COLUMNS: &str = "n.id, n.claim_id, n.kind, n.body, n.created_by, \
     u.username AS author, n.created_at";

/// Insert a note on a claim and return it
pub async fn insert_note(
    pool: &SqlitePool,
    claim_pk: i64,
    kind: NoteKind,
    body: &str,
    created_by: i64,
) -> Result<Note> {
    let result = sqlx::query(
        "INSERT INTO notes (claim_id, kind, body, created_by) VALUES (?, ?, ?, ?)",
    )
    .bind(claim_pk)
    .bind(kind.as_str())
    .bind(body)
    .bind(created_by)
    .execute(pool)
    .await?;

    let row = sqlx::query(&format!(
        "SELECT {} FROM notes n LEFT JOIN users u ON n.created_by = u.id WHERE n.id = ?",
        NOTE_COLUMNS
    ))
    .bind(result.last_insert_rowid())
    .fetch_one(pool)
    .await?;

    Ok(note_from_row(&row))
}

/// List a claim's notes, newest first
pub async fn notes_for_claim(pool: &SqlitePool, claim_pk: i64) -> Result<Vec<Note>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM notes n LEFT JOIN users u ON n.created_by = u.id
         WHERE n.claim_id = ?
         ORDER BY n.created_at DESC, n.id DESC",
        NOTE_COLUMNS
    ))
    .bind(claim_pk)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(note_from_row).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trip() {
        assert_eq!(NoteKind::parse("admin"), Some(NoteKind::Admin));
        assert_eq!(NoteKind::parse("system"), Some(NoteKind::System));
        assert_eq!(NoteKind::parse("other"), None);
    }
}
