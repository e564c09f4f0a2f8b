use rusqlite::{params, OptionalExtension, Row};
use serde::Serialize;

use super::Db;
use crate::error::{NotegraphError, Result};
use crate::graph::SourceDocument;

const NOTE_COLUMNS: &str = "id, title, content, created_at, updated_at";

/// A stored note. `content` is either plain text or a serialized snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Note {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            content: row.get(2)?,
            created_at: row.get(3)?,
            updated_at: row.get(4)?,
        })
    }

    /// Identifier used for this note inside the graph.
    pub fn document_id(&self) -> String {
        format!("doc-{}", self.id)
    }
}

impl From<&Note> for SourceDocument {
    fn from(note: &Note) -> Self {
        SourceDocument {
            id: note.document_id(),
            content: note.content.clone(),
        }
    }
}

/// All notes, most recently updated first.
pub async fn list_notes(db: &Db) -> Result<Vec<Note>> {
    db.with_connection(|conn| {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM markdowns ORDER BY updated_at DESC, id DESC",
            NOTE_COLUMNS
        ))?;
        let notes = stmt
            .query_map([], Note::from_row)?
            .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;
        Ok(notes)
    })
    .await
}

pub async fn get_note(db: &Db, id: i64) -> Result<Note> {
    db.with_connection(move |conn| {
        conn.query_row(
            &format!("SELECT {} FROM markdowns WHERE id = ?1", NOTE_COLUMNS),
            params![id],
            Note::from_row,
        )
        .optional()?
        .ok_or(NotegraphError::NoteNotFound(id))
    })
    .await
}

pub async fn create_note(db: &Db, title: &str, content: &str) -> Result<Note> {
    let title = title.to_string();
    let content = content.to_string();
    db.with_connection(move |conn| {
        let note = conn.query_row(
            &format!(
                "INSERT INTO markdowns (title, content) VALUES (?1, ?2) RETURNING {}",
                NOTE_COLUMNS
            ),
            params![title, content],
            Note::from_row,
        )?;
        log::debug!("Created note {} ({})", note.id, note.title);
        Ok(note)
    })
    .await
}

/// Replace title and content, bumping `updated_at`.
pub async fn update_note(db: &Db, id: i64, title: &str, content: &str) -> Result<Note> {
    let title = title.to_string();
    let content = content.to_string();
    db.with_connection(move |conn| {
        conn.query_row(
            &format!(
                "UPDATE markdowns SET title = ?1, content = ?2, updated_at = CURRENT_TIMESTAMP \
                 WHERE id = ?3 RETURNING {}",
                NOTE_COLUMNS
            ),
            params![title, content, id],
            Note::from_row,
        )
        .optional()?
        .ok_or(NotegraphError::NoteNotFound(id))
    })
    .await
}

/// Returns whether a note was removed.
pub async fn delete_note(db: &Db, id: i64) -> Result<bool> {
    db.with_connection(move |conn| {
        let affected = conn.execute("DELETE FROM markdowns WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    })
    .await
}
