//! Tags and steps share one storage shape: a user-owned named row linked to
//! postings through a join table. Everything here is generic over [`Attr`].

use crate::models::{Step, Tag};
use crate::Database;
use anyhow::Result;
use rusqlite::{params_from_iter, Connection, OptionalExtension};
use std::collections::HashMap;

pub trait Attr: Sized {
    /// Singular label used in logs.
    const KIND: &'static str;
    const TABLE: &'static str;
    const LINK_TABLE: &'static str;
    const LINK_COLUMN: &'static str;
    /// Selected columns, `id` and `name` first.
    const COLUMNS: &'static str;

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self>;

    /// Public form for responses, given the media URL prefix.
    fn present(self, _media_prefix: &str) -> Self {
        self
    }
}

impl Attr for Tag {
    const KIND: &'static str = "tag";
    const TABLE: &'static str = "tags";
    const LINK_TABLE: &'static str = "posting_tags";
    const LINK_COLUMN: &'static str = "tag_id";
    const COLUMNS: &'static str = "id, name";

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Tag {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    }
}

impl Attr for Step {
    const KIND: &'static str = "step";
    const TABLE: &'static str = "steps";
    const LINK_TABLE: &'static str = "posting_steps";
    const LINK_COLUMN: &'static str = "step_id";
    const COLUMNS: &'static str = "id, name, image";

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Step {
            id: row.get(0)?,
            name: row.get(1)?,
            image: row.get(2)?,
        })
    }

    fn present(self, media_prefix: &str) -> Self {
        self.with_url_prefix(media_prefix)
    }
}

/// The user's records ordered by name descending. With `assigned_only`,
/// only records linked to at least one posting, each listed once.
pub fn list_attrs<A: Attr>(db: &Database, user_id: i64, assigned_only: bool) -> Result<Vec<A>> {
    let conn = db.get()?;
    let assigned_clause = if assigned_only {
        format!(
            "AND EXISTS (SELECT 1 FROM {link} l WHERE l.{col} = a.id)",
            link = A::LINK_TABLE,
            col = A::LINK_COLUMN
        )
    } else {
        String::new()
    };
    let sql = format!(
        "SELECT {cols} FROM {table} a WHERE a.user_id = ? {assigned}
         ORDER BY a.name DESC, a.id DESC",
        cols = qualified_columns::<A>("a"),
        table = A::TABLE,
        assigned = assigned_clause,
    );
    let mut stmt = conn.prepare(&sql)?;
    let attrs = stmt
        .query_map([user_id], A::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(attrs)
}

pub fn get_attr<A: Attr>(db: &Database, user_id: i64, id: i64) -> Result<Option<A>> {
    let conn = db.get()?;
    find_by_id::<A>(&conn, user_id, id)
}

pub fn create_attr<A: Attr>(db: &Database, user_id: i64, name: &str) -> Result<A> {
    let conn = db.get()?;
    conn.execute(
        &format!("INSERT INTO {} (user_id, name) VALUES (?, ?)", A::TABLE),
        (user_id, name),
    )?;
    let id = conn.last_insert_rowid();
    tracing::debug!("Created {} {} for user {}", A::KIND, id, user_id);
    find_by_id::<A>(&conn, user_id, id)?
        .ok_or_else(|| anyhow::anyhow!("{} {} vanished after insert", A::KIND, id))
}

/// Renames the record when `name` is given. `None` if the record is not the
/// user's.
pub fn update_attr<A: Attr>(
    db: &Database,
    user_id: i64,
    id: i64,
    name: Option<&str>,
) -> Result<Option<A>> {
    let conn = db.get()?;
    if let Some(name) = name {
        let affected = conn.execute(
            &format!("UPDATE {} SET name = ? WHERE id = ? AND user_id = ?", A::TABLE),
            (name, id, user_id),
        )?;
        if affected == 0 {
            return Ok(None);
        }
    }
    find_by_id::<A>(&conn, user_id, id)
}

/// Deletes the record and its posting links. Postings themselves stay.
pub fn delete_attr<A: Attr>(db: &Database, user_id: i64, id: i64) -> Result<bool> {
    let conn = db.get()?;
    let affected = conn.execute(
        &format!("DELETE FROM {} WHERE id = ? AND user_id = ?", A::TABLE),
        (id, user_id),
    )?;
    Ok(affected > 0)
}

pub(crate) fn find_by_id<A: Attr>(conn: &Connection, user_id: i64, id: i64) -> Result<Option<A>> {
    let attr = conn
        .query_row(
            &format!(
                "SELECT {} FROM {} WHERE id = ? AND user_id = ?",
                A::COLUMNS,
                A::TABLE
            ),
            (id, user_id),
            A::from_row,
        )
        .optional()?;
    Ok(attr)
}

/// Posting ids bound per query, well under SQLite's host parameter limit.
const POSTING_ID_CHUNK: usize = 500;

/// Batch-loads the records linked to each of `posting_ids`, in id order.
pub(crate) fn for_postings<A: Attr>(
    conn: &Connection,
    posting_ids: &[i64],
) -> Result<HashMap<i64, Vec<A>>> {
    let mut by_posting: HashMap<i64, Vec<A>> = HashMap::new();

    // posting_id trails the attribute columns
    let posting_col = A::COLUMNS.split(',').count();
    for chunk in posting_ids.chunks(POSTING_ID_CHUNK) {
        let placeholders = vec!["?"; chunk.len()].join(",");
        let sql = format!(
            "SELECT {cols}, l.posting_id
             FROM {table} a
             JOIN {link} l ON l.{col} = a.id
             WHERE l.posting_id IN ({placeholders})
             ORDER BY a.id",
            cols = qualified_columns::<A>("a"),
            table = A::TABLE,
            link = A::LINK_TABLE,
            col = A::LINK_COLUMN,
            placeholders = placeholders,
        );

        let mut stmt = conn.prepare_cached(&sql)?;
        let rows = stmt.query_map(params_from_iter(chunk.iter()), |row| {
            let attr = A::from_row(row)?;
            let posting_id: i64 = row.get(posting_col)?;
            Ok((posting_id, attr))
        })?;

        for row in rows {
            let (posting_id, attr) = row?;
            by_posting.entry(posting_id).or_default().push(attr);
        }
    }

    Ok(by_posting)
}

fn qualified_columns<A: Attr>(alias: &str) -> String {
    A::COLUMNS
        .split(',')
        .map(|c| format!("{}.{}", alias, c.trim()))
        .collect::<Vec<_>>()
        .join(", ")
}
