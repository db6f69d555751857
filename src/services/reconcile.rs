//! Get-or-create resolution of submitted tag/step names and replacement of a
//! posting's link set. Callers run these on a transaction.

use crate::services::attrs::Attr;
use anyhow::Result;
use rusqlite::{Connection, OptionalExtension};

/// Returns the id of the user's record named `name`, inserting it on a miss.
/// An existing record is reused untouched; with duplicate names the oldest
/// wins.
pub fn get_or_create<A: Attr>(conn: &Connection, user_id: i64, name: &str) -> Result<i64> {
    let existing: Option<i64> = conn
        .query_row(
            &format!(
                "SELECT id FROM {} WHERE user_id = ? AND name = ? ORDER BY id LIMIT 1",
                A::TABLE
            ),
            (user_id, name),
            |row| row.get(0),
        )
        .optional()?;

    if let Some(id) = existing {
        return Ok(id);
    }

    conn.execute(
        &format!("INSERT INTO {} (user_id, name) VALUES (?, ?)", A::TABLE),
        (user_id, name),
    )?;
    let id = conn.last_insert_rowid();
    tracing::debug!("Created {} '{}' ({}) for user {}", A::KIND, name, id, user_id);
    Ok(id)
}

/// Resolves each name and links it to the posting. Repeated names collapse
/// into a single link.
pub fn attach<A: Attr>(
    conn: &Connection,
    posting_id: i64,
    user_id: i64,
    names: &[String],
) -> Result<()> {
    let sql = format!(
        "INSERT OR IGNORE INTO {} (posting_id, {}) VALUES (?, ?)",
        A::LINK_TABLE,
        A::LINK_COLUMN
    );
    for name in names {
        let attr_id = get_or_create::<A>(conn, user_id, name)?;
        conn.execute(&sql, (posting_id, attr_id))?;
    }
    Ok(())
}

/// Makes `names` the posting's complete link set for `A`. An empty slice
/// clears the relation. Unlinked records are kept.
pub fn replace<A: Attr>(
    conn: &Connection,
    posting_id: i64,
    user_id: i64,
    names: &[String],
) -> Result<()> {
    conn.execute(
        &format!("DELETE FROM {} WHERE posting_id = ?", A::LINK_TABLE),
        [posting_id],
    )?;
    attach::<A>(conn, posting_id, user_id, names)
}
