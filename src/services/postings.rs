use crate::models::{NewPosting, Posting, PostingChanges, PostingDetail, Step, Tag};
use crate::services::attrs;
use crate::services::filter::PostingFilter;
use crate::services::reconcile;
use crate::Database;
use anyhow::Result;
use rusqlite::{params_from_iter, Connection, OptionalExtension};

struct PostingRow {
    id: i64,
    title: String,
    description: String,
    time_minutes: i64,
    link: String,
}

const POSTING_COLUMNS: &str = "p.id, p.title, p.description, p.time_minutes, p.link";

/// Inserts the posting and links its tags and steps in one transaction.
pub fn create_posting(db: &Database, user_id: i64, input: NewPosting) -> Result<PostingDetail> {
    let mut conn = db.get()?;
    let tx = conn.transaction()?;

    tx.execute(
        "INSERT INTO postings (user_id, title, description, time_minutes, link)
         VALUES (?, ?, ?, ?, ?)",
        (
            user_id,
            &input.title,
            &input.description,
            input.time_minutes,
            &input.link,
        ),
    )?;
    let id = tx.last_insert_rowid();

    reconcile::attach::<Tag>(&tx, id, user_id, &input.tags)?;
    reconcile::attach::<Step>(&tx, id, user_id, &input.steps)?;

    let detail = load_detail(&tx, user_id, id)?
        .ok_or_else(|| anyhow::anyhow!("posting {} vanished after insert", id))?;
    tx.commit()?;

    tracing::info!("User {} created posting {}", user_id, id);
    Ok(detail)
}

pub fn get_posting(db: &Database, user_id: i64, id: i64) -> Result<Option<PostingDetail>> {
    let conn = db.get()?;
    load_detail(&conn, user_id, id)
}

/// The user's postings, newest id first, narrowed by `filter`.
pub fn list_postings(db: &Database, user_id: i64, filter: &PostingFilter) -> Result<Vec<Posting>> {
    let conn = db.get()?;
    let (clauses, filter_params) = filter.sql_clauses();
    let sql = format!(
        "SELECT {} FROM postings p WHERE p.user_id = ?{} ORDER BY p.id DESC",
        POSTING_COLUMNS, clauses
    );

    let params = std::iter::once(user_id).chain(filter_params);
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(params), row_to_posting)?
        .collect::<Result<Vec<_>, _>>()?;

    let postings = enrich(&conn, rows)?
        .into_iter()
        .map(|detail| detail.posting)
        .collect();
    Ok(postings)
}

/// Applies `changes` atomically. Relation fields that are present replace
/// the link set; absent ones are left alone. `None` if the posting is not
/// the user's.
pub fn update_posting(
    db: &Database,
    user_id: i64,
    id: i64,
    changes: PostingChanges,
) -> Result<Option<PostingDetail>> {
    let mut conn = db.get()?;
    let tx = conn.transaction()?;

    let current = match find_row(&tx, user_id, id)? {
        Some(row) => row,
        None => return Ok(None),
    };

    tx.execute(
        "UPDATE postings SET title = ?, description = ?, time_minutes = ?, link = ?
         WHERE id = ? AND user_id = ?",
        (
            changes.title.unwrap_or(current.title),
            changes.description.unwrap_or(current.description),
            changes.time_minutes.unwrap_or(current.time_minutes),
            changes.link.unwrap_or(current.link),
            id,
            user_id,
        ),
    )?;

    if let Some(tags) = &changes.tags {
        reconcile::replace::<Tag>(&tx, id, user_id, tags)?;
    }
    if let Some(steps) = &changes.steps {
        reconcile::replace::<Step>(&tx, id, user_id, steps)?;
    }

    let detail = load_detail(&tx, user_id, id)?;
    tx.commit()?;

    tracing::info!("User {} updated posting {}", user_id, id);
    Ok(detail)
}

/// Deletes the posting and its links; tags and steps survive.
pub fn delete_posting(db: &Database, user_id: i64, id: i64) -> Result<bool> {
    let conn = db.get()?;
    let affected = conn.execute(
        "DELETE FROM postings WHERE id = ? AND user_id = ?",
        (id, user_id),
    )?;
    if affected > 0 {
        tracing::info!("User {} deleted posting {}", user_id, id);
    }
    Ok(affected > 0)
}

fn find_row(conn: &Connection, user_id: i64, id: i64) -> Result<Option<PostingRow>> {
    let row = conn
        .query_row(
            &format!(
                "SELECT {} FROM postings p WHERE p.id = ? AND p.user_id = ?",
                POSTING_COLUMNS
            ),
            (id, user_id),
            row_to_posting,
        )
        .optional()?;
    Ok(row)
}

fn load_detail(conn: &Connection, user_id: i64, id: i64) -> Result<Option<PostingDetail>> {
    match find_row(conn, user_id, id)? {
        Some(row) => Ok(enrich(conn, vec![row])?.pop()),
        None => Ok(None),
    }
}

fn enrich(conn: &Connection, rows: Vec<PostingRow>) -> Result<Vec<PostingDetail>> {
    let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
    let mut tags = attrs::for_postings::<Tag>(conn, &ids)?;
    let mut steps = attrs::for_postings::<Step>(conn, &ids)?;

    let details = rows
        .into_iter()
        .map(|row| PostingDetail {
            posting: Posting {
                id: row.id,
                title: row.title,
                time_minutes: row.time_minutes,
                link: row.link,
                tags: tags.remove(&row.id).unwrap_or_default(),
                steps: steps.remove(&row.id).unwrap_or_default(),
            },
            description: row.description,
        })
        .collect();
    Ok(details)
}

fn row_to_posting(row: &rusqlite::Row<'_>) -> rusqlite::Result<PostingRow> {
    Ok(PostingRow {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        time_minutes: row.get(3)?,
        link: row.get(4)?,
    })
}
