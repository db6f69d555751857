use crate::models::{ApiToken, User};
use crate::Database;
use anyhow::Result;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::Rng;
use rusqlite::OptionalExtension;
use sha2::{Digest, Sha256};

const TOKEN_PREFIX: &str = "pt_";
const TOKEN_BYTE_LENGTH: usize = 32;

const TOKEN_COLUMNS: &str =
    "id, user_id, name, prefix, last_used_at, expires_at, created_at";

/// Generate a raw random token string with the `pt_` prefix.
fn generate_raw_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTE_LENGTH];
    rand::thread_rng().fill(&mut bytes);
    format!("{}{}", TOKEN_PREFIX, URL_SAFE_NO_PAD.encode(bytes))
}

/// SHA-256 hash a raw token for storage.
fn hash_token(raw: &str) -> String {
    let digest = Sha256::digest(raw.as_bytes());
    hex::encode(digest)
}

/// Extract the short prefix (first 8 chars after `pt_`) for display.
fn extract_prefix(raw: &str) -> String {
    let without_prefix = raw.strip_prefix(TOKEN_PREFIX).unwrap_or(raw);
    let end = without_prefix.len().min(8);
    format!("{}{}...", TOKEN_PREFIX, &without_prefix[..end])
}

/// Create a token for `user_id`. Returns the raw token (shown once) and the
/// stored record.
pub fn create_token(
    db: &Database,
    user_id: i64,
    name: &str,
    expires_at: Option<&str>,
) -> Result<(String, ApiToken)> {
    let raw_token = generate_raw_token();
    let token_hash = hash_token(&raw_token);
    let prefix = extract_prefix(&raw_token);

    let conn = db.get()?;
    conn.execute(
        "INSERT INTO api_tokens (user_id, name, token_hash, prefix, expires_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![user_id, name, token_hash, prefix, expires_at],
    )?;

    let id = conn.last_insert_rowid();
    let token = conn.query_row(
        &format!("SELECT {} FROM api_tokens WHERE id = ?", TOKEN_COLUMNS),
        [id],
        row_to_token,
    )?;

    Ok((raw_token, token))
}

/// Resolve a raw token to its owner. `None` for unknown or expired tokens.
pub fn authenticate_token(db: &Database, raw_token: &str) -> Result<Option<User>> {
    if !raw_token.starts_with(TOKEN_PREFIX) {
        return Ok(None);
    }

    let token_hash = hash_token(raw_token);
    let conn = db.get()?;

    let token = conn
        .query_row(
            &format!("SELECT {} FROM api_tokens WHERE token_hash = ?", TOKEN_COLUMNS),
            [&token_hash],
            row_to_token,
        )
        .optional()?;

    let token = match token {
        Some(t) => t,
        None => return Ok(None),
    };

    if let Some(ref expires) = token.expires_at {
        let now = chrono::Utc::now().to_rfc3339();
        if *expires < now {
            tracing::debug!("Rejected expired token {}", token.prefix);
            return Ok(None);
        }
    }

    conn.execute(
        "UPDATE api_tokens SET last_used_at = CURRENT_TIMESTAMP WHERE id = ?",
        [token.id],
    )?;
    drop(conn);

    crate::services::auth::get_user(db, token.user_id)
}

/// List tokens (without hashes), optionally only those of one user.
pub fn list_tokens(db: &Database, user_id: Option<i64>) -> Result<Vec<ApiToken>> {
    let conn = db.get()?;
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM api_tokens WHERE ?1 IS NULL OR user_id = ?1
         ORDER BY created_at DESC, id DESC",
        TOKEN_COLUMNS
    ))?;

    let tokens = stmt
        .query_map([user_id], row_to_token)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(tokens)
}

/// Revoke (delete) a token by ID. Returns whether a token was removed.
pub fn revoke_token(db: &Database, id: i64) -> Result<bool> {
    let conn = db.get()?;
    let affected = conn.execute("DELETE FROM api_tokens WHERE id = ?", [id])?;
    Ok(affected > 0)
}

fn row_to_token(row: &rusqlite::Row<'_>) -> rusqlite::Result<ApiToken> {
    Ok(ApiToken {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        prefix: row.get(3)?,
        last_used_at: row.get(4)?,
        expires_at: row.get(5)?,
        created_at: row.get(6)?,
    })
}
