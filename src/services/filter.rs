use crate::models::FieldErrors;
use std::collections::BTreeSet;

/// Parses `"1,2,3"` into a sorted, deduplicated id list. Every token must be
/// an integer; surrounding whitespace is tolerated.
pub fn parse_id_list(raw: &str) -> Result<Vec<i64>, String> {
    let mut ids = BTreeSet::new();
    for token in raw.split(',') {
        let token = token.trim();
        let id = token
            .parse::<i64>()
            .map_err(|_| format!("'{}' is not a valid integer id.", token))?;
        ids.insert(id);
    }
    Ok(ids.into_iter().collect())
}

/// Parses an integer flag such as `assigned_only`. Absent or empty is false;
/// any nonzero integer is true.
pub fn parse_flag(raw: Option<&str>) -> Result<bool, String> {
    match raw.map(str::trim) {
        None | Some("") => Ok(false),
        Some(value) => value
            .parse::<i64>()
            .map(|v| v != 0)
            .map_err(|_| format!("'{}' is not a valid integer.", value)),
    }
}

/// Inclusion filter for the posting list. Each present set requires at least
/// one linked record with an id in the set; sets combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostingFilter {
    pub tags: Option<Vec<i64>>,
    pub steps: Option<Vec<i64>>,
}

impl PostingFilter {
    /// Builds the filter from raw query values. Empty values mean no filter.
    pub fn from_query(tags: Option<&str>, steps: Option<&str>) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();
        let mut parse = |field: &str, raw: Option<&str>| match raw {
            Some(raw) if !raw.trim().is_empty() => match parse_id_list(raw) {
                Ok(ids) => Some(ids),
                Err(message) => {
                    errors.add(field, message);
                    None
                }
            },
            _ => None,
        };
        let tags = parse("tags", tags);
        let steps = parse("steps", steps);
        errors.finish(Self { tags, steps })
    }

    /// `AND EXISTS (...)` clauses against alias `p`, with their parameters in
    /// placeholder order.
    pub fn sql_clauses(&self) -> (String, Vec<i64>) {
        let mut sql = String::new();
        let mut params = Vec::new();
        for (ids, link, col) in [
            (&self.tags, "posting_tags", "tag_id"),
            (&self.steps, "posting_steps", "step_id"),
        ] {
            if let Some(ids) = ids {
                let placeholders = vec!["?"; ids.len()].join(",");
                sql.push_str(&format!(
                    " AND EXISTS (SELECT 1 FROM {link} f WHERE f.posting_id = p.id AND f.{col} IN ({placeholders}))"
                ));
                params.extend(ids.iter().copied());
            }
        }
        (sql, params)
    }
}
