use super::fields::{clean_name, present, take, FieldErrors, MAX_NAME_LENGTH, REQUIRED};
use super::tag::{validate_attr_inputs, AttrInput, Step, Tag};
use serde::{Deserialize, Serialize};

/// List representation of a posting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    pub id: i64,
    pub title: String,
    pub time_minutes: i64,
    pub link: String,
    pub tags: Vec<Tag>,
    pub steps: Vec<Step>,
}

/// Detail representation: the list fields plus `description`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostingDetail {
    #[serde(flatten)]
    pub posting: Posting,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Create,
    Replace,
    Partial,
}

impl WriteMode {
    fn requires_core_fields(self) -> bool {
        !matches!(self, Self::Partial)
    }
}

/// Incoming posting body. Every field is tri-state so that absent, `null`
/// and a value can be told apart. Unknown keys such as `id` or `user` are
/// ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostingPayload {
    #[serde(default, deserialize_with = "present")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub time_minutes: Option<Option<i64>>,
    #[serde(default, deserialize_with = "present")]
    pub link: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub tags: Option<Option<Vec<AttrInput>>>,
    #[serde(default, deserialize_with = "present")]
    pub steps: Option<Option<Vec<AttrInput>>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPosting {
    pub title: String,
    pub description: String,
    pub time_minutes: i64,
    pub link: String,
    pub tags: Vec<String>,
    pub steps: Vec<String>,
}

/// Validated update. `None` leaves the stored value alone; for `tags` and
/// `steps`, `Some(vec![])` clears the relation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostingChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub time_minutes: Option<i64>,
    pub link: Option<String>,
    pub tags: Option<Vec<String>>,
    pub steps: Option<Vec<String>>,
}

impl PostingPayload {
    pub fn validate(self, mode: WriteMode) -> Result<PostingChanges, FieldErrors> {
        let mut errors = FieldErrors::new();
        let required = mode.requires_core_fields();

        let title = take(&mut errors, "title", self.title, required)
            .and_then(|t| clean_name(&mut errors, "title", t));
        let time_minutes = take(&mut errors, "time_minutes", self.time_minutes, required)
            .and_then(|m| check_minutes(&mut errors, m));
        let description = take(&mut errors, "description", self.description, false);
        let link = take(&mut errors, "link", self.link, false)
            .and_then(|l| clean_link(&mut errors, l));
        let tags = take(&mut errors, "tags", self.tags, false)
            .map(|inputs| validate_attr_inputs(&mut errors, "tags", inputs));
        let steps = take(&mut errors, "steps", self.steps, false)
            .map(|inputs| validate_attr_inputs(&mut errors, "steps", inputs));

        errors.finish(PostingChanges {
            title,
            description,
            time_minutes,
            link,
            tags,
            steps,
        })
    }

    pub fn validate_new(self) -> Result<NewPosting, FieldErrors> {
        let changes = self.validate(WriteMode::Create)?;
        match (changes.title, changes.time_minutes) {
            (Some(title), Some(time_minutes)) => Ok(NewPosting {
                title,
                description: changes.description.unwrap_or_default(),
                time_minutes,
                link: changes.link.unwrap_or_default(),
                tags: changes.tags.unwrap_or_default(),
                steps: changes.steps.unwrap_or_default(),
            }),
            (title, _) => {
                let field = if title.is_none() { "title" } else { "time_minutes" };
                Err(FieldErrors::single(field, REQUIRED))
            }
        }
    }
}

fn check_minutes(errors: &mut FieldErrors, minutes: i64) -> Option<i64> {
    if minutes < 0 {
        errors.add(
            "time_minutes",
            "Ensure this value is greater than or equal to 0.",
        );
        return None;
    }
    Some(minutes)
}

/// An empty link is allowed; anything else must be an absolute http(s) URL.
fn clean_link(errors: &mut FieldErrors, link: String) -> Option<String> {
    let link = link.trim().to_string();
    if link.is_empty() {
        return Some(link);
    }
    if link.chars().count() > MAX_NAME_LENGTH {
        errors.add(
            "link",
            format!(
                "Ensure this field has no more than {} characters.",
                MAX_NAME_LENGTH
            ),
        );
        return None;
    }
    match url::Url::parse(&link) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Some(link),
        _ => {
            errors.add("link", "Enter a valid URL.");
            None
        }
    }
}
