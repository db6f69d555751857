use super::fields::{clean_name, present, take, FieldErrors};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub id: i64,
    pub name: String,
    /// Path relative to the media directory until rendered with
    /// [`Step::with_url_prefix`].
    pub image: Option<String>,
}

impl Step {
    pub fn with_url_prefix(mut self, prefix: &str) -> Self {
        self.image = self
            .image
            .map(|path| format!("{}/{}", prefix.trim_end_matches('/'), path));
        self
    }
}

/// Response body of the step image upload.
#[derive(Debug, Clone, Serialize)]
pub struct StepImage {
    pub id: i64,
    pub image: Option<String>,
}

impl From<Step> for StepImage {
    fn from(step: Step) -> Self {
        Self {
            id: step.id,
            image: step.image,
        }
    }
}

/// A tag or step reference nested inside a posting payload.
///
/// Only `name` participates in lookup; `id`, `image` and any other keys are
/// accepted and ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttrInput {
    #[serde(default, deserialize_with = "present")]
    pub name: Option<Option<String>>,
}

/// Body of `POST`/`PUT`/`PATCH` on `/tags/` and `/steps/`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttrPayload {
    #[serde(default, deserialize_with = "present")]
    pub name: Option<Option<String>>,
}

impl AttrPayload {
    /// Returns the cleaned name. `None` only when `partial` and absent.
    pub fn validate(self, partial: bool) -> Result<Option<String>, FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = take(&mut errors, "name", self.name, !partial)
            .and_then(|n| clean_name(&mut errors, "name", n));
        errors.finish(name)
    }
}

/// Validates nested descriptors and returns their names in submitted order.
pub fn validate_attr_inputs(
    errors: &mut FieldErrors,
    field: &str,
    inputs: Vec<AttrInput>,
) -> Vec<String> {
    let mut names = Vec::with_capacity(inputs.len());
    for (index, input) in inputs.into_iter().enumerate() {
        let key = format!("{}[{}].name", field, index);
        if let Some(name) =
            take(errors, &key, input.name, true).and_then(|n| clean_name(errors, &key, n))
        {
            names.push(name);
        }
    }
    names
}
