use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

pub const MAX_NAME_LENGTH: usize = 255;

pub const REQUIRED: &str = "This field is required.";
pub const NOT_NULL: &str = "This field may not be null.";
pub const NOT_BLANK: &str = "This field may not be blank.";

/// Keeps an explicit `null` distinguishable from an absent key.
///
/// Use with `#[serde(default, deserialize_with = "present")]` on an
/// `Option<Option<T>>` field: absent is `None`, `null` is `Some(None)`.
pub fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Field-level validation messages, serialized as `{"field": ["msg", ...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// `Ok(value)` when nothing was recorded, otherwise `Err(self)`.
    pub fn finish<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join(" ")))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// Unwraps a tri-state payload field, recording `required`/`null` errors.
pub fn take<T>(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<Option<T>>,
    required: bool,
) -> Option<T> {
    match value {
        None => {
            if required {
                errors.add(field, REQUIRED);
            }
            None
        }
        Some(None) => {
            errors.add(field, NOT_NULL);
            None
        }
        Some(Some(v)) => Some(v),
    }
}

/// Trims surrounding whitespace and enforces the non-blank and length rules.
pub fn clean_name(errors: &mut FieldErrors, field: &str, value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.add(field, NOT_BLANK);
        return None;
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        errors.add(
            field,
            format!(
                "Ensure this field has no more than {} characters.",
                MAX_NAME_LENGTH
            ),
        );
        return None;
    }
    Some(trimmed.to_string())
}
