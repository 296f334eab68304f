//! Form values and per-field validation outcomes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

/// Outcome of checking one field's current value against its rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ValidationResult {
    /// The value satisfies every check.
    Valid,
    /// The value failed a check. `message` is shown inline under the field.
    Invalid { message: String },
}

impl ValidationResult {
    /// Build an `Invalid` result.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Whether the result is `Valid`.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// The failure message, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Valid => None,
            Self::Invalid { message } => Some(message),
        }
    }
}

/// Current string value of every field in one form.
///
/// A field that was never set reads as the empty string, which is what an
/// untouched input holds.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormState {
    values: BTreeMap<String, String>,
}

impl FormState {
    /// Create an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of `field`, or `""` if it was never set.
    #[must_use]
    pub fn get(&self, field: &str) -> &str {
        self.values.get(field).map_or("", String::as_str)
    }

    /// Replace the value of `field`, zeroizing the previous value.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) {
        if let Some(mut previous) = self.values.insert(field.into(), value.into()) {
            previous.zeroize();
        }
    }

    /// Builder-style [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    /// Iterate over `(field, value)` pairs in field-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of fields that have been set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no field has been set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Zeroize every value and forget all fields.
    pub fn clear(&mut self) {
        for value in self.values.values_mut() {
            value.zeroize();
        }
        self.values.clear();
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormState {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut state = Self::new();
        for (field, value) in iter {
            state.set(field, value);
        }
        state
    }
}

// Values may hold passwords, so only field names are printed.
impl std::fmt::Debug for FormState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.values.keys()).finish()
    }
}

impl Drop for FormState {
    fn drop(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn missing_field_reads_empty() {
        let state = FormState::new();
        assert_eq!(state.get("email"), "");
    }

    #[test]
    fn set_overwrites_value() {
        let mut state = FormState::new().with("email", "a@b.co");
        state.set("email", "c@d.io");
        assert_eq!(state.get("email"), "c@d.io");
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn clear_forgets_everything() {
        let mut state = FormState::new().with("password", "Abcdef1!");
        state.clear();
        assert!(state.is_empty());
        assert_eq!(state.get("password"), "");
    }

    #[test]
    fn debug_hides_values() {
        let state = FormState::new().with("password", "Abcdef1!");
        let printed = format!("{state:?}");
        assert!(printed.contains("password"));
        assert!(!printed.contains("Abcdef1!"));
    }

    #[test]
    fn deserializes_from_flat_object() {
        let state: FormState =
            serde_json::from_str(r#"{"fullName":"Jane Doe","email":"jane@example.com"}"#).unwrap();
        assert_eq!(state.get("fullName"), "Jane Doe");
        assert_eq!(state.get("email"), "jane@example.com");
    }

    #[test]
    fn invalid_result_serializes_with_message() {
        let json = serde_json::to_value(ValidationResult::invalid("Email is required")).unwrap();
        assert_eq!(json["status"], "invalid");
        assert_eq!(json["message"], "Email is required");

        let json = serde_json::to_value(ValidationResult::Valid).unwrap();
        assert_eq!(json["status"], "valid");
    }
}
