//! Declarative field rules.
//!
//! A [`FieldRule`] names one input, optionally marks it required, and lists
//! the [`Check`]s its value must pass. Checks run in declaration order after
//! the required check; the first failure is the one shown to the user.

use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::form::{FormState, ValidationResult};
use crate::password;

/// Email addresses accepted at sign-up, matched case-insensitively over ASCII.
pub const EMAIL_PATTERN: &str = r"(?i-u)^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}$";

#[allow(clippy::expect_used)]
static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(EMAIL_PATTERN).expect("EMAIL_PATTERN is a valid regex"));

/// Whether `value` looks like an email address.
#[must_use]
pub fn is_email(value: &str) -> bool {
    EMAIL_REGEX.is_match(value)
}

/// Signature of a free-form check: `(value, all_values) -> result`.
pub type CustomFn = dyn Fn(&str, &FormState) -> ValidationResult + Send + Sync;

/// One check applied to a non-empty field value.
#[derive(Clone)]
pub enum Check {
    /// The value must match `regex`.
    Pattern { regex: Regex, message: String },
    /// The value must satisfy every password criterion.
    PasswordStrength { message: String },
    /// The value must equal the current value of `field`.
    Matches { field: String, message: String },
    /// Arbitrary check over the value and the whole snapshot.
    Custom(Arc<CustomFn>),
}

impl Check {
    /// The sign-up email check.
    pub fn email(message: impl Into<String>) -> Self {
        Self::Pattern {
            regex: EMAIL_REGEX.clone(),
            message: message.into(),
        }
    }

    /// Wrap a closure as a [`Check::Custom`].
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&str, &FormState) -> ValidationResult + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }

    /// Run the check.
    #[must_use]
    pub fn apply(&self, value: &str, snapshot: &FormState) -> ValidationResult {
        match self {
            Self::Pattern { regex, message } => {
                if regex.is_match(value) {
                    ValidationResult::Valid
                } else {
                    ValidationResult::invalid(message.as_str())
                }
            }
            Self::PasswordStrength { message } => {
                if password::meets_all(value) {
                    ValidationResult::Valid
                } else {
                    ValidationResult::invalid(message.as_str())
                }
            }
            Self::Matches { field, message } => {
                if value == snapshot.get(field) {
                    ValidationResult::Valid
                } else {
                    ValidationResult::invalid(message.as_str())
                }
            }
            Self::Custom(f) => f(value, snapshot),
        }
    }

    /// The field this check reads besides its own, if any.
    #[must_use]
    pub fn depends_on(&self) -> Option<&str> {
        match self {
            Self::Matches { field, .. } => Some(field),
            _ => None,
        }
    }
}

impl std::fmt::Debug for Check {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pattern { regex, message } => f
                .debug_struct("Pattern")
                .field("regex", &regex.as_str())
                .field("message", message)
                .finish(),
            Self::PasswordStrength { message } => f
                .debug_struct("PasswordStrength")
                .field("message", message)
                .finish(),
            Self::Matches { field, message } => f
                .debug_struct("Matches")
                .field("field", field)
                .field("message", message)
                .finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Rule for one named field.
#[derive(Debug, Clone)]
pub struct FieldRule {
    /// Form field name (e.g. `confirmPassword`).
    pub field_name: String,
    /// Human-readable label (e.g. `Confirm Password`).
    pub label: String,
    /// Message shown when the value is empty; `None` makes the field optional.
    pub required: Option<String>,
    /// Checks applied to a non-empty value, in order.
    pub checks: Vec<Check>,
}

impl FieldRule {
    /// Start an optional field with no checks.
    pub fn new(field_name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            label: label.into(),
            required: None,
            checks: Vec::new(),
        }
    }

    /// Mark the field required with the given message.
    #[must_use]
    pub fn required(mut self, message: impl Into<String>) -> Self {
        self.required = Some(message.into());
        self
    }

    /// Mark the field required with the default `"<Label> is required"`
    /// message.
    #[must_use]
    pub fn required_default(self) -> Self {
        let message = format!("{} is required", sentence_case(&self.label));
        self.required(message)
    }

    /// Append a check.
    #[must_use]
    pub fn check(mut self, check: Check) -> Self {
        self.checks.push(check);
        self
    }

    /// Whether the value must be non-empty.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required.is_some()
    }

    /// Evaluate `value` against this rule.
    #[must_use]
    pub fn evaluate(&self, value: &str, snapshot: &FormState) -> ValidationResult {
        if value.is_empty() {
            return match &self.required {
                Some(message) => ValidationResult::invalid(message.as_str()),
                None => ValidationResult::Valid,
            };
        }

        self.checks
            .iter()
            .map(|check| check.apply(value, snapshot))
            .find(|result| !result.is_valid())
            .unwrap_or(ValidationResult::Valid)
    }

    /// Whether this rule carries a password-strength check.
    #[must_use]
    pub fn checks_password_strength(&self) -> bool {
        self.checks
            .iter()
            .any(|c| matches!(c, Check::PasswordStrength { .. }))
    }
}

/// `"Full Name"` -> `"Full name"`.
fn sentence_case(label: &str) -> String {
    let mut words = label.split_whitespace();
    let mut out = String::with_capacity(label.len());
    if let Some(first) = words.next() {
        out.push_str(first);
    }
    for word in words {
        out.push(' ');
        if word.chars().all(|c| c.is_ascii_uppercase()) {
            out.push_str(word);
        } else {
            out.push_str(&word.to_lowercase());
        }
    }
    out
}
