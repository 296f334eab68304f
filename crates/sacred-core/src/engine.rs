//! Synchronous form validation engine.
//!
//! The engine owns an immutable rule set and evaluates field values against
//! it. Evaluation is pure: no I/O, no interior mutability, no suspension.
//! Callers evaluate one field on every value change and the whole form once
//! before submission.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use tracing::debug;

use crate::error::RuleError;
use crate::form::{FormState, ValidationResult};
use crate::password::{self, CriterionStatus};
use crate::rule::FieldRule;
use crate::signup;

/// Per-field results for a whole snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormReport {
    /// Whether every field is valid.
    pub valid: bool,
    /// Result for every declared field.
    pub fields: BTreeMap<String, ValidationResult>,
    /// Live checklist for the password field, if the form has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_criteria: Option<Vec<CriterionStatus>>,
}

impl FormReport {
    /// Whether submission is permitted.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Result for one field.
    #[must_use]
    pub fn result(&self, field: &str) -> Option<&ValidationResult> {
        self.fields.get(field)
    }

    /// The failure message of every invalid field.
    #[must_use]
    pub fn errors(&self) -> BTreeMap<&str, &str> {
        self.fields
            .iter()
            .filter_map(|(field, result)| result.message().map(|m| (field.as_str(), m)))
            .collect()
    }
}

/// Evaluates field values against a fixed set of [`FieldRule`]s.
#[derive(Debug, Clone)]
pub struct FormValidationEngine {
    rules: Vec<FieldRule>,
}

impl FormValidationEngine {
    /// Build an engine from a rule set.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError`] if a field name is empty or declared twice, or if
    /// a `Matches` check names a field that has no rule.
    pub fn new(rules: Vec<FieldRule>) -> Result<Self, RuleError> {
        let mut seen = HashSet::with_capacity(rules.len());
        for rule in &rules {
            if rule.field_name.is_empty() {
                return Err(RuleError::EmptyFieldName);
            }
            if !seen.insert(rule.field_name.as_str()) {
                return Err(RuleError::DuplicateField {
                    field: rule.field_name.clone(),
                });
            }
        }

        for rule in &rules {
            for depends_on in rule.checks.iter().filter_map(|c| c.depends_on()) {
                if !seen.contains(depends_on) {
                    return Err(RuleError::UnknownDependency {
                        field: rule.field_name.clone(),
                        depends_on: depends_on.to_owned(),
                    });
                }
            }
        }

        Ok(Self { rules })
    }

    /// Engine for the sign-up form.
    #[must_use]
    pub fn signup() -> Self {
        Self {
            rules: signup::rules(),
        }
    }

    /// Declared rules, in form order.
    #[must_use]
    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    /// Rule for `field`, if declared.
    #[must_use]
    pub fn rule(&self, field: &str) -> Option<&FieldRule> {
        self.rules.iter().find(|r| r.field_name == field)
    }

    /// Evaluate one field's value against its rule.
    ///
    /// `snapshot` supplies the other fields for cross-field checks. A field
    /// with no rule is always valid.
    #[must_use]
    pub fn evaluate(&self, field: &str, value: &str, snapshot: &FormState) -> ValidationResult {
        let result = self
            .rule(field)
            .map_or(ValidationResult::Valid, |rule| rule.evaluate(value, snapshot));
        debug!(field, valid = result.is_valid(), "field evaluated");
        result
    }

    /// Evaluate every declared field against the snapshot.
    #[must_use]
    pub fn evaluate_form(&self, snapshot: &FormState) -> FormReport {
        let fields: BTreeMap<String, ValidationResult> = self
            .rules
            .iter()
            .map(|rule| {
                let value = snapshot.get(&rule.field_name);
                (rule.field_name.clone(), rule.evaluate(value, snapshot))
            })
            .collect();

        let valid = fields.values().all(ValidationResult::is_valid);
        let password_criteria = self.password_criteria(snapshot);

        debug!(
            fields = fields.len(),
            invalid = fields.values().filter(|r| !r.is_valid()).count(),
            "form evaluated"
        );

        FormReport {
            valid,
            fields,
            password_criteria,
        }
    }

    /// Live checklist for `field` if its rule checks password strength.
    #[must_use]
    pub fn criteria_for(&self, field: &str, value: &str) -> Option<Vec<CriterionStatus>> {
        self.rule(field)
            .filter(|r| r.checks_password_strength())
            .map(|_| password::checklist(value))
    }

    /// Fields whose checks read `field`, in form order.
    pub fn dependents_of<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.rules
            .iter()
            .filter(move |r| r.checks.iter().any(|c| c.depends_on() == Some(field)))
            .map(|r| r.field_name.as_str())
    }

    fn password_criteria(&self, snapshot: &FormState) -> Option<Vec<CriterionStatus>> {
        self.rules
            .iter()
            .find(|r| r.checks_password_strength())
            .map(|r| password::checklist(snapshot.get(&r.field_name)))
    }
}

impl Default for FormValidationEngine {
    fn default() -> Self {
        Self::signup()
    }
}
