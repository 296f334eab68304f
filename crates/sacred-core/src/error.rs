//! Error types for `sacred-core`.
//!
//! Field validation failures are not errors: they are [`ValidationResult`]
//! values shown inline to the user. The types here cover misconfigured rule
//! sets and failures of the external registration capability. No variant
//! ever carries a password.
//!
//! [`ValidationResult`]: crate::form::ValidationResult

/// Errors from building a rule set.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RuleError {
    /// Two rules were declared for the same field.
    #[error("duplicate rule for field '{field}'")]
    DuplicateField { field: String },

    /// A `Matches` check refers to a field that has no rule.
    #[error("field '{field}' must match undeclared field '{depends_on}'")]
    UnknownDependency { field: String, depends_on: String },

    /// A field name was empty.
    #[error("field name must not be empty")]
    EmptyFieldName,
}

/// Errors from the registration capability.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    /// An account already exists for this email address.
    #[error("an account already exists for {email}")]
    AlreadyRegistered { email: String },

    /// The registrar refused the request.
    #[error("registration rejected: {reason}")]
    Rejected { reason: String },

    /// The upstream registration service could not be reached or failed.
    #[error("registration service unavailable: {reason}")]
    Upstream { reason: String },

    /// Internal registrar failure.
    #[error("registration failed: {reason}")]
    Internal { reason: String },
}
