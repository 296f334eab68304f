//! Core library for `SacredSecret` sign-up.
//!
//! Contains the declarative field rules, the fixed password criteria, the
//! synchronous validation engine, the per-form session that re-evaluates
//! dependent fields and notifies observers, and the registrar capability that
//! a valid form is handed to. Nothing in this crate performs I/O except the
//! registrar implementations.

pub mod engine;
pub mod error;
pub mod form;
pub mod password;
pub mod registrar;
pub mod rule;
pub mod session;
pub mod signup;

pub use engine::{FormReport, FormValidationEngine};
pub use form::{FormState, ValidationResult};
pub use password::{CriterionStatus, PasswordCriterion};
pub use registrar::{MemoryRegistrar, RegisteredAccount, Registrar};
pub use rule::{Check, FieldRule};
pub use session::{FieldObserver, FieldUpdate, FormSession, SubmitOutcome};
pub use signup::SignupRequest;
