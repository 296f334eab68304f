//! HTTP route handlers for `SacredSecret` server.
//!
//! Routes are organized by subsystem:
//! - `signup`: Field validation, password checklist, registration
//! - `sys`: Health checks

pub mod signup;
pub mod sys;
