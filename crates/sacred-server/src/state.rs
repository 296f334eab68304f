//! Shared application state for `SacredSecret` server.
//!
//! A single [`AppState`] is constructed at startup and shared across all
//! Axum handlers via `Arc`. The engine is immutable; the registrar handles
//! its own synchronization.

use std::sync::Arc;

use sacred_core::{FormValidationEngine, Registrar};

/// Shared application state passed to all HTTP handlers.
pub struct AppState {
    /// Sign-up rule set.
    pub engine: Arc<FormValidationEngine>,
    /// Receives validated sign-ups.
    pub registrar: Arc<dyn Registrar>,
}

impl AppState {
    /// Sign-up state over the given registrar.
    #[must_use]
    pub fn new(registrar: Arc<dyn Registrar>) -> Self {
        Self {
            engine: Arc::new(FormValidationEngine::signup()),
            registrar,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}
