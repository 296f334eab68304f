//! Sign-up routes: `/v1/signup/*`
//!
//! The presentation layer posts its form snapshot here on every change to
//! get field results and the password checklist, and posts it once more to
//! register. Registration re-validates server-side; an invalid snapshot
//! never reaches the registrar.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use sacred_core::password;
use sacred_core::{FieldUpdate, FormReport, FormState, RegisteredAccount, SignupRequest};

use crate::error::AppError;
use crate::state::AppState;

/// Build the `/v1/signup` router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/criteria", get(criteria))
        .route("/validate", post(validate))
        .route("/register", post(register))
}

// ── Request / Response types ─────────────────────────────────────────

/// Response body for `GET /v1/signup/criteria`.
#[derive(Debug, Serialize)]
pub struct CriteriaResponse {
    pub criteria: Vec<&'static str>,
}

/// Request body for `POST /v1/signup/validate`.
#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    /// Current value of every field.
    #[serde(default)]
    pub values: FormState,
    /// Evaluate only this field instead of the whole form.
    pub field: Option<String>,
}

/// Response body for `POST /v1/signup/validate`.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ValidateResponse {
    Field(FieldUpdate),
    Form(FormReport),
}

/// Request body for `POST /v1/signup/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub values: FormState,
}

// ── Handlers ─────────────────────────────────────────────────────────

/// List the password criteria, in checklist order.
async fn criteria() -> Json<CriteriaResponse> {
    Json(CriteriaResponse {
        criteria: password::criteria().iter().map(|c| c.label).collect(),
    })
}

/// Evaluate one field or the whole snapshot.
async fn validate(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ValidateRequest>,
) -> Result<Json<ValidateResponse>, AppError> {
    let Some(field) = body.field else {
        return Ok(Json(ValidateResponse::Form(
            state.engine.evaluate_form(&body.values),
        )));
    };

    if state.engine.rule(&field).is_none() {
        return Err(AppError::BadRequest(format!("unknown field '{field}'")));
    }

    let value = body.values.get(&field);
    Ok(Json(ValidateResponse::Field(FieldUpdate {
        result: state.engine.evaluate(&field, value, &body.values),
        criteria: state.engine.criteria_for(&field, value),
        field,
    })))
}

/// Validate the snapshot and hand it to the registrar.
async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisteredAccount>), AppError> {
    let report = state.engine.evaluate_form(&body.values);
    if !report.is_valid() {
        debug!(
            invalid = report.errors().len(),
            "registration suppressed, form has invalid fields"
        );
        return Err(AppError::from(&report));
    }

    let request = SignupRequest::from_form(&body.values);
    let account = state.registrar.register(&request).await.map_err(|e| {
        error!(error = %e, "registration failed");
        AppError::from(e)
    })?;

    info!(account_id = %account.id, "account registered");
    Ok((StatusCode::CREATED, Json(account)))
}
