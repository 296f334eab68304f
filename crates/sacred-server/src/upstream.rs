//! Registrar that forwards sign-ups to an upstream account service.
//!
//! The request is POSTed as JSON. A `201`/`200` response must carry a
//! [`RegisteredAccount`]; `409` means the email is taken; any other `4xx` is
//! a [`RegistrationError::Rejected`] with a fixed reason (the upstream body is
//! logged, never returned to the caller); `5xx`, other statuses and transport
//! failures are [`RegistrationError::Upstream`].

use std::time::Duration;

use reqwest::StatusCode;
use tracing::warn;

use sacred_core::error::RegistrationError;
use sacred_core::{RegisteredAccount, Registrar, SignupRequest};

/// Upper bound on one upstream call.
const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

/// Forwards validated sign-ups over HTTP.
#[derive(Debug, Clone)]
pub struct UpstreamRegistrar {
    http: reqwest::Client,
    url: String,
}

impl UpstreamRegistrar {
    /// Build a registrar posting to `url`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::Internal`] if the HTTP client cannot be
    /// constructed.
    pub fn new(url: impl Into<String>) -> Result<Self, RegistrationError> {
        let http = reqwest::Client::builder()
            .timeout(UPSTREAM_TIMEOUT)
            .build()
            .map_err(|e| RegistrationError::Internal {
                reason: format!("http client: {e}"),
            })?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }
}

#[async_trait::async_trait]
impl Registrar for UpstreamRegistrar {
    async fn register(&self, request: &SignupRequest) -> Result<RegisteredAccount, RegistrationError> {
        let resp = self
            .http
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| RegistrationError::Upstream {
                reason: e.without_url().to_string(),
            })?;

        let status = resp.status();
        match status {
            StatusCode::OK | StatusCode::CREATED => {
                resp.json::<RegisteredAccount>()
                    .await
                    .map_err(|e| RegistrationError::Upstream {
                        reason: format!("invalid response body: {}", e.without_url()),
                    })
            }
            StatusCode::CONFLICT => Err(RegistrationError::AlreadyRegistered {
                email: request.email.clone(),
            }),
            s if s.is_client_error() => {
                let body = resp.text().await.unwrap_or_default();
                warn!(status = %s, body = %body, "upstream rejected registration");
                Err(RegistrationError::Rejected {
                    reason: format!("upstream returned {s}"),
                })
            }
            s => Err(RegistrationError::Upstream {
                reason: format!("upstream returned {s}"),
            }),
        }
    }
}
