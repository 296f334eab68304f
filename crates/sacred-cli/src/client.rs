//! HTTP client for `sacred-server`, and the registrar that submits through it.

use anyhow::{Context, Result, bail};
use serde_json::{Value, json};

use sacred_core::error::RegistrationError;
use sacred_core::signup::fields;
use sacred_core::{RegisteredAccount, Registrar, SignupRequest};

/// Thin JSON client over the server's REST API.
pub struct Client {
    http: reqwest::Client,
    addr: String,
}

impl Client {
    pub fn new(addr: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            addr: addr.trim_end_matches('/').to_owned(),
        }
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.addr)
    }

    pub async fn get(&self, path: &str) -> Result<Value> {
        let resp = self
            .http
            .get(self.url(path))
            .send()
            .await
            .context("request failed")?;
        handle_response(resp).await
    }
}

async fn handle_response(resp: reqwest::Response) -> Result<Value> {
    let status = resp.status();
    if status == reqwest::StatusCode::NO_CONTENT {
        return Ok(Value::Null);
    }
    let body = resp.text().await.context("failed to read response body")?;
    if !status.is_success() {
        bail!("server returned {status}: {body}");
    }
    if body.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&body).context("failed to parse response JSON")
}

/// Registers accounts through `POST /v1/signup/register`.
pub struct ServerRegistrar<'a> {
    client: &'a Client,
}

impl<'a> ServerRegistrar<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Registrar for ServerRegistrar<'_> {
    async fn register(&self, request: &SignupRequest) -> Result<RegisteredAccount, RegistrationError> {
        // The server re-validates the whole form, confirmation included. The
        // session only submits once both password fields are equal.
        let values: serde_json::Map<String, Value> = [
            (fields::FULL_NAME, &request.full_name),
            (fields::EMAIL, &request.email),
            (fields::PHONE, &request.phone),
            (fields::COUNTRY, &request.country),
            (fields::PASSWORD, &request.password),
            (fields::CONFIRM_PASSWORD, &request.password),
        ]
        .into_iter()
        .map(|(field, value)| (field.to_owned(), Value::String(value.clone())))
        .collect();
        let body = json!({ "values": values });

        let resp = self
            .client
            .http
            .post(self.client.url("/v1/signup/register"))
            .json(&body)
            .send()
            .await
            .map_err(|e| RegistrationError::Upstream {
                reason: e.without_url().to_string(),
            })?;

        let status = resp.status();
        if status.is_success() {
            return resp
                .json::<RegisteredAccount>()
                .await
                .map_err(|e| RegistrationError::Upstream {
                    reason: format!("invalid response body: {}", e.without_url()),
                });
        }

        let body: Value = resp.json().await.unwrap_or(Value::Null);
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("no details")
            .to_owned();

        Err(match status {
            reqwest::StatusCode::CONFLICT => RegistrationError::AlreadyRegistered {
                email: request.email.clone(),
            },
            s if s.is_client_error() => RegistrationError::Rejected {
                reason: format!("server returned {s}: {message}"),
            },
            s => RegistrationError::Upstream {
                reason: format!("server returned {s}: {message}"),
            },
        })
    }
}
