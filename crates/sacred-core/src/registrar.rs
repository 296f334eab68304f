//! The registration capability a valid sign-up form is handed to.
//!
//! [`Registrar`] is the seam between the validation core and whatever creates
//! accounts. The core never calls it for an invalid form. [`MemoryRegistrar`]
//! keeps accounts in process memory and is used for development and tests.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::RegistrationError;
use crate::signup::SignupRequest;

/// An account created by a registrar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredAccount {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Creates accounts from validated sign-up requests.
///
/// Implementations must be safe to share across async tasks (`Send + Sync`).
#[async_trait::async_trait]
pub trait Registrar: Send + Sync {
    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::AlreadyRegistered`] if the email is taken,
    /// or another variant if the registrar fails.
    async fn register(&self, request: &SignupRequest) -> Result<RegisteredAccount, RegistrationError>;
}

/// In-memory registrar keyed by lower-cased email.
///
/// Passwords are not retained.
#[derive(Debug, Clone, Default)]
pub struct MemoryRegistrar {
    accounts: Arc<RwLock<HashMap<String, RegisteredAccount>>>,
}

impl MemoryRegistrar {
    /// Create an empty registrar.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered accounts.
    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }

    /// Whether no account has been registered.
    pub async fn is_empty(&self) -> bool {
        self.accounts.read().await.is_empty()
    }

    /// Look up an account by email, ignoring case.
    pub async fn find(&self, email: &str) -> Option<RegisteredAccount> {
        self.accounts
            .read()
            .await
            .get(&email.to_lowercase())
            .cloned()
    }
}

#[async_trait::async_trait]
impl Registrar for MemoryRegistrar {
    async fn register(&self, request: &SignupRequest) -> Result<RegisteredAccount, RegistrationError> {
        let key = request.email.to_lowercase();
        let mut accounts = self.accounts.write().await;

        if accounts.contains_key(&key) {
            return Err(RegistrationError::AlreadyRegistered {
                email: request.email.clone(),
            });
        }

        let account = RegisteredAccount {
            id: Uuid::new_v4(),
            full_name: request.full_name.clone(),
            email: request.email.clone(),
            created_at: Utc::now(),
        };
        accounts.insert(key, account.clone());
        Ok(account)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::form::FormState;
    use crate::signup::fields;

    fn request(email: &str) -> SignupRequest {
        SignupRequest::from_form(
            &FormState::new()
                .with(fields::FULL_NAME, "Jane Doe")
                .with(fields::EMAIL, email)
                .with(fields::PASSWORD, "Abcdef1!"),
        )
    }

    #[tokio::test]
    async fn register_then_find() {
        let registrar = MemoryRegistrar::new();
        let account = registrar.register(&request("jane@example.com")).await.unwrap();
        assert_eq!(account.full_name, "Jane Doe");
        assert_eq!(registrar.len().await, 1);

        let found = registrar.find("JANE@example.com").await.unwrap();
        assert_eq!(found.id, account.id);
    }

    #[tokio::test]
    async fn duplicate_email_rejected_ignoring_case() {
        let registrar = MemoryRegistrar::new();
        registrar.register(&request("jane@example.com")).await.unwrap();

        let err = registrar
            .register(&request("Jane@Example.com"))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            RegistrationError::AlreadyRegistered {
                email: "Jane@Example.com".to_owned()
            }
        );
        assert_eq!(registrar.len().await, 1);
    }

    #[tokio::test]
    async fn clones_share_accounts() {
        let registrar = MemoryRegistrar::new();
        let clone = registrar.clone();
        clone.register(&request("a@b.co")).await.unwrap();
        assert!(!registrar.is_empty().await);
    }
}
