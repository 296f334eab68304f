//! One live form: its values, the latest result per field, and the observers
//! that render those results.
//!
//! Every mutation re-evaluates the changed field and the touched fields whose
//! checks read it (after a submit attempt, all of them), then notifies each
//! subscribed [`FieldObserver`]. Evaluation is synchronous; only
//! [`FormSession::submit`] awaits, and only once the form is valid.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info};

use crate::engine::{FormReport, FormValidationEngine};
use crate::error::RegistrationError;
use crate::form::{FormState, ValidationResult};
use crate::password::CriterionStatus;
use crate::registrar::{RegisteredAccount, Registrar};
use crate::signup::SignupRequest;

/// A fresh result for one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldUpdate {
    pub field: String,
    pub result: ValidationResult,
    /// Per-criterion state, for password-strength fields only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub criteria: Option<Vec<CriterionStatus>>,
}

/// Receives every field result the session computes.
pub trait FieldObserver: Send + Sync {
    fn on_field_update(&self, update: &FieldUpdate);
}

/// Result of a submission attempt.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// At least one field is invalid; the registrar was not called.
    Rejected(FormReport),
    /// The registrar created the account. The session has been reset.
    Registered(RegisteredAccount),
    /// The registrar failed. The values are kept.
    Failed(RegistrationError),
}

/// Mutable state of one form, owned by whoever presents it.
pub struct FormSession {
    engine: Arc<FormValidationEngine>,
    state: FormState,
    results: BTreeMap<String, ValidationResult>,
    touched: BTreeSet<String>,
    submitted: bool,
    observers: Vec<Arc<dyn FieldObserver>>,
}

impl FormSession {
    /// Start an empty session over `engine`.
    #[must_use]
    pub fn new(engine: Arc<FormValidationEngine>) -> Self {
        Self {
            engine,
            state: FormState::new(),
            results: BTreeMap::new(),
            touched: BTreeSet::new(),
            submitted: false,
            observers: Vec::new(),
        }
    }

    /// Start an empty sign-up session.
    #[must_use]
    pub fn signup() -> Self {
        Self::new(Arc::new(FormValidationEngine::signup()))
    }

    /// Register an observer for every subsequent field update.
    pub fn subscribe(&mut self, observer: Arc<dyn FieldObserver>) {
        self.observers.push(observer);
    }

    /// The engine this session evaluates against.
    #[must_use]
    pub fn engine(&self) -> &FormValidationEngine {
        &self.engine
    }

    /// Current values.
    #[must_use]
    pub fn values(&self) -> &FormState {
        &self.state
    }

    /// Latest result for `field`, if it has been evaluated.
    #[must_use]
    pub fn result(&self, field: &str) -> Option<&ValidationResult> {
        self.results.get(field)
    }

    /// Whether `field` has received a value or lost focus.
    #[must_use]
    pub fn is_touched(&self, field: &str) -> bool {
        self.touched.contains(field)
    }

    /// Whether a submit attempt has been made since the last reset.
    #[must_use]
    pub fn submitted(&self) -> bool {
        self.submitted
    }

    /// Whether the current values would be accepted for submission.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.engine.evaluate_form(&self.state).is_valid()
    }

    /// Change a field's value and re-evaluate it and its dependents.
    ///
    /// Returns the updates in the order observers received them.
    pub fn set_value(&mut self, field: &str, value: impl Into<String>) -> Vec<FieldUpdate> {
        self.state.set(field, value);
        self.touched.insert(field.to_owned());

        let engine = Arc::clone(&self.engine);
        let mut targets = vec![field.to_owned()];
        targets.extend(
            engine
                .dependents_of(field)
                .filter(|dep| *dep != field && (self.submitted || self.touched.contains(*dep)))
                .map(str::to_owned),
        );

        targets
            .iter()
            .map(|target| self.refresh(&engine, target))
            .collect()
    }

    /// Mark a field touched and evaluate its current value.
    pub fn blur(&mut self, field: &str) -> FieldUpdate {
        self.touched.insert(field.to_owned());
        let engine = Arc::clone(&self.engine);
        self.refresh(&engine, field)
    }

    /// Evaluate every field and record the submit attempt.
    pub fn validate(&mut self) -> FormReport {
        self.submitted = true;
        let report = self.engine.evaluate_form(&self.state);

        for (field, result) in &report.fields {
            let update = FieldUpdate {
                field: field.clone(),
                result: result.clone(),
                criteria: self.engine.criteria_for(field, self.state.get(field)),
            };
            self.results.insert(field.clone(), result.clone());
            self.notify(&update);
        }

        report
    }

    /// Validate, and hand a valid form to `registrar`.
    ///
    /// An invalid form never reaches the registrar. A registrar failure is
    /// logged and returned; the values are kept so the user can try again.
    pub async fn submit(&mut self, registrar: &dyn Registrar) -> SubmitOutcome {
        let report = self.validate();
        if !report.is_valid() {
            debug!(
                invalid = report.errors().len(),
                "submission suppressed, form has invalid fields"
            );
            return SubmitOutcome::Rejected(report);
        }

        let request = SignupRequest::from_form(&self.state);
        match registrar.register(&request).await {
            Ok(account) => {
                info!(account_id = %account.id, "account registered");
                self.reset();
                SubmitOutcome::Registered(account)
            }
            Err(e) => {
                error!(error = %e, "registration failed");
                SubmitOutcome::Failed(e)
            }
        }
    }

    /// Wipe every value and result. Observers stay subscribed.
    pub fn reset(&mut self) {
        self.state.clear();
        self.results.clear();
        self.touched.clear();
        self.submitted = false;
    }

    fn refresh(&mut self, engine: &FormValidationEngine, field: &str) -> FieldUpdate {
        let value = self.state.get(field);
        let update = FieldUpdate {
            field: field.to_owned(),
            result: engine.evaluate(field, value, &self.state),
            criteria: engine.criteria_for(field, value),
        };
        self.results.insert(field.to_owned(), update.result.clone());
        self.notify(&update);
        update
    }

    fn notify(&self, update: &FieldUpdate) {
        for observer in &self.observers {
            observer.on_field_update(update);
        }
    }
}

impl std::fmt::Debug for FormSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormSession")
            .field("state", &self.state)
            .field("results", &self.results)
            .field("submitted", &self.submitted)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::registrar::MemoryRegistrar;
    use crate::signup::fields;

    #[derive(Default)]
    struct Recorder {
        updates: Mutex<Vec<FieldUpdate>>,
    }

    impl Recorder {
        fn fields(&self) -> Vec<String> {
            self.updates
                .lock()
                .unwrap()
                .iter()
                .map(|u| u.field.clone())
                .collect()
        }
    }

    impl FieldObserver for Recorder {
        fn on_field_update(&self, update: &FieldUpdate) {
            self.updates.lock().unwrap().push(update.clone());
        }
    }

    #[derive(Default)]
    struct CountingRegistrar {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl Registrar for CountingRegistrar {
        async fn register(
            &self,
            request: &SignupRequest,
        ) -> Result<RegisteredAccount, RegistrationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(RegistrationError::Upstream {
                    reason: "connection refused".to_owned(),
                });
            }
            MemoryRegistrar::new().register(request).await
        }
    }

    fn fill(session: &mut FormSession) {
        session.set_value(fields::FULL_NAME, "Jane Doe");
        session.set_value(fields::EMAIL, "jane@example.com");
        session.set_value(fields::PHONE, "+1 (555) 000-0000");
        session.set_value(fields::COUNTRY, "United States");
        session.set_value(fields::PASSWORD, "Abcdef1!");
        session.set_value(fields::CONFIRM_PASSWORD, "Abcdef1!");
    }

    #[test]
    fn set_value_evaluates_and_notifies() {
        let recorder = Arc::new(Recorder::default());
        let mut session = FormSession::signup();
        session.subscribe(recorder.clone());

        let updates = session.set_value(fields::EMAIL, "not-an-email");
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].result.message(), Some("Invalid email address"));
        assert_eq!(recorder.fields(), vec![fields::EMAIL]);
        assert_eq!(
            session.result(fields::EMAIL),
            Some(&ValidationResult::invalid("Invalid email address"))
        );
    }

    #[test]
    fn password_update_carries_checklist() {
        let mut session = FormSession::signup();
        let updates = session.set_value(fields::PASSWORD, "abcdefgh");
        let criteria = updates[0].criteria.as_ref().unwrap();
        assert_eq!(criteria.len(), 5);
        assert!(criteria[0].met);
        assert!(!criteria[1].met);
    }

    #[test]
    fn untouched_confirm_is_not_reevaluated() {
        let mut session = FormSession::signup();
        let updates = session.set_value(fields::PASSWORD, "Abcdef1!");
        assert_eq!(updates.len(), 1);
        assert!(session.result(fields::CONFIRM_PASSWORD).is_none());
    }

    #[test]
    fn password_change_rechecks_touched_confirm() {
        let recorder = Arc::new(Recorder::default());
        let mut session = FormSession::signup();
        session.subscribe(recorder.clone());

        session.set_value(fields::PASSWORD, "Abcdef1!");
        session.set_value(fields::CONFIRM_PASSWORD, "Abcdef1!");
        assert!(session.result(fields::CONFIRM_PASSWORD).unwrap().is_valid());

        let updates = session.set_value(fields::PASSWORD, "Abcdef1?");
        assert_eq!(
            updates.iter().map(|u| u.field.as_str()).collect::<Vec<_>>(),
            vec![fields::PASSWORD, fields::CONFIRM_PASSWORD]
        );
        assert_eq!(
            session.result(fields::CONFIRM_PASSWORD),
            Some(&ValidationResult::invalid("Passwords do not match"))
        );
        assert_eq!(recorder.fields().len(), 4);
    }

    #[test]
    fn after_submit_attempt_dependents_always_refresh() {
        let mut session = FormSession::signup();
        session.validate();
        let updates = session.set_value(fields::PASSWORD, "Abcdef1!");
        assert_eq!(updates.len(), 2);
        assert_eq!(
            updates[1].result,
            ValidationResult::invalid("Please confirm your password")
        );
    }

    #[test]
    fn blur_marks_touched() {
        let mut session = FormSession::signup();
        let update = session.blur(fields::FULL_NAME);
        assert!(session.is_touched(fields::FULL_NAME));
        assert_eq!(update.result.message(), Some("Full name is required"));
    }

    #[test]
    fn validate_notifies_every_field() {
        let recorder = Arc::new(Recorder::default());
        let mut session = FormSession::signup();
        session.subscribe(recorder.clone());

        let report = session.validate();
        assert!(!report.is_valid());
        assert!(session.submitted());
        assert_eq!(recorder.fields().len(), fields::ALL.len());
    }

    #[tokio::test]
    async fn invalid_form_never_reaches_registrar() {
        let registrar = CountingRegistrar::default();
        let mut session = FormSession::signup();
        fill(&mut session);
        session.set_value(fields::FULL_NAME, "");

        let report = match session.submit(&registrar).await {
            SubmitOutcome::Rejected(report) => report,
            other => panic!("expected rejection, got {other:?}"),
        };
        assert_eq!(
            report.errors().get(fields::FULL_NAME).copied(),
            Some("Full name is required")
        );
        assert_eq!(registrar.calls.load(Ordering::SeqCst), 0);
        assert_eq!(session.values().get(fields::EMAIL), "jane@example.com");
    }

    #[tokio::test]
    async fn valid_form_registers_and_resets() {
        let registrar = CountingRegistrar::default();
        let mut session = FormSession::signup();
        fill(&mut session);
        assert!(session.is_valid());

        let account = match session.submit(&registrar).await {
            SubmitOutcome::Registered(account) => account,
            other => panic!("expected registration, got {other:?}"),
        };
        assert_eq!(account.email, "jane@example.com");
        assert_eq!(registrar.calls.load(Ordering::SeqCst), 1);
        assert!(session.values().is_empty());
        assert!(!session.submitted());
        assert!(session.result(fields::EMAIL).is_none());
    }

    #[tokio::test]
    async fn registrar_failure_keeps_values() {
        let registrar = CountingRegistrar {
            fail: true,
            ..CountingRegistrar::default()
        };
        let mut session = FormSession::signup();
        fill(&mut session);

        let outcome = session.submit(&registrar).await;
        assert!(matches!(
            outcome,
            SubmitOutcome::Failed(RegistrationError::Upstream { .. })
        ));
        assert_eq!(registrar.calls.load(Ordering::SeqCst), 1);
        assert_eq!(session.values().get(fields::FULL_NAME), "Jane Doe");
    }

    #[tokio::test]
    async fn duplicate_account_is_reported() {
        let registrar = MemoryRegistrar::new();
        let mut first = FormSession::signup();
        fill(&mut first);
        assert!(matches!(
            first.submit(&registrar).await,
            SubmitOutcome::Registered(_)
        ));

        let mut second = FormSession::signup();
        fill(&mut second);
        assert!(matches!(
            second.submit(&registrar).await,
            SubmitOutcome::Failed(RegistrationError::AlreadyRegistered { .. })
        ));
    }
}
