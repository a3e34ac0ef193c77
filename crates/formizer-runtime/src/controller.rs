#![forbid(unsafe_code)]

//! Submit and reset orchestration.
//!
//! One submit attempt is a small state machine:
//! `Validating -> {Failed, Accepted}`, and `Accepted -> Reset` when the form
//! is configured to reset on submit. Every field is validated, and its
//! errors written back to the store, before either callback runs.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use formizer_core::evaluate;
use formizer_store::{FieldStore, FieldsData, FieldsSnapshot, SubscriptionId};
use indexmap::IndexMap;
use tracing::{debug, debug_span};

use crate::config::FormConfig;

// ---------------------------------------------------------------------------
// Callback types
// ---------------------------------------------------------------------------

/// What submit callbacks receive.
#[derive(Debug)]
pub struct SubmitParams<'a, E> {
    /// The host event that triggered the submit.
    pub event: &'a E,
    pub data: FieldsData,
}

/// Success and validation-failed callback.
pub type SubmitHandler<E> = Box<dyn Fn(&SubmitParams<'_, E>) + Send + Sync>;

/// Form-level change callback, called with the full formatted snapshot.
pub type FieldsChangeHandler = Box<dyn Fn(&FieldsData) + Send + Sync>;

// ---------------------------------------------------------------------------
// SubmitPhase / SubmitOutcome
// ---------------------------------------------------------------------------

/// States of one submit attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitPhase {
    Validating,
    Failed,
    Accepted,
    Reset,
}

impl fmt::Display for SubmitPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Validating => "validating",
            Self::Failed => "failed",
            Self::Accepted => "accepted",
            Self::Reset => "reset",
        })
    }
}

/// Result of [`FormController::submit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// All fields valid; the submit callback ran.
    Accepted {
        /// Whether the form was reset afterwards.
        reset: bool,
    },
    /// At least one field invalid; the validation-failed callback ran.
    Rejected {
        /// Number of fields with errors.
        invalid_fields: usize,
    },
}

impl SubmitOutcome {
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

// ---------------------------------------------------------------------------
// FormController
// ---------------------------------------------------------------------------

/// Submit/reset orchestration for one form.
///
/// `E` is the host's event type, passed through to the callbacks untouched.
pub struct FormController<E = ()> {
    store: FieldStore,
    config: FormConfig,
    on_submit: Option<SubmitHandler<E>>,
    on_validation_failed: Option<SubmitHandler<E>>,
    change_subscription: Option<SubscriptionId>,
    attempts: AtomicU64,
}

impl<E> FormController<E> {
    /// A controller over `store` with no callbacks.
    pub fn new(store: FieldStore, config: FormConfig) -> Self {
        Self {
            store,
            config,
            on_submit: None,
            on_validation_failed: None,
            change_subscription: None,
            attempts: AtomicU64::new(0),
        }
    }

    /// Called with valid data on a successful submit.
    #[must_use]
    pub fn on_submit(mut self, f: impl Fn(&SubmitParams<'_, E>) + Send + Sync + 'static) -> Self {
        self.on_submit = Some(Box::new(f));
        self
    }

    /// Called with the aggregated errors when a submit fails validation.
    #[must_use]
    pub fn on_validation_failed(
        mut self,
        f: impl Fn(&SubmitParams<'_, E>) + Send + Sync + 'static,
    ) -> Self {
        self.on_validation_failed = Some(Box::new(f));
        self
    }

    /// Called with the full formatted snapshot after every value change.
    ///
    /// Replaces any previously set handler.
    #[must_use]
    pub fn on_fields_change(mut self, f: impl Fn(&FieldsData) + Send + Sync + 'static) -> Self {
        if let Some(id) = self.change_subscription.take() {
            self.store.unsubscribe(id);
        }
        let handler: FieldsChangeHandler = Box::new(f);
        let weak = self.store.downgrade();
        let id = self.store.on_field_change(move |_, _| {
            if let Some(store) = weak.upgrade() {
                handler(&store.snapshot().data());
            }
        });
        self.change_subscription = Some(id);
        self
    }

    #[must_use]
    pub fn store(&self) -> &FieldStore {
        &self.store
    }

    #[must_use]
    pub fn config(&self) -> FormConfig {
        self.config
    }

    /// Validate every field, then submit or report.
    pub fn submit(&self, event: &E) -> SubmitOutcome {
        let attempt = self.attempts.fetch_add(1, Ordering::Relaxed) + 1;
        let _span = debug_span!("form.submit", attempt).entered();

        let snapshot = self.store.snapshot();
        debug!(phase = %SubmitPhase::Validating, fields = snapshot.len());
        let data = self.validate_all(&snapshot);
        let invalid_fields = data.invalid_fields().len();

        if invalid_fields > 0 {
            debug!(phase = %SubmitPhase::Failed, invalid_fields);
            if let Some(handler) = &self.on_validation_failed {
                handler(&SubmitParams { event, data });
            }
            return SubmitOutcome::Rejected { invalid_fields };
        }

        debug!(phase = %SubmitPhase::Accepted);
        if let Some(handler) = &self.on_submit {
            handler(&SubmitParams { event, data });
        }

        let reset = self.config.reset_on_submit;
        if reset {
            self.store.reset_all();
            debug!(phase = %SubmitPhase::Reset);
        }
        SubmitOutcome::Accepted { reset }
    }

    /// Reset every field. Submit callbacks are not involved.
    pub fn reset(&self) -> FieldsSnapshot {
        self.store.reset_all()
    }

    /// Evaluate each field in registration order, writing errors back.
    fn validate_all(&self, snapshot: &FieldsSnapshot) -> FieldsData {
        let mut values = IndexMap::with_capacity(snapshot.len());
        let mut errors = IndexMap::with_capacity(snapshot.len());
        for (name, field) in snapshot.iter() {
            let field_errors = evaluate(field.value(), field.rules());
            self.store.update_errors(name, field_errors.clone());
            values.insert(name.to_string(), field.value().clone());
            errors.insert(name.to_string(), field_errors);
        }
        FieldsData { values, errors }
    }
}

impl<E> Drop for FormController<E> {
    fn drop(&mut self) {
        if let Some(id) = self.change_subscription.take() {
            self.store.unsubscribe(id);
        }
    }
}

impl<E> fmt::Debug for FormController<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormController")
            .field("config", &self.config)
            .field("fields", &self.store.len())
            .field("on_submit", &self.on_submit.is_some())
            .field("on_validation_failed", &self.on_validation_failed.is_some())
            .field("attempts", &self.attempts.load(Ordering::Relaxed))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formizer_core::{FieldKind, FieldValue, Rules};
    use formizer_store::FieldInit;
    use std::sync::{Arc, Mutex};

    fn store_with_name(required: bool) -> FieldStore {
        let store = FieldStore::new();
        store.initialize(
            "name",
            FieldInit::new(FieldKind::Text, "").rules(Rules::new().required(required)),
        );
        store
    }

    #[test]
    fn empty_form_submits() {
        let controller: FormController = FormController::new(FieldStore::new(), FormConfig::new());
        assert_eq!(controller.submit(&()), SubmitOutcome::Accepted { reset: false });
    }

    #[test]
    fn failed_submit_writes_errors_back() {
        let store = store_with_name(true);
        let controller: FormController = FormController::new(store.clone(), FormConfig::new());
        assert_eq!(
            controller.submit(&()),
            SubmitOutcome::Rejected { invalid_fields: 1 }
        );
        assert_eq!(store.errors("name").unwrap(), ["required"]);
    }

    #[test]
    fn event_is_passed_through() {
        #[derive(Debug, PartialEq)]
        struct Click(u32);

        let seen = Arc::new(Mutex::new(None));
        let s = Arc::clone(&seen);
        let controller = FormController::new(store_with_name(false), FormConfig::new())
            .on_submit(move |p: &SubmitParams<'_, Click>| *s.lock().unwrap() = Some(p.event.0));
        controller.submit(&Click(7));
        assert_eq!(*seen.lock().unwrap(), Some(7));
    }

    #[test]
    fn reset_does_not_fire_submit_callbacks() {
        let fired = Arc::new(Mutex::new(0));
        let f1 = Arc::clone(&fired);
        let f2 = Arc::clone(&fired);
        let store = store_with_name(true);
        let controller: FormController = FormController::new(store.clone(), FormConfig::new())
            .on_submit(move |_| *f1.lock().unwrap() += 1)
            .on_validation_failed(move |_| *f2.lock().unwrap() += 1);
        store.update_value("name", FieldValue::from("typed"));
        controller.reset();
        assert_eq!(*fired.lock().unwrap(), 0);
        assert_eq!(store.value("name"), Some(FieldValue::from("")));
    }

    #[test]
    fn fields_change_handler_is_replaced_and_dropped() {
        let store = store_with_name(false);
        let first = Arc::new(Mutex::new(0));
        let second = Arc::new(Mutex::new(0));
        let (a, b) = (Arc::clone(&first), Arc::clone(&second));

        let controller: FormController = FormController::new(store.clone(), FormConfig::new())
            .on_fields_change(move |_| *a.lock().unwrap() += 1)
            .on_fields_change(move |_| *b.lock().unwrap() += 1);
        store.update_value("name", "x".into());
        assert_eq!((*first.lock().unwrap(), *second.lock().unwrap()), (0, 1));

        drop(controller);
        store.update_value("name", "y".into());
        assert_eq!(*second.lock().unwrap(), 1);
    }

    #[test]
    fn phase_display() {
        assert_eq!(SubmitPhase::Validating.to_string(), "validating");
        assert_eq!(SubmitPhase::Reset.to_string(), "reset");
        assert!(SubmitOutcome::Accepted { reset: true }.is_accepted());
        assert!(!SubmitOutcome::Rejected { invalid_fields: 2 }.is_accepted());
    }
}
