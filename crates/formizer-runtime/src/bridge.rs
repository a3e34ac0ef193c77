#![forbid(unsafe_code)]

//! Read and write access to a form from outside its field tree.
//!
//! The bridge holds the last formatted snapshot pushed to it and the most
//! recently registered setter. [`RegistrationBridge::connect`] wires it to a
//! store so every published snapshot is pushed automatically.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use formizer_core::{ErrorCode, FieldValue, FieldValueError};
use formizer_store::{FieldStore, FieldsData, SetValueFn, SubscriptionId};
use tracing::trace;

/// Told that a fresh snapshot arrived.
pub type BridgeListener = Arc<dyn Fn(&FieldsData) + Send + Sync>;

#[derive(Default)]
struct BridgeState {
    data: FieldsData,
    setter: Option<SetValueFn>,
}

#[derive(Default)]
struct BridgeInner {
    state: RwLock<BridgeState>,
    listeners: RwLock<Vec<(SubscriptionId, BridgeListener)>>,
    next_id: AtomicU64,
}

/// Shared handle; clones see the same snapshot and setter.
#[derive(Clone, Default)]
pub struct RegistrationBridge {
    inner: Arc<BridgeInner>,
}

impl RegistrationBridge {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a snapshot and the setter to use from now on.
    ///
    /// Listeners run after the state is swapped, outside the lock.
    pub fn register(&self, data: FieldsData, setter: SetValueFn) {
        {
            let mut state = self
                .inner
                .state
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            state.data = data;
            state.setter = Some(setter);
        }
        self.notify();
    }

    /// Subscribe to `store`: push now, then on every published snapshot.
    ///
    /// The subscription holds the bridge, not the store.
    pub fn connect(&self, store: &FieldStore) -> SubscriptionId {
        let setter = store.setter();
        self.register(store.snapshot().data(), Arc::clone(&setter));
        let bridge = self.clone();
        store.subscribe(move |snapshot| bridge.register(snapshot.data(), Arc::clone(&setter)))
    }

    /// Be told whenever a fresh snapshot is pushed.
    pub fn subscribe(&self, listener: impl Fn(&FieldsData) + Send + Sync + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        self.inner
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(listener)));
        id
    }

    /// Returns `true` if a listener was removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self
            .inner
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        listeners.len() != before
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// The last pushed snapshot.
    #[must_use]
    pub fn data(&self) -> FieldsData {
        self.read_state(|s| s.data.clone())
    }

    #[must_use]
    pub fn get_value(&self, name: &str) -> Option<FieldValue> {
        self.read_state(|s| s.data.value(name).cloned())
    }

    /// The value converted to `T`.
    ///
    /// `None` if the field is unknown; `Some(Err(_))` on a type mismatch.
    #[must_use]
    pub fn get_value_as<T>(&self, name: &str) -> Option<Result<T, FieldValueError>>
    where
        T: TryFrom<FieldValue, Error = FieldValueError>,
    {
        self.get_value(name).map(T::try_from)
    }

    #[must_use]
    pub fn get_errors(&self, name: &str) -> Option<Vec<ErrorCode>> {
        self.read_state(|s| s.data.field_errors(name).map(<[ErrorCode]>::to_vec))
    }

    /// Returns `true` once a setter has been registered.
    #[must_use]
    pub fn is_registered(&self) -> bool {
        self.read_state(|s| s.setter.is_some())
    }

    // -------------------------------------------------------------------------
    // Writes
    // -------------------------------------------------------------------------

    /// Forward through the latest setter. No setter yet is a no-op.
    pub fn set_value(&self, name: &str, value: impl Into<FieldValue>) {
        let setter = self.read_state(|s| s.setter.clone());
        match setter {
            Some(setter) => setter(name, value.into()),
            None => trace!(field = %name, "bridge set before registration ignored"),
        }
    }

    fn read_state<R>(&self, f: impl FnOnce(&BridgeState) -> R) -> R {
        f(&self
            .inner
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner))
    }

    fn notify(&self) {
        let listeners: Vec<BridgeListener> = self
            .inner
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        if listeners.is_empty() {
            return;
        }
        let data = self.data();
        for listener in listeners {
            listener(&data);
        }
    }
}

impl fmt::Debug for RegistrationBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.read_state(|s| {
            f.debug_struct("RegistrationBridge")
                .field("data", &s.data)
                .field("registered", &s.setter.is_some())
                .finish()
        })
    }
}
