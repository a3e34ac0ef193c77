#![forbid(unsafe_code)]

//! The field store.
//!
//! # Design Invariants
//!
//! 1. **Copy-on-write**: the map lives behind an `Arc`; mutations go through
//!    `Arc::make_mut`, so any snapshot a consumer still holds is untouched.
//! 2. **No stale errors**: `update_value` recomputes errors in the same call.
//! 3. **Callbacks outside the lock**: hooks, rules and subscribers never run
//!    while the map is locked, so they may call back into the store.
//! 4. **No removal**: fields live as long as the store.
//!
//! # Notifications
//!
//! | Operation | Snapshot subscribers | Field-change handlers |
//! |-----------|----------------------|-----------------------|
//! | `initialize` | yes | no |
//! | `update_value` / `set_value` | yes | yes |
//! | `update_errors` | yes | no |
//! | `recompute_all_errors` | yes | no |
//! | `reset_all` | yes | no |

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use formizer_core::{ErrorCode, FieldValue, evaluate};
use tracing::{debug, trace};

use crate::field::{Field, FieldChange, FieldInit};
use crate::snapshot::{FieldMap, FieldsSnapshot};

/// Called with every newly published snapshot.
pub type SnapshotHandler = Arc<dyn Fn(&FieldsSnapshot) + Send + Sync>;

/// Called with `(name, change)` after every value change.
pub type ChangeHandler = Arc<dyn Fn(&str, &FieldChange) + Send + Sync>;

/// Routes an external value into a named field.
pub type SetValueFn = Arc<dyn Fn(&str, FieldValue) + Send + Sync>;

/// Identifies a registered subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

struct StoreInner {
    fields: RwLock<Arc<FieldMap>>,
    snapshot_handlers: RwLock<Vec<(SubscriptionId, SnapshotHandler)>>,
    change_handlers: RwLock<Vec<(SubscriptionId, ChangeHandler)>>,
    next_id: AtomicU64,
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// Handle to one form's field store.
///
/// Clones share the same store; construct one per form and pass it to every
/// input adapter, the controller and the bridge.
#[derive(Clone)]
pub struct FieldStore {
    inner: Arc<StoreInner>,
}

impl FieldStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(StoreInner {
                fields: RwLock::new(Arc::new(FieldMap::new())),
                snapshot_handlers: RwLock::new(Vec::new()),
                change_handlers: RwLock::new(Vec::new()),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// The current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> FieldsSnapshot {
        FieldsSnapshot::new(Arc::clone(&read(&self.inner.fields)))
    }

    /// A copy of one field.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<Field> {
        read(&self.inner.fields).get(name).cloned()
    }

    /// The current value of one field.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<FieldValue> {
        read(&self.inner.fields).get(name).map(|f| f.value.clone())
    }

    /// The current errors of one field.
    #[must_use]
    pub fn errors(&self, name: &str) -> Option<Vec<ErrorCode>> {
        read(&self.inner.fields).get(name).map(|f| f.errors.clone())
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        read(&self.inner.fields).contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        read(&self.inner.fields).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    /// Register a field, or merge a repeated registration into it.
    ///
    /// See [`Field`] merge rules: first non-empty rules win, a truthy radio
    /// default is kept, hooks are chained old-then-new.
    pub fn initialize(&self, name: impl Into<String>, init: FieldInit) -> FieldsSnapshot {
        let name = name.into();
        let snapshot = self.commit(|map| {
            let map = Arc::make_mut(map);
            match map.get_mut(&name) {
                Some(field) => {
                    field.merge(init);
                    debug!(field = %name, kind = %field.kind, "field registration merged");
                }
                None => {
                    debug!(field = %name, kind = %init.kind, "field registered");
                    map.insert(name.clone(), Field::from_init(init));
                }
            }
        });
        self.publish(&snapshot);
        snapshot
    }

    /// Set a field's value and recompute its errors.
    ///
    /// Fires field-change handlers and snapshot subscribers. Returns the
    /// emitted change, or `None` if no field has this name.
    pub fn update_value(&self, name: &str, value: FieldValue) -> Option<FieldChange> {
        // Rules run outside the lock.
        let rules = read(&self.inner.fields).get(name).map(|f| f.rules.clone());
        let Some(rules) = rules else {
            debug!(field = %name, "value update for unknown field ignored");
            return None;
        };
        let errors = evaluate(&value, &rules);

        let change = FieldChange { value, errors };
        let mut found = false;
        let snapshot = self.commit(|map| {
            if !map.contains_key(name) {
                return;
            }
            found = true;
            if let Some(field) = Arc::make_mut(map).get_mut(name) {
                field.value = change.value.clone();
                field.errors = change.errors.clone();
            }
        });
        if !found {
            return None;
        }

        trace!(field = %name, errors = change.errors.len(), "value updated");
        self.emit_change(name, &change);
        self.publish(&snapshot);
        Some(change)
    }

    /// Push a value from outside the rendered tree.
    ///
    /// Runs the field's set hook with the value, then follows the regular
    /// [`update_value`](Self::update_value) path. Unknown names are a no-op.
    pub fn set_value(&self, name: &str, value: FieldValue) -> Option<FieldChange> {
        let hook = match read(&self.inner.fields).get(name) {
            Some(field) => field.set.clone(),
            None => {
                debug!(field = %name, "external set for unknown field ignored");
                return None;
            }
        };
        if let Some(hook) = hook {
            hook(&value);
        }
        self.update_value(name, value)
    }

    /// Overwrite a field's errors without recomputing them.
    ///
    /// Returns `false` if no field has this name.
    pub fn update_errors(&self, name: &str, errors: Vec<ErrorCode>) -> bool {
        let mut found = false;
        let snapshot = self.commit(|map| {
            if !map.contains_key(name) {
                return;
            }
            found = true;
            if let Some(field) = Arc::make_mut(map).get_mut(name) {
                field.errors = errors;
            }
        });
        if found {
            trace!(field = %name, "errors overwritten");
            self.publish(&snapshot);
        } else {
            debug!(field = %name, "error update for unknown field ignored");
        }
        found
    }

    /// Recompute every field's errors from its current value and rules.
    pub fn recompute_all_errors(&self) -> FieldsSnapshot {
        let current = self.snapshot();
        let computed: Vec<(String, Vec<ErrorCode>)> = current
            .iter()
            .map(|(name, field)| (name.to_string(), evaluate(&field.value, &field.rules)))
            .collect();
        drop(current);

        let snapshot = self.commit(|map| {
            let map = Arc::make_mut(map);
            for (name, errors) in computed {
                if let Some(field) = map.get_mut(&name) {
                    field.errors = errors;
                }
            }
        });
        debug!(
            fields = snapshot.len(),
            invalid = snapshot.iter().filter(|(_, f)| !f.is_valid()).count(),
            "errors recomputed"
        );
        self.publish(&snapshot);
        snapshot
    }

    /// Restore every field to its default.
    ///
    /// Composite reset hooks run first, in registration order; then every
    /// value is set to its default and every error list cleared.
    pub fn reset_all(&self) -> FieldsSnapshot {
        let hooks: Vec<_> = self
            .snapshot()
            .iter()
            .filter_map(|(_, field)| field.reset.clone())
            .collect();
        for hook in &hooks {
            hook();
        }

        let snapshot = self.commit(|map| {
            for field in Arc::make_mut(map).values_mut() {
                field.value = field.default_value.clone();
                field.errors.clear();
            }
        });
        debug!(fields = snapshot.len(), hooks = hooks.len(), "fields reset");
        self.publish(&snapshot);
        snapshot
    }

    /// A function routing `(name, value)` into [`set_value`](Self::set_value).
    ///
    /// Holds the store weakly: once every handle is dropped the setter does
    /// nothing.
    #[must_use]
    pub fn setter(&self) -> SetValueFn {
        let weak = self.downgrade();
        Arc::new(move |name: &str, value: FieldValue| {
            if let Some(store) = weak.upgrade() {
                store.set_value(name, value);
            }
        })
    }

    /// A non-owning handle, for callbacks stored inside the store itself.
    #[must_use]
    pub fn downgrade(&self) -> WeakFieldStore {
        WeakFieldStore {
            inner: Arc::downgrade(&self.inner),
        }
    }

    // -------------------------------------------------------------------------
    // Subscriptions
    // -------------------------------------------------------------------------

    /// Observe every published snapshot.
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&FieldsSnapshot) + Send + Sync + 'static,
    {
        let id = self.next_id();
        write(&self.inner.snapshot_handlers).push((id, Arc::new(handler)));
        id
    }

    /// Observe per-field value changes.
    pub fn on_field_change<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&str, &FieldChange) + Send + Sync + 'static,
    {
        let id = self.next_id();
        write(&self.inner.change_handlers).push((id, Arc::new(handler)));
        id
    }

    /// Remove a subscriber of either kind. Returns `true` if one was removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut removed = false;
        {
            let mut handlers = write(&self.inner.snapshot_handlers);
            let before = handlers.len();
            handlers.retain(|(hid, _)| *hid != id);
            removed |= handlers.len() != before;
        }
        {
            let mut handlers = write(&self.inner.change_handlers);
            let before = handlers.len();
            handlers.retain(|(hid, _)| *hid != id);
            removed |= handlers.len() != before;
        }
        removed
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn next_id(&self) -> SubscriptionId {
        SubscriptionId(self.inner.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Apply `f` under the write lock and return the resulting snapshot.
    fn commit(&self, f: impl FnOnce(&mut Arc<FieldMap>)) -> FieldsSnapshot {
        let mut guard = write(&self.inner.fields);
        f(&mut guard);
        FieldsSnapshot::new(Arc::clone(&guard))
    }

    fn publish(&self, snapshot: &FieldsSnapshot) {
        let handlers: Vec<SnapshotHandler> = read(&self.inner.snapshot_handlers)
            .iter()
            .map(|(_, h)| Arc::clone(h))
            .collect();
        for handler in handlers {
            handler(snapshot);
        }
    }

    fn emit_change(&self, name: &str, change: &FieldChange) {
        let handlers: Vec<ChangeHandler> = read(&self.inner.change_handlers)
            .iter()
            .map(|(_, h)| Arc::clone(h))
            .collect();
        for handler in handlers {
            handler(name, change);
        }
    }
}

/// Weak counterpart of [`FieldStore`].
#[derive(Clone)]
pub struct WeakFieldStore {
    inner: Weak<StoreInner>,
}

impl WeakFieldStore {
    /// The store, if any strong handle is still alive.
    #[must_use]
    pub fn upgrade(&self) -> Option<FieldStore> {
        self.inner.upgrade().map(|inner| FieldStore { inner })
    }
}

impl Default for FieldStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FieldStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldStore")
            .field("fields", &self.snapshot())
            .finish()
    }
}
