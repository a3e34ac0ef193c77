#![forbid(unsafe_code)]

//! Formizer field store.
//!
//! The [`FieldStore`] owns one [`Field`] per logical input name. Every
//! operation publishes a fresh immutable [`FieldsSnapshot`]; snapshots
//! already handed to consumers never change underneath them.
//!
//! # Key Components
//!
//! - [`FieldStore`] - registry, value updates, bulk validation and reset
//! - [`Field`] / [`FieldInit`] - one logical field and its registration payload
//! - [`FieldsSnapshot`] / [`FieldsData`] - immutable views and their formatted form
//! - [`hooks`] - reset/set callbacks and their chaining

pub mod field;
pub mod hooks;
pub mod snapshot;
pub mod store;

pub use field::{Field, FieldChange, FieldInit};
pub use hooks::{Chain, ResetHook, SetHook, compose, reset_hook, set_hook};
pub use snapshot::{FieldMap, FieldsData, FieldsSnapshot, format_fields_data};
pub use store::{
    ChangeHandler, FieldStore, SetValueFn, SnapshotHandler, SubscriptionId, WeakFieldStore,
};
