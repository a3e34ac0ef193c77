#![forbid(unsafe_code)]

//! Formizer runtime.
//!
//! Ties the store to the host: the [`FormController`] runs the
//! validate-all-then-submit-or-report sequence and form resets, and the
//! [`RegistrationBridge`] lets code outside the field tree read snapshots
//! and push values.
//!
//! # Submit flow
//!
//! ```text
//! submit(event)
//!   │
//!   ▼
//! Validating ──any errors──▶ Failed   (on_validation_failed)
//!   │
//!   └──all clear──▶ Accepted (on_submit) ──reset_on_submit──▶ Reset
//! ```

pub mod bridge;
pub mod config;
pub mod controller;

pub use bridge::{BridgeListener, RegistrationBridge};
pub use config::FormConfig;
pub use controller::{
    FieldsChangeHandler, FormController, SubmitHandler, SubmitOutcome, SubmitParams, SubmitPhase,
};
