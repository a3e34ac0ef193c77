#![forbid(unsafe_code)]

//! Formizer public facade crate.
//!
//! Re-exports the value and rule types, the field store and the form
//! runtime, and adds headless [`input`] adapters that drive a store the way
//! HTML inputs would.

use std::fmt;

pub mod input;

// --- Core re-exports -------------------------------------------------------

pub use formizer_core::{
    CustomRule, CustomVerdict, ErrorCode, FieldKind, FieldValue, FieldValueError, FileHandle,
    Pattern, RuleError, Rules, evaluate,
};

// --- Store re-exports ------------------------------------------------------

pub use formizer_store::{
    FieldChange, FieldInit, FieldStore, FieldsData, FieldsSnapshot, SetValueFn, SubscriptionId,
};

// --- Runtime re-exports ----------------------------------------------------

pub use formizer_runtime::{
    FormConfig, FormController, RegistrationBridge, SubmitOutcome, SubmitParams,
};

pub use input::{InputError, InputEvent, InputProps, InputType, MountedInput};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for Formizer APIs.
#[derive(Debug)]
pub enum Error {
    /// A rule set could not be built.
    Rule(RuleError),
    /// A field value had the wrong type for a typed read.
    Value(FieldValueError),
    /// An input adapter was misconfigured.
    Input(InputError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rule(err) => write!(f, "{err}"),
            Self::Value(err) => write!(f, "{err}"),
            Self::Input(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Rule(err) => Some(err),
            Self::Value(err) => Some(err),
            Self::Input(err) => Some(err),
        }
    }
}

impl From<RuleError> for Error {
    fn from(err: RuleError) -> Self {
        Self::Rule(err)
    }
}

impl From<FieldValueError> for Error {
    fn from(err: FieldValueError) -> Self {
        Self::Value(err)
    }
}

impl From<InputError> for Error {
    fn from(err: InputError) -> Self {
        Self::Input(err)
    }
}

/// Standard result type for Formizer APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Error, FieldInit, FieldKind, FieldStore, FieldValue, FieldsData, FormConfig,
        FormController, InputEvent, InputProps, InputType, RegistrationBridge, Result, Rules,
        SubmitOutcome,
    };

    pub use crate::{core, runtime, store};
}

pub use formizer_core as core;
pub use formizer_runtime as runtime;
pub use formizer_store as store;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn errors_convert_and_chain() {
        let err: Error = Pattern::new("(").unwrap_err().into();
        assert!(matches!(err, Error::Rule(_)));
        assert!(err.source().is_some());

        let err: Error = String::try_from(FieldValue::Bool(true)).unwrap_err().into();
        assert_eq!(err.to_string(), "expected a text value, found bool");
    }

    #[test]
    fn question_mark_flows_into_facade_result() {
        fn build() -> Result<Rules> {
            Ok(Rules::new().pattern("[")?)
        }
        assert!(build().is_err());
    }
}
