#![forbid(unsafe_code)]

//! Core: field values, validation rule sets, and the validation engine.
//!
//! Everything in this crate is pure data plus one pure function,
//! [`evaluate`]. State lives in `formizer-store`; orchestration lives in
//! `formizer-runtime`.

pub mod rules;
pub mod validation;
pub mod value;

pub use rules::{CustomRule, CustomVerdict, Pattern, RuleError, RuleResult, Rules};
pub use validation::{
    ERROR_CODE_CUSTOM, ERROR_CODE_MAX_LENGTH, ERROR_CODE_MIN_LENGTH, ERROR_CODE_PATTERN,
    ERROR_CODE_REQUIRED, ErrorCode, evaluate,
};
pub use value::{FieldKind, FieldValue, FieldValueError, FileHandle};
