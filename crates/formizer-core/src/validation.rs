#![forbid(unsafe_code)]

//! The validation engine.
//!
//! [`evaluate`] is a pure function from a value and a rule set to the
//! ordered list of failing error codes. Rules run in a fixed order and
//! never short-circuit:
//!
//! 1. `required`
//! 2. `custom`
//! 3. `max-length`, `min-length`, `pattern` (text values only; skipped,
//!    not failed, for anything else)

use std::borrow::Cow;
use std::fmt;

use crate::rules::{CustomVerdict, Rules};
use crate::value::FieldValue;

// ---------------------------------------------------------------------------
// Error Codes
// ---------------------------------------------------------------------------

/// Error code for a missing required value.
pub const ERROR_CODE_REQUIRED: &str = "required";
/// Error code for text longer than the maximum.
pub const ERROR_CODE_MAX_LENGTH: &str = "max-length";
/// Error code for text shorter than the minimum.
pub const ERROR_CODE_MIN_LENGTH: &str = "min-length";
/// Error code for text not matching the pattern.
pub const ERROR_CODE_PATTERN: &str = "pattern";
/// Error code for a custom rule returning `false`.
pub const ERROR_CODE_CUSTOM: &str = "custom";

/// A string identifying which rule failed.
///
/// Built-in codes are static; custom rules may name their own.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ErrorCode(Cow<'static, str>);

impl ErrorCode {
    pub const REQUIRED: Self = Self(Cow::Borrowed(ERROR_CODE_REQUIRED));
    pub const MAX_LENGTH: Self = Self(Cow::Borrowed(ERROR_CODE_MAX_LENGTH));
    pub const MIN_LENGTH: Self = Self(Cow::Borrowed(ERROR_CODE_MIN_LENGTH));
    pub const PATTERN: Self = Self(Cow::Borrowed(ERROR_CODE_PATTERN));
    pub const CUSTOM: Self = Self(Cow::Borrowed(ERROR_CODE_CUSTOM));

    /// A caller-chosen code.
    #[must_use]
    pub fn custom(code: impl Into<String>) -> Self {
        Self(Cow::Owned(code.into()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ErrorCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for ErrorCode {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for ErrorCode {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl From<&'static str> for ErrorCode {
    fn from(code: &'static str) -> Self {
        Self(Cow::Borrowed(code))
    }
}

impl From<String> for ErrorCode {
    fn from(code: String) -> Self {
        Self(Cow::Owned(code))
    }
}

// ---------------------------------------------------------------------------
// evaluate
// ---------------------------------------------------------------------------

fn is_missing(value: &FieldValue) -> bool {
    match value {
        FieldValue::Null => true,
        FieldValue::Text(s) => s.is_empty(),
        FieldValue::Bool(b) => !b,
        FieldValue::Number(_) | FieldValue::Files(_) => false,
    }
}

/// Compute the error codes `value` produces under `rules`.
///
/// Returns an empty vector when the value is valid.
#[must_use]
pub fn evaluate(value: &FieldValue, rules: &Rules) -> Vec<ErrorCode> {
    let mut errors = Vec::new();

    if rules.required && is_missing(value) {
        errors.push(ErrorCode::REQUIRED);
    }

    if let Some(custom) = &rules.custom {
        match custom.check(value) {
            CustomVerdict::Pass => {}
            CustomVerdict::Fail => errors.push(ErrorCode::CUSTOM),
            CustomVerdict::Code(code) => errors.push(ErrorCode::custom(code)),
        }
    }

    let Some(text) = value.as_text() else {
        return errors;
    };

    // Length rules count characters, not bytes.
    if rules.max_length.is_some() || rules.min_length.is_some() {
        let len = text.chars().count();
        if let Some(max) = rules.max_length
            && len > max
        {
            errors.push(ErrorCode::MAX_LENGTH);
        }
        if let Some(min) = rules.min_length
            && len < min
        {
            errors.push(ErrorCode::MIN_LENGTH);
        }
    }

    if let Some(pattern) = &rules.pattern
        && !pattern.is_match(text)
    {
        errors.push(ErrorCode::PATTERN);
    }

    errors
}
