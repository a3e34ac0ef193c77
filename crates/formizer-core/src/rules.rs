#![forbid(unsafe_code)]

//! Validation rule sets.
//!
//! A [`Rules`] value is the mapping of rule kind to parameter bound to a
//! field. An absent parameter means the rule is inactive. Rule sets are
//! built once, when an input registers, so construction is the only place
//! that can fail (an invalid regular expression).

use std::fmt;
use std::sync::Arc;

use crate::value::FieldValue;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised while building a rule set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    /// The pattern is not a valid regular expression.
    InvalidPattern { pattern: String, reason: String },
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPattern { pattern, reason } => {
                write!(f, "invalid pattern `{pattern}`: {reason}")
            }
        }
    }
}

impl std::error::Error for RuleError {}

/// Result type for rule construction.
pub type RuleResult<T> = Result<T, RuleError>;

// ---------------------------------------------------------------------------
// Pattern
// ---------------------------------------------------------------------------

/// A compiled regular expression rule.
///
/// Expressions use ECMAScript syntax and semantics, so `\w`, `\d` and `\b`
/// are ASCII-only and patterns written for HTML `pattern` attributes work
/// unchanged. Matching is a search, not a full match: anchor the expression
/// with `^...$` to constrain the whole string.
#[derive(Clone)]
pub struct Pattern {
    source: String,
    regex: regress::Regex,
}

impl Pattern {
    /// Compile a pattern.
    pub fn new(source: &str) -> RuleResult<Self> {
        regress::Regex::new(source)
            .map(|regex| Self {
                source: source.to_string(),
                regex,
            })
            .map_err(|err| RuleError::InvalidPattern {
                pattern: source.to_string(),
                reason: err.to_string(),
            })
    }

    /// The source expression.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns `true` if the expression matches anywhere in `text`.
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.find(text).is_some()
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.as_str()).finish()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

// ---------------------------------------------------------------------------
// Custom rules
// ---------------------------------------------------------------------------

/// Outcome of a caller-supplied rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomVerdict {
    Pass,
    /// Fails with the generic `custom` code.
    Fail,
    /// Fails with a caller-chosen error code.
    Code(String),
}

impl From<bool> for CustomVerdict {
    fn from(ok: bool) -> Self {
        if ok { Self::Pass } else { Self::Fail }
    }
}

impl From<&str> for CustomVerdict {
    fn from(code: &str) -> Self {
        Self::Code(code.to_string())
    }
}

impl From<String> for CustomVerdict {
    fn from(code: String) -> Self {
        Self::Code(code)
    }
}

type CustomFn = dyn Fn(&FieldValue) -> CustomVerdict + Send + Sync;

/// A caller-supplied predicate over the raw field value.
///
/// Panics inside the predicate are not caught; they unwind through
/// whichever store or controller operation triggered validation.
#[derive(Clone)]
pub struct CustomRule(Arc<CustomFn>);

impl CustomRule {
    /// Wrap a predicate returning anything convertible to a [`CustomVerdict`]
    /// (`bool`, `&str`, `String`).
    pub fn new<F, R>(f: F) -> Self
    where
        F: Fn(&FieldValue) -> R + Send + Sync + 'static,
        R: Into<CustomVerdict>,
    {
        Self(Arc::new(move |value| f(value).into()))
    }

    /// Run the predicate.
    #[must_use]
    pub fn check(&self, value: &FieldValue) -> CustomVerdict {
        (self.0)(value)
    }
}

impl fmt::Debug for CustomRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomRule(..)")
    }
}

impl PartialEq for CustomRule {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// The rule set bound to a field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rules {
    pub required: bool,
    pub max_length: Option<usize>,
    pub min_length: Option<usize>,
    pub pattern: Option<Pattern>,
    pub custom: Option<CustomRule>,
}

impl Rules {
    /// An empty rule set (every value is valid).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the required flag.
    #[must_use]
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Limit text to at most `max` characters.
    #[must_use]
    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    /// Require text to have at least `min` characters.
    #[must_use]
    pub fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    /// Compile and attach a pattern.
    pub fn pattern(self, source: &str) -> RuleResult<Self> {
        Ok(self.with_pattern(Pattern::new(source)?))
    }

    /// Attach an already compiled pattern.
    #[must_use]
    pub fn with_pattern(mut self, pattern: Pattern) -> Self {
        self.pattern = Some(pattern);
        self
    }

    /// Attach a custom predicate.
    #[must_use]
    pub fn custom<F, R>(mut self, f: F) -> Self
    where
        F: Fn(&FieldValue) -> R + Send + Sync + 'static,
        R: Into<CustomVerdict>,
    {
        self.custom = Some(CustomRule::new(f));
        self
    }

    /// Attach an existing custom rule (shares the predicate).
    #[must_use]
    pub fn with_custom(mut self, rule: CustomRule) -> Self {
        self.custom = Some(rule);
        self
    }

    /// Returns `true` when no rule is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.required
            && self.max_length.is_none()
            && self.min_length.is_none()
            && self.pattern.is_none()
            && self.custom.is_none()
    }
}
