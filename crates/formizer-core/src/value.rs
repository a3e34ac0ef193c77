#![forbid(unsafe_code)]

//! Field values and input categories.

use std::fmt;

// ---------------------------------------------------------------------------
// FieldKind
// ---------------------------------------------------------------------------

/// The input category a field was registered with.
///
/// The store is agnostic to the kind except for radio-group default merging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum FieldKind {
    /// Free text (text, password, email, date, ...).
    Text,
    /// Numeric input (number, range).
    Numeric,
    /// Boolean checkbox.
    Checkbox,
    /// One logical field shared by several radio options.
    Radio,
    /// Ordered list of selected files.
    File,
    /// Programmatic value not edited by the user.
    Hidden,
}

impl FieldKind {
    /// Stable lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Numeric => "numeric",
            Self::Checkbox => "checkbox",
            Self::Radio => "radio",
            Self::File => "file",
            Self::Hidden => "hidden",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// FileHandle
// ---------------------------------------------------------------------------

/// An opaque reference to a file picked by the user.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FileHandle {
    /// File name as reported by the host.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// MIME type, when known.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub mime: Option<String>,
}

impl FileHandle {
    /// Create a handle with no MIME type.
    #[must_use]
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
            mime: None,
        }
    }

    /// Attach a MIME type.
    #[must_use]
    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }
}

// ---------------------------------------------------------------------------
// FieldValue
// ---------------------------------------------------------------------------

/// The current value of a field.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum FieldValue {
    /// No value (unset radio group, unparsable number, ...).
    #[default]
    Null,
    Text(String),
    Number(f64),
    Bool(bool),
    Files(Vec<FileHandle>),
}

impl FieldValue {
    /// Returns `true` for [`FieldValue::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Borrow the text, if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Truthiness as host UIs understand it.
    ///
    /// Null, empty text, zero, NaN and `false` are falsy. A file list is
    /// truthy even when empty.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Text(s) => !s.is_empty(),
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::Bool(b) => *b,
            Self::Files(_) => true,
        }
    }

    /// Short name of the variant, used in conversion errors and logs.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Text(_) => "text",
            Self::Number(_) => "number",
            Self::Bool(_) => "bool",
            Self::Files(_) => "files",
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Vec<FileHandle>> for FieldValue {
    fn from(value: Vec<FileHandle>) -> Self {
        Self::Files(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

// ---------------------------------------------------------------------------
// Typed conversions
// ---------------------------------------------------------------------------

/// A typed read found a value of a different shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValueError {
    /// What the caller asked for.
    pub expected: &'static str,
    /// What the field actually held.
    pub found: &'static str,
}

impl fmt::Display for FieldValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "expected a {} value, found {}",
            self.expected, self.found
        )
    }
}

impl std::error::Error for FieldValueError {}

macro_rules! impl_try_from_value {
    ($ty:ty, $variant:ident, $expected:literal) => {
        impl TryFrom<FieldValue> for $ty {
            type Error = FieldValueError;

            fn try_from(value: FieldValue) -> Result<Self, Self::Error> {
                match value {
                    FieldValue::$variant(inner) => Ok(inner),
                    other => Err(FieldValueError {
                        expected: $expected,
                        found: other.type_name(),
                    }),
                }
            }
        }
    };
}

impl_try_from_value!(String, Text, "text");
impl_try_from_value!(f64, Number, "number");
impl_try_from_value!(bool, Bool, "bool");
impl_try_from_value!(Vec<FileHandle>, Files, "files");
