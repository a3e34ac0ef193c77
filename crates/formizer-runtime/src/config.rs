#![forbid(unsafe_code)]

//! Form-level configuration.

/// Flags recognized by the form orchestration.
///
/// With the `serde` feature, missing keys fall back to [`Default`]:
///
/// ```ignore
/// let config: FormConfig = serde_json::from_str(r#"{"reset_on_submit": true}"#)?;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FormConfig {
    /// Reset every field after a successful submit.
    pub reset_on_submit: bool,
}

impl FormConfig {
    /// Default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether a successful submit resets the form.
    #[must_use]
    pub fn reset_on_submit(mut self, enabled: bool) -> Self {
        self.reset_on_submit = enabled;
        self
    }
}
