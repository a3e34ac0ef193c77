#![forbid(unsafe_code)]

//! Headless input adapters.
//!
//! An [`InputProps`] describes one HTML-style input. Mounting it registers
//! the field with a store and yields a [`MountedInput`], which turns
//! [`InputEvent`]s into store operations according to the input's kind.
//!
//! | Kind | Default | Rules | Events |
//! |------|---------|-------|--------|
//! | text | value or `""` | all | `Changed` |
//! | numeric | parsed value or null | required, pattern, custom | `Changed`, `Blur` |
//! | radio | option value when checked, else null | required, custom | `Checked` |
//! | checkbox | checked flag | required, custom | `Checked` |
//! | file | empty list | required, custom | `Files` |
//! | hidden | value or `""` | all | `Changed` |
//! | reset | not a field | none | `Click` |

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};

use formizer_core::{
    CustomRule, CustomVerdict, FieldKind, FieldValue, FileHandle, Pattern, RuleError, Rules,
};
use formizer_store::{
    FieldChange, FieldInit, FieldStore, ResetHook, SetHook, compose, reset_hook, set_hook,
};
use tracing::trace;

// ---------------------------------------------------------------------------
// InputError
// ---------------------------------------------------------------------------

/// Errors from building or mounting an input.
#[derive(Debug)]
pub enum InputError {
    /// The type string names no supported input.
    UnknownType(String),
    /// The declared rules could not be built.
    InvalidRules(RuleError),
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownType(ty) => write!(f, "unknown input type: {ty:?}"),
            Self::InvalidRules(err) => write!(f, "invalid input rules: {err}"),
        }
    }
}

impl std::error::Error for InputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::UnknownType(_) => None,
            Self::InvalidRules(err) => Some(err),
        }
    }
}

impl From<RuleError> for InputError {
    fn from(err: RuleError) -> Self {
        Self::InvalidRules(err)
    }
}

// ---------------------------------------------------------------------------
// InputType
// ---------------------------------------------------------------------------

/// The HTML `type` attribute values the adapters understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InputType {
    #[default]
    Text,
    Password,
    Email,
    Search,
    Tel,
    Url,
    Date,
    DatetimeLocal,
    Month,
    Week,
    Color,
    Time,
    Number,
    Range,
    Radio,
    Checkbox,
    File,
    Hidden,
    Reset,
}

impl InputType {
    pub const ALL: [Self; 19] = [
        Self::Text,
        Self::Password,
        Self::Email,
        Self::Search,
        Self::Tel,
        Self::Url,
        Self::Date,
        Self::DatetimeLocal,
        Self::Month,
        Self::Week,
        Self::Color,
        Self::Time,
        Self::Number,
        Self::Range,
        Self::Radio,
        Self::Checkbox,
        Self::File,
        Self::Hidden,
        Self::Reset,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Password => "password",
            Self::Email => "email",
            Self::Search => "search",
            Self::Tel => "tel",
            Self::Url => "url",
            Self::Date => "date",
            Self::DatetimeLocal => "datetime-local",
            Self::Month => "month",
            Self::Week => "week",
            Self::Color => "color",
            Self::Time => "time",
            Self::Number => "number",
            Self::Range => "range",
            Self::Radio => "radio",
            Self::Checkbox => "checkbox",
            Self::File => "file",
            Self::Hidden => "hidden",
            Self::Reset => "reset",
        }
    }

    /// The field kind this input registers, or `None` for a reset button.
    #[must_use]
    pub const fn kind(self) -> Option<FieldKind> {
        match self {
            Self::Text
            | Self::Password
            | Self::Email
            | Self::Search
            | Self::Tel
            | Self::Url
            | Self::Date
            | Self::DatetimeLocal
            | Self::Month
            | Self::Week
            | Self::Color
            | Self::Time => Some(FieldKind::Text),
            Self::Number | Self::Range => Some(FieldKind::Numeric),
            Self::Radio => Some(FieldKind::Radio),
            Self::Checkbox => Some(FieldKind::Checkbox),
            Self::File => Some(FieldKind::File),
            Self::Hidden => Some(FieldKind::Hidden),
            Self::Reset => None,
        }
    }
}

impl fmt::Display for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InputType {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|ty| ty.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| InputError::UnknownType(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// InputProps
// ---------------------------------------------------------------------------

/// Declared attributes of one input.
#[derive(Clone, Default)]
pub struct InputProps {
    pub name: String,
    pub input_type: InputType,
    /// Initial text, numeric source text, or radio option value.
    pub value: Option<String>,
    pub checked: bool,
    pub required: bool,
    pub max_length: Option<usize>,
    pub min_length: Option<usize>,
    pub pattern: Option<String>,
    pub custom: Option<CustomRule>,
    /// Caller hook run when the form resets, after the adapter's own.
    pub reset: Option<ResetHook>,
    /// Caller hook run when a value is pushed from outside, after the adapter's own.
    pub set: Option<SetHook>,
}

impl InputProps {
    pub fn new(name: impl Into<String>, input_type: InputType) -> Self {
        Self {
            name: name.into(),
            input_type,
            ..Self::default()
        }
    }

    /// Props from an HTML type string.
    pub fn parse(name: impl Into<String>, input_type: &str) -> Result<Self, InputError> {
        Ok(Self::new(name, input_type.parse()?))
    }

    #[must_use]
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    #[must_use]
    pub fn checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    #[must_use]
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    #[must_use]
    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    #[must_use]
    pub fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    /// Regex source; compiled when the input is mounted.
    #[must_use]
    pub fn pattern(mut self, source: impl Into<String>) -> Self {
        self.pattern = Some(source.into());
        self
    }

    #[must_use]
    pub fn custom<F, R>(mut self, f: F) -> Self
    where
        F: Fn(&FieldValue) -> R + Send + Sync + 'static,
        R: Into<CustomVerdict>,
    {
        self.custom = Some(CustomRule::new(f));
        self
    }

    /// Run `f` whenever the form resets. Repeated calls chain.
    #[must_use]
    pub fn on_reset(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.reset = compose(self.reset.take(), Some(reset_hook(f)));
        self
    }

    /// Run `f` with every externally set value. Repeated calls chain.
    #[must_use]
    pub fn on_set(mut self, f: impl Fn(&FieldValue) + Send + Sync + 'static) -> Self {
        self.set = compose(self.set.take(), Some(set_hook(f)));
        self
    }

    /// The rule set this input's kind supports. Unsupported props are dropped.
    pub fn rules(&self) -> Result<Rules, InputError> {
        let Some(kind) = self.input_type.kind() else {
            return Ok(Rules::new());
        };
        let mut rules = Rules::new().required(self.required);
        if let Some(custom) = &self.custom {
            rules = rules.with_custom(custom.clone());
        }
        let takes_pattern = matches!(
            kind,
            FieldKind::Text | FieldKind::Hidden | FieldKind::Numeric
        );
        if takes_pattern && let Some(source) = &self.pattern {
            rules = rules.with_pattern(Pattern::new(source)?);
        }
        if matches!(kind, FieldKind::Text | FieldKind::Hidden) {
            rules.max_length = self.max_length;
            rules.min_length = self.min_length;
        }
        Ok(rules)
    }

    /// The value the field starts at and resets to.
    #[must_use]
    pub fn default_value(&self) -> FieldValue {
        match self.input_type.kind() {
            Some(FieldKind::Text | FieldKind::Hidden) => {
                FieldValue::Text(self.value.clone().unwrap_or_default())
            }
            Some(FieldKind::Numeric) => self.value.as_deref().map_or(FieldValue::Null, parse_number),
            Some(FieldKind::Radio) if self.checked => {
                self.value.clone().map_or(FieldValue::Null, FieldValue::Text)
            }
            Some(FieldKind::Checkbox) => FieldValue::Bool(self.checked),
            Some(FieldKind::File) => FieldValue::Files(Vec::new()),
            Some(FieldKind::Radio) | None => FieldValue::Null,
        }
    }

    /// Register with `store` and return the live adapter.
    ///
    /// Text-like inputs get reset and set hooks that keep their display
    /// string in step with the store; caller hooks run after those. Hidden
    /// inputs validate immediately.
    pub fn mount(self, store: &FieldStore) -> Result<MountedInput, InputError> {
        let rules = self.rules()?;
        let default_value = self.default_value();
        let display = Arc::new(Mutex::new(display_of(&default_value)));

        if let Some(kind) = self.input_type.kind() {
            let mut init = FieldInit::new(kind, default_value.clone()).rules(rules);
            if matches!(kind, FieldKind::Text | FieldKind::Numeric | FieldKind::Hidden) {
                let on_reset = Arc::clone(&display);
                let reset_to = display_of(&default_value);
                let on_set = Arc::clone(&display);
                init = init
                    .on_reset(move || set_display(&on_reset, reset_to.clone()))
                    .on_set(move |value| set_display(&on_set, display_of(value)));
            }
            init.reset = compose(init.reset, self.reset.clone());
            init.set = compose(init.set, self.set.clone());
            store.initialize(self.name.clone(), init);
            if kind == FieldKind::Hidden {
                store.update_value(&self.name, default_value);
            }
        }

        Ok(MountedInput {
            props: self,
            store: store.clone(),
            display,
        })
    }
}

impl fmt::Debug for InputProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputProps")
            .field("name", &self.name)
            .field("input_type", &self.input_type)
            .field("value", &self.value)
            .field("checked", &self.checked)
            .field("required", &self.required)
            .field("max_length", &self.max_length)
            .field("min_length", &self.min_length)
            .field("pattern", &self.pattern)
            .field("custom", &self.custom)
            .field("reset", &self.reset.is_some())
            .field("set", &self.set.is_some())
            .finish()
    }
}

/// Number from the longest numeric prefix of `raw`.
///
/// Leading whitespace is skipped, trailing garbage ignored, and `Infinity`
/// is the only spelled-out value. No numeric prefix gives null.
fn parse_number(raw: &str) -> FieldValue {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let digits = |from: usize| bytes[from..].iter().take_while(|b| b.is_ascii_digit()).count();

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    if s[end..].starts_with("Infinity") {
        let n = if s.starts_with('-') { f64::NEG_INFINITY } else { f64::INFINITY };
        return FieldValue::Number(n);
    }

    let int = digits(end);
    end += int;
    let mut frac = 0;
    if bytes.get(end) == Some(&b'.') {
        frac = digits(end + 1);
        if int > 0 || frac > 0 {
            end += 1 + frac;
        }
    }
    if int == 0 && frac == 0 {
        return FieldValue::Null;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let n = digits(exp);
        if n > 0 {
            end = exp + n;
        }
    }

    s[..end]
        .parse::<f64>()
        .map_or(FieldValue::Null, FieldValue::Number)
}

fn display_of(value: &FieldValue) -> String {
    match value {
        FieldValue::Text(s) => s.clone(),
        FieldValue::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

fn set_display(display: &Mutex<String>, text: String) {
    *display.lock().unwrap_or_else(PoisonError::into_inner) = text;
}

// ---------------------------------------------------------------------------
// InputEvent / MountedInput
// ---------------------------------------------------------------------------

/// What the host reports about an input.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// New raw text (text, numeric, hidden).
    Changed(String),
    /// New checked state (checkbox, radio).
    Checked(bool),
    /// New file selection.
    Files(Vec<FileHandle>),
    /// Focus left the input.
    Blur,
    /// The input was clicked.
    Click,
}

/// A mounted input bound to its store.
pub struct MountedInput {
    props: InputProps,
    store: FieldStore,
    display: Arc<Mutex<String>>,
}

impl MountedInput {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.props.name
    }

    #[must_use]
    pub fn props(&self) -> &InputProps {
        &self.props
    }

    /// Apply an event. Returns the value change it caused, if any.
    pub fn handle(&self, event: InputEvent) -> Option<FieldChange> {
        let name = self.props.name.as_str();
        match (self.props.input_type.kind(), event) {
            (Some(FieldKind::Text | FieldKind::Hidden), InputEvent::Changed(raw)) => {
                set_display(&self.display, raw.clone());
                self.store.update_value(name, FieldValue::Text(raw))
            }
            (Some(FieldKind::Numeric), InputEvent::Changed(raw)) => {
                let value = parse_number(&raw);
                set_display(&self.display, raw);
                self.store.update_value(name, value)
            }
            (Some(FieldKind::Numeric), InputEvent::Blur) => {
                self.store.recompute_all_errors();
                None
            }
            (Some(FieldKind::Checkbox), InputEvent::Checked(checked)) => {
                self.store.update_value(name, FieldValue::Bool(checked))
            }
            (Some(FieldKind::Radio), InputEvent::Checked(true)) => {
                let option = self.props.value.clone().map_or(FieldValue::Null, FieldValue::Text);
                self.store.update_value(name, option)
            }
            (Some(FieldKind::File), InputEvent::Files(files)) => {
                self.store.update_value(name, FieldValue::Files(files))
            }
            (None, InputEvent::Click) => {
                self.store.reset_all();
                None
            }
            (_, event) => {
                trace!(field = %name, input = %self.props.input_type, ?event, "input event ignored");
                None
            }
        }
    }

    /// Whether the control renders as checked.
    ///
    /// A radio is checked when the group's value equals its option value.
    #[must_use]
    pub fn is_checked(&self) -> bool {
        let current = self.store.value(&self.props.name);
        match self.props.input_type.kind() {
            Some(FieldKind::Checkbox) => current == Some(FieldValue::Bool(true)),
            Some(FieldKind::Radio) => match (&self.props.value, current) {
                (Some(option), Some(FieldValue::Text(selected))) => *option == selected,
                _ => false,
            },
            _ => false,
        }
    }

    /// The text the control shows.
    #[must_use]
    pub fn display(&self) -> String {
        match self.props.input_type.kind() {
            Some(FieldKind::Radio) => self.props.value.clone().unwrap_or_default(),
            _ => self
                .display
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
        }
    }
}

impl fmt::Debug for MountedInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MountedInput")
            .field("name", &self.props.name)
            .field("type", &self.props.input_type)
            .field("display", &self.display())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formizer_core::ErrorCode;

    #[test]
    fn type_strings_parse() {
        for ty in InputType::ALL {
            assert_eq!(ty.as_str().parse::<InputType>().unwrap(), ty);
        }
        assert_eq!("EMAIL".parse::<InputType>().unwrap(), InputType::Email);
        assert!(matches!(
            "button".parse::<InputType>(),
            Err(InputError::UnknownType(t)) if t == "button"
        ));
    }

    #[test]
    fn kinds_follow_type() {
        assert_eq!(InputType::Password.kind(), Some(FieldKind::Text));
        assert_eq!(InputType::Range.kind(), Some(FieldKind::Numeric));
        assert_eq!(InputType::Reset.kind(), None);
    }

    #[test]
    fn rules_are_filtered_per_kind() {
        let full = |ty| {
            InputProps::new("f", ty)
                .required(true)
                .max_length(3)
                .min_length(1)
                .pattern("^a")
                .rules()
                .unwrap()
        };
        let text = full(InputType::Text);
        assert_eq!((text.max_length, text.min_length), (Some(3), Some(1)));
        assert!(text.pattern.is_some());

        let numeric = full(InputType::Number);
        assert!(numeric.required && numeric.pattern.is_some());
        assert_eq!((numeric.max_length, numeric.min_length), (None, None));

        let checkbox = full(InputType::Checkbox);
        assert!(checkbox.required && checkbox.pattern.is_none());
        assert_eq!(checkbox.max_length, None);
    }

    #[test]
    fn bad_pattern_fails_mount() {
        let store = FieldStore::new();
        let err = InputProps::new("x", InputType::Text)
            .pattern("(")
            .mount(&store)
            .unwrap_err();
        assert!(matches!(err, InputError::InvalidRules(_)));
        assert!(!store.contains("x"));
    }

    #[test]
    fn defaults_per_kind() {
        let d = |p: InputProps| p.default_value();
        assert_eq!(d(InputProps::new("t", InputType::Text)), FieldValue::from(""));
        assert_eq!(d(InputProps::new("n", InputType::Number).value("4.5")), FieldValue::Number(4.5));
        assert_eq!(d(InputProps::new("n", InputType::Number).value("x")), FieldValue::Null);
        assert_eq!(d(InputProps::new("r", InputType::Radio).value("A")), FieldValue::Null);
        assert_eq!(
            d(InputProps::new("r", InputType::Radio).value("A").checked(true)),
            FieldValue::from("A")
        );
        assert_eq!(d(InputProps::new("c", InputType::Checkbox)), FieldValue::Bool(false));
        assert_eq!(d(InputProps::new("f", InputType::File)), FieldValue::Files(vec![]));
    }

    #[test]
    fn numeric_change_parses_and_blur_recomputes() {
        let store = FieldStore::new();
        let age = InputProps::new("age", InputType::Number)
            .required(true)
            .mount(&store)
            .unwrap();

        let change = age.handle(InputEvent::Changed("12".into())).unwrap();
        assert_eq!(change.value, FieldValue::Number(12.0));
        assert_eq!(age.display(), "12");

        let change = age.handle(InputEvent::Changed("".into())).unwrap();
        assert_eq!(change.value, FieldValue::Null);
        assert_eq!(change.errors, [ErrorCode::REQUIRED]);

        store.update_errors("age", vec![]);
        assert!(age.handle(InputEvent::Blur).is_none());
        assert_eq!(store.errors("age").unwrap(), ["required"]);
    }

    #[test]
    fn mismatched_events_are_ignored() {
        let store = FieldStore::new();
        let tos = InputProps::new("tos", InputType::Checkbox).mount(&store).unwrap();
        assert!(tos.handle(InputEvent::Changed("on".into())).is_none());
        assert!(tos.handle(InputEvent::Click).is_none());
        assert_eq!(store.value("tos"), Some(FieldValue::Bool(false)));
    }

    #[test]
    fn set_and_reset_hooks_track_display() {
        let store = FieldStore::new();
        let input = InputProps::new("city", InputType::Text)
            .value("Oslo")
            .mount(&store)
            .unwrap();
        assert_eq!(input.display(), "Oslo");

        store.set_value("city", "Bergen".into());
        assert_eq!(input.display(), "Bergen");

        store.reset_all();
        assert_eq!(input.display(), "Oslo");
    }

    #[test]
    fn hidden_input_validates_on_mount() {
        let store = FieldStore::new();
        InputProps::new("token", InputType::Hidden)
            .required(true)
            .mount(&store)
            .unwrap();
        assert_eq!(store.errors("token").unwrap(), ["required"]);
    }

    #[test]
    fn numbers_parse_from_leading_prefix() {
        let cases = [
            ("12px", FieldValue::Number(12.0)),
            ("  -3.5e2kg", FieldValue::Number(-350.0)),
            (".5", FieldValue::Number(0.5)),
            ("7.", FieldValue::Number(7.0)),
            ("1e", FieldValue::Number(1.0)),
            ("Infinity", FieldValue::Number(f64::INFINITY)),
            ("-Infinity", FieldValue::Number(f64::NEG_INFINITY)),
            ("inf", FieldValue::Null),
            ("infinity", FieldValue::Null),
            ("NaN", FieldValue::Null),
            ("px12", FieldValue::Null),
            ("-", FieldValue::Null),
            (".", FieldValue::Null),
            ("", FieldValue::Null),
        ];
        for (raw, expected) in cases {
            assert_eq!(parse_number(raw), expected, "{raw:?}");
        }
    }

    #[test]
    fn numeric_change_keeps_raw_display() {
        let store = FieldStore::new();
        let width = InputProps::new("width", InputType::Number).mount(&store).unwrap();
        let change = width.handle(InputEvent::Changed("12px".into())).unwrap();
        assert_eq!(change.value, FieldValue::Number(12.0));
        assert_eq!(width.display(), "12px");
    }

    #[test]
    fn caller_reset_hook_runs_after_adapter_hook() {
        let store = FieldStore::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let (first, second) = (Arc::clone(&log), Arc::clone(&log));
        let handle = store.clone();
        let token = InputProps::new("token", InputType::Hidden)
            .value("abc")
            .on_reset(move || {
                first.lock().unwrap().push(format!("reset:{:?}", handle.value("token")));
            })
            .on_reset(move || second.lock().unwrap().push("again".to_string()))
            .mount(&store)
            .unwrap();

        token.handle(InputEvent::Changed("xyz".into()));
        store.reset_all();

        assert_eq!(
            *log.lock().unwrap(),
            [r#"reset:Some(Text("xyz"))"#, "again"]
        );
        assert_eq!(token.display(), "abc");
        assert_eq!(store.value("token"), Some(FieldValue::from("abc")));
    }

    #[test]
    fn caller_set_hook_sees_external_values() {
        let store = FieldStore::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = Arc::clone(&seen);
        let tos = InputProps::new("tos", InputType::Checkbox)
            .on_set(move |v| s.lock().unwrap().push(v.clone()))
            .mount(&store)
            .unwrap();

        store.set_value("tos", true.into());
        assert_eq!(*seen.lock().unwrap(), [FieldValue::Bool(true)]);
        assert!(tos.is_checked());
    }

    #[test]
    fn numeric_blur_revalidates_the_whole_form() {
        let store = FieldStore::new();
        let age = InputProps::new("age", InputType::Number).mount(&store).unwrap();
        InputProps::new("name", InputType::Text)
            .required(true)
            .mount(&store)
            .unwrap();
        assert!(store.errors("name").unwrap().is_empty());

        age.handle(InputEvent::Blur);
        assert_eq!(store.errors("name").unwrap(), ["required"]);
    }
}
