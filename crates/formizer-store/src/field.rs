#![forbid(unsafe_code)]

//! One logical field and its registration payload.

use std::fmt;

use formizer_core::{ErrorCode, FieldKind, FieldValue, Rules};

use crate::hooks::{ResetHook, SetHook, compose, reset_hook, set_hook};

// ---------------------------------------------------------------------------
// FieldInit
// ---------------------------------------------------------------------------

/// What an input sends when it registers.
#[derive(Clone)]
pub struct FieldInit {
    pub kind: FieldKind,
    pub default_value: FieldValue,
    pub rules: Rules,
    pub reset: Option<ResetHook>,
    pub set: Option<SetHook>,
}

impl FieldInit {
    /// A registration with no rules and no hooks.
    pub fn new(kind: FieldKind, default_value: impl Into<FieldValue>) -> Self {
        Self {
            kind,
            default_value: default_value.into(),
            rules: Rules::default(),
            reset: None,
            set: None,
        }
    }

    #[must_use]
    pub fn rules(mut self, rules: Rules) -> Self {
        self.rules = rules;
        self
    }

    /// Attach a reset hook.
    #[must_use]
    pub fn on_reset(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.reset = Some(reset_hook(f));
        self
    }

    /// Attach a set hook.
    #[must_use]
    pub fn on_set(mut self, f: impl Fn(&FieldValue) + Send + Sync + 'static) -> Self {
        self.set = Some(set_hook(f));
        self
    }
}

impl fmt::Debug for FieldInit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldInit")
            .field("kind", &self.kind)
            .field("default_value", &self.default_value)
            .field("rules", &self.rules)
            .field("reset", &self.reset.is_some())
            .field("set", &self.set.is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// FieldChange
// ---------------------------------------------------------------------------

/// Payload of a per-field change event.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange {
    pub value: FieldValue,
    pub errors: Vec<ErrorCode>,
}

// ---------------------------------------------------------------------------
// Field
// ---------------------------------------------------------------------------

/// A field as held by the store.
#[derive(Clone)]
pub struct Field {
    pub(crate) kind: FieldKind,
    pub(crate) value: FieldValue,
    pub(crate) default_value: FieldValue,
    pub(crate) rules: Rules,
    pub(crate) errors: Vec<ErrorCode>,
    pub(crate) reset: Option<ResetHook>,
    pub(crate) set: Option<SetHook>,
}

impl Field {
    /// A fresh field: value starts at the default, no errors yet.
    pub(crate) fn from_init(init: FieldInit) -> Self {
        Self {
            kind: init.kind,
            value: init.default_value.clone(),
            default_value: init.default_value,
            rules: init.rules,
            errors: Vec::new(),
            reset: init.reset,
            set: init.set,
        }
    }

    /// Fold a repeated registration into this field.
    ///
    /// - rules: the first non-empty set wins
    /// - default: a truthy radio default is kept; otherwise the new one is
    ///   adopted, and an unset value follows it
    /// - hooks: chained, existing first
    ///
    /// Value and errors are never cleared.
    pub(crate) fn merge(&mut self, init: FieldInit) {
        if self.rules.is_empty() {
            self.rules = init.rules;
        }

        let keep_default = self.kind == FieldKind::Radio && self.default_value.is_truthy();
        if !keep_default {
            self.default_value = init.default_value;
            if self.value.is_null() {
                self.value = self.default_value.clone();
            }
        }

        self.reset = compose(self.reset.take(), init.reset);
        self.set = compose(self.set.take(), init.set);
    }

    #[must_use]
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    #[must_use]
    pub fn value(&self) -> &FieldValue {
        &self.value
    }

    #[must_use]
    pub fn default_value(&self) -> &FieldValue {
        &self.default_value
    }

    #[must_use]
    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    #[must_use]
    pub fn errors(&self) -> &[ErrorCode] {
        &self.errors
    }

    /// Returns `true` when the last recompute found no errors.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// The composite reset hook, if any input supplied one.
    #[must_use]
    pub fn reset_hook(&self) -> Option<&ResetHook> {
        self.reset.as_ref()
    }

    /// The composite set hook, if any input supplied one.
    #[must_use]
    pub fn set_hook(&self) -> Option<&SetHook> {
        self.set.as_ref()
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("kind", &self.kind)
            .field("value", &self.value)
            .field("default_value", &self.default_value)
            .field("rules", &self.rules)
            .field("errors", &self.errors)
            .field("reset", &self.reset.is_some())
            .field("set", &self.set.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn radio(default: Option<&str>) -> FieldInit {
        FieldInit::new(FieldKind::Radio, default)
    }

    #[test]
    fn fresh_field_starts_at_default() {
        let f = Field::from_init(FieldInit::new(FieldKind::Text, "hi"));
        assert_eq!(f.value(), &FieldValue::from("hi"));
        assert_eq!(f.default_value(), &FieldValue::from("hi"));
        assert!(f.errors().is_empty());
    }

    #[test]
    fn first_non_empty_rules_win() {
        let first = Rules::new().required(true);
        let mut f = Field::from_init(FieldInit::new(FieldKind::Text, "").rules(first.clone()));
        f.merge(FieldInit::new(FieldKind::Text, "").rules(Rules::new().max_length(1)));
        assert_eq!(f.rules(), &first);
    }

    #[test]
    fn empty_rules_adopt_later_ones() {
        let mut f = Field::from_init(radio(None));
        let later = Rules::new().required(true);
        f.merge(radio(None).rules(later.clone()));
        assert_eq!(f.rules(), &later);
    }

    #[test]
    fn checked_radio_default_survives_later_options() {
        let mut f = Field::from_init(radio(None));
        f.merge(radio(Some("B")));
        f.merge(radio(None));
        assert_eq!(f.default_value(), &FieldValue::from("B"));
        assert_eq!(f.value(), &FieldValue::from("B"));
    }

    #[test]
    fn non_radio_adopts_new_default_but_keeps_value() {
        let mut f = Field::from_init(FieldInit::new(FieldKind::Text, "one"));
        f.value = FieldValue::from("typed");
        f.merge(FieldInit::new(FieldKind::Text, "two"));
        assert_eq!(f.default_value(), &FieldValue::from("two"));
        assert_eq!(f.value(), &FieldValue::from("typed"));
    }

    #[test]
    fn merge_never_clears_errors() {
        let mut f = Field::from_init(FieldInit::new(FieldKind::Text, ""));
        f.errors = vec![ErrorCode::REQUIRED];
        f.merge(FieldInit::new(FieldKind::Text, ""));
        assert_eq!(f.errors(), [ErrorCode::REQUIRED]);
    }

    #[test]
    fn hooks_are_chained_on_merge() {
        let mut f = Field::from_init(radio(None).on_reset(|| {}));
        assert!(f.set_hook().is_none());
        f.merge(radio(None).on_set(|_| {}));
        assert!(f.reset_hook().is_some());
        assert!(f.set_hook().is_some());
    }
}
