#![forbid(unsafe_code)]

//! Lifecycle hooks and their composition.
//!
//! Several physical inputs can register under one name (radio options).
//! Each registration may bring its own reset and set hooks; the store keeps
//! all of them by chaining old-then-new with [`compose`].

use std::sync::Arc;

use formizer_core::FieldValue;

/// Restores adapter-local display state to the field default.
pub type ResetHook = Arc<dyn Fn() + Send + Sync>;

/// Pushes an externally set value into adapter-local display state.
pub type SetHook = Arc<dyn Fn(&FieldValue) + Send + Sync>;

/// Wrap a closure as a [`ResetHook`].
pub fn reset_hook(f: impl Fn() + Send + Sync + 'static) -> ResetHook {
    Arc::new(f)
}

/// Wrap a closure as a [`SetHook`].
pub fn set_hook(f: impl Fn(&FieldValue) + Send + Sync + 'static) -> SetHook {
    Arc::new(f)
}

/// Sequential composition of two callbacks of the same shape.
pub trait Chain: Sized {
    /// A callback that runs `self`, then `next`, with the same arguments.
    fn chain(self, next: Self) -> Self;
}

impl Chain for ResetHook {
    fn chain(self, next: Self) -> Self {
        let first = self;
        Arc::new(move || {
            first();
            next();
        })
    }
}

impl Chain for SetHook {
    fn chain(self, next: Self) -> Self {
        let first = self;
        Arc::new(move |value: &FieldValue| {
            first(value);
            next(value);
        })
    }
}

/// Merge an existing hook with an incoming one.
///
/// Both present: chained, existing first. One present: that one.
pub fn compose<H: Chain>(existing: Option<H>, incoming: Option<H>) -> Option<H> {
    match (existing, incoming) {
        (Some(old), Some(new)) => Some(old.chain(new)),
        (old, None) => old,
        (None, new) => new,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(&str) -> ResetHook) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let make = {
            let log = Arc::clone(&log);
            move |tag: &str| {
                let log = Arc::clone(&log);
                let tag = tag.to_string();
                reset_hook(move || log.lock().unwrap().push(tag.clone()))
            }
        };
        (log, make)
    }

    #[test]
    fn compose_runs_existing_then_incoming() {
        let (log, make) = recorder();
        let hook = compose(Some(make("a")), Some(make("b"))).unwrap();
        hook();
        assert_eq!(*log.lock().unwrap(), ["a", "b"]);
    }

    #[test]
    fn compose_keeps_single_side() {
        let (log, make) = recorder();
        compose(Some(make("old")), None).unwrap()();
        compose(None, Some(make("new"))).unwrap()();
        assert!(compose::<ResetHook>(None, None).is_none());
        assert_eq!(*log.lock().unwrap(), ["old", "new"]);
    }

    #[test]
    fn repeated_composition_preserves_order() {
        let (log, make) = recorder();
        let mut hook = None;
        for tag in ["1", "2", "3"] {
            hook = compose(hook, Some(make(tag)));
        }
        hook.unwrap()();
        assert_eq!(*log.lock().unwrap(), ["1", "2", "3"]);
    }

    #[test]
    fn set_hooks_receive_the_same_value() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let a = {
            let seen = Arc::clone(&seen);
            set_hook(move |v| seen.lock().unwrap().push(("a", v.clone())))
        };
        let b = {
            let seen = Arc::clone(&seen);
            set_hook(move |v| seen.lock().unwrap().push(("b", v.clone())))
        };
        compose(Some(a), Some(b)).unwrap()(&FieldValue::from("x"));
        assert_eq!(
            *seen.lock().unwrap(),
            [("a", FieldValue::from("x")), ("b", FieldValue::from("x"))]
        );
    }
}
