#![forbid(unsafe_code)]

//! Read bindings over [`Observable`] values and scoped subscription ownership.
//!
//! A [`Binding<T>`] evaluates lazily on each `get()`, so it never returns a
//! stale value. Overlay widgets use [`bind_mapped2`] to derive their visual
//! phase from the logical-visibility and mount-state signals without copying
//! either.
//!
//! [`BindingScope`] owns the subscriptions a component makes; dropping the
//! scope disconnects every callback it holds.
//!
//! # Invariants
//!
//! 1. `Binding::get()` always reflects the current source values.
//! 2. After a `BindingScope` is dropped or cleared, none of its callbacks fire.

use std::rc::Rc;

use super::observable::{Observable, Subscription};

/// A read-only, lazily evaluated view of one or more observables.
pub struct Binding<T> {
    eval: Rc<dyn Fn() -> T>,
}

impl<T> Clone for Binding<T> {
    fn clone(&self) -> Self {
        Self {
            eval: Rc::clone(&self.eval),
        }
    }
}

impl<T: std::fmt::Debug + 'static> std::fmt::Debug for Binding<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("value", &self.get())
            .finish()
    }
}

impl<T: 'static> Binding<T> {
    /// Create a binding that evaluates `f` on each `get()` call.
    pub fn new(f: impl Fn() -> T + 'static) -> Self {
        Self { eval: Rc::new(f) }
    }

    /// Get the current bound value.
    #[must_use]
    pub fn get(&self) -> T {
        (self.eval)()
    }

    /// Apply a further transform, returning a new `Binding`.
    pub fn then<U: 'static>(self, f: impl Fn(T) -> U + 'static) -> Binding<U> {
        Binding {
            eval: Rc::new(move || f((self.eval)())),
        }
    }
}

/// Identity binding to an observable.
pub fn bind_observable<T: Clone + PartialEq + 'static>(source: &Observable<T>) -> Binding<T> {
    let src = source.clone();
    Binding::new(move || src.get())
}

/// `source` transformed by `map`.
pub fn bind_mapped<S: Clone + PartialEq + 'static, T: 'static>(
    source: &Observable<S>,
    map: impl Fn(&S) -> T + 'static,
) -> Binding<T> {
    let src = source.clone();
    Binding::new(move || src.with(|v| map(v)))
}

/// Two observables combined by `map`.
pub fn bind_mapped2<
    S1: Clone + PartialEq + 'static,
    S2: Clone + PartialEq + 'static,
    T: 'static,
>(
    s1: &Observable<S1>,
    s2: &Observable<S2>,
    map: impl Fn(&S1, &S2) -> T + 'static,
) -> Binding<T> {
    let src1 = s1.clone();
    let src2 = s2.clone();
    Binding::new(move || src1.with(|v1| src2.with(|v2| map(v1, v2))))
}

/// Owns the subscriptions made on behalf of one component.
pub struct BindingScope {
    subscriptions: Vec<Subscription>,
}

impl BindingScope {
    #[must_use]
    pub fn new() -> Self {
        Self {
            subscriptions: Vec::new(),
        }
    }

    /// Keep `sub` alive until the scope is dropped or cleared.
    pub fn hold(&mut self, sub: Subscription) {
        self.subscriptions.push(sub);
    }

    /// Subscribe to `source` for the lifetime of this scope.
    pub fn subscribe<T: Clone + PartialEq + 'static>(
        &mut self,
        source: &Observable<T>,
        callback: impl Fn(&T) + 'static,
    ) -> &mut Self {
        let sub = source.subscribe(callback);
        self.subscriptions.push(sub);
        self
    }

    #[must_use]
    pub fn binding_count(&self) -> usize {
        self.subscriptions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Release every subscription now; the scope stays usable.
    pub fn clear(&mut self) {
        // Drop in reverse registration order.
        while self.subscriptions.pop().is_some() {}
    }
}

impl Default for BindingScope {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for BindingScope {
    fn drop(&mut self) {
        self.clear();
    }
}

impl std::fmt::Debug for BindingScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BindingScope")
            .field("binding_count", &self.subscriptions.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn binding_tracks_source() {
        let obs = Observable::new(42);
        let b = bind_observable(&obs);
        assert_eq!(b.get(), 42);
        obs.set(100);
        assert_eq!(b.get(), 100);
    }

    #[test]
    fn mapped_binding() {
        let count = Observable::new(3);
        let label = bind_mapped(&count, |c| format!("items: {c}"));
        assert_eq!(label.get(), "items: 3");
        count.set(7);
        assert_eq!(label.get(), "items: 7");
    }

    #[test]
    fn mapped2_combines_signals() {
        let visible = Observable::new(false);
        let mounted = Observable::new(false);
        let exiting = bind_mapped2(&visible, &mounted, |v, m| !*v && *m);
        assert!(!exiting.get());
        mounted.set(true);
        assert!(exiting.get());
        visible.set(true);
        assert!(!exiting.get());
    }

    #[test]
    fn then_chains() {
        let obs = Observable::new(5);
        let doubled = bind_observable(&obs).then(|v| v * 2);
        assert_eq!(doubled.get(), 10);
    }

    #[test]
    fn scope_drop_releases_subscriptions() {
        let obs = Observable::new(0);
        let seen = Rc::new(Cell::new(0));
        {
            let mut scope = BindingScope::new();
            let s = Rc::clone(&seen);
            scope.subscribe(&obs, move |v| s.set(*v));
            obs.set(1);
            assert_eq!(seen.get(), 1);
        }
        obs.set(99);
        assert_eq!(seen.get(), 1, "callback should not fire after scope dropped");
    }

    #[test]
    fn scope_clear_and_reuse() {
        let obs = Observable::new(0);
        let mut scope = BindingScope::new();
        let first = Rc::new(Cell::new(false));
        let f = Rc::clone(&first);
        scope.subscribe(&obs, move |_| f.set(true));
        scope.clear();
        assert!(scope.is_empty());

        let second = Rc::new(Cell::new(false));
        let s = Rc::clone(&second);
        scope.hold(obs.subscribe(move |_| s.set(true)));
        assert_eq!(scope.binding_count(), 1);

        obs.set(1);
        assert!(!first.get());
        assert!(second.get());
    }
}
