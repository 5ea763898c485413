#![forbid(unsafe_code)]

//! Version-tracked shared values with change notification.
//!
//! An [`Observable<T>`] is a cheap-to-clone handle to a single value. Every
//! clone observes the same value. Mutations that change the value bump the
//! version and notify subscribers in registration order.
//!
//! Subscribers are held as `Weak` callbacks; the strong reference lives in the
//! [`Subscription`] returned by [`Observable::subscribe`], so dropping the
//! subscription disconnects the callback. Dead entries are pruned on the next
//! mutation.
//!
//! Notification happens after the internal borrow is released, so callbacks
//! may freely read or even mutate the observable they are subscribed to.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

type Callback<T> = dyn Fn(&T);

struct ObservableInner<T> {
    value: T,
    version: u64,
    subscribers: Vec<Weak<Callback<T>>>,
}

/// A shared, version-tracked value.
pub struct Observable<T> {
    inner: Rc<RefCell<ObservableInner<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Observable")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    /// Create an observable holding `value` at version 0.
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ObservableInner {
                value,
                version: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Clone out the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Borrow the current value for the duration of `f`.
    ///
    /// `f` must not mutate this observable.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// Replace the value. Equal values are a no-op.
    pub fn set(&self, value: T) {
        let notify = {
            let mut inner = self.inner.borrow_mut();
            if inner.value == value {
                return;
            }
            inner.value = value;
            inner.version += 1;
            inner.subscribers.retain(|weak| weak.strong_count() > 0);
            let callbacks: Vec<Rc<Callback<T>>> =
                inner.subscribers.iter().filter_map(Weak::upgrade).collect();
            (inner.value.clone(), callbacks)
        };
        let (snapshot, callbacks) = notify;
        for callback in callbacks {
            callback(&snapshot);
        }
    }

    /// Mutate the value in place; notifies only if the result differs.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let mut next = self.get();
        f(&mut next);
        self.set(next);
    }

    /// Number of value-changing mutations so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Register `callback` to run after every change.
    #[must_use = "dropping the subscription disconnects the callback"]
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let callback: Rc<Callback<T>> = Rc::new(callback);
        self.inner
            .borrow_mut()
            .subscribers
            .push(Rc::downgrade(&callback));
        Subscription {
            _callback: Box::new(callback),
        }
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .borrow()
            .subscribers
            .iter()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }
}

/// RAII guard for an [`Observable`] subscription.
///
/// The callback stays connected exactly as long as this guard is alive.
#[must_use = "dropping the subscription disconnects the callback"]
pub struct Subscription {
    _callback: Box<dyn Any>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn set_bumps_version_once_per_change() {
        let obs = Observable::new(1);
        assert_eq!(obs.version(), 0);
        obs.set(2);
        assert_eq!(obs.version(), 1);
        obs.set(2);
        assert_eq!(obs.version(), 1);
        assert_eq!(obs.get(), 2);
    }

    #[test]
    fn subscribers_run_in_registration_order() {
        let obs = Observable::new(0);
        let log = Rc::new(RefCell::new(Vec::new()));
        let first = {
            let log = Rc::clone(&log);
            obs.subscribe(move |v| log.borrow_mut().push(("first", *v)))
        };
        let second = {
            let log = Rc::clone(&log);
            obs.subscribe(move |v| log.borrow_mut().push(("second", *v)))
        };
        obs.set(5);
        assert_eq!(*log.borrow(), vec![("first", 5), ("second", 5)]);
        drop((first, second));
    }

    #[test]
    fn dropped_subscription_stops_notifications() {
        let obs = Observable::new(false);
        let hits = Rc::new(Cell::new(0));
        let sub = {
            let hits = Rc::clone(&hits);
            obs.subscribe(move |_| hits.set(hits.get() + 1))
        };
        obs.set(true);
        assert_eq!(obs.subscriber_count(), 1);
        drop(sub);
        obs.set(false);
        assert_eq!(hits.get(), 1);
        assert_eq!(obs.subscriber_count(), 0);
    }

    #[test]
    fn callbacks_may_read_and_write_the_source() {
        let obs = Observable::new(0);
        let reader = obs.clone();
        let _sub = obs.subscribe(move |v| {
            assert_eq!(reader.get(), *v);
            if *v < 3 {
                reader.set(*v + 1);
            }
        });
        obs.set(1);
        assert_eq!(obs.get(), 3);
    }

    #[test]
    fn update_equal_value_is_noop() {
        let obs = Observable::new(String::from("a"));
        obs.update(|s| s.push('b'));
        assert_eq!(obs.get(), "ab");
        let v = obs.version();
        obs.update(|_| {});
        assert_eq!(obs.version(), v);
    }
}
