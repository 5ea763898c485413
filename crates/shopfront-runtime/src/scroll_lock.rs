#![forbid(unsafe_code)]

//! Document-wide scroll lock.
//!
//! While any overlay is shown the page behind it must not scroll. The lock is
//! a reference count: every holder owns a [`ScrollLockGuard`], the first
//! acquisition sets the body overflow to [`Overflow::Hidden`], and releasing
//! the last guard restores [`Overflow::Unset`]. A single overlay is the
//! count-of-one case; several overlays open at once compose without one of
//! them unlocking the page underneath the others.
//!
//! The body overflow is published as an [`Observable`] so the page layer can
//! react to it.
//!
//! # Invariants
//!
//! 1. `overflow() == Hidden` if and only if `holders() > 0`.
//! 2. Each guard releases exactly once, on drop.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::reactive::{Observable, Subscription};

/// The body's overflow style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Overflow {
    /// Normal scrolling.
    #[default]
    Unset,
    /// Scrolling disabled.
    Hidden,
}

impl Overflow {
    /// CSS keyword for this value.
    pub const fn as_css(self) -> &'static str {
        match self {
            Self::Unset => "unset",
            Self::Hidden => "hidden",
        }
    }
}

impl fmt::Display for Overflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_css())
    }
}

struct LockState {
    holders: Cell<usize>,
    overflow: Observable<Overflow>,
}

thread_local! {
    static GLOBAL_LOCK: ScrollLock = ScrollLock::new();
}

/// Reference-counted scroll lock. Clones share the same count.
#[derive(Clone)]
pub struct ScrollLock {
    state: Rc<LockState>,
}

impl fmt::Debug for ScrollLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollLock")
            .field("holders", &self.state.holders.get())
            .field("overflow", &self.state.overflow.get())
            .finish()
    }
}

impl Default for ScrollLock {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrollLock {
    /// An unlocked, independent lock.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Rc::new(LockState {
                holders: Cell::new(0),
                overflow: Observable::new(Overflow::Unset),
            }),
        }
    }

    /// The document's lock (thread-local).
    #[must_use]
    pub fn global() -> Self {
        GLOBAL_LOCK.with(Clone::clone)
    }

    /// Take a hold on the lock. Scrolling stays disabled while the guard lives.
    #[must_use = "dropping the guard releases the scroll lock"]
    pub fn acquire(&self) -> ScrollLockGuard {
        let holders = self.state.holders.get() + 1;
        self.state.holders.set(holders);
        if holders == 1 {
            tracing::debug!("scroll lock engaged");
            self.state.overflow.set(Overflow::Hidden);
        } else {
            tracing::trace!(holders, "scroll lock shared");
        }
        ScrollLockGuard {
            state: Rc::clone(&self.state),
        }
    }

    #[must_use]
    pub fn holders(&self) -> usize {
        self.state.holders.get()
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.holders() > 0
    }

    /// Current body overflow.
    #[must_use]
    pub fn overflow(&self) -> Overflow {
        self.state.overflow.get()
    }

    /// Observe body overflow changes.
    pub fn subscribe(&self, callback: impl Fn(&Overflow) + 'static) -> Subscription {
        self.state.overflow.subscribe(callback)
    }
}

/// One hold on a [`ScrollLock`].
#[must_use = "dropping the guard releases the scroll lock"]
pub struct ScrollLockGuard {
    state: Rc<LockState>,
}

impl fmt::Debug for ScrollLockGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollLockGuard")
            .field("holders", &self.state.holders.get())
            .finish()
    }
}

impl Drop for ScrollLockGuard {
    fn drop(&mut self) {
        let holders = self.state.holders.get().saturating_sub(1);
        self.state.holders.set(holders);
        if holders == 0 {
            tracing::debug!("scroll lock released");
            self.state.overflow.set(Overflow::Unset);
        } else {
            tracing::trace!(holders, "scroll lock still held");
        }
    }
}
