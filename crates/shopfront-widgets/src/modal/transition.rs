#![forbid(unsafe_code)]

//! Mount/unmount timing for overlays with an exit animation.
//!
//! An overlay that animates out must stay in the tree after the caller hides
//! it, for as long as the animation runs. [`TransitionMountController`]
//! derives that "still mounted" signal from the caller's visibility:
//!
//! ```text
//!              visible = true
//!   Unmounted ─────────────────────▶ Entered
//!       ▲                             │  ▲
//!       │ exit timer fires            │  │ visible = true
//!       │                  visible =  │  │ (timer cancelled)
//!       │                  false      ▼  │
//!       └───────────────────────── Exiting
//! ```
//!
//! # Invariants
//!
//! 1. Mount state becomes true in the same call that observes `visible = true`.
//! 2. After `visible = false`, mount state stays true for exactly the
//!    transition duration, unless visibility returns first.
//! 3. At most one exit timer is live; scheduling a new one drops (and so
//!    cancels) the previous handle.
//! 4. Dropping the controller cancels the pending exit timer.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::time::Duration;

use shopfront_runtime::{Observable, TimerHandle, TimerQueue};

/// Where a controlled overlay is in its enter/exit cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransitionPhase {
    /// Not in the tree.
    #[default]
    Unmounted,
    /// Visible and mounted.
    Entered,
    /// Hidden by the caller, still mounted while the exit animation plays.
    Exiting,
}

impl TransitionPhase {
    /// Phase implied by the caller's visibility and the derived mount state.
    #[must_use]
    pub const fn from_signals(visible: bool, mounted: bool) -> Self {
        match (visible, mounted) {
            (_, false) => Self::Unmounted,
            (true, true) => Self::Entered,
            (false, true) => Self::Exiting,
        }
    }

    #[must_use]
    pub const fn is_mounted(self) -> bool {
        !matches!(self, Self::Unmounted)
    }
}

/// Derives an overlay's mount state from its visibility, lagging on exit.
///
/// All methods take `&self`; no internal borrow is held while the mount
/// signal notifies, so subscribers may call back into the controller.
pub struct TransitionMountController {
    timers: TimerQueue,
    duration: Duration,
    visible: Cell<bool>,
    mounted: Observable<bool>,
    pending: RefCell<Option<TimerHandle>>,
}

impl fmt::Debug for TransitionMountController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionMountController")
            .field("duration", &self.duration)
            .field("visible", &self.visible.get())
            .field("mounted", &self.mounted.get())
            .field("pending", &self.has_pending_exit())
            .finish()
    }
}

impl TransitionMountController {
    /// A controller that starts hidden and unmounted.
    ///
    /// The duration is fixed for the controller's lifetime.
    pub fn new(timers: &TimerQueue, duration: Duration) -> Self {
        Self {
            timers: timers.clone(),
            duration,
            visible: Cell::new(false),
            mounted: Observable::new(false),
            pending: RefCell::new(None),
        }
    }

    /// Feed the caller's current visibility; returns the mount state.
    ///
    /// Observing the value already seen is a no-op, so an exit delay in
    /// progress is neither restarted nor cancelled by a repeated `false`.
    pub fn observe(&self, visible: bool) -> bool {
        if visible == self.visible.get() {
            return self.mounted.get();
        }
        self.visible.set(visible);

        if visible {
            let previous = self.pending.borrow_mut().take();
            if previous.as_ref().is_some_and(TimerHandle::is_pending) {
                tracing::debug!("exit transition cancelled by re-entry");
            }
            drop(previous);
            if !self.mounted.get() {
                tracing::debug!("overlay mounted");
            }
            self.mounted.set(true);
        } else if self.mounted.get() {
            self.begin_exit();
        }
        self.mounted.get()
    }

    fn begin_exit(&self) {
        // Dropping the previous handle cancels any exit timer still pending.
        let previous = self.pending.borrow_mut().take();
        drop(previous);

        if self.duration.is_zero() {
            tracing::debug!("overlay unmounted");
            self.mounted.set(false);
            return;
        }

        tracing::debug!(duration_ms = self.duration.as_millis() as u64, "exit transition started");
        let mounted = self.mounted.clone();
        let handle = self.timers.schedule(self.duration, move || {
            tracing::debug!("overlay unmounted");
            mounted.set(false);
        });
        *self.pending.borrow_mut() = Some(handle);
    }

    /// Derived mount state.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted.get()
    }

    /// Last visibility observed.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible.get()
    }

    #[must_use]
    pub fn phase(&self) -> TransitionPhase {
        TransitionPhase::from_signals(self.visible.get(), self.mounted.get())
    }

    /// Whether an exit timer is scheduled and has not fired yet.
    #[must_use]
    pub fn has_pending_exit(&self) -> bool {
        self.pending
            .borrow()
            .as_ref()
            .is_some_and(TimerHandle::is_pending)
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// The mount state as a shared signal. Subscribers see every change,
    /// including the one made by the exit timer.
    #[must_use]
    pub fn mounted_signal(&self) -> Observable<bool> {
        self.mounted.clone()
    }
}
