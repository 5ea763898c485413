#![forbid(unsafe_code)]

//! Single-threaded one-shot timers.
//!
//! The [`TimerQueue`] is the only source of deferred work in the runtime. The
//! event loop calls [`TimerQueue::poll`] between input events; every timer
//! whose deadline has passed fires, in deadline order, ties broken by
//! scheduling order.
//!
//! # Ownership
//!
//! [`TimerQueue::schedule`] returns a [`TimerHandle`]. The handle is the only
//! way to refer to the timer and dropping it cancels the timer. A component
//! that keeps at most one `Option<TimerHandle>` therefore cannot leak timers:
//! replacing the option cancels the old timer before the new one is stored,
//! and dropping the component cancels whatever is pending.
//!
//! # Invariants
//!
//! 1. A cancelled timer never fires and its callback is dropped immediately.
//! 2. A timer fires at most once, and never before its deadline.
//! 3. Callbacks run with no internal borrow held, so they may schedule or
//!    cancel timers on the same queue.
//! 4. Timers scheduled by a callback during `poll` are not fired by that same
//!    `poll` call, even with a zero delay.
//!
//! # Clocks
//!
//! Time comes from a [`Clock`]. [`SystemClock`] reads a monotonic
//! `web_time::Instant` (so it also works on `wasm32`); [`ManualClock`] is
//! advanced explicitly and makes timing tests deterministic.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

use ahash::AHashMap;
use web_time::Instant;

/// Source of "now" for a [`TimerQueue`], as elapsed time since an origin.
pub trait Clock {
    fn now(&self) -> Duration;
}

/// Wall-clock time since construction.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward by `delta`.
    pub fn advance(&self, delta: Duration) {
        self.now.set(self.now.get() + delta);
    }

    /// Jump to an absolute time. Moving backwards is ignored.
    pub fn set(&self, now: Duration) {
        if now > self.now.get() {
            self.now.set(now);
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// Opaque identifier of a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    #[inline]
    pub const fn id(self) -> u64 {
        self.0
    }
}

type Callback = Box<dyn FnOnce()>;

struct QueueInner {
    clock: Box<dyn Clock>,
    next_id: u64,
    queue: BTreeMap<(Duration, TimerId), Callback>,
    deadlines: AHashMap<TimerId, Duration>,
    fired: u64,
    cancelled: u64,
}

impl QueueInner {
    fn remove(&mut self, id: TimerId) -> Option<Callback> {
        let deadline = self.deadlines.remove(&id)?;
        self.queue.remove(&(deadline, id))
    }

    fn pop_due(&mut self, now: Duration, watermark: u64) -> Option<(TimerId, Callback)> {
        let (&(deadline, id), _) = self
            .queue
            .iter()
            .find(|((_, id), _)| id.0 < watermark)?;
        if deadline > now {
            return None;
        }
        self.deadlines.remove(&id);
        let callback = self.queue.remove(&(deadline, id))?;
        self.fired += 1;
        Some((id, callback))
    }
}

thread_local! {
    static GLOBAL_QUEUE: TimerQueue = TimerQueue::new(SystemClock::new());
}

/// A single-threaded queue of one-shot timers. Clones share the same queue.
#[derive(Clone)]
pub struct TimerQueue {
    inner: Rc<RefCell<QueueInner>>,
}

impl fmt::Debug for TimerQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("TimerQueue")
            .field("pending", &inner.queue.len())
            .field("fired", &inner.fired)
            .field("cancelled", &inner.cancelled)
            .finish()
    }
}

impl TimerQueue {
    /// Create a queue driven by `clock`.
    pub fn new(clock: impl Clock + 'static) -> Self {
        Self {
            inner: Rc::new(RefCell::new(QueueInner {
                clock: Box::new(clock),
                next_id: 1,
                queue: BTreeMap::new(),
                deadlines: AHashMap::new(),
                fired: 0,
                cancelled: 0,
            })),
        }
    }

    /// A queue driven by a fresh [`ManualClock`], returned alongside it.
    pub fn manual() -> (Self, ManualClock) {
        let clock = ManualClock::new();
        (Self::new(clock.clone()), clock)
    }

    /// The thread's shared queue over the system clock.
    #[must_use]
    pub fn global() -> Self {
        GLOBAL_QUEUE.with(Clone::clone)
    }

    /// Current time according to the queue's clock.
    pub fn now(&self) -> Duration {
        self.inner.borrow().clock.now()
    }

    /// Run `callback` once, no earlier than `delay` from now.
    #[must_use = "dropping the handle cancels the timer"]
    pub fn schedule(&self, delay: Duration, callback: impl FnOnce() + 'static) -> TimerHandle {
        let mut inner = self.inner.borrow_mut();
        let id = TimerId(inner.next_id);
        inner.next_id += 1;
        let deadline = inner.clock.now() + delay;
        inner.queue.insert((deadline, id), Box::new(callback));
        inner.deadlines.insert(id, deadline);
        tracing::trace!(
            timer = id.0,
            delay_ms = delay.as_millis() as u64,
            "timer scheduled"
        );
        TimerHandle {
            id,
            queue: Rc::downgrade(&self.inner),
        }
    }

    /// Fire every timer that is due. Returns how many fired.
    pub fn poll(&self) -> usize {
        let (now, watermark) = {
            let inner = self.inner.borrow();
            (inner.clock.now(), inner.next_id)
        };
        let mut fired = 0;
        loop {
            let due = self.inner.borrow_mut().pop_due(now, watermark);
            let Some((id, callback)) = due else {
                break;
            };
            tracing::trace!(timer = id.0, "timer fired");
            callback();
            fired += 1;
        }
        fired
    }

    /// Number of timers that are scheduled and not yet fired or cancelled.
    pub fn pending(&self) -> usize {
        self.inner.borrow().queue.len()
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.inner
            .borrow()
            .queue
            .keys()
            .next()
            .map(|(deadline, _)| *deadline)
    }

    /// Total timers fired over the queue's lifetime.
    pub fn fired(&self) -> u64 {
        self.inner.borrow().fired
    }

    /// Total timers cancelled over the queue's lifetime.
    pub fn cancelled(&self) -> u64 {
        self.inner.borrow().cancelled
    }
}

/// Owning reference to a scheduled timer; dropping it cancels the timer.
#[must_use = "dropping the handle cancels the timer"]
pub struct TimerHandle {
    id: TimerId,
    queue: Weak<RefCell<QueueInner>>,
}

impl fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerHandle")
            .field("id", &self.id.0)
            .field("pending", &self.is_pending())
            .finish()
    }
}

impl TimerHandle {
    #[inline]
    pub fn id(&self) -> TimerId {
        self.id
    }

    /// Whether the timer is still waiting to fire.
    pub fn is_pending(&self) -> bool {
        self.queue
            .upgrade()
            .is_some_and(|queue| queue.borrow().deadlines.contains_key(&self.id))
    }

    /// Cancel the timer. Returns `true` if it had not fired yet.
    pub fn cancel(self) -> bool {
        self.cancel_in_place()
    }

    fn cancel_in_place(&self) -> bool {
        let Some(queue) = self.queue.upgrade() else {
            return false;
        };
        // The callback is dropped after the borrow ends; its captures may own
        // handles into this same queue.
        let removed = {
            let mut inner = queue.borrow_mut();
            let removed = inner.remove(self.id);
            if removed.is_some() {
                inner.cancelled += 1;
            }
            removed
        };
        let was_pending = removed.is_some();
        if was_pending {
            tracing::trace!(timer = self.id.0, "timer cancelled");
        }
        drop(removed);
        was_pending
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.cancel_in_place();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn fires_only_after_deadline() {
        let (queue, clock) = TimerQueue::manual();
        let hit = Rc::new(Cell::new(false));
        let h = Rc::clone(&hit);
        let handle = queue.schedule(ms(100), move || h.set(true));

        clock.advance(ms(99));
        assert_eq!(queue.poll(), 0);
        assert!(handle.is_pending());

        clock.advance(ms(1));
        assert_eq!(queue.poll(), 1);
        assert!(hit.get());
        assert!(!handle.is_pending());
    }

    #[test]
    fn dropping_handle_cancels() {
        let (queue, clock) = TimerQueue::manual();
        let hit = Rc::new(Cell::new(false));
        let h = Rc::clone(&hit);
        drop(queue.schedule(ms(10), move || h.set(true)));
        assert_eq!(queue.pending(), 0);
        assert_eq!(queue.cancelled(), 1);

        clock.advance(ms(50));
        queue.poll();
        assert!(!hit.get());
    }

    #[test]
    fn cancel_after_fire_reports_false() {
        let (queue, clock) = TimerQueue::manual();
        let handle = queue.schedule(ms(0), || {});
        clock.advance(ms(1));
        queue.poll();
        assert!(!handle.cancel());
        assert_eq!(queue.cancelled(), 0);
    }

    #[test]
    fn fires_in_deadline_then_schedule_order() {
        let (queue, clock) = TimerQueue::manual();
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut handles = Vec::new();
        for (label, delay) in [("c", 30), ("a", 10), ("b", 10)] {
            let order = Rc::clone(&order);
            handles.push(queue.schedule(ms(delay), move || order.borrow_mut().push(label)));
        }
        clock.advance(ms(30));
        assert_eq!(queue.poll(), 3);
        assert_eq!(*order.borrow(), vec!["a", "b", "c"]);
    }

    #[test]
    fn callbacks_can_reschedule_without_looping() {
        let (queue, clock) = TimerQueue::manual();
        let slot: Rc<RefCell<Option<TimerHandle>>> = Rc::new(RefCell::new(None));
        let count = Rc::new(Cell::new(0));

        fn arm(queue: &TimerQueue, slot: &Rc<RefCell<Option<TimerHandle>>>, count: &Rc<Cell<u32>>) {
            let (q, s, c) = (queue.clone(), Rc::clone(slot), Rc::clone(count));
            let handle = queue.schedule(Duration::ZERO, move || {
                c.set(c.get() + 1);
                arm(&q, &s, &c);
            });
            *slot.borrow_mut() = Some(handle);
        }

        arm(&queue, &slot, &count);
        clock.advance(ms(1));
        assert_eq!(queue.poll(), 1);
        assert_eq!(count.get(), 1);
        assert_eq!(queue.pending(), 1);
        assert_eq!(queue.poll(), 1);
        assert_eq!(count.get(), 2);
        slot.borrow_mut().take();
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn callback_may_cancel_sibling() {
        let (queue, clock) = TimerQueue::manual();
        let hit = Rc::new(Cell::new(false));
        let h = Rc::clone(&hit);
        let victim = queue.schedule(ms(20), move || h.set(true));
        let victim = RefCell::new(Some(victim));
        let _killer = queue.schedule(ms(10), move || {
            victim.borrow_mut().take();
        });
        clock.advance(ms(30));
        assert_eq!(queue.poll(), 1);
        assert!(!hit.get());
    }

    #[test]
    fn handle_outliving_queue_is_inert() {
        let (queue, _clock) = TimerQueue::manual();
        let handle = queue.schedule(ms(5), || {});
        drop(queue);
        assert!(!handle.is_pending());
        assert!(!handle.cancel());
    }

    #[test]
    fn next_deadline_tracks_earliest() {
        let (queue, clock) = TimerQueue::manual();
        assert_eq!(queue.next_deadline(), None);
        clock.advance(ms(5));
        let _a = queue.schedule(ms(40), || {});
        let _b = queue.schedule(ms(15), || {});
        assert_eq!(queue.next_deadline(), Some(ms(20)));
    }

    #[test]
    fn manual_clock_never_goes_backwards() {
        let clock = ManualClock::new();
        clock.set(ms(50));
        clock.set(ms(10));
        assert_eq!(clock.now(), ms(50));
    }
}
