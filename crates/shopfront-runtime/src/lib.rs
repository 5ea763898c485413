#![forbid(unsafe_code)]

//! Single-threaded runtime services for the Shopfront UI: reactive values,
//! the timer queue that drives deferred work, and the document scroll lock.

pub mod reactive;
pub mod scroll_lock;
pub mod timer;

pub use reactive::{Binding, BindingScope, Observable, Subscription};
pub use scroll_lock::{Overflow, ScrollLock, ScrollLockGuard};
pub use timer::{Clock, ManualClock, SystemClock, TimerHandle, TimerId, TimerQueue};
