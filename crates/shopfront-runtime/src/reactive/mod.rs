#![forbid(unsafe_code)]

//! Reactive primitives for overlay state.
//!
//! - [`Observable`]: a shared, version-tracked value with change notification.
//! - [`Subscription`]: RAII guard that disconnects its callback on drop.
//! - [`Binding`]: a lazily evaluated view derived from observables.
//! - [`BindingScope`]: owns the subscriptions of one component.
//!
//! # Architecture
//!
//! `Observable<T>` uses `Rc<RefCell<..>>` for single-threaded shared ownership.
//! Subscribers are stored as `Weak` function pointers and pruned lazily on the
//! next mutation.
//!
//! # Invariants
//!
//! 1. Version increments exactly once per mutation that changes the value.
//! 2. Subscribers are notified in registration order.
//! 3. Setting a value equal to the current value is a no-op.
//! 4. Dropping a [`Subscription`] removes the callback before the next
//!    notification cycle.

pub mod binding;
pub mod observable;

pub use binding::{Binding, BindingScope, bind_mapped, bind_mapped2, bind_observable};
pub use observable::{Observable, Subscription};
