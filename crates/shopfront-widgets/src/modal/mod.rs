#![forbid(unsafe_code)]

//! Modal dialogs: mount transitions, the overlay layer, and the dialog itself.
//!
//! # Lifecycle
//!
//! [`TransitionMountController`] turns the caller's visibility into a mount
//! state that lags on exit by the transition duration, so the exit animation
//! has something to animate. [`OverlayHost`] follows that mount state: it
//! mounts its dialog into the [`OverlayRoot`] and holds the document
//! [`ScrollLock`](shopfront_runtime::ScrollLock) for exactly as long as the
//! dialog is mounted.
//!
//! # Rendering
//!
//! The mounted view draws a [`Modal`] container (backdrop, positioning, size
//! constraints) around a [`Dialog`] (header, content, footer). Hit regions
//! tagged with [`MODAL_HIT_BACKDROP`], [`MODAL_HIT_CONTENT`],
//! [`DIALOG_HIT_CLOSE`] and [`DIALOG_HIT_BUTTON`] let
//! [`OverlayHost::handle_event`] tell a backdrop click from a click inside the
//! dialog.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use shopfront_render::frame::Frame;
//! use shopfront_runtime::{ScrollLock, TimerQueue};
//! use shopfront_widgets::Label;
//! use shopfront_widgets::modal::{OverlayHost, OverlayRoot, TransitionPhase};
//!
//! let (timers, clock) = TimerQueue::manual();
//! let root = OverlayRoot::new();
//! let lock = ScrollLock::new();
//!
//! let host = OverlayHost::builder()
//!     .title("Confirm order")
//!     .content(Label::new("2 items, $18.50"))
//!     .confirm_text("Place order")
//!     .timers(&timers)
//!     .root(&root)
//!     .scroll_lock(&lock)
//!     .build();
//!
//! host.set_visible(true);
//! let mut frame = Frame::with_hit_grid(80, 24);
//! root.render(frame.area(), &mut frame);
//! assert!(frame.buffer.contains_text("[ Place order ]"));
//!
//! host.set_visible(false);
//! assert_eq!(host.phase(), TransitionPhase::Exiting);
//! clock.advance(Duration::from_millis(300));
//! timers.poll();
//! assert_eq!(host.phase(), TransitionPhase::Unmounted);
//! assert!(!lock.is_locked());
//! ```

mod config;
mod container;
mod dialog;
mod host;
mod portal;
mod transition;

pub use config::{ConfigError, ModalConfig};
pub use container::{
    BackdropConfig, MODAL_HIT_BACKDROP, MODAL_HIT_CONTENT, Modal, ModalPosition,
    ModalSizeConstraints,
};
pub use dialog::{
    DIALOG_HIT_BUTTON, DIALOG_HIT_CLOSE, Dialog, DialogButton, DialogParts, DialogStyle,
    FooterAction,
};
pub use host::{CancelReason, OverlayAction, OverlayBuilder, OverlayHost};
pub use portal::{OverlayRoot, PortalId, PortalSlot};
pub use transition::{TransitionMountController, TransitionPhase};
