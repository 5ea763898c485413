#![forbid(unsafe_code)]

//! Overlay host: a modal dialog mounted into the document's overlay layer.
//!
//! The caller owns the dialog's visibility (an `Observable<bool>`). The host
//! feeds it to a [`TransitionMountController`] and follows the derived mount
//! state:
//!
//! - while mounted, the dialog view sits in the [`OverlayRoot`] and the host
//!   holds one [`ScrollLockGuard`];
//! - when the mount state drops, both are released.
//!
//! The view reads visibility and mount state together as a
//! [`TransitionPhase`], so during the exit transition it is still drawn (with
//! the exit backdrop) but [`OverlayHost::handle_event`] ignores input.
//!
//! Dropping the host unmounts immediately, releases the scroll lock and
//! cancels any pending exit timer.
//!
//! # Example
//!
//! ```
//! use shopfront_runtime::Observable;
//! use shopfront_widgets::modal::OverlayHost;
//!
//! let open = Observable::new(false);
//! let close = open.clone();
//! let host = OverlayHost::builder()
//!     .title("Remove item?")
//!     .confirm_text("Remove")
//!     .visibility(&open)
//!     .on_cancel(move || close.set(false))
//!     .build();
//!
//! open.set(true);
//! assert!(host.is_mounted());
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use shopfront_core::dimension::Dimension;
use shopfront_core::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use shopfront_core::geometry::Rect;
use shopfront_render::cell::PackedRgba;
use shopfront_render::frame::{Frame, HitData, HitId, HitRegion};
use shopfront_runtime::reactive::bind_mapped2;
use shopfront_runtime::{Binding, BindingScope, Observable, ScrollLock, ScrollLockGuard, TimerQueue};

use super::config::ModalConfig;
use super::container::{BackdropConfig, MODAL_HIT_BACKDROP, Modal, ModalPosition, ModalSizeConstraints};
use super::dialog::{
    DIALOG_HIT_BUTTON, DIALOG_HIT_CLOSE, Dialog, DialogParts, DialogStyle, FooterAction,
};
use super::portal::{OverlayRoot, PortalId, PortalSlot};
use super::transition::{TransitionMountController, TransitionPhase};
use crate::Widget;

/// Why the dialog was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CancelReason {
    Backdrop,
    CloseButton,
    CancelButton,
    Escape,
}

/// Outcome of an event handled by [`OverlayHost::handle_event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayAction {
    Confirmed,
    Cancelled(CancelReason),
}

type Callback = Rc<dyn Fn()>;

thread_local! {
    static NEXT_HIT_ID: Cell<u32> = const { Cell::new(1) };
}

fn next_hit_id() -> HitId {
    NEXT_HIT_ID.with(|next| {
        let id = next.get();
        next.set(id.wrapping_add(1));
        HitId::new(id)
    })
}

/// The widget mounted into the overlay root.
struct ModalView {
    parts: Rc<RefCell<DialogParts>>,
    style: DialogStyle,
    phase: Binding<TransitionPhase>,
    position: ModalPosition,
    size: ModalSizeConstraints,
    backdrop: BackdropConfig,
    exit_opacity: f32,
    hit_id: HitId,
}

impl Widget for ModalView {
    fn render(&self, area: Rect, frame: &mut Frame) {
        let opacity = match self.phase.get() {
            TransitionPhase::Unmounted => return,
            TransitionPhase::Entered => self.backdrop.opacity,
            TransitionPhase::Exiting => self.exit_opacity,
        };
        let parts = self.parts.borrow();
        let dialog = Dialog::new(&parts, &self.style).hit_id(self.hit_id);
        Modal::new(dialog)
            .position(self.position)
            .size(self.size)
            .backdrop(self.backdrop.opacity(opacity))
            .hit_id(self.hit_id)
            .render(area, frame);
    }
}

/// Side effects that exist exactly while the overlay is mounted.
///
/// No borrow of the cell is held while the root or the lock run code that
/// can reach subscribers.
struct MountEffects {
    root: OverlayRoot,
    lock: ScrollLock,
    mounted: Observable<bool>,
    view: Rc<dyn Widget>,
    slot: Option<PortalSlot>,
    guard: Option<ScrollLockGuard>,
}

impl MountEffects {
    fn sync(cell: &RefCell<Self>, mounted: bool) {
        if !mounted {
            Self::release(cell);
            return;
        }

        let (root, lock, view, needs_slot, needs_guard) = {
            let effects = cell.borrow();
            (
                effects.root.clone(),
                effects.lock.clone(),
                Rc::clone(&effects.view),
                effects.slot.is_none(),
                effects.guard.is_none(),
            )
        };
        if needs_slot {
            let slot = root.mount(view);
            let extra = cell.borrow_mut().slot.replace(slot);
            drop(extra);
        }
        if needs_guard {
            // Overflow subscribers run inside `acquire` and may hide the
            // overlay or re-enter this function.
            let guard = lock.acquire();
            let extra = {
                let mut effects = cell.borrow_mut();
                if effects.guard.is_none() {
                    effects.guard = Some(guard);
                    None
                } else {
                    Some(guard)
                }
            };
            drop(extra);
        }

        let still_mounted = cell.borrow().mounted.get();
        if !still_mounted {
            Self::release(cell);
        }
    }

    fn release(cell: &RefCell<Self>) {
        // Dropped outside the borrow: releasing the lock notifies overflow
        // subscribers.
        let (slot, guard) = {
            let mut effects = cell.borrow_mut();
            (effects.slot.take(), effects.guard.take())
        };
        drop(slot);
        drop(guard);
    }
}

/// Builder for [`OverlayHost`].
pub struct OverlayBuilder {
    parts: DialogParts,
    style: DialogStyle,
    config: ModalConfig,
    confirm_text: Option<String>,
    cancel_text: Option<String>,
    transition_ms: Option<u64>,
    position: ModalPosition,
    size: ModalSizeConstraints,
    backdrop_color: PackedRgba,
    on_confirm: Option<Callback>,
    on_cancel: Option<Callback>,
    visibility: Option<Observable<bool>>,
    visible: bool,
    timers: Option<TimerQueue>,
    root: Option<OverlayRoot>,
    scroll_lock: Option<ScrollLock>,
    hit_id: Option<HitId>,
}

impl Default for OverlayBuilder {
    fn default() -> Self {
        Self {
            parts: DialogParts::new(""),
            style: DialogStyle::default(),
            config: ModalConfig::default(),
            confirm_text: None,
            cancel_text: None,
            transition_ms: None,
            position: ModalPosition::Center,
            size: ModalSizeConstraints::new()
                .min_width(Dimension::Cells(30))
                .max_width(Dimension::Cells(60)),
            backdrop_color: PackedRgba::BLACK,
            on_confirm: None,
            on_cancel: None,
            visibility: None,
            visible: false,
            timers: None,
            root: None,
            scroll_lock: None,
            hit_id: None,
        }
    }
}

impl OverlayBuilder {
    /// Defaults for transition time, button labels and close behaviour.
    /// Explicit builder calls win over the config.
    pub fn config(mut self, config: ModalConfig) -> Self {
        self.config = config;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.parts.title = title.into();
        self
    }

    pub fn content(mut self, content: impl Widget + 'static) -> Self {
        self.parts.content = Some(Rc::new(content));
        self
    }

    /// Replace the default confirm/cancel buttons.
    pub fn footer(mut self, footer: impl Widget + 'static) -> Self {
        self.parts.footer = Some(Rc::new(footer));
        self
    }

    pub fn confirm_text(mut self, text: impl Into<String>) -> Self {
        self.confirm_text = Some(text.into());
        self
    }

    pub fn cancel_text(mut self, text: impl Into<String>) -> Self {
        self.cancel_text = Some(text.into());
        self
    }

    pub fn confirm_disabled(mut self, disabled: bool) -> Self {
        self.parts.confirm.disabled = disabled;
        self
    }

    pub fn cancel_disabled(mut self, disabled: bool) -> Self {
        self.parts.cancel.disabled = disabled;
        self
    }

    /// Length of the exit transition. Fixed once the host is built.
    pub fn transition_ms(mut self, ms: u64) -> Self {
        self.transition_ms = Some(ms);
        self
    }

    pub fn min_width(mut self, width: impl Into<Dimension>) -> Self {
        self.size.min_width = Some(width.into());
        self
    }

    pub fn max_width(mut self, width: impl Into<Dimension>) -> Self {
        self.size.max_width = Some(width.into());
        self
    }

    pub fn position(mut self, position: ModalPosition) -> Self {
        self.position = position;
        self
    }

    pub fn style(mut self, style: DialogStyle) -> Self {
        self.style = style;
        self
    }

    pub fn backdrop_color(mut self, color: PackedRgba) -> Self {
        self.backdrop_color = color;
        self
    }

    pub fn on_confirm(mut self, callback: impl Fn() + 'static) -> Self {
        self.on_confirm = Some(Rc::new(callback));
        self
    }

    pub fn on_cancel(mut self, callback: impl Fn() + 'static) -> Self {
        self.on_cancel = Some(Rc::new(callback));
        self
    }

    /// Follow a caller-owned visibility signal instead of an internal one.
    pub fn visibility(mut self, visibility: &Observable<bool>) -> Self {
        self.visibility = Some(visibility.clone());
        self
    }

    /// Initial value of the internal visibility signal.
    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Timer queue for the exit delay (default: the thread's queue).
    pub fn timers(mut self, timers: &TimerQueue) -> Self {
        self.timers = Some(timers.clone());
        self
    }

    /// Insertion point (default: the document's overlay root).
    pub fn root(mut self, root: &OverlayRoot) -> Self {
        self.root = Some(root.clone());
        self
    }

    /// Scroll lock (default: the document's lock).
    pub fn scroll_lock(mut self, lock: &ScrollLock) -> Self {
        self.scroll_lock = Some(lock.clone());
        self
    }

    pub fn hit_id(mut self, id: HitId) -> Self {
        self.hit_id = Some(id);
        self
    }

    pub fn build(self) -> OverlayHost {
        let Self {
            mut parts,
            style,
            config,
            confirm_text,
            cancel_text,
            transition_ms,
            position,
            size,
            backdrop_color,
            on_confirm,
            on_cancel,
            visibility,
            visible,
            timers,
            root,
            scroll_lock,
            hit_id,
        } = self;

        parts.confirm.label = confirm_text.unwrap_or_else(|| config.confirm_text.clone());
        parts.cancel.label = cancel_text.unwrap_or_else(|| config.cancel_text.clone());
        let duration = transition_ms.map_or_else(
            || config.transition(),
            std::time::Duration::from_millis,
        );

        let timers = timers.unwrap_or_else(TimerQueue::global);
        let visibility = visibility.unwrap_or_else(|| Observable::new(visible));
        let hit_id = hit_id.unwrap_or_else(next_hit_id);
        let controller = TransitionMountController::new(&timers, duration);
        let mounted = controller.mounted_signal();
        let parts = Rc::new(RefCell::new(parts));

        let view = ModalView {
            parts: Rc::clone(&parts),
            style,
            phase: bind_mapped2(&visibility, &mounted, |&v, &m| {
                TransitionPhase::from_signals(v, m)
            }),
            position,
            size,
            backdrop: BackdropConfig::new(backdrop_color, config.backdrop_opacity),
            exit_opacity: config.exit_backdrop_opacity,
            hit_id,
        };
        let effects = Rc::new(RefCell::new(MountEffects {
            root: root.unwrap_or_else(OverlayRoot::global),
            lock: scroll_lock.unwrap_or_else(ScrollLock::global),
            mounted: mounted.clone(),
            view: Rc::new(view),
            slot: None,
            guard: None,
        }));
        let controller = Rc::new(controller);

        let mut scope = BindingScope::new();
        {
            let effects = Rc::clone(&effects);
            scope.subscribe(&mounted, move |&m| MountEffects::sync(&effects, m));
        }
        {
            let controller = Rc::clone(&controller);
            scope.subscribe(&visibility, move |&v| {
                controller.observe(v);
            });
        }
        controller.observe(visibility.get());

        tracing::debug!(
            hit_id = hit_id.id(),
            transition_ms = duration.as_millis() as u64,
            "overlay host created"
        );

        OverlayHost {
            visibility,
            controller,
            effects,
            parts,
            config,
            hit_id,
            on_confirm,
            on_cancel,
            scope,
        }
    }
}

/// A modal dialog that mounts itself into the overlay layer while shown.
pub struct OverlayHost {
    visibility: Observable<bool>,
    controller: Rc<TransitionMountController>,
    effects: Rc<RefCell<MountEffects>>,
    parts: Rc<RefCell<DialogParts>>,
    config: ModalConfig,
    hit_id: HitId,
    on_confirm: Option<Callback>,
    on_cancel: Option<Callback>,
    scope: BindingScope,
}

impl fmt::Debug for OverlayHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverlayHost")
            .field("hit_id", &self.hit_id)
            .field("phase", &self.phase())
            .field("parts", &*self.parts.borrow())
            .finish()
    }
}

impl OverlayHost {
    pub fn builder() -> OverlayBuilder {
        OverlayBuilder::default()
    }

    /// Set the logical visibility. Mounting happens synchronously; unmounting
    /// after the transition.
    pub fn set_visible(&self, visible: bool) {
        self.visibility.set(visible);
    }

    pub fn is_visible(&self) -> bool {
        self.visibility.get()
    }

    /// The visibility signal the host follows.
    pub fn visibility(&self) -> Observable<bool> {
        self.visibility.clone()
    }

    pub fn is_mounted(&self) -> bool {
        self.controller.is_mounted()
    }

    pub fn phase(&self) -> TransitionPhase {
        self.controller.phase()
    }

    pub fn has_pending_exit(&self) -> bool {
        self.controller.has_pending_exit()
    }

    /// Hit id of every region the dialog registers.
    pub fn hit_id(&self) -> HitId {
        self.hit_id
    }

    /// Layer id while mounted.
    pub fn portal_id(&self) -> Option<PortalId> {
        self.effects.borrow().slot.as_ref().map(PortalSlot::id)
    }

    /// Whether this host currently holds the scroll lock.
    pub fn holds_scroll_lock(&self) -> bool {
        self.effects.borrow().guard.is_some()
    }

    pub fn config(&self) -> &ModalConfig {
        &self.config
    }

    pub fn set_title(&self, title: impl Into<String>) {
        self.parts.borrow_mut().title = title.into();
    }

    pub fn set_confirm_text(&self, text: impl Into<String>) {
        self.parts.borrow_mut().confirm.label = text.into();
    }

    pub fn set_cancel_text(&self, text: impl Into<String>) {
        self.parts.borrow_mut().cancel.label = text.into();
    }

    pub fn set_confirm_disabled(&self, disabled: bool) {
        self.parts.borrow_mut().confirm.disabled = disabled;
    }

    pub fn set_cancel_disabled(&self, disabled: bool) {
        self.parts.borrow_mut().cancel.disabled = disabled;
    }

    pub fn set_content(&self, content: Option<Rc<dyn Widget>>) {
        self.parts.borrow_mut().content = content;
    }

    pub fn set_footer(&self, footer: Option<Rc<dyn Widget>>) {
        self.parts.borrow_mut().footer = footer;
    }

    /// Handle an input event, given the hit-test result for pointer events.
    ///
    /// Only acts while the dialog is shown; during the exit transition it is
    /// inert. The matching callback runs before the action is returned, with
    /// no host state borrowed, so it may hide the dialog.
    pub fn handle_event(
        &self,
        event: &Event,
        hit: Option<(HitId, HitRegion, HitData)>,
    ) -> Option<OverlayAction> {
        if self.phase() != TransitionPhase::Entered {
            return None;
        }
        let action = self.resolve(event, hit)?;
        tracing::debug!(?action, hit_id = self.hit_id.id(), "overlay action");

        let callback = match action {
            OverlayAction::Confirmed => self.on_confirm.clone(),
            OverlayAction::Cancelled(_) => self.on_cancel.clone(),
        };
        if let Some(callback) = callback {
            callback();
        }
        Some(action)
    }

    fn resolve(
        &self,
        event: &Event,
        hit: Option<(HitId, HitRegion, HitData)>,
    ) -> Option<OverlayAction> {
        match event {
            Event::Key(KeyEvent {
                code: KeyCode::Escape,
                kind: KeyEventKind::Press,
                ..
            }) if self.config.close_on_escape => {
                Some(OverlayAction::Cancelled(CancelReason::Escape))
            }
            Event::Key(KeyEvent {
                code: KeyCode::Enter,
                kind: KeyEventKind::Press,
                ..
            }) => (!self.parts.borrow().confirm.disabled).then_some(OverlayAction::Confirmed),
            Event::Mouse(MouseEvent {
                kind: MouseEventKind::Down(MouseButton::Left),
                ..
            }) => {
                let (id, region, data) = hit?;
                if id != self.hit_id {
                    return None;
                }
                match region {
                    MODAL_HIT_BACKDROP if self.config.close_on_backdrop => {
                        Some(OverlayAction::Cancelled(CancelReason::Backdrop))
                    }
                    DIALOG_HIT_CLOSE => Some(OverlayAction::Cancelled(CancelReason::CloseButton)),
                    DIALOG_HIT_BUTTON => {
                        let parts = self.parts.borrow();
                        match FooterAction::from_hit_data(data)? {
                            FooterAction::Confirm if !parts.confirm.disabled => {
                                Some(OverlayAction::Confirmed)
                            }
                            FooterAction::Cancel if !parts.cancel.disabled => {
                                Some(OverlayAction::Cancelled(CancelReason::CancelButton))
                            }
                            _ => None,
                        }
                    }
                    // Content clicks stop here.
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

impl Drop for OverlayHost {
    fn drop(&mut self) {
        self.scope.clear();
        if self.is_mounted() {
            tracing::debug!(hit_id = self.hit_id.id(), "overlay host dropped while mounted");
        }
        MountEffects::release(&self.effects);
        // The controller goes with the remaining fields; its pending exit
        // timer is cancelled when the handle drops.
    }
}
