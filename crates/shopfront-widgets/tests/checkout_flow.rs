//! End-to-end overlay behaviour on a checkout page.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use proptest::prelude::*;
use shopfront_core::event::{Event, KeyCode};
use shopfront_core::geometry::Rect;
use shopfront_render::frame::Frame;
use shopfront_runtime::{ManualClock, Observable, Overflow, ScrollLock, TimerQueue};
use shopfront_widgets::modal::{
    CancelReason, MODAL_HIT_BACKDROP, OverlayAction, OverlayHost, OverlayRoot, TransitionPhase,
};
use shopfront_widgets::{Label, Widget};

/// A page whose content scrolls unless the document is locked.
struct CheckoutPage {
    lock: ScrollLock,
    offset: Cell<u16>,
}

impl CheckoutPage {
    fn scroll(&self) {
        if !self.lock.is_locked() {
            self.offset.set(self.offset.get() + 1);
        }
    }
}

impl Widget for CheckoutPage {
    fn render(&self, area: Rect, frame: &mut Frame) {
        Label::new(format!("Checkout (scrolled {})\nName\nAddress\n[ Submit order ]", self.offset.get()))
            .render(area, frame);
    }
}

struct Document {
    timers: TimerQueue,
    clock: ManualClock,
    root: OverlayRoot,
    lock: ScrollLock,
    page: CheckoutPage,
}

impl Document {
    fn new() -> Self {
        let (timers, clock) = TimerQueue::manual();
        let lock = ScrollLock::new();
        Self {
            timers,
            clock,
            root: OverlayRoot::new(),
            page: CheckoutPage {
                lock: lock.clone(),
                offset: Cell::new(0),
            },
            lock,
        }
    }

    fn at(&self, ms: u64) {
        self.clock.set(Duration::from_millis(ms));
        self.timers.poll();
    }

    fn frame(&self) -> Frame {
        let mut frame = Frame::with_hit_grid(80, 24);
        self.root.compose(&self.page, frame.area(), &mut frame);
        frame
    }
}

/// Order confirmation wired the way a checkout form wires it: submitting
/// opens the dialog, both outcomes close it.
fn order_confirmation(doc: &Document, open: &Observable<bool>, placed: &Rc<Cell<bool>>) -> OverlayHost {
    let close = open.clone();
    let confirm_close = open.clone();
    let placed = Rc::clone(placed);
    OverlayHost::builder()
        .title("Confirm order")
        .content(Label::new("2 items\nTotal: $18.50"))
        .confirm_text("Place order")
        .cancel_text("Back")
        .visibility(open)
        .on_confirm(move || {
            placed.set(true);
            confirm_close.set(false);
        })
        .on_cancel(move || close.set(false))
        .timers(&doc.timers)
        .root(&doc.root)
        .scroll_lock(&doc.lock)
        .build()
}

fn locate(frame: &Frame, needle: &str) -> Option<(u16, u16)> {
    (0..frame.buffer.height()).find_map(|y| {
        let line = frame.buffer.row_text(y);
        line.find(needle)
            .map(|i| (line[..i].chars().count() as u16, y))
    })
}

#[test]
fn confirm_places_order_and_fades_out() {
    let doc = Document::new();
    let open = Observable::new(false);
    let placed = Rc::new(Cell::new(false));
    let host = order_confirmation(&doc, &open, &placed);

    doc.page.scroll();
    open.set(true);
    doc.page.scroll();
    assert_eq!(doc.page.offset.get(), 1);
    assert_eq!(doc.lock.overflow(), Overflow::Hidden);

    let frame = doc.frame();
    assert!(frame.buffer.contains_text("Checkout (scrolled 1)"));
    let (x, y) = locate(&frame, "[ Place order ]").expect("confirm button rendered");
    let action = host.handle_event(&Event::click(x + 2, y), frame.hit_test(x + 2, y));
    assert_eq!(action, Some(OverlayAction::Confirmed));
    assert!(placed.get());
    assert!(!open.get());

    // Fading out: still drawn, page still locked.
    doc.at(150);
    assert_eq!(host.phase(), TransitionPhase::Exiting);
    assert!(doc.frame().buffer.contains_text("Confirm order"));
    doc.page.scroll();
    assert_eq!(doc.page.offset.get(), 1);

    doc.at(300);
    assert!(!doc.frame().buffer.contains_text("Confirm order"));
    doc.page.scroll();
    assert_eq!(doc.page.offset.get(), 2);
}

#[test]
fn delayed_exit_timeline() {
    let doc = Document::new();
    let open = Observable::new(false);
    let placed = Rc::new(Cell::new(false));
    let host = order_confirmation(&doc, &open, &placed);

    open.set(true);
    assert!(host.is_mounted());
    doc.at(10);
    open.set(false);
    assert!(host.is_mounted());
    doc.at(200);
    assert!(host.is_mounted());
    doc.at(310);
    assert!(!host.is_mounted());
    assert!(doc.root.is_empty());
}

#[test]
fn reopening_during_fade_keeps_dialog() {
    let doc = Document::new();
    let open = Observable::new(false);
    let placed = Rc::new(Cell::new(false));
    let host = order_confirmation(&doc, &open, &placed);

    open.set(true);
    let first = host.portal_id();
    assert!(first.is_some());
    doc.at(10);
    open.set(false);
    doc.at(50);
    open.set(true);
    doc.at(310);

    assert_eq!(host.phase(), TransitionPhase::Entered);
    // Same layer throughout: no unmount/remount flicker.
    assert_eq!(host.portal_id(), first);
    assert_eq!(doc.timers.fired(), 0);
}

#[test]
fn backdrop_closes_but_dialog_body_does_not() {
    let doc = Document::new();
    let open = Observable::new(true);
    let placed = Rc::new(Cell::new(false));
    let host = order_confirmation(&doc, &open, &placed);
    let frame = doc.frame();

    let (x, y) = locate(&frame, "Total: $18.50").expect("content rendered");
    assert_eq!(host.handle_event(&Event::click(x, y), frame.hit_test(x, y)), None);
    assert!(open.get());

    // Page text under the backdrop is still visible but not reachable.
    let (x, y) = locate(&frame, "Submit order").expect("page rendered");
    let hit = frame.hit_test(x, y);
    assert_eq!(hit.map(|(_, region, _)| region), Some(MODAL_HIT_BACKDROP));
    assert_eq!(
        host.handle_event(&Event::click(x, y), hit),
        Some(OverlayAction::Cancelled(CancelReason::Backdrop))
    );
    assert!(!open.get());
    assert!(!placed.get());
}

#[test]
fn escape_then_navigate_away_mid_fade() {
    let doc = Document::new();
    let open = Observable::new(true);
    let placed = Rc::new(Cell::new(false));
    let host = order_confirmation(&doc, &open, &placed);

    host.handle_event(&Event::key(KeyCode::Escape), None);
    assert_eq!(host.phase(), TransitionPhase::Exiting);

    // The page is torn down before the fade completes.
    drop(host);
    assert!(doc.root.is_empty());
    assert!(!doc.lock.is_locked());
    assert_eq!(doc.timers.pending(), 0);
    doc.at(1_000);
    assert_eq!(doc.timers.fired(), 0);
}

#[derive(Debug, Clone)]
enum Step {
    Show(bool),
    Wait(u64),
    Drop,
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        4 => any::<bool>().prop_map(Step::Show),
        4 => (0u64..500).prop_map(Step::Wait),
        1 => Just(Step::Drop),
    ]
}

proptest! {
    #[test]
    fn lock_and_layer_follow_mount_state(steps in proptest::collection::vec(step(), 1..48)) {
        let doc = Document::new();
        let open = Observable::new(false);
        let placed = Rc::new(Cell::new(false));
        let mut host = Some(order_confirmation(&doc, &open, &placed));
        let mut now = 0;

        for step in steps {
            match step {
                Step::Show(visible) => open.set(visible),
                Step::Wait(ms) => {
                    now += ms;
                    doc.at(now);
                }
                Step::Drop => host = None,
            }

            let mounted = host.as_ref().is_some_and(OverlayHost::is_mounted);
            prop_assert_eq!(doc.lock.is_locked(), mounted);
            prop_assert_eq!(doc.lock.holders(), usize::from(mounted));
            prop_assert_eq!(doc.root.len(), usize::from(mounted));
            prop_assert!(doc.timers.pending() <= 1);
            if open.get() {
                prop_assert!(host.is_none() || mounted);
            }
        }
    }
}
