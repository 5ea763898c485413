#![forbid(unsafe_code)]

//! The document's overlay layer.
//!
//! Overlays are not rendered where they are declared but into a single
//! insertion point above the page, so they escape whatever clipping and
//! stacking the declaring widget lives in. [`OverlayRoot`] is that insertion
//! point. A widget is "mounted" while a [`PortalSlot`] for it is alive.
//!
//! The root is a thread-local singleton created on first access, so it always
//! exists before the first overlay mounts into it.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use shopfront_core::geometry::Rect;
use shopfront_render::frame::Frame;

use crate::Widget;

/// Identifies one mounted layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PortalId(u64);

impl PortalId {
    #[inline]
    pub const fn id(self) -> u64 {
        self.0
    }
}

struct Layer {
    id: PortalId,
    view: Rc<dyn Widget>,
}

#[derive(Default)]
struct RootInner {
    layers: RefCell<Vec<Layer>>,
    next_id: Cell<u64>,
}

thread_local! {
    static GLOBAL_ROOT: OverlayRoot = OverlayRoot::new();
}

/// Overlay insertion point. Clones share the same layer list.
#[derive(Clone, Default)]
pub struct OverlayRoot {
    inner: Rc<RootInner>,
}

impl fmt::Debug for OverlayRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverlayRoot")
            .field("layers", &self.len())
            .finish()
    }
}

impl OverlayRoot {
    /// An empty, independent root.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The document's root (thread-local).
    #[must_use]
    pub fn global() -> Self {
        GLOBAL_ROOT.with(Clone::clone)
    }

    /// Add `view` on top of every layer mounted so far.
    #[must_use = "dropping the slot unmounts the view"]
    pub fn mount(&self, view: Rc<dyn Widget>) -> PortalSlot {
        let id = PortalId(self.inner.next_id.get());
        self.inner.next_id.set(id.0 + 1);
        self.inner.layers.borrow_mut().push(Layer { id, view });
        tracing::trace!(portal = id.0, "portal mounted");
        PortalSlot {
            id,
            root: Rc::downgrade(&self.inner),
        }
    }

    /// Number of mounted layers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.layers.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn contains(&self, id: PortalId) -> bool {
        self.inner.layers.borrow().iter().any(|layer| layer.id == id)
    }

    /// Render every layer over `area`, oldest first.
    pub fn render(&self, area: Rect, frame: &mut Frame) {
        // Snapshot so a view may mount or unmount while rendering.
        let views: Vec<Rc<dyn Widget>> = self
            .inner
            .layers
            .borrow()
            .iter()
            .map(|layer| Rc::clone(&layer.view))
            .collect();
        for view in views {
            view.render(area, frame);
        }
    }

    /// Render the document: `page` first, then the overlay layer on top.
    pub fn compose(&self, page: &dyn Widget, area: Rect, frame: &mut Frame) {
        page.render(area, frame);
        self.render(area, frame);
    }
}

/// A mounted layer. Dropping it removes the view from the root.
#[must_use = "dropping the slot unmounts the view"]
pub struct PortalSlot {
    id: PortalId,
    root: Weak<RootInner>,
}

impl fmt::Debug for PortalSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PortalSlot").field("id", &self.id.0).finish()
    }
}

impl PortalSlot {
    #[inline]
    pub fn id(&self) -> PortalId {
        self.id
    }
}

impl Drop for PortalSlot {
    fn drop(&mut self) {
        let Some(root) = self.root.upgrade() else {
            return;
        };
        // Remove under the borrow, drop the view after it.
        let removed = {
            let mut layers = root.layers.borrow_mut();
            layers
                .iter()
                .position(|layer| layer.id == self.id)
                .map(|index| layers.remove(index))
        };
        if removed.is_some() {
            tracing::trace!(portal = self.id.0, "portal unmounted");
        }
        drop(removed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Label;

    fn label(text: &str) -> Rc<dyn Widget> {
        Rc::new(Label::new(text))
    }

    #[test]
    fn mount_and_drop() {
        let root = OverlayRoot::new();
        let slot = root.mount(label("hello"));
        assert_eq!(root.len(), 1);
        assert!(root.contains(slot.id()));

        let id = slot.id();
        drop(slot);
        assert!(root.is_empty());
        assert!(!root.contains(id));
    }

    #[test]
    fn layers_render_in_mount_order() {
        let root = OverlayRoot::new();
        let _a = root.mount(label("first"));
        let _b = root.mount(label("2nd"));

        let mut frame = Frame::new(8, 1);
        root.render(frame.area(), &mut frame);
        assert_eq!(frame.buffer.row_text(0), "2ndst");
    }

    #[test]
    fn unmounting_middle_layer_keeps_others() {
        let root = OverlayRoot::new();
        let a = root.mount(label("a"));
        let b = root.mount(label("b"));
        let c = root.mount(label("c"));
        drop(b);
        assert_eq!(root.len(), 2);
        assert!(root.contains(a.id()));
        assert!(root.contains(c.id()));
    }

    #[test]
    fn compose_draws_overlay_over_page() {
        let root = OverlayRoot::new();
        let page = Label::new("catalog page");
        let _slot = root.mount(label("MODAL"));

        let mut frame = Frame::new(12, 1);
        root.compose(&page, frame.area(), &mut frame);
        assert_eq!(frame.buffer.row_text(0), "MODALog page");
    }

    #[test]
    fn slot_outliving_root_is_harmless() {
        let root = OverlayRoot::new();
        let slot = root.mount(label("x"));
        drop(root);
        drop(slot);
    }

    #[test]
    fn global_root_is_shared_within_thread() {
        let slot = OverlayRoot::global().mount(label("x"));
        let id = slot.id();
        assert!(OverlayRoot::global().contains(id));
        drop(slot);
        assert!(!OverlayRoot::global().contains(id));
    }
}
