#![forbid(unsafe_code)]

//! Frames: a buffer plus an optional hit grid.
//!
//! Widgets register hit regions while rendering. The hit grid keeps, for each
//! cell, the region registered last, so a region drawn on top of another
//! (modal content over its backdrop) shadows it for pointer routing.

use shopfront_core::geometry::Rect;

use crate::buffer::Buffer;

/// Identifies the widget instance that owns a hit region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HitId(u32);

impl HitId {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn id(self) -> u32 {
        self.0
    }
}

/// Which part of a widget was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HitRegion {
    Content,
    Button,
    Custom(u8),
}

/// Free-form payload attached to a hit region (e.g. a button index).
pub type HitData = u64;

type HitEntry = (HitId, HitRegion, HitData);

pub struct Frame {
    pub buffer: Buffer,
    hit_grid: Option<Vec<Option<HitEntry>>>,
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.buffer.width())
            .field("height", &self.buffer.height())
            .field("hit_grid", &self.hit_grid.is_some())
            .finish()
    }
}

impl Frame {
    /// A frame without hit testing.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            buffer: Buffer::new(width, height),
            hit_grid: None,
        }
    }

    /// A frame that records hit regions.
    pub fn with_hit_grid(width: u16, height: u16) -> Self {
        Self {
            buffer: Buffer::new(width, height),
            hit_grid: Some(vec![None; width as usize * height as usize]),
        }
    }

    #[inline]
    pub fn area(&self) -> Rect {
        self.buffer.area()
    }

    /// Record `region` for every cell of `area` (clipped to the frame).
    ///
    /// No-op when the frame has no hit grid.
    pub fn register_hit(&mut self, area: Rect, id: HitId, region: HitRegion, data: HitData) {
        let bounds = self.buffer.area();
        let width = bounds.width as usize;
        let Some(grid) = self.hit_grid.as_mut() else {
            return;
        };
        let area = area.intersection(&bounds);
        #[cfg(feature = "tracing")]
        tracing::trace!(
            hit_id = id.id(),
            ?region,
            x = area.x,
            y = area.y,
            w = area.width,
            h = area.height,
            "register hit region"
        );
        for y in area.y..area.bottom() {
            for x in area.x..area.right() {
                grid[y as usize * width + x as usize] = Some((id, region, data));
            }
        }
    }

    /// The region registered last at `(x, y)`, if any.
    pub fn hit_test(&self, x: u16, y: u16) -> Option<(HitId, HitRegion, HitData)> {
        let grid = self.hit_grid.as_ref()?;
        if !self.buffer.area().contains(x, y) {
            return None;
        }
        grid[y as usize * self.buffer.width() as usize + x as usize]
    }

    /// Forget all hit regions (keeps the grid enabled).
    pub fn clear_hits(&mut self) {
        if let Some(grid) = self.hit_grid.as_mut() {
            grid.iter_mut().for_each(|entry| *entry = None);
        }
    }
}
