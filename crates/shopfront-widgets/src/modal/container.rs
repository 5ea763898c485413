#![forbid(unsafe_code)]

//! Modal container widget with backdrop, positioning, and size constraints.
//!
//! This widget renders:
//! 1) a full-screen backdrop (tinted overlay), then
//! 2) the content widget in a positioned rectangle.
//!
//! With a hit id set it registers a backdrop region over the whole area and a
//! content region over the content rectangle. The content region is registered
//! after the backdrop and before the content renders, so clicks inside the
//! content never resolve to the backdrop, and regions the content registers
//! itself (buttons) shadow the generic content region.

use shopfront_core::dimension::Dimension;
use shopfront_core::geometry::{Rect, Size};
use shopfront_render::cell::PackedRgba;
use shopfront_render::frame::{Frame, HitId, HitRegion};
use shopfront_render::style::Style;

use crate::{Widget, set_style_area};

/// Hit region tag for the modal backdrop.
pub const MODAL_HIT_BACKDROP: HitRegion = HitRegion::Custom(1);
/// Hit region tag for the modal content.
pub const MODAL_HIT_CONTENT: HitRegion = HitRegion::Custom(2);

/// Backdrop configuration (color + opacity).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackdropConfig {
    /// Backdrop color (alpha will be scaled by `opacity`).
    pub color: PackedRgba,
    /// Opacity in `[0.0, 1.0]`.
    pub opacity: f32,
}

impl BackdropConfig {
    pub fn new(color: PackedRgba, opacity: f32) -> Self {
        Self { color, opacity }
    }

    pub fn color(mut self, color: PackedRgba) -> Self {
        self.color = color;
        self
    }

    pub fn opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }
}

impl Default for BackdropConfig {
    fn default() -> Self {
        Self {
            color: PackedRgba::rgb(0, 0, 0),
            opacity: 0.6,
        }
    }
}

/// Modal size constraints.
///
/// Widths are [`Dimension`]s so callers can ask for "at least 40 columns" or
/// "at most 80% of the screen"; heights are plain rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModalSizeConstraints {
    pub min_width: Option<Dimension>,
    pub max_width: Option<Dimension>,
    pub min_height: Option<u16>,
    pub max_height: Option<u16>,
}

impl ModalSizeConstraints {
    /// Create an unconstrained size spec.
    pub const fn new() -> Self {
        Self {
            min_width: None,
            max_width: None,
            min_height: None,
            max_height: None,
        }
    }

    pub fn min_width(mut self, value: impl Into<Dimension>) -> Self {
        self.min_width = Some(value.into());
        self
    }

    pub fn max_width(mut self, value: impl Into<Dimension>) -> Self {
        self.max_width = Some(value.into());
        self
    }

    pub fn min_height(mut self, value: u16) -> Self {
        self.min_height = Some(value);
        self
    }

    pub fn max_height(mut self, value: u16) -> Self {
        self.max_height = Some(value);
        self
    }

    /// Fit `preferred` to these constraints, never exceeding `available`.
    ///
    /// When a minimum and a maximum disagree the minimum wins.
    pub fn clamp(self, preferred: Size, available: Size) -> Size {
        let mut width = preferred.width.min(available.width);
        let mut height = preferred.height.min(available.height);

        if let Some(max_width) = self.max_width {
            width = width.min(max_width.resolve(available.width));
        }
        if let Some(max_height) = self.max_height {
            height = height.min(max_height);
        }
        if let Some(min_width) = self.min_width {
            width = width
                .max(min_width.resolve(available.width))
                .min(available.width);
        }
        if let Some(min_height) = self.min_height {
            height = height.max(min_height).min(available.height);
        }

        Size::new(width, height)
    }
}

/// Modal positioning options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModalPosition {
    #[default]
    Center,
    CenterOffset {
        x: i16,
        y: i16,
    },
    TopCenter {
        margin: u16,
    },
    Custom {
        x: u16,
        y: u16,
    },
}

impl ModalPosition {
    fn resolve(self, area: Rect, size: Size) -> Rect {
        let base_x = i32::from(area.x);
        let base_y = i32::from(area.y);
        let slack_x = i32::from(area.width) - i32::from(size.width);
        let slack_y = i32::from(area.height) - i32::from(size.height);

        let (x, y) = match self {
            Self::Center => (base_x + slack_x / 2, base_y + slack_y / 2),
            Self::CenterOffset { x, y } => (
                base_x + slack_x / 2 + i32::from(x),
                base_y + slack_y / 2 + i32::from(y),
            ),
            Self::TopCenter { margin } => (base_x + slack_x / 2, base_y + i32::from(margin)),
            Self::Custom { x, y } => (i32::from(x), i32::from(y)),
        };

        let x = x.clamp(base_x, base_x + slack_x.max(0));
        let y = y.clamp(base_y, base_y + slack_y.max(0));

        Rect::new(x as u16, y as u16, size.width, size.height)
    }
}

/// Modal container widget.
///
/// Invariants:
/// - `content_rect()` is always clamped within the given `area`.
/// - Size constraints are applied before positioning and never exceed `area`.
///
/// If the available `area` is empty or constraints clamp to zero size, the
/// content is not rendered.
#[derive(Debug, Clone)]
pub struct Modal<C> {
    content: C,
    position: ModalPosition,
    backdrop: BackdropConfig,
    size: ModalSizeConstraints,
    preferred_width: Option<u16>,
    hit_id: Option<HitId>,
}

impl<C: Widget> Modal<C> {
    pub fn new(content: C) -> Self {
        Self {
            content,
            position: ModalPosition::Center,
            backdrop: BackdropConfig::default(),
            size: ModalSizeConstraints::default(),
            preferred_width: None,
            hit_id: None,
        }
    }

    pub fn position(mut self, position: ModalPosition) -> Self {
        self.position = position;
        self
    }

    pub fn backdrop(mut self, backdrop: BackdropConfig) -> Self {
        self.backdrop = backdrop;
        self
    }

    pub fn size(mut self, size: ModalSizeConstraints) -> Self {
        self.size = size;
        self
    }

    /// Width the content would like before constraints apply. Without one
    /// the content takes the full width of the area.
    pub fn preferred_width(mut self, width: u16) -> Self {
        self.preferred_width = Some(width);
        self
    }

    /// Set the hit id used for backdrop/content hit regions.
    pub fn hit_id(mut self, id: HitId) -> Self {
        self.hit_id = Some(id);
        self
    }

    /// Compute the content rectangle for the given area.
    pub fn content_rect(&self, area: Rect) -> Rect {
        let available = area.size();
        let width = self
            .size
            .clamp(
                Size::new(self.preferred_width.unwrap_or(area.width), 0),
                available,
            )
            .width;
        let preferred = Size::new(width, self.content.desired_height(width));
        let size = self.size.clamp(preferred, available);
        if size.is_empty() {
            return Rect::new(area.x, area.y, 0, 0);
        }
        self.position.resolve(area, size)
    }
}

impl<C: Widget> Widget for Modal<C> {
    fn render(&self, area: Rect, frame: &mut Frame) {
        if area.is_empty() {
            return;
        }

        // Backdrop (full area), preserving existing glyphs.
        let opacity = self.backdrop.opacity.clamp(0.0, 1.0);
        if opacity > 0.0 {
            let bg = self.backdrop.color.with_opacity(opacity);
            set_style_area(&mut frame.buffer, area, Style::new().bg(bg));
        }

        let content_area = self.content_rect(area);

        if let Some(hit_id) = self.hit_id {
            frame.register_hit(area, hit_id, MODAL_HIT_BACKDROP, 0);
            if !content_area.is_empty() {
                frame.register_hit(content_area, hit_id, MODAL_HIT_CONTENT, 0);
            }
        }

        if !content_area.is_empty() {
            self.content.render(content_area, frame);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopfront_render::frame::Frame;

    /// Content that asks for a fixed number of rows.
    #[derive(Debug, Clone)]
    struct Stub(u16);

    impl Widget for Stub {
        fn render(&self, _area: Rect, _frame: &mut Frame) {}

        fn desired_height(&self, _width: u16) -> u16 {
            self.0
        }
    }

    fn fixed(width: u16, height: u16) -> ModalSizeConstraints {
        ModalSizeConstraints::new()
            .min_width(width)
            .max_width(width)
            .min_height(height)
            .max_height(height)
    }

    #[test]
    fn center_positioning() {
        let modal = Modal::new(Stub(4)).size(fixed(10, 4));
        let rect = modal.content_rect(Rect::new(0, 0, 40, 20));
        assert_eq!(rect, Rect::new(15, 8, 10, 4));
    }

    #[test]
    fn offset_positioning() {
        let modal = Modal::new(Stub(4))
            .size(fixed(10, 4))
            .position(ModalPosition::CenterOffset { x: -2, y: 3 });
        let rect = modal.content_rect(Rect::new(0, 0, 40, 20));
        assert_eq!(rect, Rect::new(13, 11, 10, 4));
    }

    #[test]
    fn height_follows_content() {
        let modal = Modal::new(Stub(7)).preferred_width(20);
        let rect = modal.content_rect(Rect::new(0, 0, 40, 20));
        assert_eq!((rect.width, rect.height), (20, 7));
    }

    #[test]
    fn size_constraints_respect_available() {
        let modal = Modal::new(Stub(12)).size(
            ModalSizeConstraints::new()
                .min_width(Dimension::Cells(10))
                .max_width(Dimension::Cells(30))
                .min_height(6)
                .max_height(20),
        );
        let rect = modal.content_rect(Rect::new(0, 0, 8, 4));
        assert_eq!(rect.width, 8);
        assert_eq!(rect.height, 4);
    }

    #[test]
    fn percent_widths_resolve_against_area() {
        let constraints = ModalSizeConstraints::new()
            .min_width(Dimension::Percent(50))
            .max_width(Dimension::Percent(80));
        let available = Size::new(100, 30);
        assert_eq!(constraints.clamp(Size::new(20, 5), available).width, 50);
        assert_eq!(constraints.clamp(Size::new(95, 5), available).width, 80);
        assert_eq!(constraints.clamp(Size::new(60, 5), available).width, 60);
    }

    #[test]
    fn min_wins_over_max() {
        let constraints = ModalSizeConstraints::new()
            .min_width(Dimension::Cells(40))
            .max_width(Dimension::Cells(20));
        assert_eq!(
            constraints.clamp(Size::new(30, 1), Size::new(80, 10)).width,
            40
        );
    }

    #[test]
    fn hit_regions_registered() {
        let modal = Modal::new(Stub(3)).size(fixed(6, 3)).hit_id(HitId::new(7));

        let mut frame = Frame::with_hit_grid(20, 10);
        let area = Rect::new(0, 0, 20, 10);
        modal.render(area, &mut frame);

        assert_eq!(
            frame.hit_test(0, 0),
            Some((HitId::new(7), MODAL_HIT_BACKDROP, 0))
        );

        let content = modal.content_rect(area);
        assert_eq!(
            frame.hit_test(content.x + 1, content.y + 1),
            Some((HitId::new(7), MODAL_HIT_CONTENT, 0))
        );
    }

    #[test]
    fn backdrop_tints_page() {
        let modal = Modal::new(Stub(1))
            .size(fixed(2, 1))
            .backdrop(BackdropConfig::new(PackedRgba::BLACK, 0.5));
        let mut frame = Frame::new(6, 3);
        modal.render(frame.area(), &mut frame);
        let cell = frame.buffer.get(0, 0).copied().unwrap_or_default();
        assert_eq!(cell.bg, PackedRgba::BLACK.with_opacity(0.5));
    }

    #[test]
    fn zero_opacity_leaves_page_untouched() {
        let modal = Modal::new(Stub(1)).backdrop(BackdropConfig::default().opacity(0.0));
        let mut frame = Frame::new(6, 3);
        modal.render(frame.area(), &mut frame);
        let cell = frame.buffer.get(0, 0).copied().unwrap_or_default();
        assert_eq!(cell.bg, PackedRgba::TRANSPARENT);
    }

    #[test]
    fn content_rect_within_bounds_for_positions() {
        let base_constraints = ModalSizeConstraints::new()
            .min_width(Dimension::Cells(2))
            .min_height(2)
            .max_width(Dimension::Cells(30))
            .max_height(10);
        let positions = [
            ModalPosition::Center,
            ModalPosition::CenterOffset { x: 3, y: -2 },
            ModalPosition::TopCenter { margin: 1 },
            ModalPosition::Custom { x: 100, y: 100 },
        ];
        let areas = [
            Rect::new(0, 0, 10, 6),
            Rect::new(2, 3, 40, 20),
            Rect::new(5, 1, 8, 4),
        ];

        for area in areas {
            for &position in &positions {
                let modal = Modal::new(Stub(8)).size(base_constraints).position(position);
                let rect = modal.content_rect(area);
                if rect.is_empty() {
                    continue;
                }
                assert!(rect.x >= area.x);
                assert!(rect.y >= area.y);
                assert!(rect.right() <= area.right());
                assert!(rect.bottom() <= area.bottom());
            }
        }
    }
}
