#![forbid(unsafe_code)]

//! Widgets for the Shopfront UI.
//!
//! The interesting part of this crate is [`modal`]: the transition controller
//! that keeps an overlay mounted while its exit animation plays, and the
//! overlay host that renders a modal dialog into the document's overlay layer.
//! [`block`] and [`label`] are the small presentational pieces the dialog is
//! assembled from.

pub mod block;
pub mod label;
pub mod modal;

pub use block::Block;
pub use label::Label;

use shopfront_core::geometry::Rect;
use shopfront_render::buffer::Buffer;
use shopfront_render::cell::Cell;
use shopfront_render::frame::Frame;
use shopfront_render::style::Style;

/// A `Widget` is a renderable component.
///
/// Widgets render themselves into a `Frame` within a given `Rect`.
pub trait Widget {
    /// Render the widget into the frame at the given area.
    fn render(&self, area: Rect, frame: &mut Frame);

    /// Rows this widget wants when laid out at `width` columns.
    ///
    /// Containers that size themselves to their children (the modal dialog)
    /// use this; widgets that fill whatever they get can keep the default.
    fn desired_height(&self, _width: u16) -> u16 {
        1
    }
}

/// Apply a style to all cells in a rectangular area.
///
/// This modifies existing cells, preserving their content.
pub(crate) fn set_style_area(buf: &mut Buffer, area: Rect, style: Style) {
    if style.is_empty() {
        return;
    }
    for y in area.y..area.bottom() {
        for x in area.x..area.right() {
            if let Some(cell) = buf.get_mut(x, y) {
                style.apply(cell);
            }
        }
    }
}

/// Display width of `text` in cells.
pub(crate) fn text_width(text: &str) -> u16 {
    use unicode_width::UnicodeWidthStr;
    u16::try_from(UnicodeWidthStr::width(text)).unwrap_or(u16::MAX)
}

/// Draw a text span into a frame at the given position.
///
/// Returns the x position after the last drawn character.
/// Stops at `max_x` (exclusive); a wide glyph that would straddle `max_x` is
/// not drawn.
pub(crate) fn draw_text_span(
    frame: &mut Frame,
    mut x: u16,
    y: u16,
    content: &str,
    style: Style,
    max_x: u16,
) -> u16 {
    use unicode_segmentation::UnicodeSegmentation;
    use unicode_width::UnicodeWidthStr;

    for grapheme in content.graphemes(true) {
        if x >= max_x {
            break;
        }
        let w = UnicodeWidthStr::width(grapheme);
        if w == 0 {
            continue;
        }
        let w = w as u16;
        if x.saturating_add(w) > max_x {
            break;
        }
        let Some(ch) = grapheme.chars().next() else {
            continue;
        };

        let mut cell = Cell::from_char(ch);
        style.apply(&mut cell);
        frame.buffer.set(x, y, cell);
        for offset in 1..w {
            let mut tail = Cell::continuation();
            style.apply(&mut tail);
            frame.buffer.set(x + offset, y, tail);
        }

        x = x.saturating_add(w);
    }
    x
}
