#![forbid(unsafe_code)]

//! A bordered box with an optional title.

use shopfront_core::geometry::Rect;
use shopfront_render::cell::Cell;
use shopfront_render::frame::Frame;
use shopfront_render::style::Style;

use crate::{Widget, draw_text_span, set_style_area, text_width};

/// Horizontal placement of a title or text line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

impl Alignment {
    /// X offset for content of `content_width` inside `available` columns.
    pub(crate) fn offset(self, content_width: u16, available: u16) -> u16 {
        let slack = available.saturating_sub(content_width);
        match self {
            Self::Left => 0,
            Self::Center => slack / 2,
            Self::Right => slack,
        }
    }
}

const TOP_LEFT: char = '┌';
const TOP_RIGHT: char = '┐';
const BOTTOM_LEFT: char = '└';
const BOTTOM_RIGHT: char = '┘';
const HORIZONTAL: char = '─';
const VERTICAL: char = '│';

#[derive(Debug, Clone, Default)]
pub struct Block<'a> {
    bordered: bool,
    title: Option<&'a str>,
    title_alignment: Alignment,
    style: Style,
    border_style: Style,
}

impl<'a> Block<'a> {
    /// A block with borders on all sides.
    pub fn bordered() -> Self {
        Self {
            bordered: true,
            ..Self::default()
        }
    }

    pub fn title(mut self, title: &'a str) -> Self {
        self.title = Some(title);
        self
    }

    pub fn title_alignment(mut self, alignment: Alignment) -> Self {
        self.title_alignment = alignment;
        self
    }

    /// Style for the whole area (background fill).
    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn border_style(mut self, style: Style) -> Self {
        self.border_style = style;
        self
    }

    /// Area left for content inside the borders.
    pub fn inner(&self, area: Rect) -> Rect {
        if self.bordered {
            area.inset(1)
        } else {
            area
        }
    }

    fn render_borders(&self, area: Rect, frame: &mut Frame) {
        if area.width < 2 || area.height < 2 {
            return;
        }
        let (left, top) = (area.x, area.y);
        let (right, bottom) = (area.right() - 1, area.bottom() - 1);
        let mut put = |x: u16, y: u16, ch: char| {
            let mut cell = Cell::from_char(ch);
            self.style.apply(&mut cell);
            self.border_style.apply(&mut cell);
            frame.buffer.set(x, y, cell);
        };
        for x in left + 1..right {
            put(x, top, HORIZONTAL);
            put(x, bottom, HORIZONTAL);
        }
        for y in top + 1..bottom {
            put(left, y, VERTICAL);
            put(right, y, VERTICAL);
        }
        put(left, top, TOP_LEFT);
        put(right, top, TOP_RIGHT);
        put(left, bottom, BOTTOM_LEFT);
        put(right, bottom, BOTTOM_RIGHT);
    }
}

impl Widget for Block<'_> {
    fn render(&self, area: Rect, frame: &mut Frame) {
        if area.is_empty() {
            return;
        }

        // Clear what was underneath so the block is opaque.
        let mut blank = Cell::default();
        self.style.apply(&mut blank);
        frame.buffer.fill(area, blank);
        set_style_area(&mut frame.buffer, area, self.style);

        if !self.bordered {
            return;
        }
        self.render_borders(area, frame);

        if let Some(title) = self.title {
            let available = area.width.saturating_sub(4);
            if available == 0 {
                return;
            }
            let label = format!(" {title} ");
            let width = text_width(&label).min(available + 2);
            let x = area.x + 1 + self.title_alignment.offset(width, area.width - 2);
            let style = self.style.merge(&self.border_style).bold();
            draw_text_span(frame, x, area.y, &label, style, area.right() - 1);
        }
    }

    fn desired_height(&self, _width: u16) -> u16 {
        if self.bordered { 2 } else { 0 }
    }
}
