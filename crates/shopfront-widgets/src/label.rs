#![forbid(unsafe_code)]

//! Multi-line text.
//!
//! Lines are split on `\n` and never wrapped; text past the right edge of the
//! area is clipped.

use shopfront_core::geometry::Rect;
use shopfront_render::frame::Frame;
use shopfront_render::style::Style;

use crate::block::Alignment;
use crate::{Widget, draw_text_span, text_width};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Label {
    text: String,
    style: Style,
    alignment: Alignment,
}

impl Label {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Widest line, in cells.
    pub fn width(&self) -> u16 {
        self.text.lines().map(text_width).max().unwrap_or(0)
    }
}

impl Widget for Label {
    fn render(&self, area: Rect, frame: &mut Frame) {
        if area.is_empty() {
            return;
        }
        for (row, line) in (0..area.height).zip(self.text.lines()) {
            let x = area.x + self.alignment.offset(text_width(line), area.width);
            draw_text_span(frame, x, area.y + row, line, self.style, area.right());
        }
    }

    fn desired_height(&self, _width: u16) -> u16 {
        u16::try_from(self.text.lines().count()).unwrap_or(u16::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_each_line() {
        let mut frame = Frame::new(12, 3);
        Label::new("Subtotal\nShipping").render(frame.area(), &mut frame);
        assert_eq!(frame.buffer.to_lines(), vec!["Subtotal", "Shipping", ""]);
    }

    #[test]
    fn clips_to_area() {
        let mut frame = Frame::new(10, 2);
        Label::new("one\ntwo\nthree").render(Rect::new(0, 0, 2, 2), &mut frame);
        assert_eq!(frame.buffer.to_lines(), vec!["on", "tw"]);
    }

    #[test]
    fn right_alignment() {
        let mut frame = Frame::new(8, 1);
        Label::new("$12")
            .alignment(Alignment::Right)
            .render(frame.area(), &mut frame);
        assert_eq!(frame.buffer.row_text(0), "     $12");
    }

    #[test]
    fn measures_lines() {
        let label = Label::new("Order total\n$42.00");
        assert_eq!(label.desired_height(20), 2);
        assert_eq!(label.width(), 11);
        assert_eq!(Label::new("").desired_height(20), 0);
    }
}
