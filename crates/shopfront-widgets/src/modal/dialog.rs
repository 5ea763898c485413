#![forbid(unsafe_code)]

//! The dialog drawn inside a modal: header, optional content, footer.
//!
//! ```text
//! ┌──────────────────────────────┐
//! │ Confirm order              × │  header: title + close affordance
//! │                              │
//! │ 3 items, $42.00              │  content (optional)
//! │                              │
//! │     [ Cancel ]  [ Place ]    │  footer: default buttons or custom widget
//! └──────────────────────────────┘
//! ```
//!
//! The dialog only draws and registers hit regions; deciding what a click or
//! key press means is the overlay host's job.

use std::fmt;
use std::rc::Rc;

use shopfront_core::geometry::Rect;
use shopfront_render::frame::{Frame, HitData, HitId, HitRegion};
use shopfront_render::style::Style;

use crate::block::Block;
use crate::{Widget, draw_text_span, text_width};

/// Hit region for the footer buttons. The hit data is a [`FooterAction`].
pub const DIALOG_HIT_BUTTON: HitRegion = HitRegion::Custom(10);
/// Hit region for the header close affordance.
pub const DIALOG_HIT_CLOSE: HitRegion = HitRegion::Custom(11);

const CLOSE_GLYPH: &str = "×";
const BUTTON_GAP: u16 = 2;

/// What a default footer button does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FooterAction {
    Confirm,
    Cancel,
}

impl FooterAction {
    /// Value stored as [`HitData`] for this button.
    pub const fn hit_data(self) -> HitData {
        match self {
            Self::Confirm => 0,
            Self::Cancel => 1,
        }
    }

    pub const fn from_hit_data(data: HitData) -> Option<Self> {
        match data {
            0 => Some(Self::Confirm),
            1 => Some(Self::Cancel),
            _ => None,
        }
    }
}

/// A footer button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogButton {
    pub label: String,
    pub disabled: bool,
}

impl DialogButton {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            disabled: false,
        }
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    fn text(&self) -> String {
        format!("[ {} ]", self.label)
    }

    /// Width including the brackets.
    pub fn display_width(&self) -> u16 {
        text_width(&self.label).saturating_add(4)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DialogStyle {
    pub surface: Style,
    pub border: Style,
    pub title: Style,
    pub close: Style,
    pub button: Style,
    pub primary_button: Style,
    pub disabled_button: Style,
}

impl Default for DialogStyle {
    fn default() -> Self {
        Self {
            surface: Style::new(),
            border: Style::new(),
            title: Style::new().bold(),
            close: Style::new(),
            button: Style::new(),
            primary_button: Style::new().bold(),
            disabled_button: Style::new().dim(),
        }
    }
}

/// Everything the dialog shows.
#[derive(Clone)]
pub struct DialogParts {
    pub title: String,
    pub content: Option<Rc<dyn Widget>>,
    /// Replaces the default confirm/cancel buttons when set.
    pub footer: Option<Rc<dyn Widget>>,
    pub confirm: DialogButton,
    pub cancel: DialogButton,
}

impl DialogParts {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: None,
            footer: None,
            confirm: DialogButton::new("OK"),
            cancel: DialogButton::new("Cancel"),
        }
    }
}

impl fmt::Debug for DialogParts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialogParts")
            .field("title", &self.title)
            .field("content", &self.content.is_some())
            .field("footer", &self.footer.is_some())
            .field("confirm", &self.confirm)
            .field("cancel", &self.cancel)
            .finish()
    }
}

/// Renders [`DialogParts`] into the modal's content rectangle.
pub struct Dialog<'a> {
    parts: &'a DialogParts,
    style: &'a DialogStyle,
    hit_id: Option<HitId>,
}

impl<'a> Dialog<'a> {
    pub fn new(parts: &'a DialogParts, style: &'a DialogStyle) -> Self {
        Self {
            parts,
            style,
            hit_id: None,
        }
    }

    pub fn hit_id(mut self, id: HitId) -> Self {
        self.hit_id = Some(id);
        self
    }

    fn block(&self) -> Block<'static> {
        Block::bordered()
            .style(self.style.surface)
            .border_style(self.style.border)
    }

    /// Inner area minus one column of padding on each side.
    fn body(&self, area: Rect) -> Rect {
        let inner = self.block().inner(area);
        Rect::new(
            inner.x.saturating_add(1),
            inner.y,
            inner.width.saturating_sub(2),
            inner.height,
        )
    }

    fn footer_height(&self, width: u16) -> u16 {
        match &self.parts.footer {
            Some(footer) => footer.desired_height(width),
            None => 1,
        }
    }

    fn render_header(&self, row: Rect, frame: &mut Frame) {
        let close_x = row.right().saturating_sub(text_width(CLOSE_GLYPH));
        draw_text_span(
            frame,
            row.x,
            row.y,
            &self.parts.title,
            self.style.surface.merge(&self.style.title),
            close_x.saturating_sub(1),
        );
        draw_text_span(
            frame,
            close_x,
            row.y,
            CLOSE_GLYPH,
            self.style.surface.merge(&self.style.close),
            row.right(),
        );
        if let Some(hit_id) = self.hit_id {
            frame.register_hit(
                Rect::new(close_x, row.y, text_width(CLOSE_GLYPH), 1),
                hit_id,
                DIALOG_HIT_CLOSE,
                0,
            );
        }
    }

    fn render_buttons(&self, row: Rect, frame: &mut Frame) {
        let buttons = [
            (FooterAction::Cancel, &self.parts.cancel),
            (FooterAction::Confirm, &self.parts.confirm),
        ];
        let total = buttons
            .iter()
            .map(|(_, button)| button.display_width())
            .fold(BUTTON_GAP * (buttons.len() as u16 - 1), u16::saturating_add);

        let mut x = row.x + row.width.saturating_sub(total) / 2;
        for (action, button) in buttons {
            if x >= row.right() {
                break;
            }
            let style = if button.disabled {
                self.style.disabled_button
            } else if action == FooterAction::Confirm {
                self.style.primary_button
            } else {
                self.style.button
            };
            let end = draw_text_span(
                frame,
                x,
                row.y,
                &button.text(),
                self.style.surface.merge(&style),
                row.right(),
            );
            if let Some(hit_id) = self.hit_id {
                frame.register_hit(
                    Rect::new(x, row.y, end - x, 1),
                    hit_id,
                    DIALOG_HIT_BUTTON,
                    action.hit_data(),
                );
            }
            x = end.saturating_add(BUTTON_GAP);
        }
    }
}

impl Widget for Dialog<'_> {
    fn render(&self, area: Rect, frame: &mut Frame) {
        if area.is_empty() {
            return;
        }
        let _span = tracing::debug_span!(
            "widget_render",
            widget = "Dialog",
            x = area.x,
            y = area.y,
            w = area.width,
            h = area.height
        )
        .entered();

        self.block().render(area, frame);

        let body = self.body(area);
        if body.is_empty() {
            return;
        }

        self.render_header(body.row(0), frame);
        let mut y = body.y + 1;

        if let Some(content) = &self.parts.content {
            y = y.saturating_add(1);
            let height = content
                .desired_height(body.width)
                .min(body.bottom().saturating_sub(y));
            content.render(Rect::new(body.x, y, body.width, height), frame);
            y = y.saturating_add(height);
        }

        y = y.saturating_add(1);
        if y >= body.bottom() {
            return;
        }
        let footer = Rect::new(body.x, y, body.width, body.bottom() - y);
        match &self.parts.footer {
            Some(widget) => widget.render(footer, frame),
            None => self.render_buttons(footer.row(0), frame),
        }
    }

    fn desired_height(&self, width: u16) -> u16 {
        let body_width = width.saturating_sub(4);
        let content = self
            .parts
            .content
            .as_ref()
            .map_or(0, |content| content.desired_height(body_width).saturating_add(1));
        // Borders, header, content, gap, footer.
        2u16.saturating_add(1)
            .saturating_add(content)
            .saturating_add(1)
            .saturating_add(self.footer_height(body_width))
    }
}
