#![forbid(unsafe_code)]

//! Partial cell styles.
//!
//! A [`Style`] only overrides the fields it sets; unset fields leave the
//! underlying cell untouched when applied.

use crate::cell::{Cell, PackedRgba, StyleFlags};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Style {
    pub fg: Option<PackedRgba>,
    pub bg: Option<PackedRgba>,
    pub attrs: Option<StyleFlags>,
}

impl Style {
    pub const fn new() -> Self {
        Self {
            fg: None,
            bg: None,
            attrs: None,
        }
    }

    pub const fn fg(mut self, color: PackedRgba) -> Self {
        self.fg = Some(color);
        self
    }

    pub const fn bg(mut self, color: PackedRgba) -> Self {
        self.bg = Some(color);
        self
    }

    fn with_flag(mut self, flag: StyleFlags) -> Self {
        self.attrs = Some(self.attrs.unwrap_or_default() | flag);
        self
    }

    pub fn bold(self) -> Self {
        self.with_flag(StyleFlags::BOLD)
    }

    pub fn dim(self) -> Self {
        self.with_flag(StyleFlags::DIM)
    }

    pub fn reverse(self) -> Self {
        self.with_flag(StyleFlags::REVERSE)
    }

    pub fn underline(self) -> Self {
        self.with_flag(StyleFlags::UNDERLINE)
    }

    /// Whether applying this style would change nothing.
    pub const fn is_empty(&self) -> bool {
        self.fg.is_none() && self.bg.is_none() && self.attrs.is_none()
    }

    /// Overlay `other` on top of `self`: fields set in `other` win and
    /// attribute flags are combined.
    pub fn merge(&self, other: &Style) -> Style {
        let attrs = match (self.attrs, other.attrs) {
            (Some(a), Some(b)) => Some(a | b),
            (a, b) => a.or(b),
        };
        Style {
            fg: other.fg.or(self.fg),
            bg: other.bg.or(self.bg),
            attrs,
        }
    }

    /// Apply the set fields to `cell`.
    pub fn apply(&self, cell: &mut Cell) {
        if let Some(fg) = self.fg {
            cell.fg = fg;
        }
        if let Some(bg) = self.bg {
            cell.bg = bg;
        }
        if let Some(attrs) = self.attrs {
            cell.attrs |= attrs;
        }
    }

    /// Whether the style carries `flag`.
    pub fn has(&self, flag: StyleFlags) -> bool {
        self.attrs.is_some_and(|attrs| attrs.contains(flag))
    }
}
