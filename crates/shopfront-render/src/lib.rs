#![forbid(unsafe_code)]

//! Render primitives for the Shopfront UI.
//!
//! Widgets draw into a [`frame::Frame`], which owns a [`buffer::Buffer`] of
//! [`cell::Cell`]s and an optional hit grid used to route pointer events back
//! to the region that was drawn last at a given cell.

pub mod buffer;
pub mod cell;
pub mod frame;
pub mod style;

pub use style::Style;
