#![forbid(unsafe_code)]

//! Core primitives for the Shopfront UI: geometry, input events, and the
//! caller-facing [`Dimension`] used for size constraints.

pub mod dimension;
pub mod event;
pub mod geometry;

pub use dimension::Dimension;
