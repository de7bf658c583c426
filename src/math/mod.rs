//! Mathematical utilities and data structures

pub mod curve;
pub mod grid;
pub mod rect;

pub use curve::HeightCurve;
pub use grid::Grid;
pub use rect::Rect;
