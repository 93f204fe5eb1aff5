use crate::utils::scale_i16;
use otspec::types::*;

/// Represents a point inside a glyf::Contour
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct Point {
    /// x-coordinate
    pub x: int16,
    /// y-coordinate
    pub y: int16,
    /// Is this an on-curve point?
    pub on_curve: bool,
}

impl Point {
    /// Returns a new point with both coordinates multiplied by `factor`
    /// and rounded back onto the integer grid.
    pub fn scaled(&self, factor: f64) -> Point {
        Point {
            x: scale_i16(self.x, factor),
            y: scale_i16(self.y, factor),
            on_curve: self.on_curve,
        }
    }
}
