//! Collision primitives shared by the simulations
//!
//! Everything here works in surface pixel space with y pointing down.
//! Overlap tests are strict: rectangles that only share an edge do not touch.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle (top-left origin)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self::new(pos.x, pos.y, size.x, size.y)
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Strict AABB overlap
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Strict overlap of the horizontal extents only
    pub fn overlaps_x(&self, other: &Rect) -> bool {
        self.x < other.right() && self.right() > other.x
    }
}

/// Centre-distance hit test
#[inline]
pub fn within_radius(a: Vec2, b: Vec2, radius: f32) -> bool {
    a.distance_squared(b) < radius * radius
}

/// True when a point lies outside `[0, bounds.x] × [0, bounds.y]`
#[inline]
pub fn outside_bounds(point: Vec2, bounds: Vec2) -> bool {
    point.x < 0.0 || point.x > bounds.x || point.y < 0.0 || point.y > bounds.y
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.overlaps(&Rect::new(5.0, 5.0, 10.0, 10.0)));
        assert!(!a.overlaps(&Rect::new(20.0, 0.0, 10.0, 10.0)));
    }

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(!a.overlaps(&Rect::new(10.0, 0.0, 10.0, 10.0)));
        assert!(!a.overlaps(&Rect::new(0.0, 10.0, 10.0, 10.0)));
    }

    #[test]
    fn test_overlaps_x_ignores_vertical() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.overlaps_x(&Rect::new(5.0, 500.0, 10.0, 10.0)));
    }

    #[test]
    fn test_within_radius() {
        assert!(within_radius(Vec2::ZERO, Vec2::new(3.0, 4.0), 5.1));
        assert!(!within_radius(Vec2::ZERO, Vec2::new(3.0, 4.0), 5.0));
    }

    #[test]
    fn test_outside_bounds() {
        let bounds = Vec2::new(100.0, 50.0);
        assert!(!outside_bounds(Vec2::new(50.0, 25.0), bounds));
        assert!(outside_bounds(Vec2::new(-1.0, 25.0), bounds));
        assert!(outside_bounds(Vec2::new(50.0, 51.0), bounds));
    }
}
