//! Triangulation of surface draw commands
//!
//! Output stays in surface pixel space; the pipeline maps it to NDC.

use glam::Vec2;
use std::f32::consts::TAU;

use super::vertex::Vertex;
use crate::sim::collision::Rect;
use crate::surface::{Color, DrawCommand, Surface};

/// Segments used for a circle of radius `r` (small bullets stay cheap)
fn circle_segments(radius: f32) -> u32 {
    ((radius * 2.0) as u32).clamp(8, 48)
}

fn push_triangle(out: &mut Vec<Vertex>, a: Vec2, b: Vec2, c: Vec2, color: Color) {
    out.push(Vertex::new(a.x, a.y, color));
    out.push(Vertex::new(b.x, b.y, color));
    out.push(Vertex::new(c.x, c.y, color));
}

/// Two triangles for an axis-aligned rectangle
pub fn rect(out: &mut Vec<Vertex>, r: &Rect, color: Color) {
    let tl = Vec2::new(r.x, r.y);
    let tr = Vec2::new(r.right(), r.y);
    let bl = Vec2::new(r.x, r.bottom());
    let br = Vec2::new(r.right(), r.bottom());
    push_triangle(out, tl, bl, tr, color);
    push_triangle(out, tr, bl, br, color);
}

/// Triangle fan around the centre
pub fn circle(out: &mut Vec<Vertex>, center: Vec2, radius: f32, color: Color) {
    let segments = circle_segments(radius);
    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * TAU;
        let theta2 = ((i + 1) as f32 / segments as f32) * TAU;
        push_triangle(
            out,
            center,
            center + Vec2::from_angle(theta1) * radius,
            center + Vec2::from_angle(theta2) * radius,
            color,
        );
    }
}

/// Fan from the first point; correct for convex paths
pub fn polygon(out: &mut Vec<Vertex>, points: &[Vec2], color: Color) {
    if let Some((&first, rest)) = points.split_first() {
        for pair in rest.windows(2) {
            push_triangle(out, first, pair[0], pair[1], color);
        }
    }
}

/// A segment thickened into a quad
pub fn line(out: &mut Vec<Vertex>, from: Vec2, to: Vec2, width: f32, color: Color) {
    let dir = (to - from).normalize_or_zero();
    if dir == Vec2::ZERO {
        return;
    }
    let perp = dir.perp() * (width / 2.0);
    let (a, b) = (from + perp, from - perp);
    let (c, d) = (to + perp, to - perp);
    push_triangle(out, a, b, c, color);
    push_triangle(out, c, b, d, color);
}

/// Every command on the surface, in draw order
pub fn tessellate(surface: &Surface) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity(surface.commands().len() * 6);
    for command in surface.commands() {
        match command {
            DrawCommand::Rect { rect: r, color } => rect(&mut vertices, r, *color),
            DrawCommand::Circle {
                center,
                radius,
                color,
            } => circle(&mut vertices, *center, *radius, *color),
            DrawCommand::Polygon { points, color } => polygon(&mut vertices, points, *color),
            DrawCommand::Line {
                from,
                to,
                width,
                color,
            } => line(&mut vertices, *from, *to, *width, *color),
        }
    }
    vertices
}
