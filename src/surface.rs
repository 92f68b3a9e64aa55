//! Drawing surface adapter
//!
//! Simulations draw into a [`Surface`] as a list of 2D commands in pixel
//! space. The director clears it at the start of every tick; the host then
//! presents the list through whatever backend it has (see `renderer`).

use glam::Vec2;

use crate::sim::collision::Rect;

/// RGBA, components in 0..=1
pub type Color = [f32; 4];

/// Hub palette
pub mod colors {
    use super::Color;

    pub const BACKGROUND: Color = [0.96, 0.95, 0.92, 1.0];
    /// #8a9a7b
    pub const SAGE: Color = [0.541, 0.604, 0.482, 1.0];
    /// #b5a89b
    pub const SAND: Color = [0.710, 0.659, 0.608, 1.0];
    /// #7b7fa3
    pub const SLATE: Color = [0.482, 0.498, 0.639, 1.0];
    /// #c4a882
    pub const OCHRE: Color = [0.769, 0.659, 0.510, 1.0];
    /// #444
    pub const CHARCOAL: Color = [0.267, 0.267, 0.267, 1.0];
    /// #333
    pub const INK: Color = [0.2, 0.2, 0.2, 1.0];
    /// #777
    pub const STONE: Color = [0.467, 0.467, 0.467, 1.0];
    /// #e67e22
    pub const EMBER: Color = [0.902, 0.494, 0.133, 1.0];
    pub const GRID_LINE: Color = [0.0, 0.0, 0.0, 0.08];
}

/// One primitive recorded on the surface
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Rect {
        rect: Rect,
        color: Color,
    },
    Circle {
        center: Vec2,
        radius: f32,
        color: Color,
    },
    /// Filled convex path
    Polygon {
        points: Vec<Vec2>,
        color: Color,
    },
    /// Stroked segment
    Line {
        from: Vec2,
        to: Vec2,
        width: f32,
        color: Color,
    },
}

/// Pixel-sized drawing target
#[derive(Debug, Clone)]
pub struct Surface {
    width: u32,
    height: u32,
    clear_color: Color,
    commands: Vec<DrawCommand>,
}

impl Surface {
    /// Dimensions are clamped to at least one pixel
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            clear_color: colors::BACKGROUND,
            commands: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Size as a float vector, the form simulations use for bounds
    pub fn extent(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    pub fn clear_color(&self) -> Color {
        self.clear_color
    }

    /// Returns true when the dimensions actually changed
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        let (width, height) = (width.max(1), height.max(1));
        if (width, height) == (self.width, self.height) {
            return false;
        }
        self.width = width;
        self.height = height;
        true
    }

    /// Drop everything drawn so far
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::Rect { rect, color });
    }

    pub fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            color,
        });
    }

    /// Paths with fewer than three points have no area and are skipped
    pub fn fill_polygon(&mut self, points: Vec<Vec2>, color: Color) {
        if points.len() >= 3 {
            self.commands.push(DrawCommand::Polygon { points, color });
        }
    }

    pub fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            width,
            color,
        });
    }
}
