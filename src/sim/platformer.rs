//! Gravity platformer
//!
//! Horizontal velocity comes straight from the held direction key; vertical
//! velocity integrates gravity. Platforms are static for a run. Score is the
//! furthest distance reached to the right of the spawn point.

use glam::Vec2;

use super::collision::Rect;
use super::input::{InputEvent, Key};
use super::{EndReason, SimContext, Simulation};
use crate::surface::{Surface, colors};
use crate::tuning::PlatformerTuning;

#[derive(Debug, Clone)]
pub struct Runner {
    pub rect: Rect,
    /// px/s
    pub vel: Vec2,
    pub grounded: bool,
}

#[derive(Debug, Clone)]
pub struct Platformer {
    pub tuning: PlatformerTuning,
    pub player: Runner,
    pub platforms: Vec<Rect>,
}

impl Platformer {
    pub fn new(tuning: PlatformerTuning) -> Self {
        let player = Runner {
            rect: Rect::from_pos_size(tuning.spawn, tuning.player_size),
            vel: Vec2::ZERO,
            grounded: false,
        };
        let platforms = tuning.platforms.clone();
        Self {
            tuning,
            player,
            platforms,
        }
    }

    /// Snap onto a platform the player is descending into
    fn land(&mut self) {
        let player = &mut self.player;
        player.grounded = false;
        if player.vel.y < 0.0 {
            return;
        }
        for platform in &self.platforms {
            let foot = player.rect.bottom();
            let in_band =
                foot > platform.y && foot < platform.bottom() + self.tuning.landing_tolerance;
            if player.rect.overlaps_x(platform) && in_band {
                player.rect.y = platform.y - player.rect.h;
                player.vel.y = 0.0;
                player.grounded = true;
            }
        }
    }

    fn distance_points(&self) -> u64 {
        let travelled = self.player.rect.x - self.tuning.spawn.x;
        (travelled / self.tuning.distance_per_point).floor().max(0.0) as u64
    }
}

impl Simulation for Platformer {
    fn init(&mut self, _ctx: &mut SimContext<'_>) -> Option<EndReason> {
        self.player = Runner {
            rect: Rect::from_pos_size(self.tuning.spawn, self.tuning.player_size),
            vel: Vec2::ZERO,
            grounded: false,
        };
        self.platforms = self.tuning.platforms.clone();
        None
    }

    fn update(&mut self, dt: f32, ctx: &mut SimContext<'_>) -> Option<EndReason> {
        let player = &mut self.player;
        player.vel.y += self.tuning.gravity * dt;
        player.rect.x += player.vel.x * dt;
        player.rect.y += player.vel.y * dt;

        self.land();

        *ctx.score = (*ctx.score).max(self.distance_points());

        if self.player.rect.y > ctx.bounds.y {
            return Some(EndReason::Fell);
        }
        None
    }

    fn draw(&self, surface: &mut Surface) {
        surface.fill_rect(self.player.rect, colors::SAGE);
        for platform in &self.platforms {
            surface.fill_rect(*platform, colors::CHARCOAL);
        }
    }

    fn input(&mut self, event: &InputEvent, _ctx: &mut SimContext<'_>) -> Option<EndReason> {
        let run = self.tuning.run_speed;
        let player = &mut self.player;
        match event {
            InputEvent::KeyDown(Key::Left) => player.vel.x = -run,
            InputEvent::KeyDown(Key::Right) => player.vel.x = run,
            InputEvent::KeyDown(Key::Space | Key::Up) if player.grounded => {
                player.vel.y = self.tuning.jump_velocity;
                player.grounded = false;
            }
            // Releasing a direction only stops motion in that direction
            InputEvent::KeyUp(Key::Left) if player.vel.x < 0.0 => player.vel.x = 0.0,
            InputEvent::KeyUp(Key::Right) if player.vel.x > 0.0 => player.vel.x = 0.0,
            _ => {}
        }
        None
    }
}
