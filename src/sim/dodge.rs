//! Side-scrolling dodger
//!
//! The player hangs at a fixed x under gravity and flaps upward; obstacles
//! scroll in from the right edge and score when they leave on the left.

use glam::Vec2;
use rand::Rng;

use super::collision::Rect;
use super::input::InputEvent;
use super::{EndReason, SimContext, Simulation};
use crate::surface::{Surface, colors};
use crate::tuning::DodgeTuning;

/// The flapping player
#[derive(Debug, Clone)]
pub struct Flyer {
    pub rect: Rect,
    /// Vertical velocity, px/s (positive = down)
    pub vy: f32,
}

#[derive(Debug, Clone)]
pub struct Dodge {
    pub tuning: DodgeTuning,
    pub player: Flyer,
    /// Oldest first
    pub obstacles: Vec<Rect>,
}

impl Dodge {
    pub fn new(tuning: DodgeTuning) -> Self {
        let player = Flyer {
            rect: Rect::from_pos_size(Vec2::new(tuning.player_x, 0.0), tuning.player_size),
            vy: 0.0,
        };
        Self {
            tuning,
            player,
            obstacles: Vec::new(),
        }
    }

    fn flap(&mut self) {
        self.player.vy = self.tuning.flap_velocity;
    }

    fn spawn_obstacle(&mut self, ctx: &mut SimContext<'_>) {
        let size = self.tuning.obstacle_size;
        let span = (ctx.bounds.y - size.y).max(0.0);
        let y = ctx.rng.random::<f32>() * span;
        self.obstacles
            .push(Rect::new(ctx.bounds.x, y, size.x, size.y));
    }
}

impl Simulation for Dodge {
    fn init(&mut self, ctx: &mut SimContext<'_>) -> Option<EndReason> {
        self.player = Flyer {
            rect: Rect::from_pos_size(
                Vec2::new(self.tuning.player_x, ctx.bounds.y / 2.0),
                self.tuning.player_size,
            ),
            vy: 0.0,
        };
        self.obstacles.clear();
        None
    }

    fn update(&mut self, dt: f32, ctx: &mut SimContext<'_>) -> Option<EndReason> {
        // Gravity, then clamp to the surface; hitting an edge kills the velocity
        let player = &mut self.player;
        player.vy += self.tuning.gravity * dt;
        player.rect.y += player.vy * dt;
        let floor = (ctx.bounds.y - player.rect.h).max(0.0);
        if player.rect.y < 0.0 {
            player.rect.y = 0.0;
            player.vy = 0.0;
        } else if player.rect.y > floor {
            player.rect.y = floor;
            player.vy = 0.0;
        }

        if ctx.rng.random_bool(self.tuning.spawn_chance) {
            self.spawn_obstacle(ctx);
        }

        let step = self.tuning.obstacle_speed * dt;
        for obstacle in &mut self.obstacles {
            obstacle.x -= step;
        }

        let before = self.obstacles.len();
        self.obstacles.retain(|o| o.right() >= 0.0);
        let passed = (before - self.obstacles.len()) as u64;
        *ctx.score += passed * self.tuning.obstacle_points;

        if self.obstacles.iter().any(|o| o.overlaps(&self.player.rect)) {
            return Some(EndReason::Collision);
        }
        None
    }

    fn draw(&self, surface: &mut Surface) {
        surface.fill_rect(self.player.rect, colors::SAGE);
        for obstacle in &self.obstacles {
            surface.fill_rect(*obstacle, colors::SAND);
        }
    }

    fn input(&mut self, event: &InputEvent, _ctx: &mut SimContext<'_>) -> Option<EndReason> {
        // Any press or click flaps
        if matches!(event, InputEvent::KeyDown(_) | InputEvent::PointerDown(_)) {
            self.flap();
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::input::Key;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const BOUNDS: Vec2 = Vec2::new(800.0, 400.0);
    const DT: f32 = 0.016;

    fn quiet() -> Dodge {
        Dodge::new(DodgeTuning {
            spawn_chance: 0.0,
            ..Default::default()
        })
    }

    #[test]
    fn test_init_centres_player() {
        let mut dodge = quiet();
        let (mut score, mut rng) = (0, Pcg32::seed_from_u64(1));
        let mut ctx = SimContext::new(BOUNDS, &mut score, &mut rng);
        dodge.obstacles.push(Rect::new(10.0, 10.0, 30.0, 40.0));
        dodge.init(&mut ctx);
        assert_eq!(dodge.player.rect.y, 200.0);
        assert!(dodge.obstacles.is_empty());
    }

    #[test]
    fn test_gravity_clamps_at_floor() {
        let mut dodge = quiet();
        let (mut score, mut rng) = (0, Pcg32::seed_from_u64(1));
        let mut ctx = SimContext::new(BOUNDS, &mut score, &mut rng);
        dodge.init(&mut ctx);
        for _ in 0..200 {
            assert_eq!(dodge.update(DT, &mut ctx), None);
        }
        assert_eq!(dodge.player.rect.y, BOUNDS.y - dodge.player.rect.h);
        assert_eq!(dodge.player.vy, 0.0);
    }

    #[test]
    fn test_flap_sets_upward_velocity() {
        let mut dodge = quiet();
        let (mut score, mut rng) = (0, Pcg32::seed_from_u64(1));
        let mut ctx = SimContext::new(BOUNDS, &mut score, &mut rng);
        dodge.init(&mut ctx);
        dodge.input(&InputEvent::KeyDown(Key::Space), &mut ctx);
        assert_eq!(dodge.player.vy, dodge.tuning.flap_velocity);
        let y = dodge.player.rect.y;
        dodge.update(DT, &mut ctx);
        assert!(dodge.player.rect.y < y);
    }

    #[test]
    fn test_obstacle_leaving_left_edge_scores_once() {
        let mut dodge = quiet();
        let (mut score, mut rng) = (0, Pcg32::seed_from_u64(1));
        {
            let mut ctx = SimContext::new(BOUNDS, &mut score, &mut rng);
            dodge.init(&mut ctx);
            // Right edge at +1 px; one tick moves it past zero
            dodge.obstacles.push(Rect::new(-29.0, 0.0, 30.0, 40.0));
            assert_eq!(dodge.update(DT, &mut ctx), None);
            assert!(dodge.obstacles.is_empty());
            assert_eq!(dodge.update(DT, &mut ctx), None);
        }
        assert_eq!(score, 10);
    }

    #[test]
    fn test_obstacle_on_screen_is_kept() {
        let mut dodge = quiet();
        let (mut score, mut rng) = (0, Pcg32::seed_from_u64(1));
        {
            let mut ctx = SimContext::new(BOUNDS, &mut score, &mut rng);
            dodge.init(&mut ctx);
            dodge.obstacles.push(Rect::new(400.0, 0.0, 30.0, 40.0));
            dodge.update(DT, &mut ctx);
        }
        assert_eq!(dodge.obstacles.len(), 1);
        assert_eq!(score, 0);
    }

    #[test]
    fn test_overlap_ends_run() {
        let mut dodge = quiet();
        let (mut score, mut rng) = (0, Pcg32::seed_from_u64(1));
        let mut ctx = SimContext::new(BOUNDS, &mut score, &mut rng);
        dodge.init(&mut ctx);
        let p = dodge.player.rect;
        dodge.obstacles.push(Rect::new(p.x + 5.0, p.y, 30.0, 40.0));
        assert_eq!(dodge.update(DT, &mut ctx), Some(EndReason::Collision));
    }

    #[test]
    fn test_certain_spawn_appears_at_right_edge() {
        let mut dodge = Dodge::new(DodgeTuning {
            spawn_chance: 1.0,
            ..Default::default()
        });
        let (mut score, mut rng) = (0, Pcg32::seed_from_u64(3));
        let mut ctx = SimContext::new(BOUNDS, &mut score, &mut rng);
        dodge.init(&mut ctx);
        dodge.update(0.0, &mut ctx);
        assert_eq!(dodge.obstacles.len(), 1);
        let o = dodge.obstacles[0];
        assert_eq!(o.x, BOUNDS.x);
        assert!(o.y >= 0.0 && o.bottom() <= BOUNDS.y);
    }
}
