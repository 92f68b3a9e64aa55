//! Top-down shooter
//!
//! A fixed turret in the middle of the surface aims at the pointer. Enemies
//! appear just outside a random edge and home in on the turret; bullets fly
//! straight along the heading they were fired with.

use glam::Vec2;
use rand::Rng;

use super::collision::{Rect, outside_bounds, within_radius};
use super::input::{InputEvent, Key};
use super::{EndReason, SimContext, Simulation};
use crate::surface::{Surface, colors};
use crate::tuning::ShooterTuning;

/// Barrel length and half-thickness, px
const BARREL: Vec2 = Vec2::new(20.0, 3.0);

#[derive(Debug, Clone)]
pub struct Turret {
    pub pos: Vec2,
    /// Radians, 0 = +x, y down
    pub aim: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bullet {
    pub pos: Vec2,
    /// Fixed at fire time
    pub heading: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Enemy {
    pub pos: Vec2,
    /// px/s
    pub speed: f32,
}

#[derive(Debug, Clone)]
pub struct Shooter {
    pub tuning: ShooterTuning,
    pub player: Turret,
    /// Oldest first
    pub bullets: Vec<Bullet>,
    /// Oldest first
    pub enemies: Vec<Enemy>,
}

impl Shooter {
    pub fn new(tuning: ShooterTuning) -> Self {
        Self {
            tuning,
            player: Turret {
                pos: Vec2::ZERO,
                aim: 0.0,
            },
            bullets: Vec::new(),
            enemies: Vec::new(),
        }
    }

    fn aim_at(&mut self, target: Vec2) {
        let d = target - self.player.pos;
        self.player.aim = d.y.atan2(d.x);
    }

    fn fire(&mut self) {
        self.bullets.push(Bullet {
            pos: self.player.pos,
            heading: self.player.aim,
        });
    }

    fn spawn_enemy(&mut self, ctx: &mut SimContext<'_>) {
        let margin = self.tuning.spawn_margin;
        let b = ctx.bounds;
        let t: f32 = ctx.rng.random();
        let pos = match ctx.rng.random_range(0..4) {
            0 => Vec2::new(t * b.x, -margin),
            1 => Vec2::new(b.x + margin, t * b.y),
            2 => Vec2::new(t * b.x, b.y + margin),
            _ => Vec2::new(-margin, t * b.y),
        };
        self.enemies.push(Enemy {
            pos,
            speed: self.tuning.enemy_speed,
        });
    }

    /// Pair bullets with enemies; each bullet takes at most the first enemy it touches
    fn resolve_hits(&mut self) -> u64 {
        let hit_radius = self.tuning.hit_radius;
        let enemies = &mut self.enemies;
        let mut kills = 0;
        self.bullets.retain(|bullet| {
            match enemies
                .iter()
                .position(|e| within_radius(bullet.pos, e.pos, hit_radius))
            {
                Some(i) => {
                    enemies.remove(i);
                    kills += 1;
                    false
                }
                None => true,
            }
        });
        kills
    }

    fn rotated(&self, local: Vec2) -> Vec2 {
        self.player.pos + Vec2::from_angle(self.player.aim).rotate(local)
    }
}

impl Simulation for Shooter {
    fn init(&mut self, ctx: &mut SimContext<'_>) -> Option<EndReason> {
        self.player = Turret {
            pos: ctx.bounds / 2.0,
            aim: 0.0,
        };
        self.bullets.clear();
        self.enemies.clear();
        None
    }

    fn update(&mut self, dt: f32, ctx: &mut SimContext<'_>) -> Option<EndReason> {
        if ctx.rng.random_bool(self.tuning.enemy_spawn_chance) {
            self.spawn_enemy(ctx);
        }

        let target = self.player.pos;
        for enemy in &mut self.enemies {
            let to_player = target - enemy.pos;
            if to_player.length() < self.tuning.contact_radius {
                return Some(EndReason::Overrun);
            }
            enemy.pos += to_player.normalize_or_zero() * enemy.speed * dt;
        }

        let step = self.tuning.bullet_speed * dt;
        for bullet in &mut self.bullets {
            bullet.pos += Vec2::from_angle(bullet.heading) * step;
        }
        self.bullets.retain(|b| !outside_bounds(b.pos, ctx.bounds));

        let kills = self.resolve_hits();
        *ctx.score += kills * self.tuning.kill_points;
        None
    }

    fn draw(&self, surface: &mut Surface) {
        let half = self.tuning.player_size / 2.0;
        let hull = [
            Vec2::new(-half, -half),
            Vec2::new(half, -half),
            Vec2::new(half, half),
            Vec2::new(-half, half),
        ];
        surface.fill_polygon(hull.iter().map(|&c| self.rotated(c)).collect(), colors::SAND);

        let barrel = [
            Vec2::new(0.0, -BARREL.y),
            Vec2::new(BARREL.x, -BARREL.y),
            Vec2::new(BARREL.x, BARREL.y),
            Vec2::new(0.0, BARREL.y),
        ];
        surface.fill_polygon(barrel.iter().map(|&c| self.rotated(c)).collect(), colors::INK);

        let size = self.tuning.enemy_size;
        for enemy in &self.enemies {
            surface.fill_rect(
                Rect::new(enemy.pos.x - size / 2.0, enemy.pos.y - size / 2.0, size, size),
                colors::STONE,
            );
        }
        for bullet in &self.bullets {
            surface.fill_circle(bullet.pos, self.tuning.bullet_radius, colors::EMBER);
        }
    }

    fn input(&mut self, event: &InputEvent, _ctx: &mut SimContext<'_>) -> Option<EndReason> {
        match *event {
            InputEvent::PointerMove(p) => self.aim_at(p),
            InputEvent::PointerDown(p) => {
                self.aim_at(p);
                self.fire();
            }
            InputEvent::KeyDown(Key::Space) => self.fire(),
            _ => {}
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use std::f32::consts::FRAC_PI_2;

    const BOUNDS: Vec2 = Vec2::new(800.0, 600.0);

    fn quiet() -> Shooter {
        Shooter::new(ShooterTuning {
            enemy_spawn_chance: 0.0,
            ..Default::default()
        })
    }

    #[test]
    fn test_pointer_sets_aim() {
        let mut game = quiet();
        let (mut score, mut rng) = (0, Pcg32::seed_from_u64(1));
        let mut ctx = SimContext::new(BOUNDS, &mut score, &mut rng);
        game.init(&mut ctx);
        game.input(&InputEvent::PointerMove(Vec2::new(400.0, 500.0)), &mut ctx);
        assert!((game.player.aim - FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn test_pointer_down_fires_along_aim() {
        let mut game = quiet();
        let (mut score, mut rng) = (0, Pcg32::seed_from_u64(1));
        let mut ctx = SimContext::new(BOUNDS, &mut score, &mut rng);
        game.init(&mut ctx);
        game.input(&InputEvent::PointerDown(Vec2::new(600.0, 300.0)), &mut ctx);
        assert_eq!(game.bullets.len(), 1);
        game.update(0.1, &mut ctx);
        let b = &game.bullets[0];
        assert!((b.pos - Vec2::new(442.0, 300.0)).length() < 1e-3);
    }

    #[test]
    fn test_bullet_leaving_surface_is_discarded() {
        let mut game = quiet();
        let (mut score, mut rng) = (0, Pcg32::seed_from_u64(1));
        let mut ctx = SimContext::new(BOUNDS, &mut score, &mut rng);
        game.init(&mut ctx);
        game.bullets.push(Bullet {
            pos: Vec2::new(795.0, 10.0),
            heading: 0.0,
        });
        game.update(0.016, &mut ctx);
        assert!(game.bullets.is_empty());
    }

    #[test]
    fn test_hit_removes_both_and_scores() {
        let mut game = quiet();
        let (mut score, mut rng) = (0, Pcg32::seed_from_u64(1));
        {
            let mut ctx = SimContext::new(BOUNDS, &mut score, &mut rng);
            game.init(&mut ctx);
            game.enemies.push(Enemy {
                pos: Vec2::new(100.0, 100.0),
                speed: 90.0,
            });
            game.bullets.push(Bullet {
                pos: Vec2::new(110.0, 100.0),
                heading: 0.0,
            });
            assert_eq!(game.update(0.0, &mut ctx), None);
        }
        assert!(game.enemies.is_empty());
        assert!(game.bullets.is_empty());
        assert_eq!(score, 50);
    }

    #[test]
    fn test_bullet_kills_at_most_one_enemy_per_tick() {
        let mut game = quiet();
        let (mut score, mut rng) = (0, Pcg32::seed_from_u64(1));
        {
            let mut ctx = SimContext::new(BOUNDS, &mut score, &mut rng);
            game.init(&mut ctx);
            game.enemies.push(Enemy {
                pos: Vec2::new(100.0, 100.0),
                speed: 90.0,
            });
            game.enemies.push(Enemy {
                pos: Vec2::new(105.0, 100.0),
                speed: 90.0,
            });
            game.bullets.push(Bullet {
                pos: Vec2::new(102.0, 100.0),
                heading: 0.0,
            });
            game.update(0.0, &mut ctx);
        }
        assert_eq!(game.enemies.len(), 1);
        assert_eq!(game.enemies[0].pos, Vec2::new(105.0, 100.0));
        assert_eq!(score, 50);
    }

    #[test]
    fn test_enemies_home_on_player() {
        let mut game = quiet();
        let (mut score, mut rng) = (0, Pcg32::seed_from_u64(1));
        let mut ctx = SimContext::new(BOUNDS, &mut score, &mut rng);
        game.init(&mut ctx);
        game.enemies.push(Enemy {
            pos: Vec2::new(0.0, 300.0),
            speed: 100.0,
        });
        game.update(0.5, &mut ctx);
        assert_eq!(game.enemies[0].pos, Vec2::new(50.0, 300.0));
    }

    #[test]
    fn test_contact_ends_run() {
        let mut game = quiet();
        let (mut score, mut rng) = (0, Pcg32::seed_from_u64(1));
        let mut ctx = SimContext::new(BOUNDS, &mut score, &mut rng);
        game.init(&mut ctx);
        game.enemies.push(Enemy {
            pos: game.player.pos + Vec2::new(10.0, 0.0),
            speed: 90.0,
        });
        assert_eq!(game.update(0.016, &mut ctx), Some(EndReason::Overrun));
    }

    #[test]
    fn test_spawn_is_outside_surface() {
        let mut game = Shooter::new(ShooterTuning {
            enemy_spawn_chance: 1.0,
            ..Default::default()
        });
        let (mut score, mut rng) = (0, Pcg32::seed_from_u64(42));
        let mut ctx = SimContext::new(BOUNDS, &mut score, &mut rng);
        game.init(&mut ctx);
        for _ in 0..20 {
            game.update(0.0, &mut ctx);
        }
        assert_eq!(game.enemies.len(), 20);
        assert!(game.enemies.iter().all(|e| outside_bounds(e.pos, BOUNDS)));
    }
}
