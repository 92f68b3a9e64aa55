//! Simulation module
//!
//! Each game is a self-contained model behind the [`Simulation`] trait.
//! Rules shared by all of them:
//! - Seeded RNG only (borrowed from the director through [`SimContext`])
//! - Stable iteration order (entities live in insertion-ordered `Vec`s)
//! - A run ends by returning an [`EndReason`], never by touching the director
//! - Drawing only through [`Surface`] primitives

pub mod collision;
pub mod dodge;
pub mod input;
pub mod platformer;
pub mod shooter;
pub mod stack;

use glam::Vec2;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::surface::Surface;
use crate::tuning::Tuning;

pub use collision::Rect;
pub use dodge::Dodge;
pub use input::{InputEvent, Key};
pub use platformer::Platformer;
pub use shooter::Shooter;
pub use stack::Stack;

/// Which game is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimulationId {
    #[default]
    #[serde(alias = "ocean")]
    Dodge,
    #[serde(alias = "tetris")]
    Stack,
    #[serde(alias = "platform")]
    Platformer,
    #[serde(alias = "tanks")]
    Shooter,
}

impl SimulationId {
    pub const ALL: [SimulationId; 4] = [
        SimulationId::Dodge,
        SimulationId::Stack,
        SimulationId::Platformer,
        SimulationId::Shooter,
    ];

    /// Accepts the hub's button names as well as the descriptive ones
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "dodge" | "ocean" => Some(SimulationId::Dodge),
            "stack" | "tetris" => Some(SimulationId::Stack),
            "platformer" | "platform" => Some(SimulationId::Platformer),
            "shooter" | "tanks" => Some(SimulationId::Shooter),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SimulationId::Dodge => "dodge",
            SimulationId::Stack => "stack",
            SimulationId::Platformer => "platformer",
            SimulationId::Shooter => "shooter",
        }
    }

    /// Title shown on the idle overlay
    pub fn prompt(&self) -> &'static str {
        match self {
            SimulationId::Dodge => "Ready to Surf?",
            SimulationId::Stack => "Block Stack",
            SimulationId::Platformer => "Hero Quest",
            SimulationId::Shooter => "Iron Arena",
        }
    }
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// Dodge player hit an obstacle
    Collision,
    /// Stack could not place a new piece
    BoardFull,
    /// Platformer player dropped off the bottom
    Fell,
    /// Shooter enemy reached the player
    Overrun,
}

impl EndReason {
    pub fn describe(&self) -> &'static str {
        match self {
            EndReason::Collision => "hit an obstacle",
            EndReason::BoardFull => "board full",
            EndReason::Fell => "fell out of the world",
            EndReason::Overrun => "overrun by enemies",
        }
    }
}

/// What a simulation may touch outside its own state during a call
pub struct SimContext<'a> {
    /// Surface size in pixels
    pub bounds: Vec2,
    /// Run score; the active simulation is its only writer
    pub score: &'a mut u64,
    pub rng: &'a mut Pcg32,
}

impl<'a> SimContext<'a> {
    pub fn new(bounds: Vec2, score: &'a mut u64, rng: &'a mut Pcg32) -> Self {
        Self { bounds, score, rng }
    }
}

/// Frame-stepped game contract
///
/// `init` rebuilds the whole state; nothing survives from a previous run.
/// Any call that can finish the run returns `Some(EndReason)`.
pub trait Simulation {
    fn init(&mut self, ctx: &mut SimContext<'_>) -> Option<EndReason>;

    /// Advance by `dt` seconds
    fn update(&mut self, dt: f32, ctx: &mut SimContext<'_>) -> Option<EndReason>;

    fn draw(&self, surface: &mut Surface);

    fn input(&mut self, event: &InputEvent, ctx: &mut SimContext<'_>) -> Option<EndReason>;

    /// Surface size changed mid-run
    fn on_resize(&mut self, _ctx: &mut SimContext<'_>) -> Option<EndReason> {
        None
    }
}

/// The closed set of games; the director's single dispatch point
#[derive(Debug, Clone)]
pub enum Game {
    Dodge(Dodge),
    Stack(Stack),
    Platformer(Platformer),
    Shooter(Shooter),
}

impl Game {
    /// Fresh, uninitialised game of the given kind
    pub fn new(id: SimulationId, tuning: &Tuning) -> Self {
        match id {
            SimulationId::Dodge => Game::Dodge(Dodge::new(tuning.dodge.clone())),
            SimulationId::Stack => Game::Stack(Stack::new(tuning.stack.clone())),
            SimulationId::Platformer => {
                Game::Platformer(Platformer::new(tuning.platformer.clone()))
            }
            SimulationId::Shooter => Game::Shooter(Shooter::new(tuning.shooter.clone())),
        }
    }

    pub fn id(&self) -> SimulationId {
        match self {
            Game::Dodge(_) => SimulationId::Dodge,
            Game::Stack(_) => SimulationId::Stack,
            Game::Platformer(_) => SimulationId::Platformer,
            Game::Shooter(_) => SimulationId::Shooter,
        }
    }

    fn as_sim(&self) -> &dyn Simulation {
        match self {
            Game::Dodge(g) => g,
            Game::Stack(g) => g,
            Game::Platformer(g) => g,
            Game::Shooter(g) => g,
        }
    }

    fn as_sim_mut(&mut self) -> &mut dyn Simulation {
        match self {
            Game::Dodge(g) => g,
            Game::Stack(g) => g,
            Game::Platformer(g) => g,
            Game::Shooter(g) => g,
        }
    }
}

impl Simulation for Game {
    fn init(&mut self, ctx: &mut SimContext<'_>) -> Option<EndReason> {
        self.as_sim_mut().init(ctx)
    }

    fn update(&mut self, dt: f32, ctx: &mut SimContext<'_>) -> Option<EndReason> {
        self.as_sim_mut().update(dt, ctx)
    }

    fn draw(&self, surface: &mut Surface) {
        self.as_sim().draw(surface)
    }

    fn input(&mut self, event: &InputEvent, ctx: &mut SimContext<'_>) -> Option<EndReason> {
        self.as_sim_mut().input(event, ctx)
    }

    fn on_resize(&mut self, ctx: &mut SimContext<'_>) -> Option<EndReason> {
        self.as_sim_mut().on_resize(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_names() {
        assert_eq!(SimulationId::from_name("ocean"), Some(SimulationId::Dodge));
        assert_eq!(SimulationId::from_name("Tetris"), Some(SimulationId::Stack));
        assert_eq!(SimulationId::from_name("platformer"), Some(SimulationId::Platformer));
        assert_eq!(SimulationId::from_name("tanks"), Some(SimulationId::Shooter));
        assert_eq!(SimulationId::from_name("pong"), None);
    }

    #[test]
    fn test_game_reports_its_id() {
        let tuning = Tuning::default();
        for id in SimulationId::ALL {
            assert_eq!(Game::new(id, &tuning).id(), id);
        }
    }

    #[test]
    fn test_init_update_zero_draw_keeps_score_zero() {
        let tuning = Tuning::default();
        let mut surface = Surface::new(800, 400);
        for id in SimulationId::ALL {
            let mut game = Game::new(id, &tuning);
            let mut score = 0;
            let mut rng = Pcg32::seed_from_u64(7);
            let mut ctx = SimContext::new(surface.extent(), &mut score, &mut rng);
            assert_eq!(game.init(&mut ctx), None, "{:?} ended on init", id);
            assert_eq!(game.update(0.0, &mut ctx), None, "{:?} ended on update(0)", id);
            surface.clear();
            game.draw(&mut surface);
            assert!(!surface.commands().is_empty());
            assert_eq!(score, 0, "{:?} scored on an empty tick", id);
        }
    }
}
