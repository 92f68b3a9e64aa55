//! Data-driven game balance
//!
//! Every constant the four simulations use lives here so a hub page can
//! override them with a JSON blob. Sections are `#[serde(default)]`, so a
//! partial document only replaces the fields it names.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::sim::SimulationId;
use crate::sim::collision::Rect;

/// Error raised when a tuning document cannot be used
#[derive(Debug)]
pub enum TuningError {
    /// The tuning file could not be read
    Io(std::io::Error),
    /// The JSON itself did not parse
    Parse(serde_json::Error),
    /// A field parsed but holds a value the simulations cannot run with
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

impl fmt::Display for TuningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TuningError::Io(e) => write!(f, "tuning file could not be read: {e}"),
            TuningError::Parse(e) => write!(f, "tuning is not valid JSON: {e}"),
            TuningError::Invalid { field, reason } => {
                write!(f, "tuning field `{field}` {reason}")
            }
        }
    }
}

impl std::error::Error for TuningError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TuningError::Io(e) => Some(e),
            TuningError::Parse(e) => Some(e),
            TuningError::Invalid { .. } => None,
        }
    }
}

impl From<std::io::Error> for TuningError {
    fn from(e: std::io::Error) -> Self {
        TuningError::Io(e)
    }
}

impl From<serde_json::Error> for TuningError {
    fn from(e: serde_json::Error) -> Self {
        TuningError::Parse(e)
    }
}

/// Director-level knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectorTuning {
    /// Largest dt (seconds) handed to a simulation in one tick
    pub max_frame_dt: f32,
    /// Simulation selected before any mode switch arrives
    pub initial_mode: SimulationId,
}

impl Default for DirectorTuning {
    fn default() -> Self {
        Self {
            max_frame_dt: 0.1,
            initial_mode: SimulationId::Dodge,
        }
    }
}

/// Side-scrolling dodger
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DodgeTuning {
    pub player_x: f32,
    pub player_size: Vec2,
    /// px/s²
    pub gravity: f32,
    /// Vertical velocity set by a flap (negative = up), px/s
    pub flap_velocity: f32,
    pub obstacle_size: Vec2,
    /// px/s, leftward
    pub obstacle_speed: f32,
    /// Chance per tick of spawning an obstacle
    pub spawn_chance: f64,
    pub obstacle_points: u64,
}

impl Default for DodgeTuning {
    fn default() -> Self {
        Self {
            player_x: 50.0,
            player_size: Vec2::new(40.0, 40.0),
            gravity: 1800.0,
            flap_velocity: -480.0,
            obstacle_size: Vec2::new(30.0, 40.0),
            obstacle_speed: 240.0,
            spawn_chance: 0.02,
            obstacle_points: 10,
        }
    }
}

/// Falling-block puzzle
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StackTuning {
    pub cols: usize,
    /// Cell edge in px; row count is `floor(surface height / cell_size)`
    pub cell_size: f32,
    /// Seconds between forced one-row drops
    pub drop_interval: f32,
    pub line_points: u64,
}

impl Default for StackTuning {
    fn default() -> Self {
        Self {
            cols: 10,
            cell_size: 25.0,
            drop_interval: 1.0,
            line_points: 100,
        }
    }
}

/// Gravity platformer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformerTuning {
    pub spawn: Vec2,
    pub player_size: Vec2,
    /// px/s²
    pub gravity: f32,
    /// Horizontal speed while a direction is held, px/s
    pub run_speed: f32,
    /// Vertical velocity set by a jump (negative = up), px/s
    pub jump_velocity: f32,
    /// Extra depth below a platform's bottom edge that still counts as landing
    pub landing_tolerance: f32,
    /// Horizontal px per point of distance score
    pub distance_per_point: f32,
    pub platforms: Vec<Rect>,
}

impl Default for PlatformerTuning {
    fn default() -> Self {
        Self {
            spawn: Vec2::new(50.0, 200.0),
            player_size: Vec2::new(30.0, 30.0),
            gravity: 2880.0,
            run_speed: 300.0,
            jump_velocity: -720.0,
            landing_tolerance: 20.0,
            distance_per_point: 10.0,
            platforms: vec![
                Rect::new(0.0, 350.0, 800.0, 50.0),
                Rect::new(200.0, 250.0, 150.0, 20.0),
                Rect::new(450.0, 180.0, 150.0, 20.0),
                Rect::new(100.0, 120.0, 150.0, 20.0),
            ],
        }
    }
}

/// Top-down shooter
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShooterTuning {
    pub player_size: f32,
    pub enemy_size: f32,
    /// px/s toward the player
    pub enemy_speed: f32,
    /// Chance per tick of spawning an enemy
    pub enemy_spawn_chance: f64,
    /// How far outside the surface edge enemies appear
    pub spawn_margin: f32,
    /// Enemy-to-player centre distance that ends the run
    pub contact_radius: f32,
    /// px/s along the bullet heading
    pub bullet_speed: f32,
    pub bullet_radius: f32,
    /// Bullet-to-enemy centre distance that counts as a kill
    pub hit_radius: f32,
    pub kill_points: u64,
}

impl Default for ShooterTuning {
    fn default() -> Self {
        Self {
            player_size: 30.0,
            enemy_size: 20.0,
            enemy_speed: 90.0,
            enemy_spawn_chance: 0.03,
            spawn_margin: 20.0,
            contact_radius: 20.0,
            bullet_speed: 420.0,
            bullet_radius: 4.0,
            hit_radius: 20.0,
            kill_points: 50,
        }
    }
}

/// Complete tuning document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub director: DirectorTuning,
    pub dodge: DodgeTuning,
    pub stack: StackTuning,
    pub platformer: PlatformerTuning,
    pub shooter: ShooterTuning,
}

fn positive(field: &'static str, value: f32) -> Result<(), TuningError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(TuningError::Invalid {
            field,
            reason: "must be a positive number",
        })
    }
}

fn probability(field: &'static str, value: f64) -> Result<(), TuningError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(TuningError::Invalid {
            field,
            reason: "must be a probability in [0, 1]",
        })
    }
}

impl Tuning {
    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "arcade_hub_tuning";

    /// Parse and validate a JSON document
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn to_json(&self) -> String {
        // Plain data with string keys; serialization cannot fail
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Reject values the simulations would misbehave with
    pub fn validate(&self) -> Result<(), TuningError> {
        positive("director.max_frame_dt", self.director.max_frame_dt)?;

        let d = &self.dodge;
        positive("dodge.player_size.x", d.player_size.x)?;
        positive("dodge.player_size.y", d.player_size.y)?;
        positive("dodge.obstacle_size.x", d.obstacle_size.x)?;
        positive("dodge.obstacle_size.y", d.obstacle_size.y)?;
        positive("dodge.obstacle_speed", d.obstacle_speed)?;
        probability("dodge.spawn_chance", d.spawn_chance)?;

        let s = &self.stack;
        if s.cols == 0 {
            return Err(TuningError::Invalid {
                field: "stack.cols",
                reason: "must be at least 1",
            });
        }
        positive("stack.cell_size", s.cell_size)?;
        positive("stack.drop_interval", s.drop_interval)?;

        let p = &self.platformer;
        positive("platformer.player_size.x", p.player_size.x)?;
        positive("platformer.player_size.y", p.player_size.y)?;
        positive("platformer.distance_per_point", p.distance_per_point)?;
        if p.landing_tolerance < 0.0 {
            return Err(TuningError::Invalid {
                field: "platformer.landing_tolerance",
                reason: "must not be negative",
            });
        }

        let sh = &self.shooter;
        positive("shooter.enemy_speed", sh.enemy_speed)?;
        positive("shooter.bullet_speed", sh.bullet_speed)?;
        positive("shooter.contact_radius", sh.contact_radius)?;
        positive("shooter.hit_radius", sh.hit_radius)?;
        probability("shooter.enemy_spawn_chance", sh.enemy_spawn_chance)?;

        Ok(())
    }

    /// Load tuning overrides from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(tuning) => {
                        log::info!("Loaded tuning from LocalStorage");
                        return tuning;
                    }
                    Err(e) => log::warn!("Ignoring stored tuning: {}", e),
                }
            }
        }

        log::info!("Using default tuning");
        Self::default()
    }

    /// Native builds have no browser storage
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        log::info!("Using default tuning");
        Self::default()
    }

    /// Load a tuning file from disk (native only)
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_path(path: &std::path::Path) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path)?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_override_keeps_other_defaults() {
        let tuning = Tuning::from_json(r#"{ "dodge": { "spawn_chance": 0.0 } }"#).unwrap();
        assert_eq!(tuning.dodge.spawn_chance, 0.0);
        assert_eq!(tuning.dodge.obstacle_points, 10);
        assert_eq!(tuning.stack.cols, 10);
        assert_eq!(tuning.platformer.platforms.len(), 4);
    }

    #[test]
    fn test_mode_names_in_json() {
        let tuning = Tuning::from_json(r#"{ "director": { "initial_mode": "tetris" } }"#).unwrap();
        assert_eq!(tuning.director.initial_mode, SimulationId::Stack);
    }

    #[test]
    fn test_rejects_bad_probability() {
        let err = Tuning::from_json(r#"{ "shooter": { "enemy_spawn_chance": 1.5 } }"#).unwrap_err();
        assert!(matches!(
            err,
            TuningError::Invalid {
                field: "shooter.enemy_spawn_chance",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_zero_columns() {
        let mut tuning = Tuning::default();
        tuning.stack.cols = 0;
        assert!(tuning.validate().is_err());
    }

    #[test]
    fn test_parse_error_has_source() {
        use std::error::Error;
        let err = Tuning::from_json("{ not json").unwrap_err();
        assert!(matches!(err, TuningError::Parse(_)));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_missing_file_keeps_io_cause() {
        use std::error::Error;
        let path = std::env::temp_dir().join("arcade_hub_no_such_tuning.json");
        let err = Tuning::load_path(&path).unwrap_err();
        match &err {
            TuningError::Io(io) => assert_eq!(io.kind(), std::io::ErrorKind::NotFound),
            other => panic!("expected an io error, got {other:?}"),
        }
        assert!(err.source().is_some());
    }

    #[test]
    fn test_load_path_reads_and_validates() {
        let path = std::env::temp_dir().join(format!("arcade_hub_tuning_{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "stack": { "cols": 12 } }"#).unwrap();
        let tuning = Tuning::load_path(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(tuning.stack.cols, 12);
    }

    #[test]
    fn test_json_round_trip_preserves_platforms() {
        let tuning = Tuning::default();
        let back = Tuning::from_json(&tuning.to_json()).unwrap();
        assert_eq!(back.platformer.platforms, tuning.platformer.platforms);
    }
}
