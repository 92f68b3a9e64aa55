//! Arcade Hub - four small arcade games behind one director
//!
//! Core modules:
//! - `sim`: Deterministic games (Dodge, Stack, Platformer, Shooter) and input model
//! - `director`: Lifecycle, frame clock, score, input and resize routing
//! - `surface`: Backend-agnostic drawing surface (draw command list)
//! - `renderer`: WebGPU presentation of the surface
//! - `tuning`: Data-driven game balance

pub mod director;
pub mod renderer;
pub mod sim;
pub mod surface;
pub mod tuning;

pub use director::{Command, Director, Hud, LoopControl, Phase};
pub use sim::{EndReason, Game, InputEvent, Key, Simulation, SimulationId};
pub use surface::{DrawCommand, Surface};
pub use tuning::{Tuning, TuningError};
