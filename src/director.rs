//! Multi-game director
//!
//! Owns the lifecycle (Idle → Running → Ended → Running …), the frame clock,
//! the score and the one active [`Game`]. Hosts feed it animation-frame
//! timestamps, input, resize and mode-switch requests, either by calling the
//! methods directly or by funnelling [`Command`]s through [`Director::dispatch`].
//!
//! The director never schedules frames itself. `start`, `tick` and
//! `route_input` report whether the host should request another frame, and
//! the director remembers when a frame is already outstanding so two loops can
//! never run at once. That claim is only released by a `tick` returning
//! [`LoopControl::Stop`]: ending or switching between frames leaves it in
//! place, and a restart before the pending frame arrives rides on that frame.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::sim::{EndReason, Game, InputEvent, Key, SimContext, Simulation, SimulationId};
use crate::surface::Surface;
use crate::tuning::Tuning;

/// Director lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Waiting for a start request
    #[default]
    Idle,
    /// Frame loop active
    Running,
    /// Run finished; state frozen until the next start
    Ended,
}

/// Whether the host should request another animation frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Stop,
}

/// Serialized host request
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Start or restart at the given timestamp (ms)
    Start(f64),
    /// Animation frame at the given timestamp (ms)
    Tick(f64),
    Input(InputEvent, f64),
    Resize(u32, u32),
    Switch(SimulationId),
    End,
}

/// What the overlay and score label should show
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hud {
    pub overlay_visible: bool,
    pub title: String,
    pub detail: Option<String>,
    pub button: &'static str,
    pub score_visible: bool,
    pub score_text: String,
}

pub struct Director {
    tuning: Tuning,
    active: SimulationId,
    game: Game,
    phase: Phase,
    score: u64,
    /// Timestamp (ms) of the previous tick; `None` unless Running
    last_frame: Option<f64>,
    /// A frame callback has been requested and not yet delivered
    frame_pending: bool,
    rng: Pcg32,
    surface: Surface,
    end_reason: Option<EndReason>,
    /// Updates run since the last start
    frames: u64,
    /// Number of starts (each one a full `init`)
    runs: u64,
}

impl Director {
    /// Invalid tuning is replaced by the defaults.
    pub fn new(tuning: Tuning, seed: u64, width: u32, height: u32) -> Self {
        let tuning = match tuning.validate() {
            Ok(()) => tuning,
            Err(e) => {
                log::warn!("Ignoring tuning: {}", e);
                Tuning::default()
            }
        };
        let active = tuning.director.initial_mode;
        let game = Game::new(active, &tuning);
        Self {
            tuning,
            active,
            game,
            phase: Phase::Idle,
            score: 0,
            last_frame: None,
            frame_pending: false,
            rng: Pcg32::seed_from_u64(seed),
            surface: Surface::new(width, height),
            end_reason: None,
            frames: 0,
            runs: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn active(&self) -> SimulationId {
        self.active
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    #[cfg(test)]
    pub(crate) fn game_mut(&mut self) -> &mut Game {
        &mut self.game
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn end_reason(&self) -> Option<EndReason> {
        self.end_reason
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn runs(&self) -> u64 {
        self.runs
    }

    /// Run `f` against the active game with a context over the director's state
    fn with_game<R>(&mut self, f: impl FnOnce(&mut Game, &mut SimContext<'_>) -> R) -> R {
        let mut ctx = SimContext::new(self.surface.extent(), &mut self.score, &mut self.rng);
        f(&mut self.game, &mut ctx)
    }

    /// Claim the next frame; false if one is already outstanding
    fn request_frame(&mut self) -> bool {
        if self.frame_pending {
            return false;
        }
        self.frame_pending = true;
        true
    }

    /// Begin a fresh run of the active game.
    ///
    /// No-op while Running. Returns true when the host must request a frame.
    pub fn start(&mut self, now: f64) -> bool {
        if self.phase == Phase::Running {
            return false;
        }

        self.phase = Phase::Running;
        self.score = 0;
        self.end_reason = None;
        self.frames = 0;
        self.runs += 1;
        self.last_frame = Some(now);
        self.surface.clear();

        log::info!("Starting {} (run {})", self.active.as_str(), self.runs);

        if let Some(reason) = self.with_game(|game, ctx| game.init(ctx)) {
            self.game.draw(&mut self.surface);
            self.finish(Some(reason));
            return false;
        }
        self.request_frame()
    }

    /// One animation frame: update, draw, and decide whether to continue
    pub fn tick(&mut self, now: f64) -> LoopControl {
        if self.phase != Phase::Running {
            self.frame_pending = false;
            return LoopControl::Stop;
        }

        let last = self.last_frame.unwrap_or(now);
        let dt = (((now - last) / 1000.0) as f32).clamp(0.0, self.tuning.director.max_frame_dt);
        self.last_frame = Some(now);

        self.surface.clear();
        let ended = self.with_game(|game, ctx| game.update(dt, ctx));
        self.game.draw(&mut self.surface);
        self.frames += 1;

        if let Some(reason) = ended {
            self.finish(Some(reason));
        }

        if self.phase == Phase::Running {
            LoopControl::Continue
        } else {
            self.frame_pending = false;
            LoopControl::Stop
        }
    }

    /// Stop the current run, leaving its state frozen. An outstanding frame
    /// stays claimed until its `tick` reports `Stop`.
    pub fn end(&mut self) {
        self.finish(None);
    }

    fn finish(&mut self, reason: Option<EndReason>) {
        if self.phase != Phase::Running {
            return;
        }
        self.phase = Phase::Ended;
        self.end_reason = reason;
        self.last_frame = None;
        match reason {
            Some(reason) => log::info!(
                "{} ended ({}) with score {}",
                self.active.as_str(),
                reason.describe(),
                self.score
            ),
            None => log::info!("{} stopped with score {}", self.active.as_str(), self.score),
        }
    }

    /// Select another game. Initialisation waits for the next `start`.
    pub fn switch_mode(&mut self, id: SimulationId) {
        self.phase = Phase::Idle;
        self.active = id;
        self.game = Game::new(id, &self.tuning);
        self.last_frame = None;
        self.end_reason = None;
        self.surface.clear();
        log::info!("Switched to {}", id.as_str());
    }

    /// Forward input to the running game; out of a run only the start
    /// trigger is honoured. Returns true when the host must request a frame.
    pub fn route_input(&mut self, event: InputEvent, now: f64) -> bool {
        match self.phase {
            Phase::Running => {
                if let Some(reason) = self.with_game(|game, ctx| game.input(&event, ctx)) {
                    self.surface.clear();
                    self.game.draw(&mut self.surface);
                    self.finish(Some(reason));
                }
                false
            }
            Phase::Idle | Phase::Ended if event.is_start_trigger() => self.start(now),
            Phase::Idle | Phase::Ended => false,
        }
    }

    /// New surface size; the running game re-derives what depends on it
    pub fn route_resize(&mut self, width: u32, height: u32) {
        self.surface.resize(width, height);
        if self.phase != Phase::Running {
            return;
        }
        if let Some(reason) = self.with_game(|game, ctx| game.on_resize(ctx)) {
            self.finish(Some(reason));
        }
    }

    /// Whether the host should swallow this key (e.g. stop page scrolling):
    /// game keys while Running, the start trigger otherwise
    pub fn captures(&self, key: Key) -> bool {
        match self.phase {
            Phase::Running => key.is_game_key(),
            Phase::Idle | Phase::Ended => InputEvent::KeyDown(key).is_start_trigger(),
        }
    }

    /// Single entry point for queued hosts. Returns true when the host must
    /// request a frame.
    pub fn dispatch(&mut self, command: Command) -> bool {
        match command {
            Command::Start(now) => self.start(now),
            Command::Tick(now) => self.tick(now) == LoopControl::Continue,
            Command::Input(event, now) => self.route_input(event, now),
            Command::Resize(w, h) => {
                self.route_resize(w, h);
                false
            }
            Command::Switch(id) => {
                self.switch_mode(id);
                false
            }
            Command::End => {
                self.end();
                false
            }
        }
    }

    pub fn score_text(&self) -> String {
        match self.active {
            SimulationId::Dodge => format!("{}m", self.score),
            _ => self.score.to_string(),
        }
    }

    pub fn hud(&self) -> Hud {
        match self.phase {
            Phase::Idle => Hud {
                overlay_visible: true,
                title: self.active.prompt().to_string(),
                detail: None,
                button: "Start Module",
                score_visible: false,
                score_text: self.score_text(),
            },
            Phase::Running => Hud {
                overlay_visible: false,
                title: String::new(),
                detail: None,
                button: "",
                score_visible: true,
                score_text: self.score_text(),
            },
            Phase::Ended => Hud {
                overlay_visible: true,
                title: "Game Over!".to_string(),
                detail: Some(format!("Final score: {}", self.score_text())),
                button: "Try Again",
                score_visible: false,
                score_text: self.score_text(),
            },
        }
    }
}
