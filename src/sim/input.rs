//! Logical input events
//!
//! The host translates DOM (or native) events into these before handing them
//! to the director, so simulations never see platform key names.

use glam::Vec2;

/// Keys the simulations react to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Space,
    Other,
}

impl Key {
    /// Map a `KeyboardEvent.key` value
    pub fn from_dom(key: &str) -> Self {
        match key {
            "ArrowLeft" | "Left" => Key::Left,
            "ArrowRight" | "Right" => Key::Right,
            "ArrowUp" | "Up" => Key::Up,
            "ArrowDown" | "Down" => Key::Down,
            " " | "Space" | "Spacebar" => Key::Space,
            _ => Key::Other,
        }
    }

    /// Keys a running game owns (the host should not let the page scroll)
    pub fn is_game_key(self) -> bool {
        !matches!(self, Key::Other)
    }
}

/// One input event, pointer positions in surface pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    KeyDown(Key),
    KeyUp(Key),
    PointerMove(Vec2),
    PointerDown(Vec2),
}

impl InputEvent {
    /// The event that starts (or restarts) a game from Idle/Ended
    pub fn is_start_trigger(&self) -> bool {
        matches!(self, InputEvent::KeyDown(Key::Space))
    }
}
