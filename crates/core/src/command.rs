use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Disjoint input bits sampled once per client frame.
    ///
    /// A 2D profile only ever sets `FORWARD`/`BACKWARD`/`TURN_LEFT`/`TURN_RIGHT`.
    ///
    /// `Serialize`/`Deserialize` come from bitflags's own `serde` feature,
    /// which (de)serializes the bit pattern as a plain integer.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Buttons: u32 {
        const MOVE_UP = 1 << 0;
        const MOVE_DOWN = 1 << 1;
        const FORWARD = 1 << 2;
        const BACKWARD = 1 << 3;
        const TURN_LEFT = 1 << 4;
        const TURN_RIGHT = 1 << 5;
        const STRAFE_LEFT = 1 << 6;
        const STRAFE_RIGHT = 1 << 7;
        const QUIT = 1 << 8;
        const TOGGLE_DEBUG = 1 << 9;
        const TOGGLE_PREDICT = 1 << 10;
    }
}

impl Default for Buttons {
    fn default() -> Self {
        Buttons::empty()
    }
}

/// A single player-input sample. `id` is monotone per client, starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub id: u32,
    pub buttons: Buttons,
    pub yaw_delta: f32,
    pub pitch_delta: f32,
    /// Wall-clock time the inputs were held, used as the integration step.
    pub duration_ms: u16,
}

impl Command {
    pub const CLASS_ID: u8 = 7;

    pub fn new(id: u32, buttons: Buttons, yaw_delta: f32, pitch_delta: f32, duration_ms: u16) -> Self {
        Command {
            id,
            buttons,
            yaw_delta,
            pitch_delta,
            duration_ms,
        }
    }
}
