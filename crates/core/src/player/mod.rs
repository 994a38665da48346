use std::f64::consts::PI;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::command::{Buttons, Command};
use crate::config::{MOVE_SPEED, TURN_SPEED};

/// A player's identity and kinematic state.
///
/// `id` is unique within a `World`; `0` is reserved for "absent". Position is
/// kept in double precision so that repeated integration over a long-running
/// server stays numerically well-behaved.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: u8,
    /// Packed `AABBGGRR`.
    pub color: u32,
    pub position: DVec3,
    pub yaw: f64,
    pub pitch: f64,
    /// Id of the most recent command the server has applied to this player.
    pub last_command_id: u32,
}

impl Player {
    pub const CLASS_ID: u8 = 1;

    pub fn new(id: u8, color: u32) -> Self {
        Player {
            id,
            color,
            position: DVec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            last_command_id: 0,
        }
    }

    /// Deterministic kinematic integration of a single command. Must not read
    /// wall-clock time — `cmd.duration_ms` is the only notion of elapsed time.
    pub fn apply(&mut self, cmd: &Command) {
        self.last_command_id = cmd.id;

        self.yaw += cmd.yaw_delta as f64;
        self.pitch += cmd.pitch_delta as f64;

        let d = cmd.duration_ms as f64 * MOVE_SPEED / 1000.0;
        let d_theta = cmd.duration_ms as f64 * TURN_SPEED / 1000.0;

        if cmd.buttons.contains(Buttons::TURN_LEFT) {
            self.yaw += d_theta;
        }
        if cmd.buttons.contains(Buttons::TURN_RIGHT) {
            self.yaw -= d_theta;
        }

        if cmd.buttons == (Buttons::TURN_LEFT | Buttons::TURN_RIGHT) {
            return;
        }

        let fx = self.yaw.cos();
        let fz = -self.yaw.sin();
        let sx = (self.yaw - PI / 2.0).cos();
        let sz = -(self.yaw - PI / 2.0).sin();

        if cmd.buttons.contains(Buttons::FORWARD) {
            self.position.x += d * fx;
            self.position.z += d * fz;
        }
        if cmd.buttons.contains(Buttons::BACKWARD) {
            self.position.x -= d * fx;
            self.position.z -= d * fz;
        }
        if cmd.buttons.contains(Buttons::STRAFE_RIGHT) {
            self.position.x += d * sx;
            self.position.z += d * sz;
        }
        if cmd.buttons.contains(Buttons::STRAFE_LEFT) {
            self.position.x -= d * sx;
            self.position.z -= d * sz;
        }
        if cmd.buttons.contains(Buttons::MOVE_UP) {
            self.position.y += d;
        }
        if cmd.buttons.contains(Buttons::MOVE_DOWN) {
            self.position.y -= d;
        }

        wrap_angles(&mut self.yaw, &mut self.pitch);
    }
}

/// Reduce an angle into `(-2*PI, 2*PI)` by repeated subtraction/addition of a
/// full turn. Crude but deterministic.
fn wrap_angle(a: &mut f64) {
    let two_pi = 2.0 * PI;
    while *a >= two_pi {
        *a -= two_pi;
    }
    while *a <= -two_pi {
        *a += two_pi;
    }
}

fn wrap_angles(yaw: &mut f64, pitch: &mut f64) {
    wrap_angle(yaw);
    wrap_angle(pitch);
}
