//! Compile-time constants shared by the server, the client, and the wire codec.

/// Server simulation/broadcast interval.
pub const TICK_MS: u64 = 50;

/// Target client frame period.
pub const FRAME_SLEEP_MS: u64 = 15;

/// Interpolation delay applied to remote players (6 ticks of buffer).
pub const INTERP_MS: u64 = 300;

/// Byte width of the ASCII-decimal frame length header.
pub const HEADER_SIZE: usize = 8;

/// Byte width of the ASCII-decimal class tag that follows the header.
pub const CLASS_ID_SIZE: usize = 3;

/// Largest valid player id; id 0 is reserved for "absent".
pub const MAX_PLAYERS: u8 = 255;

/// World extent along x, in meters.
pub const WORLD_HALF_WIDTH: f64 = 5.0;

/// World extent along z, in meters.
pub const WORLD_HALF_DEPTH: f64 = 5.0;

/// Linear movement speed, in meters per second.
pub const MOVE_SPEED: f64 = 2.0;

/// Turn speed, in radians per second.
pub const TURN_SPEED: f64 = 3.0;
