pub mod command;
pub mod config;
pub mod net;
pub mod player;
pub mod world;

pub use command::{Buttons, Command};
pub use config::{
    CLASS_ID_SIZE, FRAME_SLEEP_MS, HEADER_SIZE, INTERP_MS, MAX_PLAYERS, MOVE_SPEED, TICK_MS,
    TURN_SPEED, WORLD_HALF_DEPTH, WORLD_HALF_WIDTH,
};
pub use net::{ClassId, JoinRequest, Message, PacketError, ServerAccept, ServerDeny, WorldSnapshot, codec};
pub use player::Player;
pub use world::World;
