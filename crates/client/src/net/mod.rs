mod connection;
pub mod interpolation;

pub use connection::{ClientFlags, ClientShared, NetworkClient};
