pub mod codec;
mod protocol;

pub use protocol::{ClassId, JoinRequest, Message, PacketError, ServerAccept, ServerDeny, WorldSnapshot};
