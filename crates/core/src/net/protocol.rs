use serde::{Deserialize, Serialize};

use crate::command::Command;
use crate::world::World;

/// Normative class tags from the wire protocol. `Player` (1) and `World` (2)
/// are embedded-only: they appear nested inside a `WorldSnapshot` body and
/// are never dispatched as a standalone message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ClassId {
    Player = 1,
    World = 2,
    JoinRequest = 4,
    ServerAccept = 5,
    ServerDeny = 6,
    Command = 7,
    WorldSnapshot = 10,
}

impl ClassId {
    pub fn from_u8(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(ClassId::Player),
            2 => Some(ClassId::World),
            4 => Some(ClassId::JoinRequest),
            5 => Some(ClassId::ServerAccept),
            6 => Some(ClassId::ServerDeny),
            7 => Some(ClassId::Command),
            10 => Some(ClassId::WorldSnapshot),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinRequest {
    pub color: u32,
}

impl JoinRequest {
    pub const CLASS_ID: u8 = ClassId::JoinRequest as u8;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ServerAccept {
    pub player_id: u8,
}

impl ServerAccept {
    pub const CLASS_ID: u8 = ClassId::ServerAccept as u8;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerDeny {
    pub reason: String,
}

impl ServerDeny {
    pub const CLASS_ID: u8 = ClassId::ServerDeny as u8;

    pub fn player_limit_reached() -> Self {
        ServerDeny {
            reason: "player limit reached".to_string(),
        }
    }
}

/// A captured `World` plus the server time it was taken at.
///
/// `client_time_ms` is stamped locally by the client on receipt and is never
/// put on the wire (the server always sends zero there; the field exists so
/// the same type can live in the client's snapshot buffer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub world: World,
    pub server_time_ms: u64,
    #[serde(default)]
    pub client_time_ms: u64,
}

impl WorldSnapshot {
    pub const CLASS_ID: u8 = ClassId::WorldSnapshot as u8;

    pub fn new(world: World, server_time_ms: u64) -> Self {
        WorldSnapshot {
            world,
            server_time_ms,
            client_time_ms: 0,
        }
    }
}

/// The decoded form of any dispatchable message.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    JoinRequest(JoinRequest),
    ServerAccept(ServerAccept),
    ServerDeny(ServerDeny),
    Command(Command),
    WorldSnapshot(WorldSnapshot),
}

impl Message {
    pub fn class_id(&self) -> u8 {
        match self {
            Message::JoinRequest(_) => JoinRequest::CLASS_ID,
            Message::ServerAccept(_) => ServerAccept::CLASS_ID,
            Message::ServerDeny(_) => ServerDeny::CLASS_ID,
            Message::Command(_) => Command::CLASS_ID,
            Message::WorldSnapshot(_) => WorldSnapshot::CLASS_ID,
        }
    }

    fn payload_bytes(&self) -> serde_json::Result<Vec<u8>> {
        match self {
            Message::JoinRequest(m) => serde_json::to_vec(m),
            Message::ServerAccept(m) => serde_json::to_vec(m),
            Message::ServerDeny(m) => serde_json::to_vec(m),
            Message::Command(m) => serde_json::to_vec(m),
            Message::WorldSnapshot(m) => serde_json::to_vec(m),
        }
    }

    /// Encodes `self` into a complete frame: header, class id, payload.
    pub fn encode(&self) -> Result<Vec<u8>, PacketError> {
        let payload = self.payload_bytes().map_err(PacketError::Serialize)?;
        Ok(crate::net::codec::frame(self.class_id(), &payload))
    }

    /// Decodes a message body (everything after the length header) given its
    /// already-parsed class id. Returns `None` for an unrecognized tag, per
    /// the codec's "drop and continue" policy.
    pub fn decode(class_id: u8, payload: &[u8]) -> Result<Option<Message>, PacketError> {
        let Some(class_id) = ClassId::from_u8(class_id) else {
            log::trace!("dropping message with unrecognized class id {class_id}");
            return Ok(None);
        };
        let message = match class_id {
            ClassId::JoinRequest => {
                Message::JoinRequest(serde_json::from_slice(payload).map_err(PacketError::Deserialize)?)
            }
            ClassId::ServerAccept => {
                Message::ServerAccept(serde_json::from_slice(payload).map_err(PacketError::Deserialize)?)
            }
            ClassId::ServerDeny => {
                Message::ServerDeny(serde_json::from_slice(payload).map_err(PacketError::Deserialize)?)
            }
            ClassId::Command => {
                Message::Command(serde_json::from_slice(payload).map_err(PacketError::Deserialize)?)
            }
            ClassId::WorldSnapshot => {
                Message::WorldSnapshot(serde_json::from_slice(payload).map_err(PacketError::Deserialize)?)
            }
            ClassId::Player | ClassId::World => return Ok(None),
        };
        Ok(Some(message))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PacketError {
    #[error("serialization failed: {0}")]
    Serialize(serde_json::Error),
    #[error("deserialization failed: {0}")]
    Deserialize(serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Buttons;
    use crate::net::codec;

    #[test]
    fn join_request_round_trips() {
        let msg = Message::JoinRequest(JoinRequest { color: 0xFFA0B0C0 });
        let frame = msg.encode().unwrap();
        let body = codec::take_frame(&mut &frame[..]).unwrap().unwrap();
        let (class_id, payload) = codec::split_class_id(&body);
        let decoded = Message::decode(class_id, payload).unwrap().unwrap();
        assert_eq!(decoded, msg);
    }

    #[test]
    fn command_round_trips() {
        let msg = Message::Command(Command::new(4, Buttons::FORWARD, 0.1, -0.2, 20));
        let frame = msg.encode().unwrap();
        let body = codec::take_frame(&mut &frame[..]).unwrap().unwrap();
        let (class_id, payload) = codec::split_class_id(&body);
        let decoded = Message::decode(class_id, payload).unwrap().unwrap();
        assert_eq!(decoded, msg);
    }

    #[test]
    fn world_snapshot_round_trips() {
        let mut world = World::new();
        world.add_player(0xFF000000);
        let msg = Message::WorldSnapshot(WorldSnapshot::new(world, 150));
        let frame = msg.encode().unwrap();
        let body = codec::take_frame(&mut &frame[..]).unwrap().unwrap();
        let (class_id, payload) = codec::split_class_id(&body);
        let decoded = Message::decode(class_id, payload).unwrap().unwrap();
        assert_eq!(decoded, msg);
    }

    #[test]
    fn unknown_class_id_decodes_to_none() {
        assert!(Message::decode(200, b"{}").unwrap().is_none());
    }

    #[test]
    fn encoded_length_matches_header_field() {
        let msg = Message::ServerDeny(ServerDeny::player_limit_reached());
        let frame = msg.encode().unwrap();
        let header = std::str::from_utf8(&frame[..crate::config::HEADER_SIZE]).unwrap();
        let declared: usize = header.trim().parse().unwrap();
        assert_eq!(declared, frame.len() - crate::config::HEADER_SIZE);
    }
}
