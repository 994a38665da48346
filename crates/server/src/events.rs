#[derive(Debug, Clone, Copy)]
pub enum DisconnectReason {
    /// The peer's read loop hit a socket error or clean close.
    SocketClosed,
}

impl DisconnectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisconnectReason::SocketClosed => "disconnected",
        }
    }
}
