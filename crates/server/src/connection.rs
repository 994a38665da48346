use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream};

use skirmish_core::net::codec;

/// A single accepted client: its socket, a per-connection read accumulator,
/// and its player id (`0` until `Joined`).
pub struct Connection {
    pub stream: TcpStream,
    pub addr: SocketAddr,
    pub player_id: u8,
    read_buf: Vec<u8>,
}

impl Connection {
    pub fn new(stream: TcpStream, addr: SocketAddr) -> io::Result<Self> {
        stream.set_nonblocking(true)?;
        Ok(Connection {
            stream,
            addr,
            player_id: 0,
            read_buf: Vec::new(),
        })
    }

    /// Drains whatever bytes the non-blocking socket currently has and
    /// returns every frame body that is now fully buffered. `WouldBlock` is
    /// not an error — it just means there is nothing more to read this poll.
    /// Any other read error, including a clean close, ends the connection.
    pub fn poll_frames(&mut self) -> io::Result<Vec<Vec<u8>>> {
        let mut scratch = [0u8; 4096];
        loop {
            match self.stream.read(&mut scratch) {
                Ok(0) => {
                    return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "peer closed the connection"));
                }
                Ok(n) => self.read_buf.extend_from_slice(&scratch[..n]),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }

        let mut frames = Vec::new();
        while let Some(body) = codec::try_extract_frame(&mut self.read_buf) {
            frames.push(body);
        }
        Ok(frames)
    }

    /// Writes are best-effort: a broken connection surfaces through its read
    /// loop, not here, so a write failure is logged and otherwise ignored.
    pub fn send_best_effort(&mut self, bytes: &[u8]) {
        if let Err(e) = self.stream.write_all(bytes) {
            log::warn!("write to player {} failed: {e}", self.player_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;

    use super::*;

    #[test]
    fn poll_frames_buffers_until_a_full_frame_arrives() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let mut client = TcpStream::connect(addr).unwrap();
        let (server_stream, peer_addr) = listener.accept().unwrap();

        let mut conn = Connection::new(server_stream, peer_addr).unwrap();
        assert!(conn.poll_frames().unwrap().is_empty());

        let frame = codec::frame(4, b"{\"color\":1}");
        client.write_all(&frame[..4]).unwrap();
        assert!(conn.poll_frames().unwrap().is_empty());

        client.write_all(&frame[4..]).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(20));
        let frames = conn.poll_frames().unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(codec::split_class_id(&frames[0]).0, 4);
    }
}
