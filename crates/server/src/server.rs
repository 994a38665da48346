use std::io;
use std::net::{SocketAddr, TcpListener};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use skirmish_core::command::Command;
use skirmish_core::config::TICK_MS;
use skirmish_core::net::codec;
use skirmish_core::net::{Message, ServerAccept, ServerDeny, WorldSnapshot};
use skirmish_core::world::World;

use crate::connection::Connection;
use crate::events::DisconnectReason;

/// Accept loop, per-connection read loop, command intake, and the fixed-tick
/// snapshot broadcast, all serialized onto a single I/O-worker thread: the
/// authoritative world and the connection list are single-writer from here,
/// so no lock guards them.
pub struct GameServer {
    listener: TcpListener,
    connections: Vec<Connection>,
    world: World,
    server_time_ms: u64,
    next_tick: Instant,
}

impl GameServer {
    pub fn bind(port: u16) -> io::Result<Self> {
        let listener = TcpListener::bind(("0.0.0.0", port))?;
        listener.set_nonblocking(true)?;
        Ok(GameServer {
            listener,
            connections: Vec::new(),
            world: World::new(),
            server_time_ms: 0,
            next_tick: Instant::now() + Duration::from_millis(TICK_MS),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs until `running` is cleared. Each iteration: accept new
    /// connections, drain and dispatch available reads, fire the tick if its
    /// interval elapsed, then yield briefly.
    pub fn run(&mut self, running: &AtomicBool) {
        while running.load(Ordering::Relaxed) {
            self.accept_new_connections();
            self.poll_connections();

            if Instant::now() >= self.next_tick {
                self.tick();
                self.next_tick += Duration::from_millis(TICK_MS);
            }

            std::thread::sleep(Duration::from_millis(1));
        }
        log::info!("server stopping");
    }

    fn accept_new_connections(&mut self) {
        loop {
            match self.listener.accept() {
                Ok((stream, addr)) => match Connection::new(stream, addr) {
                    Ok(conn) => {
                        self.connections.push(conn);
                        log::info!("new client connected from {addr}");
                    }
                    Err(e) => log::warn!("failed to configure connection from {addr}: {e}"),
                },
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) => {
                    log::warn!("accept() failed: {e}");
                    break;
                }
            }
        }
    }

    fn poll_connections(&mut self) {
        let world = &mut self.world;
        let mut closed = Vec::new();

        for (index, conn) in self.connections.iter_mut().enumerate() {
            match conn.poll_frames() {
                Ok(frames) => {
                    for body in frames {
                        dispatch(world, conn, &body);
                    }
                }
                Err(e) => {
                    log::debug!("read from {}: {e}", conn.addr);
                    closed.push(index);
                }
            }
        }

        for index in closed.into_iter().rev() {
            let conn = self.connections.remove(index);
            self.world.remove_player(conn.player_id);
            log::info!(
                "client {} ({})",
                conn.addr,
                DisconnectReason::SocketClosed.as_str()
            );
        }
    }

    fn tick(&mut self) {
        self.server_time_ms += TICK_MS;

        if self.connections.is_empty() {
            return;
        }

        let snapshot = WorldSnapshot::new(self.world.clone(), self.server_time_ms);
        let message = Message::WorldSnapshot(snapshot);

        let bytes = match message.encode() {
            Ok(bytes) => bytes,
            Err(e) => {
                log::error!("failed to encode world snapshot: {e}");
                return;
            }
        };

        for conn in &mut self.connections {
            conn.send_best_effort(&bytes);
        }
    }
}

fn dispatch(world: &mut World, conn: &mut Connection, body: &[u8]) {
    let (class_id, payload) = codec::split_class_id(body);
    match Message::decode(class_id, payload) {
        Ok(Some(Message::JoinRequest(req))) => match world.add_player(req.color) {
            Some(player_id) => {
                conn.player_id = player_id;
                let accept = Message::ServerAccept(ServerAccept { player_id });
                if let Ok(bytes) = accept.encode() {
                    conn.send_best_effort(&bytes);
                }
                log::info!("player joined, id: {player_id}");
            }
            None => {
                let deny = Message::ServerDeny(ServerDeny::player_limit_reached());
                if let Ok(bytes) = deny.encode() {
                    conn.send_best_effort(&bytes);
                }
                log::info!("player rejected, reason: player limit reached");
            }
        },
        Ok(Some(Message::Command(cmd))) => {
            if validate_command(&cmd) {
                world.apply(&cmd, conn.player_id);
            }
        }
        Ok(Some(_)) | Ok(None) => {}
        Err(e) => log::debug!("failed to decode message (class {class_id}): {e}"),
    }
}

/// Placeholder anti-cheat hook. No validation is performed; every
/// well-formed command is accepted as-is.
fn validate_command(_cmd: &Command) -> bool {
    true
}
