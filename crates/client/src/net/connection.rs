use std::io::{self, Write};
use std::net::TcpStream;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use skirmish_core::command::Command;
use skirmish_core::net::{JoinRequest, Message, codec};
use skirmish_core::world::World;

use crate::command_log::CommandLog;
use crate::snapshot_buffer::SnapshotBuffer;

/// State touched by both the reader thread and the frame loop. `world`,
/// `snapshots`, and `commands` are always mutated as a group, so one mutex
/// covers all three rather than one each.
#[derive(Debug, Default)]
pub struct ClientShared {
    pub world: World,
    pub snapshots: SnapshotBuffer,
    pub commands: CommandLog,
}

/// Scalar state read far more often than it changes: cheap to poll
/// lock-free from the frame loop instead of taking the shared mutex.
#[derive(Debug, Default)]
pub struct ClientFlags {
    pub player_id: AtomicU8,
    pub game_time_ms: AtomicU64,
    pub quit: AtomicBool,
    pub debug: AtomicBool,
    pub predict_and_interpolate: AtomicBool,
}

impl ClientFlags {
    pub fn player_id(&self) -> u8 {
        self.player_id.load(Ordering::Relaxed)
    }

    pub fn is_joined(&self) -> bool {
        self.player_id() != 0
    }
}

/// A connection to the server: a write half the frame loop sends commands
/// through, and a reader thread that owns the read half and applies every
/// incoming message to `shared` and `flags`.
pub struct NetworkClient {
    write_half: Mutex<TcpStream>,
    pub shared: Arc<Mutex<ClientShared>>,
    pub flags: Arc<ClientFlags>,
    reader: Option<thread::JoinHandle<()>>,
}

impl NetworkClient {
    /// Connects, sends the join request, and spawns the reader thread.
    /// `predict_and_interpolate` starts enabled, matching the default UI
    /// state before any `TOGGLE_PREDICT` press.
    pub fn connect(host: &str, port: u16, color: u32) -> io::Result<Self> {
        let stream = TcpStream::connect((host, port))?;
        let read_half = stream.try_clone()?;

        let shared = Arc::new(Mutex::new(ClientShared::default()));
        let flags = Arc::new(ClientFlags::default());
        flags.predict_and_interpolate.store(true, Ordering::Relaxed);

        let reader_shared = shared.clone();
        let reader_flags = flags.clone();
        let reader = thread::spawn(move || read_loop(read_half, reader_shared, reader_flags));

        let client = NetworkClient {
            write_half: Mutex::new(stream),
            shared,
            flags,
            reader: Some(reader),
        };
        client.send(&Message::JoinRequest(JoinRequest { color }))?;
        Ok(client)
    }

    pub fn send(&self, message: &Message) -> io::Result<()> {
        let bytes = message
            .encode()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
        self.write_half.lock().unwrap().write_all(&bytes)
    }

    pub fn send_command(&self, cmd: Command) -> io::Result<()> {
        self.send(&Message::Command(cmd))
    }
}

impl Drop for NetworkClient {
    fn drop(&mut self) {
        self.flags.quit.store(true, Ordering::Relaxed);
        if let Ok(stream) = self.write_half.lock() {
            let _ = stream.shutdown(std::net::Shutdown::Both);
        }
        if let Some(reader) = self.reader.take() {
            let _ = reader.join();
        }
    }
}

/// Reader thread body: blocks on the socket, decodes one frame at a time,
/// and folds each message into `shared`/`flags`. Ends on a clean close or
/// any read error, which is treated the same as the join handshake failing:
/// set the quit flag and return.
fn read_loop(mut stream: TcpStream, shared: Arc<Mutex<ClientShared>>, flags: Arc<ClientFlags>) {
    loop {
        let body = match codec::take_frame(&mut stream) {
            Ok(Some(body)) => body,
            Ok(None) => break,
            Err(e) => {
                log::debug!("connection to server ended: {e}");
                break;
            }
        };

        let (class_id, payload) = codec::split_class_id(&body);
        match Message::decode(class_id, payload) {
            Ok(Some(Message::ServerAccept(accept))) => {
                flags.player_id.store(accept.player_id, Ordering::Relaxed);
                log::info!("joined as player {}", accept.player_id);
            }
            Ok(Some(Message::ServerDeny(deny))) => {
                log::warn!("server denied join: {}", deny.reason);
                flags.quit.store(true, Ordering::Relaxed);
                break;
            }
            Ok(Some(Message::WorldSnapshot(snapshot))) => {
                apply_snapshot(&shared, &flags, snapshot);
            }
            Ok(Some(_)) | Ok(None) => {}
            Err(e) => log::debug!("failed to decode message (class {class_id}): {e}"),
        }
    }
    flags.quit.store(true, Ordering::Relaxed);
}

/// The "on snapshot receipt" reconciliation algorithm: ingest into the
/// snapshot buffer, prune, replace the local world with the server's, then
/// (if prediction is on and the join handshake has completed) drop
/// acknowledged commands and replay the rest on top.
fn apply_snapshot(
    shared: &Mutex<ClientShared>,
    flags: &ClientFlags,
    mut snapshot: skirmish_core::net::WorldSnapshot,
) {
    let player_id = flags.player_id();
    let game_time_ms = flags.game_time_ms.load(Ordering::Relaxed);
    let render_time = game_time_ms.saturating_sub(skirmish_core::config::INTERP_MS);

    let mut shared = shared.lock().unwrap();
    snapshot.client_time_ms = game_time_ms;
    shared.snapshots.ingest(snapshot.clone(), game_time_ms);
    shared.snapshots.prune(render_time);
    shared.world = snapshot.world;

    if flags.predict_and_interpolate.load(Ordering::Relaxed) && flags.is_joined() {
        let acked = shared
            .world
            .player(player_id)
            .map(|p| p.last_command_id)
            .unwrap_or(0);
        let ClientShared { world, commands, .. } = &mut *shared;
        commands.reconcile(world, player_id, acked);
    }
}
