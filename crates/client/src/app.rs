use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

use skirmish_core::command::{Buttons, Command};
use skirmish_core::config::{FRAME_SLEEP_MS, INTERP_MS};

use crate::adapters::{InputSource, Presenter};
use crate::config::ClientConfig;
use crate::net::NetworkClient;
use crate::net::interpolation::interpolated_world;

/// The per-frame loop described in the netcode core's client design: poll
/// input, predict locally, reconcile against whatever the network thread
/// has folded in since, interpolate remotes, and hand a world to the
/// `Presenter`. One `ClientApp` owns the join handshake and everything that
/// follows it; the network reader thread lives inside `NetworkClient`.
pub struct ClientApp {
    config: ClientConfig,
    network: NetworkClient,
    next_command_id: u32,
    game_time_ms: u64,
    last_frame_time_ms: u64,
}

impl ClientApp {
    /// Connects to the server and sends the join request. The join
    /// handshake itself (waiting for `ServerAccept` plus a first snapshot)
    /// happens in `wait_for_join`, run separately so callers can show a
    /// loading screen in between.
    pub fn connect(config: ClientConfig) -> std::io::Result<Self> {
        let network = NetworkClient::connect(&config.host, config.port, config.color)?;
        Ok(ClientApp {
            config,
            network,
            next_command_id: 1,
            game_time_ms: 0,
            last_frame_time_ms: FRAME_SLEEP_MS,
        })
    }

    pub fn player_id(&self) -> u8 {
        self.network.flags.player_id()
    }

    pub fn quit_requested(&self) -> bool {
        self.network.flags.quit.load(Ordering::Relaxed)
    }

    /// Blocks, polling at the frame period, until either the join handshake
    /// completes (a `ServerAccept` has been seen *and* the resulting world
    /// contains our player — i.e. at least one snapshot has been processed)
    /// or the connection fails.
    pub fn wait_for_join(&self) {
        loop {
            if self.quit_requested() {
                return;
            }
            let player_id = self.player_id();
            if player_id != 0 {
                let joined = self
                    .network
                    .shared
                    .lock()
                    .unwrap()
                    .world
                    .player_exists(player_id);
                if joined {
                    return;
                }
            }
            std::thread::sleep(Duration::from_millis(FRAME_SLEEP_MS));
        }
    }

    /// Runs frames until `quit_requested()`, sampling `input` and driving
    /// `presenter` once per iteration.
    pub fn run(&mut self, input: &mut impl InputSource, presenter: &mut impl Presenter) {
        while !self.quit_requested() {
            let loop_start = Instant::now();
            self.frame(input, presenter);
            std::thread::sleep(Duration::from_millis(FRAME_SLEEP_MS));
            self.last_frame_time_ms = FRAME_SLEEP_MS + loop_start.elapsed().as_millis() as u64;
            self.game_time_ms += self.last_frame_time_ms;
            self.network.flags.game_time_ms.store(self.game_time_ms, Ordering::Relaxed);
        }
    }

    fn frame(&mut self, input: &mut impl InputSource, presenter: &mut impl Presenter) {
        input.poll_events();
        if input.quit_requested() {
            self.network.flags.quit.store(true, Ordering::Relaxed);
            return;
        }

        let debug_edge = input.button_released_edge(Buttons::TOGGLE_DEBUG);
        let predict_edge = input.button_released_edge(Buttons::TOGGLE_PREDICT);
        if debug_edge {
            let flag = &self.network.flags.debug;
            flag.store(!flag.load(Ordering::Relaxed), Ordering::Relaxed);
        }
        if predict_edge {
            let flag = &self.network.flags.predict_and_interpolate;
            flag.store(!flag.load(Ordering::Relaxed), Ordering::Relaxed);
        }

        let buttons = input.pressed_buttons();
        let (yaw_delta, pitch_delta) = input.mouse_delta();
        let predict_and_interpolate = self.network.flags.predict_and_interpolate.load(Ordering::Relaxed);

        if !buttons.is_empty() || yaw_delta != 0.0 || pitch_delta != 0.0 {
            let cmd = Command::new(
                self.next_command_id,
                buttons,
                yaw_delta,
                pitch_delta,
                self.last_frame_time_ms.min(u16::MAX as u64) as u16,
            );
            self.next_command_id += 1;

            // Sent regardless of prediction: the server must see every
            // input even when the client isn't predicting its own motion
            // from it.
            if let Err(e) = self.network.send_command(cmd) {
                log::debug!("failed to send command: {e}");
            }

            if predict_and_interpolate {
                let my_id = self.player_id();
                let mut shared = self.network.shared.lock().unwrap();
                shared.commands.push(cmd);
                shared.world.apply(&cmd, my_id);
            }
        }

        let my_id = self.player_id();
        let debug = self.network.flags.debug.load(Ordering::Relaxed);
        let shared = self.network.shared.lock().unwrap();

        let render_world = if predict_and_interpolate {
            let render_time = self.game_time_ms.saturating_sub(INTERP_MS);
            match shared.snapshots.interpolation_pair(render_time) {
                Some((from, to)) => interpolated_world(&shared.world, from, to, render_time, my_id),
                None => shared.world.clone(),
            }
        } else {
            shared.world.clone()
        };
        let latest_raw = shared.snapshots.latest().map(|s| s.world.clone());
        drop(shared);

        presenter.clear();
        presenter.draw_world(&render_world, my_id, false);
        if debug {
            if let Some(raw) = latest_raw {
                presenter.draw_world(&raw, my_id, true);
            }
        }
        presenter.present();
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::net::{TcpListener, TcpStream};
    use std::thread;

    use skirmish_core::net::{self, codec};
    use skirmish_core::world::World;

    use super::*;
    use crate::adapters::LoggingPresenter;

    /// Holds buttons steady every frame and never toggles or quits — enough
    /// to drive one deterministic `frame()` call from a test.
    struct FixedInput {
        buttons: Buttons,
    }

    impl InputSource for FixedInput {
        fn poll_events(&mut self) {}
        fn quit_requested(&self) -> bool {
            false
        }
        fn pressed_buttons(&self) -> Buttons {
            self.buttons
        }
        fn button_released_edge(&mut self, _button: Buttons) -> bool {
            false
        }
        fn mouse_delta(&mut self) -> (f32, f32) {
            (0.0, 0.0)
        }
    }

    /// Spins up a loopback listener that accepts one connection, answers the
    /// join handshake, and hands back the still-open stream so the test can
    /// keep reading whatever the client sends afterward.
    fn accept_and_join(listener: TcpListener, color: u32) -> TcpStream {
        let (mut stream, _) = listener.accept().unwrap();
        stream.set_read_timeout(Some(Duration::from_secs(2))).unwrap();

        let body = codec::take_frame(&mut stream).unwrap().unwrap();
        let (class_id, payload) = codec::split_class_id(&body);
        match net::Message::decode(class_id, payload).unwrap().unwrap() {
            net::Message::JoinRequest(req) => assert_eq!(req.color, color),
            other => panic!("expected JoinRequest, got {other:?}"),
        }

        let mut world = World::new();
        world.add_player(color);
        let accept = net::Message::ServerAccept(net::ServerAccept { player_id: 1 });
        stream.write_all(&accept.encode().unwrap()).unwrap();
        let snapshot = net::Message::WorldSnapshot(net::WorldSnapshot::new(world, 0));
        stream.write_all(&snapshot.encode().unwrap()).unwrap();
        stream
    }

    #[test]
    fn toggling_predict_off_still_sends_but_stops_local_prediction() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let server = thread::spawn(move || accept_and_join(listener, 0xAABBCCDD));

        let config = ClientConfig { host: "127.0.0.1".into(), port: addr.port(), color: 0xAABBCCDD };
        let mut app = ClientApp::connect(config).unwrap();
        app.wait_for_join();
        assert!(!app.quit_requested());

        let mut server_stream = server.join().unwrap();

        let my_id = app.player_id();
        let position_before = {
            let shared = app.network.shared.lock().unwrap();
            shared.world.player(my_id).unwrap().position
        };

        app.network.flags.predict_and_interpolate.store(false, Ordering::Relaxed);
        let mut input = FixedInput { buttons: Buttons::FORWARD };
        let mut presenter = LoggingPresenter;

        app.frame(&mut input, &mut presenter);

        {
            let shared = app.network.shared.lock().unwrap();
            assert!(shared.commands.is_empty());
            // Prediction is off: the local world must still read exactly as
            // the snapshot left it, not advanced by the frame's command.
            assert_eq!(shared.world.player(my_id).unwrap().position, position_before);
        }

        // The command was still sent to the server despite prediction being off.
        let body = codec::take_frame(&mut server_stream).unwrap().unwrap();
        let (class_id, payload) = codec::split_class_id(&body);
        assert!(matches!(
            net::Message::decode(class_id, payload).unwrap().unwrap(),
            net::Message::Command(_)
        ));
    }
}
