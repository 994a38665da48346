mod config;
mod connection;
mod events;
mod server;

use std::io::{self, BufRead};
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use config::ServerConfig;
use server::GameServer;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match parse_args(std::env::args().collect()) {
        Ok(config) => config,
        Err(usage) => {
            eprintln!("{usage}");
            return ExitCode::from(1);
        }
    };

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::from(2)
        }
    }
}

fn parse_args(args: Vec<String>) -> Result<ServerConfig, String> {
    let usage = "usage: skirmish-server <port>";
    match args.as_slice() {
        [_, port] => port
            .parse::<u16>()
            .map(|port| ServerConfig { port })
            .map_err(|_| format!("{usage}\ninvalid port: {port}")),
        _ => Err(usage.to_string()),
    }
}

fn run(config: ServerConfig) -> anyhow::Result<()> {
    let server = GameServer::bind(config.port)?;
    log::info!("server listening on {}", server.local_addr()?);

    // Two threads, as the protocol's concurrency model requires: this thread
    // (the application thread) only watches stdin for EOF; the I/O worker
    // thread runs the accept/read/tick event loop and owns the world.
    let running = Arc::new(AtomicBool::new(true));
    let io_running = running.clone();
    let io_worker = thread::spawn(move || {
        let mut server = server;
        server.run(&io_running);
    });

    wait_for_stdin_eof();
    running.store(false, Ordering::Relaxed);

    io_worker.join().expect("I/O worker thread panicked");
    log::info!("server shut down");
    Ok(())
}

fn wait_for_stdin_eof() {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    while lines.next().is_some() {}
}
