use std::process::ExitCode;

use skirmish_client::adapters::{LoggingPresenter, NullInputSource};
use skirmish_client::{ClientApp, ClientConfig};

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

fn parse_args(args: Vec<String>) -> Result<ClientConfig, String> {
    let usage = "usage: skirmish-client <host> <port>";
    match args.as_slice() {
        [_, host, port] => port
            .parse::<u16>()
            .map(|port| ClientConfig {
                host: host.clone(),
                port,
                color: 0xFFFFFFFF,
            })
            .map_err(|_| format!("{usage}\ninvalid port: {port}")),
        _ => Err(usage.to_string()),
    }
}

fn run(config: ClientConfig) -> anyhow::Result<()> {
    log::info!("connecting to {}:{}", config.host, config.port);
    let mut app = ClientApp::connect(config)?;

    log::info!("loading...");
    app.wait_for_join();
    if app.quit_requested() {
        // A deny or a transport error during the handshake already logged its
        // own reason (see NetworkClient's reader thread) and raised the quit
        // flag; per the protocol's admission-error handling this is a normal
        // exit, not an unhandled error.
        log::info!("did not join, exiting");
        return Ok(());
    }
    log::info!("joined as player {}", app.player_id());

    let mut input = NullInputSource;
    let mut presenter = LoggingPresenter;
    app.run(&mut input, &mut presenter);

    log::info!("client shut down");
    Ok(())
}
