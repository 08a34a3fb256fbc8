use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use game_core::{GameController, GameRuntime, StopReason};
use hardware::{
    sim::{SimulatedBus, SimulatedConverter},
    Actuator, BusProvider, Servo,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod terminal;

use config::{load_settings, Settings};
use terminal::{JsonDisplay, TextDisplay, HELP};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DisplayMode {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "forcegame", about = "Two-player force contest on a simulated sensor bus")]
struct Cli {
    /// Settings file; `forcegame.toml` in the working directory is used when present.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Default filter when RUST_LOG is unset.
    #[arg(long, default_value = "info")]
    log_level: String,
    #[arg(long, value_enum, default_value_t = DisplayMode::Text)]
    display: DisplayMode,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .context("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let settings = load_settings(cli.config.as_deref())?;
    run(settings, cli.display).await
}

async fn run(settings: Settings, mode: DisplayMode) -> Result<()> {
    let pads = SimulatedConverter::with_full_scale(settings.bus.converter_full_scale);
    let mut bus = SimulatedBus::with_converter(&settings.bus.name, pads.clone());
    info!(buses = ?bus.bus_names(), "available buses");

    let pulse_driver = bus
        .open_pulse_driver(&settings.bus.name, settings.bus.servo())
        .context("failed to open pulse generator")?;
    let servo = Servo::attach(pulse_driver, settings.servo.clone())
        .context("failed to attach bell servo")?;
    let converter = bus
        .open_converter(&settings.bus.name, settings.bus.converter())
        .context("failed to open converter")?;

    let game = settings.game();
    let controller = GameController::start(converter, servo, game.clone())
        .context("failed to start game")?;
    let (mut runtime, handle) = GameRuntime::new(controller, game.timing.tick_interval());
    match mode {
        DisplayMode::Text => runtime.subscribe(TextDisplay::new(std::io::stdout())),
        DisplayMode::Json => runtime.subscribe(JsonDisplay::new(std::io::stdout())),
    }

    info!("{HELP}");
    let input = tokio::spawn(terminal::drive(
        terminal::spawn_stdin_reader(),
        handle.clone(),
        pads,
        game.sensor.clone(),
    ));
    let interrupt = {
        let handle = handle.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("interrupt received");
                let _ = handle.shutdown().await;
            }
        })
    };
    drop(handle);

    let stopped = runtime.run().await;
    input.abort();
    interrupt.abort();

    let (_converter, mut servo) = stopped.controller.into_parts();
    if let Err(err) = servo.turn_off() {
        warn!(%err, "failed to release bell servo");
    }
    for address in [settings.bus.servo(), settings.bus.converter()] {
        if let Err(err) = bus.close(address) {
            warn!(%err, address = address.0, "failed to close device");
        }
    }

    match stopped.reason {
        StopReason::Fault(err) => {
            error!(%err, "game stopped on a bus fault");
            Err(err).context("game loop failed")
        }
        StopReason::Shutdown | StopReason::HandlesDropped => {
            info!("goodbye");
            Ok(())
        }
    }
}
