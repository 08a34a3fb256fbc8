//! Console front end: renders display frames and turns typed lines into
//! game commands and simulated pad readings.

use std::io::{BufRead, Write};

use game_core::{DisplayObserver, GameHandle, SensorSettings};
use hardware::sim::SimulatedConverter;
use shared::{
    domain::Side,
    protocol::{DisplayFrame, DisplayView, SideView},
};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

pub const HELP: &str = "commands: <enter>|a|action, red <raw>, green <raw>, q|quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputCommand {
    Action,
    Press { side: Side, raw: i16 },
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown command `{0}`")]
    Unknown(String),
    #[error("{0:?} needs a raw reading")]
    MissingReading(Side),
    #[error("`{0}` is not a raw reading")]
    BadReading(String),
}

pub fn parse_line(line: &str) -> Result<InputCommand, ParseError> {
    let mut words = line.split_whitespace();
    let Some(first) = words.next() else {
        return Ok(InputCommand::Action);
    };
    let side = match first.to_ascii_lowercase().as_str() {
        "a" | "action" => return Ok(InputCommand::Action),
        "q" | "quit" | "exit" => return Ok(InputCommand::Quit),
        "h" | "help" | "?" => return Ok(InputCommand::Help),
        "r" | "red" => Side::Red,
        "g" | "green" => Side::Green,
        other => return Err(ParseError::Unknown(other.to_string())),
    };
    let value = words.next().ok_or(ParseError::MissingReading(side))?;
    let raw = value
        .parse::<i16>()
        .map_err(|_| ParseError::BadReading(value.to_string()))?;
    Ok(InputCommand::Press { side, raw })
}

/// Reads stdin on a plain thread; a blocking read there cannot hold up
/// runtime shutdown.
pub fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Feeds typed lines to the game until `quit` or end of input, then asks the
/// runtime to shut down.
pub async fn drive(
    mut lines: mpsc::Receiver<String>,
    handle: GameHandle,
    pads: SimulatedConverter,
    sensor: SensorSettings,
) {
    while let Some(line) = lines.recv().await {
        match parse_line(&line) {
            Ok(InputCommand::Action) => {
                if handle.action().await.is_err() {
                    return;
                }
            }
            Ok(InputCommand::Press { side, raw }) => {
                let channel = match side {
                    Side::Red => sensor.red(),
                    Side::Green => sensor.green(),
                };
                if let Err(err) = pads.set_reading(channel, raw) {
                    warn!(%err, ?side, "could not set pad reading");
                }
            }
            Ok(InputCommand::Help) => info!("{HELP}"),
            Ok(InputCommand::Quit) => break,
            Err(err) => warn!(%err, "{HELP}"),
        }
    }

    debug!("input finished");
    if handle.shutdown().await.is_err() {
        debug!("runtime already stopped");
    }
}

/// Prints a line whenever the rendered view changes.
pub struct TextDisplay<W> {
    out: W,
    last: Option<DisplayView>,
}

impl<W: Write + Send> TextDisplay<W> {
    pub fn new(out: W) -> Self {
        Self { out, last: None }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> DisplayObserver for TextDisplay<W> {
    fn refresh(&mut self, frame: &DisplayFrame) {
        let view = frame.view();
        if self.last.as_ref() == Some(&view) {
            return;
        }
        let action = match (&view.action.label, view.action.visible) {
            (Some(label), true) => format!("[{label}]"),
            _ => "[ ]".to_string(),
        };
        let line = format!(
            "{:<8} red {} | green {} {}",
            frame.state.as_str(),
            side_text(&view.red),
            side_text(&view.green),
            action
        );
        if let Err(err) = writeln!(self.out, "{line}").and_then(|()| self.out.flush()) {
            warn!(%err, "display write failed");
        }
        self.last = Some(view);
    }
}

fn side_text(side: &SideView) -> String {
    format!("{:>7} ({:.2})", side.text, side.weight)
}

/// Emits each changed frame as one JSON object per line.
pub struct JsonDisplay<W> {
    out: W,
    last: Option<DisplayFrame>,
}

impl<W: Write + Send> JsonDisplay<W> {
    pub fn new(out: W) -> Self {
        Self { out, last: None }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> DisplayObserver for JsonDisplay<W> {
    fn refresh(&mut self, frame: &DisplayFrame) {
        if self.last == Some(*frame) {
            return;
        }
        let result = serde_json::to_writer(&mut self.out, frame)
            .map_err(std::io::Error::from)
            .and_then(|()| writeln!(self.out))
            .and_then(|()| self.out.flush());
        if let Err(err) = result {
            warn!(%err, "display write failed");
        }
        self.last = Some(*frame);
    }
}

#[cfg(test)]
#[path = "tests/terminal_tests.rs"]
mod tests;
