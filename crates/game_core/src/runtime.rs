//! Single-task event loop driving a [`GameController`].
//!
//! The scheduler tick, the countdown deadline and queued commands are all
//! awaited from one `select!`, so no two of them ever run concurrently.

use std::time::Duration;

use hardware::{Actuator, AnalogSensor};
use shared::protocol::GameCommand;
use tokio::{
    sync::mpsc,
    time::{interval, sleep_until, Instant, MissedTickBehavior},
};
use tracing::{error, info};

use crate::{
    controller::{GameController, GameEvent},
    display::DisplayObserver,
    error::GameError,
};

const COMMAND_QUEUE_DEPTH: usize = 32;

/// Cloneable sender side of the runtime's command queue.
#[derive(Debug, Clone)]
pub struct GameHandle {
    commands: mpsc::Sender<GameCommand>,
}

impl GameHandle {
    pub async fn send(&self, command: GameCommand) -> Result<(), GameError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| GameError::RuntimeClosed)
    }

    pub async fn action(&self) -> Result<(), GameError> {
        self.send(GameCommand::Action).await
    }

    pub async fn shutdown(&self) -> Result<(), GameError> {
        self.send(GameCommand::Shutdown).await
    }
}

#[derive(Debug)]
pub enum StopReason {
    Shutdown,
    /// Every [`GameHandle`] was dropped.
    HandlesDropped,
    Fault(GameError),
}

/// What [`GameRuntime::run`] hands back once the loop has ended and every
/// pending timer has been withdrawn.
pub struct Stopped<S, A> {
    pub controller: GameController<S, A>,
    pub reason: StopReason,
}

pub struct GameRuntime<S, A> {
    controller: GameController<S, A>,
    commands: mpsc::Receiver<GameCommand>,
    observers: Vec<Box<dyn DisplayObserver>>,
    tick_interval: Duration,
}

impl<S: AnalogSensor, A: Actuator> GameRuntime<S, A> {
    pub fn new(controller: GameController<S, A>, tick_interval: Duration) -> (Self, GameHandle) {
        let (tx, rx) = mpsc::channel(COMMAND_QUEUE_DEPTH);
        let runtime = Self {
            controller,
            commands: rx,
            observers: Vec::new(),
            tick_interval,
        };
        (runtime, GameHandle { commands: tx })
    }

    pub fn subscribe(&mut self, observer: impl DisplayObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub async fn run(mut self) -> Stopped<S, A> {
        let mut ticker = interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(tick_ms = self.tick_interval.as_millis() as u64, "game loop started");

        let reason = loop {
            let countdown_due = self.controller.next_countdown_fire();
            let event = tokio::select! {
                biased;
                command = self.commands.recv() => match command {
                    Some(GameCommand::Action) => GameEvent::Action,
                    Some(GameCommand::Shutdown) => break StopReason::Shutdown,
                    None => break StopReason::HandlesDropped,
                },
                () = wait_until(countdown_due) => GameEvent::CountdownElapsed,
                _ = ticker.tick() => GameEvent::Tick,
            };

            if let Err(err) = self.controller.handle(event, Instant::now()) {
                error!(%err, ?event, state = %self.controller.state(), "game loop stopped by fault");
                break StopReason::Fault(err);
            }

            let frame = self.controller.frame();
            for observer in &mut self.observers {
                observer.refresh(&frame);
            }
        };

        self.controller.cancel_countdown();
        info!(?reason, "game loop stopped");
        Stopped {
            controller: self.controller,
            reason,
        }
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
#[path = "tests/runtime_tests.rs"]
mod tests;
