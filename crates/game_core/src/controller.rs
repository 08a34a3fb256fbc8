//! The game state machine.
//!
//! Every input arrives as a [`GameEvent`] and goes through
//! [`GameController::handle`], which holds the whole transition table. Pairs
//! missing from the table leave the controller untouched.

use hardware::{Actuator, AnalogSensor};
use shared::{
    domain::{GameState, Scores},
    protocol::DisplayFrame,
};
use tokio::time::Instant;
use tracing::{debug, info, trace};

use crate::{
    countdown::{CountdownStep, CountdownTimer},
    error::GameError,
    score::ScoreTracker,
    settings::GameSettings,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// Periodic scheduler tick.
    Tick,
    /// The UI action button was pressed.
    Action,
    /// The countdown's pending fire is due.
    CountdownElapsed,
}

pub struct GameController<S, A> {
    state: GameState,
    tracker: ScoreTracker,
    countdown: CountdownTimer,
    sensor: S,
    actuator: A,
    settings: GameSettings,
    strikes: u32,
}

impl<S: AnalogSensor, A: Actuator> GameController<S, A> {
    /// Builds the controller in `Ready`, running its entry action.
    pub fn start(sensor: S, actuator: A, settings: GameSettings) -> Result<Self, GameError> {
        settings.validate()?;

        let mut controller = Self {
            state: GameState::Ready,
            tracker: ScoreTracker::new(settings.sensor.max_raw),
            countdown: CountdownTimer::new(settings.timing.countdown_step()),
            sensor,
            actuator,
            settings,
            strikes: 0,
        };
        controller.enter(GameState::Ready)?;
        Ok(controller)
    }

    /// Applies one event. Returns the state entered, if the event caused a transition.
    pub fn handle(&mut self, event: GameEvent, now: Instant) -> Result<Option<GameState>, GameError> {
        let next = match (self.state, event) {
            (GameState::Ready, GameEvent::Tick) => {
                self.tracker.reset();
                None
            }
            (GameState::Ready, GameEvent::Action) => {
                // Entering Ready withdraws any countdown, so this always arms a fresh one.
                self.countdown.start(now);
                self.advance_countdown(now);
                Some(GameState::Starting)
            }
            (GameState::Starting, GameEvent::CountdownElapsed) => self.advance_countdown(now),
            (GameState::Playing, GameEvent::Tick) => {
                let scores = self.sample()?;
                scores.has_winner().then_some(GameState::Ended)
            }
            (GameState::Ended, GameEvent::Action) => Some(GameState::Ready),
            (state, event) => {
                trace!(%state, ?event, "event has no effect");
                None
            }
        };

        if let Some(next) = next {
            self.enter(next)?;
        }
        Ok(next)
    }

    /// Withdraws any pending countdown fire.
    pub fn cancel_countdown(&mut self) {
        if self.countdown.cancel() {
            info!("pending countdown cancelled");
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn scores(&self) -> Scores {
        self.tracker.scores()
    }

    pub fn next_countdown_fire(&self) -> Option<Instant> {
        self.countdown.next_fire()
    }

    /// Number of strike commands sent to the bell since startup.
    pub fn strikes(&self) -> u32 {
        self.strikes
    }

    pub fn frame(&self) -> DisplayFrame {
        DisplayFrame {
            state: self.state,
            scores: self.tracker.scores(),
            countdown: match self.state {
                GameState::Starting => self.countdown.announced(),
                _ => None,
            },
        }
    }

    pub fn into_parts(self) -> (S, A) {
        (self.sensor, self.actuator)
    }

    fn sample(&mut self) -> Result<Scores, GameError> {
        let red = self.sensor.read_raw(self.settings.sensor.red())?;
        let green = self.sensor.read_raw(self.settings.sensor.green())?;
        let scores = self.tracker.update(red, green);
        debug!(red, green, red_score = scores.red, green_score = scores.green, "sampled");
        Ok(scores)
    }

    /// Fires the countdown once; the first fire announces the starting number.
    fn advance_countdown(&mut self, now: Instant) -> Option<GameState> {
        match self.countdown.fire(now) {
            CountdownStep::Announce(seconds) => {
                info!(seconds, "countdown");
                None
            }
            CountdownStep::Finished => Some(GameState::Playing),
            CountdownStep::Idle => None,
        }
    }

    fn enter(&mut self, next: GameState) -> Result<(), GameError> {
        let previous = self.state;
        self.state = next;
        info!(from = %previous, to = %next, scores = ?self.tracker.scores(), "state transition");

        match next {
            GameState::Ready => {
                self.countdown.cancel();
                self.tracker.reset();
                self.actuator.move_to(self.settings.bell.rest_angle)?;
            }
            GameState::Starting => self.tracker.reset(),
            GameState::Playing => {}
            GameState::Ended => {
                self.actuator.move_to(self.settings.bell.strike_angle)?;
                self.strikes += 1;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
