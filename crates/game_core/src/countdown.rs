use std::time::Duration;

use tokio::time::Instant;

/// First number announced by a fresh countdown.
pub const COUNTDOWN_START: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownStep {
    /// Publish this number; the next fire is one step later.
    Announce(u8),
    /// Countdown reached zero and is no longer active.
    Finished,
    /// Fired while not armed; nothing happened.
    Idle,
}

/// A cancelable countdown that only ever has one pending fire.
///
/// The owner polls [`CountdownTimer::next_fire`] and calls
/// [`CountdownTimer::fire`] once that instant has passed, so no timer task
/// outlives the owner.
#[derive(Debug, Clone)]
pub struct CountdownTimer {
    step: Duration,
    armed: bool,
    remaining: Option<u8>,
    announced: Option<u8>,
    next_fire: Option<Instant>,
}

impl CountdownTimer {
    pub fn new(step: Duration) -> Self {
        Self {
            step,
            armed: false,
            remaining: None,
            announced: None,
            next_fire: None,
        }
    }

    /// Arms the countdown with its first fire due at `now`. Returns `false`
    /// and leaves the running countdown untouched if one is already active.
    pub fn start(&mut self, now: Instant) -> bool {
        if self.armed {
            return false;
        }
        self.armed = true;
        self.remaining = None;
        self.announced = None;
        self.next_fire = Some(now);
        true
    }

    pub fn fire(&mut self, now: Instant) -> CountdownStep {
        if !self.armed {
            return CountdownStep::Idle;
        }

        match self.remaining.unwrap_or(COUNTDOWN_START) {
            0 => {
                self.clear();
                CountdownStep::Finished
            }
            seconds => {
                self.announced = Some(seconds);
                self.remaining = Some(seconds - 1);
                self.next_fire = Some(now + self.step);
                CountdownStep::Announce(seconds)
            }
        }
    }

    /// Drops any pending fire. Returns whether a countdown was active.
    pub fn cancel(&mut self) -> bool {
        let was_armed = self.armed;
        self.clear();
        was_armed
    }

    pub fn is_active(&self) -> bool {
        self.armed
    }

    pub fn next_fire(&self) -> Option<Instant> {
        self.next_fire
    }

    /// Seconds still to count after the last announcement.
    pub fn remaining(&self) -> Option<u8> {
        self.remaining
    }

    /// The number most recently published to the action label.
    pub fn announced(&self) -> Option<u8> {
        self.announced
    }

    pub fn step(&self) -> Duration {
        self.step
    }

    fn clear(&mut self) {
        self.armed = false;
        self.remaining = None;
        self.announced = None;
        self.next_fire = None;
    }
}

#[cfg(test)]
#[path = "tests/countdown_tests.rs"]
mod tests;
