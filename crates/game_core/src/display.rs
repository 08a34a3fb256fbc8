use std::sync::{Arc, Mutex, PoisonError};

use shared::protocol::DisplayFrame;

/// Receives the game's display frame after every handled event. Observers
/// cannot feed anything back into the state machine.
pub trait DisplayObserver: Send {
    fn refresh(&mut self, frame: &DisplayFrame);
}

/// Keeps every frame it sees; clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct RecordingDisplay {
    frames: Arc<Mutex<Vec<DisplayFrame>>>,
}

impl RecordingDisplay {
    pub fn frames(&self) -> Vec<DisplayFrame> {
        self.frames
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last(&self) -> Option<DisplayFrame> {
        self.frames
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .copied()
    }

    /// Countdown numbers in the order they first appeared.
    pub fn countdown_sequence(&self) -> Vec<u8> {
        let mut sequence: Vec<u8> = Vec::new();
        let mut previous = None;
        for frame in self.frames() {
            if frame.countdown != previous {
                if let Some(seconds) = frame.countdown {
                    sequence.push(seconds);
                }
                previous = frame.countdown;
            }
        }
        sequence
    }
}

impl DisplayObserver for RecordingDisplay {
    fn refresh(&mut self, frame: &DisplayFrame) {
        self.frames
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(*frame);
    }
}
