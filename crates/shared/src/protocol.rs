use serde::{Deserialize, Serialize};

use crate::domain::{GameState, Scores, Side, WINNING_SCORE};

pub const START_LABEL: &str = "Start";
pub const PLAY_AGAIN_LABEL: &str = "Play again?";
pub const WINNER_TEXT: &str = "Winner!";
pub const LOSER_TEXT: &str = "Loser!";

/// Commands queued into the game runtime from the outside world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameCommand {
    /// The single UI action button was pressed.
    Action,
    Shutdown,
}

/// Snapshot published to display observers after every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayFrame {
    pub state: GameState,
    pub scores: Scores,
    /// Last countdown number announced, only while starting.
    pub countdown: Option<u8>,
}

impl DisplayFrame {
    pub fn view(&self) -> DisplayView {
        DisplayView::from_frame(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideView {
    pub text: String,
    /// Proportional indicator weight in `0.0..=1.0`.
    pub weight: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionButtonView {
    pub label: Option<String>,
    pub visible: bool,
}

/// What a display shows for a given frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayView {
    pub red: SideView,
    pub green: SideView,
    pub action: ActionButtonView,
}

impl DisplayView {
    pub fn from_frame(frame: &DisplayFrame) -> Self {
        match frame.state {
            GameState::Ready => Self {
                red: zeroed_side(),
                green: zeroed_side(),
                action: ActionButtonView {
                    label: Some(START_LABEL.to_string()),
                    visible: true,
                },
            },
            GameState::Starting => Self {
                red: zeroed_side(),
                green: zeroed_side(),
                action: ActionButtonView {
                    label: frame.countdown.map(|seconds| seconds.to_string()),
                    visible: true,
                },
            },
            GameState::Playing => Self {
                red: scored_side(frame.scores.red, frame.scores.red.to_string()),
                green: scored_side(frame.scores.green, frame.scores.green.to_string()),
                action: ActionButtonView {
                    label: None,
                    visible: false,
                },
            },
            GameState::Ended => Self {
                red: scored_side(frame.scores.red, outcome_text(&frame.scores, Side::Red)),
                green: scored_side(frame.scores.green, outcome_text(&frame.scores, Side::Green)),
                action: ActionButtonView {
                    label: Some(PLAY_AGAIN_LABEL.to_string()),
                    visible: true,
                },
            },
        }
    }
}

pub fn indicator_weight(score: u8) -> f32 {
    f32::from(score) / f32::from(WINNING_SCORE)
}

fn zeroed_side() -> SideView {
    SideView {
        text: "0".to_string(),
        weight: 0.0,
    }
}

fn scored_side(score: u8, text: String) -> SideView {
    SideView {
        text,
        weight: indicator_weight(score),
    }
}

fn outcome_text(scores: &Scores, side: Side) -> String {
    if scores.is_winner(side) {
        WINNER_TEXT.to_string()
    } else {
        LOSER_TEXT.to_string()
    }
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
