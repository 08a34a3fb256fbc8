use serde::{Deserialize, Serialize};

macro_rules! index_newtype {
    ($name:ident, $inner:ty) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub $inner);
    };
}

index_newtype!(AdcChannel, u8);
index_newtype!(PwmChannel, u8);
index_newtype!(BusAddress, u16);

/// Score that wins the match.
pub const WINNING_SCORE: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameState {
    #[default]
    Ready,
    Starting,
    Playing,
    Ended,
}

impl GameState {
    pub fn as_str(self) -> &'static str {
        match self {
            GameState::Ready => "ready",
            GameState::Starting => "starting",
            GameState::Playing => "playing",
            GameState::Ended => "ended",
        }
    }
}

impl std::fmt::Display for GameState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Red,
    Green,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::Red => Side::Green,
            Side::Green => Side::Red,
        }
    }
}

/// Both sides' normalized scores, each in `0..=WINNING_SCORE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Scores {
    pub red: u8,
    pub green: u8,
}

impl Scores {
    pub const ZERO: Scores = Scores { red: 0, green: 0 };

    pub fn new(red: u8, green: u8) -> Self {
        Self { red, green }
    }

    pub fn get(&self, side: Side) -> u8 {
        match side {
            Side::Red => self.red,
            Side::Green => self.green,
        }
    }

    /// True once either side has reached the winning score.
    pub fn has_winner(&self) -> bool {
        self.red >= WINNING_SCORE || self.green >= WINNING_SCORE
    }

    /// Strictly greater than the other side; a tie leaves both sides without the flag.
    pub fn is_winner(&self, side: Side) -> bool {
        self.get(side) > self.get(side.other())
    }
}
