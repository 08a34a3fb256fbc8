//! Game control core: the state machine, score normalization, the start
//! countdown and the event loop that ties them to the peripherals.

pub mod controller;
pub mod countdown;
pub mod display;
pub mod error;
pub mod runtime;
pub mod score;
pub mod settings;

pub use controller::{GameController, GameEvent};
pub use countdown::{CountdownStep, CountdownTimer, COUNTDOWN_START};
pub use display::{DisplayObserver, RecordingDisplay};
pub use error::GameError;
pub use runtime::{GameHandle, GameRuntime, StopReason, Stopped};
pub use score::{score_for, ScoreTracker};
pub use settings::{BellSettings, GameSettings, SensorSettings, TimingSettings};
