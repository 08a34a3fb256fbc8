use hardware::HardwareError;
use shared::error::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("hardware fault: {0}")]
    Hardware(#[from] HardwareError),
    #[error("invalid game settings: {0}")]
    Config(#[from] ConfigError),
    #[error("game runtime is no longer accepting commands")]
    RuntimeClosed,
}
