use thiserror::Error;

/// Inconsistent static configuration, rejected before the game loop starts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid {name} range: min {min} must be below max {max}")]
    InvalidRange {
        name: &'static str,
        min: f32,
        max: f32,
    },
    #[error("{name} {value} lies outside {min}..={max}")]
    OutOfRange {
        name: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },
    #[error("{name} must be non-zero")]
    Zero { name: &'static str },
    #[error("sensor channels must differ, both are {0}")]
    DuplicateChannel(u8),
    #[error("devices must use distinct bus addresses, both are 0x{0:02x}")]
    DuplicateAddress(u16),
}
