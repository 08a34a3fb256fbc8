//! Types shared between the hardware seams, the game core and the app.

pub mod domain;
pub mod error;
pub mod protocol;
