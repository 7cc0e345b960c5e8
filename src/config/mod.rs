//! Stage configuration loaded from JSON.

mod error;
mod stage_config;

pub use error::ConfigError;
pub use stage_config::{CommandSpec, StageConfig};
