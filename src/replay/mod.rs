//! Scripted replay of press logs through a stage.

mod script;
mod session;

pub use script::InputScript;
pub use session::{ReplayError, ReplayReport, ReplaySession};
