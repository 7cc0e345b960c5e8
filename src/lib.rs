//! Timed input recognition for rhythm-driven mini-games.
//!
//! A key press is judged against the nearest moving target; accurate presses
//! feed a sliding-window command recognizer, a missed press wipes it.

pub mod config;
pub mod input;
pub mod play;
pub mod replay;
pub mod traits;
pub mod util;

#[cfg(test)]
mod test_utils;
