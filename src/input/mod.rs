//! Input recording and command recognition.
//!
//! This module provides:
//! - [`RingBuffer`]: fixed-capacity, overwrite-on-full sequence container
//! - [`InputToken`] / [`RawInput`]: canonical key-press records and their loose input form
//! - [`CommandRecognizer`]: sliding-window matcher for multi-step commands

mod command_recognizer;
mod error;
mod ring_buffer;
mod token;

pub use command_recognizer::{CommandCallback, CommandMatch, CommandRecognizer, RecognizerConfig};
pub use error::{InputError, RecognizerError};
pub use ring_buffer::RingBuffer;
pub use token::{InputToken, RawInput, Symbol};
