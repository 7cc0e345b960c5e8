use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::InputError;
use crate::play::Judgement;

/// Logical button identifier, already mapped from a hardware key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    /// Build a symbol, trimming surrounding whitespace.
    pub fn new(name: impl AsRef<str>) -> Result<Self, InputError> {
        let name = name.as_ref().trim();
        if name.is_empty() {
            return Err(InputError::EmptySymbol);
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Symbol {
    type Error = InputError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for Symbol {
    type Error = InputError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.0
    }
}

/// A recorded key press. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputToken {
    pub symbol: Symbol,
    /// Capture time in milliseconds on the caller's monotonic clock.
    pub time_ms: i64,
    /// Timing outcome of the press, when it came through the rhythm judge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub judgement: Option<Judgement>,
}

impl InputToken {
    pub fn new(symbol: Symbol, time_ms: i64) -> Self {
        Self {
            symbol,
            time_ms,
            judgement: None,
        }
    }

    pub fn with_judgement(mut self, judgement: Judgement) -> Self {
        self.judgement = Some(judgement);
        self
    }
}

/// Loosely shaped input as it arrives from the surrounding game or a script:
/// either a bare symbol or an object with an optional capture time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawInput {
    Symbol(String),
    Event {
        symbol: String,
        #[serde(default, alias = "t")]
        time: Option<i64>,
    },
}

impl RawInput {
    /// Normalize into a canonical token, stamping `now_ms` when no time is given.
    pub fn normalize(&self, now_ms: i64) -> Result<InputToken, InputError> {
        let (symbol, time) = match self {
            Self::Symbol(symbol) => (symbol.as_str(), None),
            Self::Event { symbol, time } => (symbol.as_str(), *time),
        };
        let time_ms = time.unwrap_or(now_ms);
        if time_ms < 0 {
            return Err(InputError::NegativeTimestamp(time_ms));
        }
        Ok(InputToken::new(Symbol::new(symbol)?, time_ms))
    }
}

impl From<&str> for RawInput {
    fn from(symbol: &str) -> Self {
        Self::Symbol(symbol.to_string())
    }
}

impl From<Symbol> for RawInput {
    fn from(symbol: Symbol) -> Self {
        Self::Symbol(symbol.0)
    }
}
