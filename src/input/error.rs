use thiserror::Error;

/// Raw input that cannot be turned into an [`InputToken`](super::InputToken).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("Input symbol is empty")]
    EmptySymbol,

    #[error("Input timestamp is negative: {0}ms")]
    NegativeTimestamp(i64),
}

#[derive(Debug, Error)]
pub enum RecognizerError {
    #[error("Recognizer capacity must be at least 1")]
    ZeroCapacity,

    #[error("Recognizer time window must be positive: {0}ms")]
    InvalidWindow(i64),

    #[error("Command `{name}` has an empty sequence")]
    EmptySequence { name: String },

    #[error("Command `{name}` has {len} steps but the buffer holds {capacity}")]
    SequenceTooLong {
        name: String,
        len: usize,
        capacity: usize,
    },

    #[error("Command `{name}` is already registered")]
    DuplicateCommand { name: String },

    #[error("Token `{symbol}` at {time_ms}ms is older than the newest buffered token at {newest_ms}ms")]
    OutOfOrder {
        symbol: String,
        time_ms: i64,
        newest_ms: i64,
    },

    #[error("Callback for command `{name}` failed")]
    Callback {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error(transparent)]
    Input(#[from] InputError),
}
