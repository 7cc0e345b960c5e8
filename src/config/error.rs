use thiserror::Error;

use crate::input::RecognizerError;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Judge thresholds must satisfy 0 <= perfect < good < miss (got {perfect}, {good}, {miss})")]
    ThresholdOrder { perfect: f64, good: f64, miss: f64 },

    #[error("Gauge range is empty: min {min}, max {max}")]
    GaugeRange { min: f64, max: f64 },

    #[error(transparent)]
    Recognizer(#[from] RecognizerError),
}
