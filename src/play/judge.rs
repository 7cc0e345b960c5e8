use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Timing classification of a single press, strictest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Judgement {
    Perfect,
    Good,
    Miss,
}

impl Judgement {
    pub const ALL: [Self; 3] = [Self::Perfect, Self::Good, Self::Miss];

    /// Whether this press keeps a combo alive and feeds the command recognizer.
    pub fn is_success(self) -> bool {
        !matches!(self, Self::Miss)
    }

    /// Index for per-outcome arrays.
    pub fn index(self) -> usize {
        match self {
            Self::Perfect => 0,
            Self::Good => 1,
            Self::Miss => 2,
        }
    }
}

/// Early/late indicator for feedback. Does not affect the judgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimingDirection {
    Early,
    Exact,
    Late,
}

impl TimingDirection {
    const EXACT_THRESHOLD_MS: f64 = 1.0;

    /// `offset_ms` is the target's remaining time to arrival:
    /// positive means the press came before the target reached the line.
    pub fn from_offset(offset_ms: f64) -> Self {
        if offset_ms > Self::EXACT_THRESHOLD_MS {
            Self::Early
        } else if offset_ms < -Self::EXACT_THRESHOLD_MS {
            Self::Late
        } else {
            Self::Exact
        }
    }
}

/// Score and recovery multiplier attached to one outcome.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutcomeValue {
    pub score: u32,
    /// Multiplier applied to the gauge's base recovery. Negative values are damage.
    pub recovery: f64,
}

/// Judge thresholds in milliseconds and per-outcome values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JudgeConfig {
    pub perfect_ms: f64,
    pub good_ms: f64,
    /// Outer edge of the judged band. Presses between `good_ms` and this
    /// value are still `Miss`; targets that pass the line by more than this
    /// are swept as missed.
    pub miss_ms: f64,
    pub perfect: OutcomeValue,
    pub good: OutcomeValue,
    pub miss: OutcomeValue,
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            perfect_ms: 80.0,
            good_ms: 150.0,
            miss_ms: 250.0,
            perfect: OutcomeValue {
                score: 100,
                recovery: 1.0,
            },
            good: OutcomeValue {
                score: 50,
                recovery: 0.0,
            },
            miss: OutcomeValue {
                score: 0,
                recovery: 0.0,
            },
        }
    }
}

impl JudgeConfig {
    /// Thresholds must satisfy `0 <= perfect < good < miss`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ordered = self.perfect_ms >= 0.0
            && self.perfect_ms < self.good_ms
            && self.good_ms < self.miss_ms;
        if !ordered {
            return Err(ConfigError::ThresholdOrder {
                perfect: self.perfect_ms,
                good: self.good_ms,
                miss: self.miss_ms,
            });
        }
        Ok(())
    }

    pub fn value(&self, judgement: Judgement) -> OutcomeValue {
        match judgement {
            Judgement::Perfect => self.perfect,
            Judgement::Good => self.good,
            Judgement::Miss => self.miss,
        }
    }

    pub fn builder() -> JudgeConfigBuilder {
        JudgeConfigBuilder::default()
    }
}

#[derive(Debug, Default)]
pub struct JudgeConfigBuilder {
    perfect_ms: Option<f64>,
    good_ms: Option<f64>,
    miss_ms: Option<f64>,
    perfect: Option<OutcomeValue>,
    good: Option<OutcomeValue>,
    miss: Option<OutcomeValue>,
}

impl JudgeConfigBuilder {
    pub fn thresholds(mut self, perfect_ms: f64, good_ms: f64, miss_ms: f64) -> Self {
        self.perfect_ms = Some(perfect_ms);
        self.good_ms = Some(good_ms);
        self.miss_ms = Some(miss_ms);
        self
    }

    pub fn perfect(mut self, score: u32, recovery: f64) -> Self {
        self.perfect = Some(OutcomeValue { score, recovery });
        self
    }

    pub fn good(mut self, score: u32, recovery: f64) -> Self {
        self.good = Some(OutcomeValue { score, recovery });
        self
    }

    pub fn miss(mut self, score: u32, recovery: f64) -> Self {
        self.miss = Some(OutcomeValue { score, recovery });
        self
    }

    pub fn build(self) -> Result<JudgeConfig, ConfigError> {
        let default = JudgeConfig::default();
        let config = JudgeConfig {
            perfect_ms: self.perfect_ms.unwrap_or(default.perfect_ms),
            good_ms: self.good_ms.unwrap_or(default.good_ms),
            miss_ms: self.miss_ms.unwrap_or(default.miss_ms),
            perfect: self.perfect.unwrap_or(default.perfect),
            good: self.good.unwrap_or(default.good),
            miss: self.miss.unwrap_or(default.miss),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Result of judging one offset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct JudgeResult {
    pub judgement: Judgement,
    pub score: u32,
    pub recovery: f64,
}

/// Stateless hit-timing judge.
#[derive(Debug, Clone, Default)]
pub struct HitJudge {
    config: JudgeConfig,
}

impl HitJudge {
    pub fn new(config: JudgeConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &JudgeConfig {
        &self.config
    }

    /// Classify a signed offset. Early and late presses are treated alike;
    /// each threshold is inclusive. NaN and infinite offsets are `Miss`.
    pub fn judge(&self, offset_ms: f64) -> JudgeResult {
        let judgement = self.classify(offset_ms);
        let value = self.config.value(judgement);
        JudgeResult {
            judgement,
            score: value.score,
            recovery: value.recovery,
        }
    }

    pub fn classify(&self, offset_ms: f64) -> Judgement {
        let diff = offset_ms.abs();
        if diff <= self.config.perfect_ms {
            Judgement::Perfect
        } else if diff <= self.config.good_ms {
            Judgement::Good
        } else {
            Judgement::Miss
        }
    }

    /// Whether a target this far past the line can no longer be hit.
    /// `offset_ms` is time to arrival, negative once the target has passed.
    pub fn is_passed(&self, offset_ms: f64) -> bool {
        offset_ms < -self.config.miss_ms
    }
}
