//! Couples the hit judge to the command recognizer.
//!
//! Every press is judged against the nearest target first. Only a successful
//! press (perfect or good) is forwarded to the recognizer; a miss wipes the
//! recognizer so a combo command needs consecutive accurate presses.

use serde::Serialize;
use tracing::{debug, warn};

use super::gauge::Gauge;
use super::judge::{HitJudge, Judgement, TimingDirection};
use super::score::ScoreManager;
use super::target::{Target, TargetSelector};
use crate::config::{ConfigError, StageConfig};
use crate::input::{CommandMatch, CommandRecognizer, InputToken, RawInput, RecognizerError, Symbol};
use crate::traits::time::{SystemTimeProvider, TimeProvider};

/// Identity of the target a press consumed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConsumedTarget {
    pub index: usize,
    pub id: u64,
}

/// Outcome record returned for every press.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputResult {
    pub judgement: Judgement,
    pub score: u32,
    /// Gauge change actually applied.
    pub recovery_amount: f64,
    /// Signed time to arrival of the selected target; `None` when no target was eligible.
    pub offset_ms: Option<f64>,
    pub direction: Option<TimingDirection>,
    pub consumed_target: Option<ConsumedTarget>,
    /// Command recognized by this press, if any.
    pub command: Option<CommandMatch>,
    /// Why the recognizer rejected this press or its command callback failed.
    pub command_error: Option<String>,
}

/// Per-stage input pipeline: selector, judge, scoring, gauge and recognizer.
pub struct RhythmInput {
    selector: TargetSelector,
    judge: HitJudge,
    recognizer: CommandRecognizer,
    score: ScoreManager,
    gauge: Gauge,
    clock: Box<dyn TimeProvider>,
}

impl RhythmInput {
    /// Build the pipeline for a stage, reading "now" from the system clock.
    pub fn new(config: &StageConfig) -> Result<Self, ConfigError> {
        Self::with_clock(config, Box::new(SystemTimeProvider::new()))
    }

    pub fn with_clock(
        config: &StageConfig,
        clock: Box<dyn TimeProvider>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            selector: TargetSelector::new(config.trigger_position),
            judge: HitJudge::new(config.judge.clone())?,
            recognizer: CommandRecognizer::new(config.recognizer)?,
            score: ScoreManager::new(),
            gauge: Gauge::new(config.gauge)?,
            clock,
        })
    }

    pub fn recognizer(&self) -> &CommandRecognizer {
        &self.recognizer
    }

    /// Mutable access for registering commands.
    pub fn recognizer_mut(&mut self) -> &mut CommandRecognizer {
        &mut self.recognizer
    }

    pub fn judge(&self) -> &HitJudge {
        &self.judge
    }

    pub fn score(&self) -> &ScoreManager {
        &self.score
    }

    pub fn gauge(&self) -> &Gauge {
        &self.gauge
    }

    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    /// Judge a press against `targets` at the current clock time.
    pub fn attempt_input_now(&mut self, symbol: Symbol, targets: &mut [Target]) -> InputResult {
        let now_ms = self.clock.now_ms();
        self.attempt_input(symbol, targets, now_ms)
    }

    /// Normalize a loose input and judge it. Untimed input is stamped with the clock.
    pub fn attempt_raw(
        &mut self,
        input: &RawInput,
        targets: &mut [Target],
    ) -> Result<InputResult, RecognizerError> {
        let token = input.normalize(self.clock.now_ms())?;
        Ok(self.attempt_input(token.symbol, targets, token.time_ms))
    }

    /// Judge a press at `now_ms` against the nearest target and update state.
    ///
    /// `targets` must reflect positions as of `now_ms`.
    pub fn attempt_input(
        &mut self,
        symbol: Symbol,
        targets: &mut [Target],
        now_ms: i64,
    ) -> InputResult {
        let timing = self.selector.select(targets);
        let offset_ms = timing.map(|t| t.offset_ms);
        let result = self.judge.judge(offset_ms.unwrap_or(f64::INFINITY));
        let judgement = result.judgement;
        let direction = offset_ms.map(TimingDirection::from_offset);

        self.score.add_judgement(judgement, result.score);
        if let Some(direction) = direction {
            self.score.record_timing(judgement, direction);
        }
        let recovery_amount = self.apply_recovery(judgement, result.recovery);

        let consumed_target = match timing {
            Some(t) if judgement.is_success() => {
                let target = &mut targets[t.index];
                target.consumed = true;
                Some(ConsumedTarget {
                    index: t.index,
                    id: target.id,
                })
            }
            _ => None,
        };

        let (command, command_error) = if judgement.is_success() {
            let token = InputToken::new(symbol, now_ms).with_judgement(judgement);
            match self.recognizer.push(token, now_ms) {
                Ok(found) => (found, None),
                Err(err) => {
                    let message = format!("{:#}", anyhow::Error::new(err));
                    warn!(error = %message, "recognizer push failed");
                    (None, Some(message))
                }
            }
        } else {
            if !self.recognizer.is_empty() {
                debug!(dropped = self.recognizer.len(), "miss resets command buffer");
            }
            self.recognizer.reset();
            (None, None)
        };

        InputResult {
            judgement,
            score: result.score,
            recovery_amount,
            offset_ms,
            direction,
            consumed_target,
            command,
            command_error,
        }
    }

    /// Record a miss for every un-consumed target that passed the line beyond
    /// the miss window, marking each consumed. The recognizer is left alone.
    pub fn sweep_passed(&mut self, targets: &mut [Target]) -> Vec<ConsumedTarget> {
        let passed = self.selector.passed(targets, self.judge.config().miss_ms);
        let miss = self.judge.config().miss;
        passed
            .into_iter()
            .map(|index| {
                let target = &mut targets[index];
                target.consumed = true;
                self.score.add_judgement(Judgement::Miss, miss.score);
                self.apply_recovery(Judgement::Miss, miss.recovery);
                debug!(target = target.id, "target passed unhit");
                ConsumedTarget {
                    index,
                    id: target.id,
                }
            })
            .collect()
    }

    /// Reset score, gauge and recognizer for a retry of the same stage.
    pub fn reset(&mut self) {
        self.score.reset();
        self.gauge.reset();
        self.recognizer.reset();
    }

    /// Healing applies only on a non-miss; damage always applies.
    fn apply_recovery(&mut self, judgement: Judgement, multiplier: f64) -> f64 {
        let delta = self.gauge.scaled(multiplier);
        if delta < 0.0 || (delta > 0.0 && judgement.is_success()) {
            self.gauge.add(delta)
        } else {
            0.0
        }
    }
}

impl std::fmt::Debug for RhythmInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RhythmInput")
            .field("selector", &self.selector)
            .field("judge", &self.judge)
            .field("recognizer", &self.recognizer)
            .field("score", &self.score)
            .field("gauge", &self.gauge)
            .finish_non_exhaustive()
    }
}
