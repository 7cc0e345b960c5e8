//! Hit judging and the rhythm/command coupling.
//!
//! This module provides:
//! - [`HitJudge`]: maps a signed timing offset to a [`Judgement`]
//! - [`TargetSelector`]: picks the target closest to arrival
//! - [`ScoreManager`] and [`Gauge`]: score, combo and recovery bookkeeping
//! - [`RhythmInput`]: the per-stage pipeline tying them to the command recognizer

mod gauge;
mod judge;
mod rhythm_input;
mod score;
mod target;

pub use gauge::{Gauge, GaugeConfig};
pub use judge::{
    HitJudge, JudgeConfig, JudgeConfigBuilder, JudgeResult, Judgement, OutcomeValue,
    TimingDirection,
};
pub use rhythm_input::{ConsumedTarget, InputResult, RhythmInput};
pub use score::ScoreManager;
pub use target::{Target, TargetSelector, TargetTiming};
