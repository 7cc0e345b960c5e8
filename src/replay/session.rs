use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use super::script::InputScript;
use crate::config::{ConfigError, StageConfig};
use crate::input::{RawInput, RecognizerError};
use crate::play::{InputResult, RhythmInput, ScoreManager};
use crate::traits::time::MockTimeProvider;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("Script step must be positive: {0}ms")]
    InvalidStep(i64),

    #[error("Press {index} at {time_ms}ms is earlier than the previous press at {previous_ms}ms")]
    OutOfOrder {
        index: usize,
        time_ms: i64,
        previous_ms: i64,
    },

    #[error("Press {index} is invalid")]
    Input {
        index: usize,
        #[source]
        source: RecognizerError,
    },
}

/// Summary of a replayed script.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub results: Vec<InputResult>,
    /// Names of recognized commands in order.
    pub commands: Vec<String>,
    pub passed_targets: usize,
    pub score: ScoreManager,
    pub gauge: f64,
}

/// Feeds a scripted press log through a stage's input pipeline.
pub struct ReplaySession {
    input: RhythmInput,
    clock: Rc<MockTimeProvider>,
    recognized: Rc<RefCell<Vec<String>>>,
}

impl ReplaySession {
    /// Build a stage and register its configured commands.
    pub fn new(config: &StageConfig) -> Result<Self, ConfigError> {
        let clock = Rc::new(MockTimeProvider::new());
        let mut input = RhythmInput::with_clock(config, Box::new(Rc::clone(&clock)))?;
        let recognized = Rc::new(RefCell::new(Vec::new()));

        for command in &config.commands {
            let sink = Rc::clone(&recognized);
            input.recognizer_mut().register(
                command.name.clone(),
                command.sequence.clone(),
                move |found| {
                    info!(command = %found.name, entries = found.entries.len(), "command recognized");
                    sink.borrow_mut().push(found.name.clone());
                    Ok(())
                },
            )?;
        }

        Ok(Self {
            input,
            clock,
            recognized,
        })
    }

    pub fn input(&self) -> &RhythmInput {
        &self.input
    }

    /// Replay every press in order. Targets move from their scripted
    /// time-0 positions; passed targets are swept before each press.
    pub fn run(&mut self, script: &InputScript) -> Result<ReplayReport, ReplayError> {
        if script.step_ms <= 0 {
            return Err(ReplayError::InvalidStep(script.step_ms));
        }

        let mut targets = script.targets.clone();
        let mut results = Vec::with_capacity(script.presses.len());
        let mut passed_targets = 0;
        let mut last_ms = 0;

        for (index, press) in script.presses.iter().enumerate() {
            let now_ms = match press {
                RawInput::Event {
                    time: Some(time), ..
                } => *time,
                _ => last_ms + script.step_ms,
            };
            if now_ms < last_ms {
                return Err(ReplayError::OutOfOrder {
                    index,
                    time_ms: now_ms,
                    previous_ms: last_ms,
                });
            }

            for target in &mut targets {
                target.advance((now_ms - last_ms) as f64);
            }
            self.clock.set_time(now_ms);
            passed_targets += self.input.sweep_passed(&mut targets).len();

            let result = self
                .input
                .attempt_raw(press, &mut targets)
                .map_err(|source| ReplayError::Input { index, source })?;
            results.push(result);
            last_ms = now_ms;
        }

        let report = ReplayReport {
            results,
            commands: self.recognized.borrow().clone(),
            passed_targets,
            score: self.input.score().clone(),
            gauge: self.input.gauge().value(),
        };
        info!(
            presses = report.results.len(),
            commands = report.commands.len(),
            score = report.score.score,
            max_combo = report.score.max_combo,
            "replay finished"
        );
        Ok(report)
    }
}
