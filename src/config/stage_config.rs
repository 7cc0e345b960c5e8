use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use crate::input::{RecognizerConfig, RecognizerError, Symbol};
use crate::play::{GaugeConfig, JudgeConfig};

const CONFIG_FILE: &str = "stage.json";

/// A named command as written in a stage file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandSpec {
    pub name: String,
    pub sequence: Vec<Symbol>,
}

/// Construction-time parameters of one stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    pub recognizer: RecognizerConfig,
    pub judge: JudgeConfig,
    pub gauge: GaugeConfig,
    /// Coordinate of the line targets are hit on.
    pub trigger_position: f64,
    /// Commands in registration order.
    pub commands: Vec<CommandSpec>,
}

impl StageConfig {
    /// Loads config from the default config file.
    /// Returns default config if file doesn't exist.
    pub fn load() -> Result<Self> {
        Self::load_from(CONFIG_FILE)
    }

    /// Loads and validates config from a specified path.
    /// Returns default config if file doesn't exist.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Saves config to the default config file.
    pub fn save(&self) -> Result<()> {
        self.save_to(CONFIG_FILE)
    }

    /// Saves config to a specified path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.recognizer.validate()?;
        self.judge.validate()?;
        self.gauge.validate()?;

        let mut names = HashSet::new();
        for command in &self.commands {
            if command.sequence.is_empty() {
                return Err(RecognizerError::EmptySequence {
                    name: command.name.clone(),
                }
                .into());
            }
            if command.sequence.len() > self.recognizer.capacity {
                return Err(RecognizerError::SequenceTooLong {
                    name: command.name.clone(),
                    len: command.sequence.len(),
                    capacity: self.recognizer.capacity,
                }
                .into());
            }
            if !names.insert(command.name.as_str()) {
                return Err(RecognizerError::DuplicateCommand {
                    name: command.name.clone(),
                }
                .into());
            }
        }
        Ok(())
    }
}
