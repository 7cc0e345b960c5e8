use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::input::RawInput;
use crate::play::Target;

/// A scripted stage run: initial target layout plus a press log.
///
/// Each press is either a bare symbol (`"A"`) or an object with an optional
/// capture time (`{"symbol": "A", "time": 1200}`). Untimed presses happen
/// `step_ms` after the previous one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputScript {
    pub step_ms: i64,
    /// Targets at time 0.
    pub targets: Vec<Target>,
    pub presses: Vec<RawInput>,
}

impl Default for InputScript {
    fn default() -> Self {
        Self {
            step_ms: 100,
            targets: Vec::new(),
            presses: Vec::new(),
        }
    }
}

impl InputScript {
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read input script: {}", path.display()))?;
        let script = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse input script: {}", path.display()))?;
        Ok(script)
    }

    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}
