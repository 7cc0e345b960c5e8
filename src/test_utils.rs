//! Test utilities for building tokens, targets and stages.
//!
//! This module provides helpers for creating test fixtures in a fluent manner.

#[cfg(test)]
pub mod builders {
    use crate::config::StageConfig;
    use crate::input::{InputToken, Symbol};
    use crate::play::{GaugeConfig, RhythmInput};
    use crate::traits::time::MockTimeProvider;

    pub fn symbol(name: &str) -> Symbol {
        Symbol::new(name).unwrap()
    }

    pub fn symbols(names: &[&str]) -> Vec<Symbol> {
        names.iter().map(|n| symbol(n)).collect()
    }

    pub fn token(name: &str, time_ms: i64) -> InputToken {
        InputToken::new(symbol(name), time_ms)
    }

    /// Builder for a [`RhythmInput`] driven by a mock clock.
    #[derive(Debug, Clone, Default)]
    pub struct StageBuilder {
        config: StageConfig,
    }

    impl StageBuilder {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn from_config(config: StageConfig) -> Self {
            Self { config }
        }

        pub fn gauge(mut self, gauge: GaugeConfig) -> Self {
            self.config.gauge = gauge;
            self
        }

        pub fn build(self) -> RhythmInput {
            RhythmInput::with_clock(&self.config, Box::new(MockTimeProvider::new())).unwrap()
        }
    }
}
