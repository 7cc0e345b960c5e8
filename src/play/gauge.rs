use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaugeConfig {
    pub initial: f64,
    pub min: f64,
    pub max: f64,
    /// Amount restored by a recovery multiplier of 1.0.
    pub base_recovery: f64,
}

impl Default for GaugeConfig {
    fn default() -> Self {
        Self {
            initial: 100.0,
            min: 0.0,
            max: 100.0,
            base_recovery: 2.0,
        }
    }
}

impl GaugeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min.is_nan() || self.max.is_nan() || self.min >= self.max {
            return Err(ConfigError::GaugeRange {
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

/// Player health, restored by accurate presses and drained by damage.
#[derive(Debug, Clone, PartialEq)]
pub struct Gauge {
    value: f64,
    config: GaugeConfig,
}

impl Gauge {
    pub fn new(config: GaugeConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            value: config.initial.clamp(config.min, config.max),
            config,
        })
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn config(&self) -> &GaugeConfig {
        &self.config
    }

    /// Recovery delta for a multiplier. Negative multipliers give damage.
    pub fn scaled(&self, multiplier: f64) -> f64 {
        self.config.base_recovery * multiplier
    }

    /// Add `delta` and clamp to `[min, max]`. Returns the change actually applied.
    pub fn add(&mut self, delta: f64) -> f64 {
        let before = self.value;
        self.value = (self.value + delta).clamp(self.config.min, self.config.max);
        self.value - before
    }

    pub fn is_empty(&self) -> bool {
        self.value <= self.config.min
    }

    pub fn is_max(&self) -> bool {
        (self.value - self.config.max).abs() < f64::EPSILON
    }

    pub fn reset(&mut self) {
        self.value = self.config.initial.clamp(self.config.min, self.config.max);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn half_gauge() -> Gauge {
        Gauge::new(GaugeConfig {
            initial: 50.0,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn add_clamps() {
        let mut gauge = half_gauge();
        assert!((gauge.add(60.0) - 50.0).abs() < f64::EPSILON);
        assert!(gauge.is_max());
        assert!((gauge.add(-150.0) + 100.0).abs() < f64::EPSILON);
        assert!(gauge.is_empty());
    }

    #[test]
    fn scaled_uses_base_recovery() {
        let gauge = half_gauge();
        assert!((gauge.scaled(1.0) - 2.0).abs() < f64::EPSILON);
        assert!((gauge.scaled(-0.5) + 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn invalid_range_rejected() {
        let config = GaugeConfig {
            min: 10.0,
            max: 10.0,
            ..Default::default()
        };
        assert!(Gauge::new(config).is_err());
    }

    #[test]
    fn reset_restores_initial() {
        let mut gauge = half_gauge();
        gauge.add(-20.0);
        gauge.reset();
        assert!((gauge.value() - 50.0).abs() < f64::EPSILON);
    }
}
