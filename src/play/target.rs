use serde::{Deserialize, Serialize};

/// A moving note approaching the trigger line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub id: u64,
    /// Position along the lane, in the same unit as the trigger position.
    pub position: f64,
    /// Approach speed in position units per millisecond.
    pub speed: f64,
    #[serde(default)]
    pub consumed: bool,
}

impl Target {
    pub fn new(id: u64, position: f64, speed: f64) -> Self {
        Self {
            id,
            position,
            speed,
            consumed: false,
        }
    }

    /// Signed milliseconds until the target reaches `trigger_position`.
    /// Negative once it has passed. `None` for a stationary target.
    pub fn time_to_arrival(&self, trigger_position: f64) -> Option<f64> {
        if self.speed == 0.0 {
            return None;
        }
        Some((self.position - trigger_position) / self.speed)
    }

    /// Move the target toward the trigger line by `dt_ms` worth of travel.
    pub fn advance(&mut self, dt_ms: f64) {
        self.position -= self.speed * dt_ms;
    }
}

/// The closest eligible target and its signed time to arrival.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetTiming {
    pub index: usize,
    pub offset_ms: f64,
}

/// Picks the target whose arrival is closest to now.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetSelector {
    trigger_position: f64,
}

impl TargetSelector {
    pub fn new(trigger_position: f64) -> Self {
        Self { trigger_position }
    }

    pub fn trigger_position(&self) -> f64 {
        self.trigger_position
    }

    /// Closest un-consumed, moving target. Ties keep the earliest in slice order.
    pub fn select(&self, targets: &[Target]) -> Option<TargetTiming> {
        let mut best: Option<TargetTiming> = None;
        for (index, target) in targets.iter().enumerate() {
            if target.consumed {
                continue;
            }
            let Some(offset_ms) = target.time_to_arrival(self.trigger_position) else {
                continue;
            };
            if offset_ms.is_nan() {
                continue;
            }
            let closer = best.is_none_or(|b| offset_ms.abs() < b.offset_ms.abs());
            if closer {
                best = Some(TargetTiming { index, offset_ms });
            }
        }
        best
    }

    /// Indices of un-consumed targets whose arrival lies further in the past than `late_ms`.
    pub fn passed(&self, targets: &[Target], late_ms: f64) -> Vec<usize> {
        targets
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.consumed)
            .filter_map(|(i, t)| {
                t.time_to_arrival(self.trigger_position)
                    .filter(|offset| *offset < -late_ms)
                    .map(|_| i)
            })
            .collect()
    }
}
