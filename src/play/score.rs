use serde::Serialize;

use super::judge::{Judgement, TimingDirection};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoreManager {
    pub score: u64,
    pub perfect_count: u32,
    pub good_count: u32,
    pub miss_count: u32,
    pub combo: u32,
    pub max_combo: u32,
    pub early_count: u32,
    pub late_count: u32,
}

impl ScoreManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a judged press. Any miss zeroes the combo.
    pub fn add_judgement(&mut self, judgement: Judgement, score: u32) {
        self.score += u64::from(score);
        match judgement {
            Judgement::Perfect => self.perfect_count += 1,
            Judgement::Good => self.good_count += 1,
            Judgement::Miss => self.miss_count += 1,
        }
        if judgement.is_success() {
            self.combo += 1;
        } else {
            self.combo = 0;
        }
        self.max_combo = self.max_combo.max(self.combo);
    }

    /// Count early/late presses. Perfect hits are not counted.
    pub fn record_timing(&mut self, judgement: Judgement, direction: TimingDirection) {
        if judgement == Judgement::Perfect {
            return;
        }
        match direction {
            TimingDirection::Early => self.early_count += 1,
            TimingDirection::Late => self.late_count += 1,
            TimingDirection::Exact => {}
        }
    }

    pub fn total_judged(&self) -> u32 {
        self.perfect_count + self.good_count + self.miss_count
    }

    /// Percentage of the maximum attainable weight, with perfect = 2 and good = 1.
    pub fn accuracy(&self) -> f64 {
        let total = self.total_judged();
        if total == 0 {
            return 100.0;
        }
        let earned = self.perfect_count * 2 + self.good_count;
        (earned as f64 / (total * 2) as f64) * 100.0
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
