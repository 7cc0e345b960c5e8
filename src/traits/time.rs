//! Millisecond clocks for stamping key presses.
//!
//! [`RhythmInput`](crate::play::RhythmInput) reads "now" from a boxed clock when
//! a press arrives without its own capture time. Live play uses
//! [`SystemTimeProvider`]; [`ReplaySession`](crate::replay::ReplaySession) shares
//! one [`MockTimeProvider`] through an `Rc` and moves it to each scripted press.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

pub trait TimeProvider {
    /// Milliseconds since the clock's own epoch. Never decreases for live clocks.
    fn now_ms(&self) -> i64;
}

/// Milliseconds elapsed since the stage was built.
pub struct SystemTimeProvider {
    stage_start: Instant,
}

impl SystemTimeProvider {
    pub fn new() -> Self {
        Self {
            stage_start: Instant::now(),
        }
    }
}

impl Default for SystemTimeProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeProvider for SystemTimeProvider {
    fn now_ms(&self) -> i64 {
        i64::try_from(self.stage_start.elapsed().as_millis()).unwrap_or(i64::MAX)
    }
}

/// Clock driven by hand: replays jump it to each press time, tests step it.
#[derive(Debug, Default)]
pub struct MockTimeProvider {
    now_ms: Cell<i64>,
}

impl MockTimeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_time(&self, ms: i64) {
        self.now_ms.set(ms);
    }

    pub fn advance(&self, delta_ms: i64) {
        self.now_ms.set(self.now_ms.get() + delta_ms);
    }
}

impl TimeProvider for MockTimeProvider {
    fn now_ms(&self) -> i64 {
        self.now_ms.get()
    }
}

/// Lets a replay keep a handle on the clock it hands to the stage.
impl<T: TimeProvider + ?Sized> TimeProvider for Rc<T> {
    fn now_ms(&self) -> i64 {
        (**self).now_ms()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replay_clock_jumps_and_steps() {
        let clock = MockTimeProvider::new();
        assert_eq!(clock.now_ms(), 0);
        clock.set_time(1_200);
        assert_eq!(clock.now_ms(), 1_200);
        clock.advance(100);
        assert_eq!(clock.now_ms(), 1_300);
    }

    #[test]
    fn shared_mock_follows_updates() {
        let tp = Rc::new(MockTimeProvider::new());
        let shared: Box<dyn TimeProvider> = Box::new(Rc::clone(&tp));
        tp.set_time(42);
        assert_eq!(shared.now_ms(), 42);
    }

    #[test]
    fn system_time_provider_monotonic() {
        let tp = SystemTimeProvider::new();
        let t1 = tp.now_ms();
        let t2 = tp.now_ms();
        assert!(t2 >= t1);
    }
}
