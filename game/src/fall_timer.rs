use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Gravity accumulator.
///
/// Time only enters through [`FallTimer::advance`], which the router calls while a game is
/// running, so a paused game keeps its exact phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallTimer {
    #[serde(with = "crate::serde_duration")]
    elapsed: Duration,
}

impl FallTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
    }

    /// Time accumulated toward the next gravity step.
    pub fn phase(&self) -> Duration {
        self.elapsed
    }

    /// Adds `dt` and returns how many whole `interval`s elapsed, keeping the remainder.
    pub fn advance(&mut self, dt: Duration, interval: Duration) -> u32 {
        if interval.is_zero() {
            return 0;
        }
        self.elapsed = self.elapsed.saturating_add(dt);
        let mut steps = 0;
        while self.elapsed >= interval {
            self.elapsed -= interval;
            steps += 1;
        }
        steps
    }
}
