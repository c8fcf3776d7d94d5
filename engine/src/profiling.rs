use std::time::Duration;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameTimings {
    pub update: Duration,
    pub render: Duration,
    pub present: Duration,
    pub total: Duration,
}

/// Rolling per-frame timing totals, reset every time a summary is taken.
#[derive(Debug, Clone, Default)]
pub struct FrameStats {
    frames: u32,
    sum: FrameTimings,
    worst_total: Duration,
}

impl FrameStats {
    pub const SUMMARY_EVERY: u32 = 300;

    pub fn record(&mut self, timings: FrameTimings) {
        self.frames += 1;
        self.sum.update += timings.update;
        self.sum.render += timings.render;
        self.sum.present += timings.present;
        self.sum.total += timings.total;
        self.worst_total = self.worst_total.max(timings.total);
    }

    pub fn frames(&self) -> u32 {
        self.frames
    }

    /// Averages over the recorded window, or `None` when nothing was recorded.
    pub fn average(&self) -> Option<FrameTimings> {
        if self.frames == 0 {
            return None;
        }
        Some(FrameTimings {
            update: self.sum.update / self.frames,
            render: self.sum.render / self.frames,
            present: self.sum.present / self.frames,
            total: self.sum.total / self.frames,
        })
    }

    /// Emits a debug summary once the window is full and starts a new window.
    pub fn maybe_log(&mut self) {
        if self.frames < Self::SUMMARY_EVERY {
            return;
        }
        if let Some(avg) = self.average() {
            tracing::debug!(
                frames = self.frames,
                update_us = avg.update.as_micros() as u64,
                render_us = avg.render.as_micros() as u64,
                present_us = avg.present.as_micros() as u64,
                total_us = avg.total.as_micros() as u64,
                worst_us = self.worst_total.as_micros() as u64,
                "frame timings"
            );
        }
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_divides_by_frame_count() {
        let mut stats = FrameStats::default();
        assert_eq!(stats.average(), None);

        for ms in [2, 4] {
            stats.record(FrameTimings {
                update: Duration::from_millis(ms),
                render: Duration::from_millis(ms),
                present: Duration::ZERO,
                total: Duration::from_millis(ms * 2),
            });
        }

        let avg = stats.average().expect("two frames recorded");
        assert_eq!(avg.update, Duration::from_millis(3));
        assert_eq!(avg.total, Duration::from_millis(6));
    }

    #[test]
    fn maybe_log_resets_after_a_full_window() {
        let mut stats = FrameStats::default();
        for _ in 0..FrameStats::SUMMARY_EVERY {
            stats.record(FrameTimings::default());
        }
        stats.maybe_log();
        assert_eq!(stats.frames(), 0);
    }
}
