const METRICS_INTERVAL_MS: f64 = 1000.0;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoopMetricsSnapshot {
    pub fps: f32,
    pub frame_time_ms: f32,
}

/// Frame counts over simulated time; emits one snapshot per elapsed second of dt.
#[derive(Debug, Default)]
pub(crate) struct MetricsAccumulator {
    interval_elapsed_ms: f64,
    frames: u32,
    latest: LoopMetricsSnapshot,
}

impl MetricsAccumulator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_frame(&mut self, frame_dt_ms: f64) -> Option<LoopMetricsSnapshot> {
        self.frames = self.frames.saturating_add(1);
        self.interval_elapsed_ms += frame_dt_ms.max(0.0);
        if self.interval_elapsed_ms < METRICS_INTERVAL_MS {
            return None;
        }

        let elapsed_seconds = (self.interval_elapsed_ms / 1000.0).max(f64::EPSILON);
        let snapshot = LoopMetricsSnapshot {
            fps: (self.frames as f64 / elapsed_seconds) as f32,
            frame_time_ms: (self.interval_elapsed_ms / self.frames as f64) as f32,
        };
        self.interval_elapsed_ms = 0.0;
        self.frames = 0;
        self.latest = snapshot;
        Some(snapshot)
    }

    pub(crate) fn latest(&self) -> LoopMetricsSnapshot {
        self.latest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_computes_expected_values() {
        let mut accumulator = MetricsAccumulator::new();
        let mut snapshot = None;
        for _ in 0..50 {
            snapshot = snapshot.or(accumulator.record_frame(20.0));
        }
        let snapshot = snapshot.expect("snapshot after one simulated second");
        assert!((snapshot.fps - 50.0).abs() < 0.05);
        assert!((snapshot.frame_time_ms - 20.0).abs() < 0.001);
        assert_eq!(accumulator.latest(), snapshot);
    }

    #[test]
    fn snapshot_not_emitted_before_interval() {
        let mut accumulator = MetricsAccumulator::new();
        assert!(accumulator.record_frame(500.0).is_none());
        assert_eq!(accumulator.latest().fps, 0.0);
    }
}
