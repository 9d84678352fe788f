use std::time::{Duration, Instant};

/// Paces redraws while something on screen is animating.
///
/// Without a cap every call to [`FrameScheduler::ready_for_frame`] succeeds and
/// presentation (FIFO) paces the loop.
#[derive(Debug, Clone)]
pub struct FrameScheduler {
    interval: Option<Duration>,
    last_frame: Option<Instant>,
}

impl FrameScheduler {
    pub fn new(target_fps: Option<f32>) -> Self {
        let interval = target_fps
            .filter(|fps| fps.is_finite() && *fps > 0.0)
            .and_then(|fps| Duration::try_from_secs_f64(1.0 / f64::from(fps)).ok());
        Self {
            interval,
            last_frame: None,
        }
    }

    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    pub fn ready_for_frame(&self, now: Instant) -> bool {
        match (self.interval, self.last_frame) {
            (Some(interval), Some(last)) => now.saturating_duration_since(last) >= interval,
            _ => true,
        }
    }

    pub fn mark_rendered(&mut self, now: Instant) {
        self.last_frame = Some(now);
    }

    /// Earliest instant the next frame may be drawn, if capped.
    pub fn next_deadline(&self) -> Option<Instant> {
        Some(self.last_frame? + self.interval?)
    }

    pub fn reset(&mut self) {
        self.last_frame = None;
    }
}

/// Measures the time between consecutive animated frames.
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last: Option<Instant>,
}

impl FrameClock {
    /// Restarts measurement so the next tick reports time since `now`.
    pub fn reset(&mut self, now: Instant) {
        self.last = Some(now);
    }

    /// Time since the previous tick (zero on the first one).
    pub fn tick(&mut self, now: Instant) -> Duration {
        let dt = self
            .last
            .map(|last| now.saturating_duration_since(last))
            .unwrap_or(Duration::ZERO);
        self.last = Some(now);
        dt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uncapped_scheduler_is_always_ready() {
        let mut scheduler = FrameScheduler::new(None);
        let now = Instant::now();
        assert!(scheduler.ready_for_frame(now));
        scheduler.mark_rendered(now);
        assert!(scheduler.ready_for_frame(now));
        assert_eq!(scheduler.next_deadline(), None);
    }

    #[test]
    fn capped_scheduler_waits_for_interval() {
        let mut scheduler = FrameScheduler::new(Some(10.0));
        let start = Instant::now();
        assert!(scheduler.ready_for_frame(start));
        scheduler.mark_rendered(start);

        assert!(!scheduler.ready_for_frame(start + Duration::from_millis(50)));
        assert!(scheduler.ready_for_frame(start + Duration::from_millis(100)));
        assert_eq!(
            scheduler.next_deadline(),
            Some(start + Duration::from_millis(100))
        );
    }

    #[test]
    fn zero_or_negative_fps_means_uncapped() {
        assert_eq!(FrameScheduler::new(Some(0.0)).interval(), None);
        assert_eq!(FrameScheduler::new(Some(-5.0)).interval(), None);
    }

    #[test]
    fn vanishing_fps_does_not_overflow_interval() {
        assert_eq!(FrameScheduler::new(Some(f32::MIN_POSITIVE)).interval(), None);
        assert_eq!(FrameScheduler::new(Some(f32::NAN)).interval(), None);
    }

    #[test]
    fn reset_makes_scheduler_ready() {
        let mut scheduler = FrameScheduler::new(Some(1.0));
        let now = Instant::now();
        scheduler.mark_rendered(now);
        assert!(!scheduler.ready_for_frame(now));
        scheduler.reset();
        assert!(scheduler.ready_for_frame(now));
    }

    #[test]
    fn frame_clock_reports_deltas() {
        let mut clock = FrameClock::default();
        let start = Instant::now();
        assert_eq!(clock.tick(start), Duration::ZERO);
        assert_eq!(
            clock.tick(start + Duration::from_millis(16)),
            Duration::from_millis(16)
        );

        clock.reset(start + Duration::from_secs(10));
        assert_eq!(
            clock.tick(start + Duration::from_millis(10_020)),
            Duration::from_millis(20)
        );
    }
}
