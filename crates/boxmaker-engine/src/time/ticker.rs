use std::time::{Duration, Instant};

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Seconds since the previous tick, clamped.
    pub dt: f32,
    pub now: Instant,
    pub frame_index: u64,
}

/// Fixed-interval tick source.
///
/// A late tick schedules the next one a full interval after itself, so stalls
/// never cause a burst of catch-up frames.
#[derive(Debug, Clone)]
pub struct FrameTicker {
    interval: Duration,
    next: Instant,
    last: Instant,
    frame_index: u64,
    dt_max: Duration,
}

impl FrameTicker {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(16);

    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            next: now,
            last: now,
            frame_index: 0,
            dt_max: Duration::from_millis(250),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// When the next frame is due.
    pub fn deadline(&self) -> Instant {
        self.next
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.next
    }

    /// Restarts the schedule from `now`, e.g. after the window was hidden.
    pub fn reset(&mut self, now: Instant) {
        self.next = now;
        self.last = now;
    }

    pub fn tick(&mut self, now: Instant) -> FrameTime {
        let dt = now.saturating_duration_since(self.last).min(self.dt_max);
        self.last = now;

        self.next += self.interval;
        if self.next <= now {
            self.next = now + self.interval;
        }

        let ft = FrameTime {
            dt: dt.as_secs_f32(),
            now,
            frame_index: self.frame_index,
        };
        self.frame_index = self.frame_index.wrapping_add(1);
        ft
    }
}

impl Default for FrameTicker {
    fn default() -> Self {
        Self::new(Self::DEFAULT_INTERVAL, Instant::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn first_tick_is_due_immediately() {
        let t0 = Instant::now();
        let ticker = FrameTicker::new(16 * MS, t0);
        assert!(ticker.is_due(t0));
    }

    #[test]
    fn on_time_ticks_keep_a_fixed_cadence() {
        let t0 = Instant::now();
        let mut ticker = FrameTicker::new(16 * MS, t0);
        ticker.tick(t0);
        assert_eq!(ticker.deadline(), t0 + 16 * MS);
        assert!(!ticker.is_due(t0 + 10 * MS));

        let ft = ticker.tick(t0 + 17 * MS);
        assert_eq!(ticker.deadline(), t0 + 32 * MS);
        assert_eq!(ft.frame_index, 1);
        assert!((ft.dt - 0.017).abs() < 1e-6);
    }

    #[test]
    fn stall_does_not_queue_catch_up_frames() {
        let t0 = Instant::now();
        let mut ticker = FrameTicker::new(16 * MS, t0);
        ticker.tick(t0);

        let late = t0 + 500 * MS;
        let ft = ticker.tick(late);
        assert_eq!(ticker.deadline(), late + 16 * MS);
        assert!((ft.dt - 0.25).abs() < 1e-6);
    }
}
