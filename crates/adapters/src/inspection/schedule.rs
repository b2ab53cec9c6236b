use std::time::{Duration, Instant};

const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Fixed-rate deadlines. Deadlines that pass while a tick is still running are
/// dropped and counted instead of being queued.
#[derive(Debug, Clone, Copy)]
pub struct TickSchedule {
    interval: Duration,
    next_deadline: Instant,
}

impl TickSchedule {
    pub fn new(start: Instant, interval: Duration) -> Self {
        let interval = interval.max(MIN_INTERVAL);
        Self {
            interval,
            next_deadline: start + interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn time_until_next(&self, now: Instant) -> Duration {
        self.next_deadline.saturating_duration_since(now)
    }

    /// Moves to the first deadline after `now` and returns how many were skipped.
    pub fn complete_tick(&mut self, now: Instant) -> u64 {
        self.next_deadline += self.interval;
        let mut skipped = 0;
        while self.next_deadline <= now {
            self.next_deadline += self.interval;
            skipped += 1;
        }
        skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn on_time_tick_skips_nothing() {
        let start = Instant::now();
        let mut schedule = TickSchedule::new(start, Duration::from_millis(100));

        assert_eq!(schedule.time_until_next(start), Duration::from_millis(100));
        let skipped = schedule.complete_tick(start + Duration::from_millis(130));

        assert_eq!(skipped, 0);
        assert_eq!(
            schedule.time_until_next(start + Duration::from_millis(130)),
            Duration::from_millis(70)
        );
    }

    #[test]
    fn overrun_skips_missed_deadlines() {
        let start = Instant::now();
        let mut schedule = TickSchedule::new(start, Duration::from_millis(100));

        let skipped = schedule.complete_tick(start + Duration::from_millis(450));

        assert_eq!(skipped, 3);
        assert_eq!(
            schedule.time_until_next(start + Duration::from_millis(450)),
            Duration::from_millis(50)
        );
    }

    #[test]
    fn late_wakeup_reports_zero_wait() {
        let start = Instant::now();
        let schedule = TickSchedule::new(start, Duration::from_millis(100));
        assert_eq!(
            schedule.time_until_next(start + Duration::from_millis(250)),
            Duration::ZERO
        );
    }

    #[test]
    fn zero_interval_is_clamped() {
        let schedule = TickSchedule::new(Instant::now(), Duration::ZERO);
        assert_eq!(schedule.interval(), MIN_INTERVAL);
    }
}
