use chrono::{DateTime, Utc};
use product_inspect_application::Clock;

#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_are_utc_with_millis() {
        let stamp = SystemClock.now_timestamp_string();
        assert!(stamp.ends_with('Z'));
        assert_eq!(stamp.len(), "2026-03-16T08:00:00.000Z".len());
    }
}
