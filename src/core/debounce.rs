//! Single-slot trailing debounce.
//!
//! `schedule_once` arms a deadline only when none is pending; later calls in
//! the same burst are absorbed, so a burst produces one firing at
//! `first_trigger + delay`. Whoever handles the firing reads the latest
//! state at that moment. Time is passed in so tests can drive it.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    due: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self { delay, due: None }
    }

    /// Arms the deadline unless one is already pending. Returns `true` when a
    /// new deadline was armed.
    pub fn schedule_once(&mut self, now: Instant) -> bool {
        if self.due.is_some() {
            return false;
        }
        self.due = Some(now + self.delay);
        true
    }

    /// Fires when the deadline has passed: clears it and returns `true`.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.due {
            Some(due) if now >= due => {
                self.due = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.due.is_some()
    }

    pub fn due(&self) -> Option<Instant> {
        self.due
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(1000);

    #[test]
    fn new_debouncer_is_idle() {
        let mut d = Debouncer::new(DELAY);
        assert!(!d.is_pending());
        assert!(!d.poll(Instant::now()));
    }

    #[test]
    fn does_not_fire_before_delay() {
        let mut d = Debouncer::new(DELAY);
        let t0 = Instant::now();
        assert!(d.schedule_once(t0));
        assert!(!d.poll(t0 + Duration::from_millis(999)));
        assert!(d.is_pending());
    }

    #[test]
    fn fires_once_at_deadline() {
        let mut d = Debouncer::new(DELAY);
        let t0 = Instant::now();
        d.schedule_once(t0);
        assert!(d.poll(t0 + DELAY));
        assert!(!d.is_pending());
        assert!(!d.poll(t0 + DELAY * 2));
    }

    #[test]
    fn burst_keeps_first_deadline() {
        let mut d = Debouncer::new(DELAY);
        let t0 = Instant::now();
        assert!(d.schedule_once(t0));
        assert!(!d.schedule_once(t0 + Duration::from_millis(300)));
        assert!(!d.schedule_once(t0 + Duration::from_millis(900)));
        assert_eq!(d.due(), Some(t0 + DELAY));
        assert!(d.poll(t0 + DELAY));
    }

    #[test]
    fn rearms_after_firing() {
        let mut d = Debouncer::new(DELAY);
        let t0 = Instant::now();
        d.schedule_once(t0);
        d.poll(t0 + DELAY);
        let t1 = t0 + Duration::from_millis(1500);
        assert!(d.schedule_once(t1));
        assert_eq!(d.due(), Some(t1 + DELAY));
    }
}
