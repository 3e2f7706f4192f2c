use std::time::{Duration, Instant};

/// Trailing-edge debounce timer: fires once `delay` after the most recent
/// event. Time is passed in so callers and tests control the clock.
#[derive(Debug, Clone)]
pub struct Debounce {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debounce {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Record an event. Replaces any pending deadline.
    pub fn on_event(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// True exactly once when the pending deadline has passed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(1500);

    #[test]
    fn test_idle_never_fires() {
        let mut timer = Debounce::new(DELAY);
        let t0 = Instant::now();
        assert!(!timer.is_pending());
        assert!(!timer.poll(t0 + DELAY * 10));
    }

    #[test]
    fn test_fires_once_after_delay() {
        let mut timer = Debounce::new(DELAY);
        let t0 = Instant::now();
        timer.on_event(t0);
        assert!(timer.is_pending());
        assert!(!timer.poll(t0 + Duration::from_millis(1499)));
        assert!(timer.poll(t0 + DELAY));
        assert!(!timer.is_pending());
        assert!(!timer.poll(t0 + DELAY * 2));
    }

    #[test]
    fn test_burst_collapses_into_one_firing() {
        let mut timer = Debounce::new(DELAY);
        let t0 = Instant::now();
        let mut fired = 0;
        for i in 0..10u32 {
            let now = t0 + Duration::from_millis(200) * i;
            timer.on_event(now);
            if timer.poll(now) {
                fired += 1;
            }
        }
        let last = t0 + Duration::from_millis(1800);
        assert_eq!(timer.deadline(), Some(last + DELAY));
        assert!(!timer.poll(last + Duration::from_millis(1000)));
        if timer.poll(last + DELAY) {
            fired += 1;
        }
        assert_eq!(fired, 1);
    }

    #[test]
    fn test_cancel_drops_pending() {
        let mut timer = Debounce::new(DELAY);
        let t0 = Instant::now();
        timer.on_event(t0);
        timer.cancel();
        assert!(!timer.poll(t0 + DELAY));
    }
}
