use std::time::{Duration, Instant};

/// How long the adjustment panel stays up without user activity.
pub const AUTO_HIDE_DELAY: Duration = Duration::from_secs(5);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum TimerState {
    Idle,
    Pending(Instant),
}

/// Cancelable delayed action, polled cooperatively from the frame loop.
///
/// At most one deadline is ever outstanding: `start` on a pending timer
/// replaces the old deadline, so a restarted timer can never double-fire.
/// A `cancel` that lands before the next poll wins over an elapsed deadline.
pub struct AutoHideTimer {
    state: TimerState,
    delay: Duration,
}

impl AutoHideTimer {
    pub fn new(delay: Duration) -> Self {
        Self {
            state: TimerState::Idle,
            delay,
        }
    }

    pub fn start(&mut self, now: Instant) {
        self.state = TimerState::Pending(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.state = TimerState::Idle;
    }

    /// Returns true exactly once when the pending deadline has elapsed.
    pub fn fired(&mut self, now: Instant) -> bool {
        match self.state {
            TimerState::Pending(deadline) if now >= deadline => {
                self.state = TimerState::Idle;
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, TimerState::Pending(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_secs(5);

    #[test]
    fn test_fires_once_after_deadline() {
        let t0 = Instant::now();
        let mut timer = AutoHideTimer::new(DELAY);
        timer.start(t0);

        assert!(!timer.fired(t0), "should not fire immediately");
        assert!(!timer.fired(t0 + Duration::from_secs(4)), "should not fire early");
        assert!(timer.fired(t0 + DELAY), "should fire at the deadline");
        assert!(!timer.fired(t0 + Duration::from_secs(60)), "must not fire twice");
    }

    #[test]
    fn test_restart_replaces_deadline() {
        let t0 = Instant::now();
        let mut timer = AutoHideTimer::new(DELAY);
        timer.start(t0);
        timer.start(t0 + Duration::from_secs(3));

        assert!(
            !timer.fired(t0 + DELAY),
            "original deadline was replaced by the restart"
        );
        assert!(timer.fired(t0 + Duration::from_secs(8)));
        assert!(!timer.fired(t0 + Duration::from_secs(99)), "exactly one fire total");
    }

    #[test]
    fn test_cancel_before_expiry_suppresses_fire() {
        let t0 = Instant::now();
        let mut timer = AutoHideTimer::new(DELAY);
        timer.start(t0);
        timer.cancel();

        assert!(!timer.is_pending());
        assert!(!timer.fired(t0 + Duration::from_secs(60)), "canceled timer must not fire");
    }

    #[test]
    fn test_cancel_wins_over_elapsed_deadline() {
        // The deadline has passed on the clock, but cancel lands before the
        // next poll. Last writer wins: no callback.
        let t0 = Instant::now();
        let mut timer = AutoHideTimer::new(DELAY);
        timer.start(t0);
        timer.cancel();
        assert!(!timer.fired(t0 + DELAY));
    }

    #[test]
    fn test_idle_timer_never_fires() {
        let mut timer = AutoHideTimer::new(DELAY);
        assert!(!timer.fired(Instant::now() + Duration::from_secs(600)));
    }
}
