/// Result of checking a timer against the clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimerPoll {
    /// Nothing armed.
    Idle,
    /// Armed, not yet due.
    Pending { remaining_ms: f64 },
    /// Deadline reached; the timer has been disarmed.
    Due,
}

/// A single-slot timer over caller-supplied timestamps (milliseconds).
///
/// Arming again replaces the pending deadline, so a burst of arms behaves as a
/// trailing-edge debounce. The owner drives it by polling with the current time.
#[derive(Debug, Clone, PartialEq)]
pub struct SingleSlotTimer {
    delay_ms: f64,
    due_at: Option<f64>,
}

impl SingleSlotTimer {
    pub fn new(delay_ms: f64) -> Self {
        SingleSlotTimer {
            delay_ms,
            due_at: None,
        }
    }

    /// Arm (or re-arm) the timer. Returns how long the caller should wait before polling.
    pub fn arm(&mut self, now_ms: f64) -> f64 {
        self.due_at = Some(now_ms + self.delay_ms);
        self.delay_ms
    }

    pub fn disarm(&mut self) {
        self.due_at = None;
    }

    pub fn is_armed(&self) -> bool {
        self.due_at.is_some()
    }

    pub fn poll(&mut self, now_ms: f64) -> TimerPoll {
        match self.due_at {
            None => TimerPoll::Idle,
            Some(due) if now_ms >= due => {
                self.due_at = None;
                TimerPoll::Due
            }
            Some(due) => TimerPoll::Pending {
                remaining_ms: due - now_ms,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unarmed_timer_is_idle() {
        let mut timer = SingleSlotTimer::new(1000.0);
        assert_eq!(timer.poll(5000.0), TimerPoll::Idle);
    }

    #[test]
    fn test_fires_once_after_delay() {
        let mut timer = SingleSlotTimer::new(1000.0);
        assert_eq!(timer.arm(100.0), 1000.0);
        assert_eq!(timer.poll(600.0), TimerPoll::Pending { remaining_ms: 500.0 });
        assert_eq!(timer.poll(1100.0), TimerPoll::Due);
        assert_eq!(timer.poll(1200.0), TimerPoll::Idle);
    }

    #[test]
    fn test_rearm_pushes_deadline() {
        let mut timer = SingleSlotTimer::new(1000.0);
        timer.arm(0.0);
        timer.arm(800.0);
        assert!(matches!(timer.poll(1000.0), TimerPoll::Pending { .. }));
        assert_eq!(timer.poll(1800.0), TimerPoll::Due);
    }

    #[test]
    fn test_disarm() {
        let mut timer = SingleSlotTimer::new(1000.0);
        timer.arm(0.0);
        timer.disarm();
        assert!(!timer.is_armed());
        assert_eq!(timer.poll(2000.0), TimerPoll::Idle);
    }
}
