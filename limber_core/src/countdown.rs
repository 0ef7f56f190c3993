//! A one-unit-per-tick countdown.
//!
//! The countdown knows nothing about wall time: whoever owns it calls
//! [`Countdown::tick`] once per fixed interval. Ticks are ignored unless the
//! countdown is running.

/// Lifecycle of a countdown
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CountdownState {
    /// Never started
    #[default]
    Idle,
    Running,
    Paused,
    Finished,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Countdown {
    remaining: u32,
    state: CountdownState,
}

impl Countdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// (Re)start from `seconds`. Starting from zero finishes immediately.
    pub fn start(&mut self, seconds: u32) {
        self.remaining = seconds;
        self.state = if seconds == 0 {
            CountdownState::Finished
        } else {
            CountdownState::Running
        };
    }

    /// Decrement by one if running. Returns `true` on the tick that reaches zero.
    pub fn tick(&mut self) -> bool {
        if self.state != CountdownState::Running {
            return false;
        }

        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.state = CountdownState::Finished;
            return true;
        }
        false
    }

    pub fn pause(&mut self) {
        if self.state == CountdownState::Running {
            self.state = CountdownState::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.state == CountdownState::Paused {
            self.state = CountdownState::Running;
        }
    }

    pub fn stop(&mut self) {
        self.remaining = 0;
        self.state = CountdownState::Finished;
    }

    /// Add `seconds` while active, never going above `cap`
    ///
    /// Ignored (returns `false`) once the countdown reached zero, when it was
    /// never started, or when it already sits at or above the cap.
    pub fn extend(&mut self, seconds: u32, cap: u32) -> bool {
        let active = matches!(
            self.state,
            CountdownState::Running | CountdownState::Paused
        );
        if !active || self.remaining == 0 || self.remaining >= cap {
            return false;
        }

        self.remaining = self.remaining.saturating_add(seconds).min(cap);
        true
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn state(&self) -> CountdownState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == CountdownState::Running
    }

    pub fn is_finished(&self) -> bool {
        self.state == CountdownState::Finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_down_to_zero_once() {
        let mut countdown = Countdown::new();
        countdown.start(3);

        assert!(!countdown.tick());
        assert!(!countdown.tick());
        assert!(countdown.tick());
        assert!(countdown.is_finished());

        // Further ticks do nothing
        assert!(!countdown.tick());
        assert_eq!(countdown.remaining(), 0);
    }

    #[test]
    fn test_idle_countdown_ignores_ticks() {
        let mut countdown = Countdown::new();
        assert!(!countdown.tick());
        assert_eq!(countdown.state(), CountdownState::Idle);
    }

    #[test]
    fn test_start_at_zero_finishes_immediately() {
        let mut countdown = Countdown::new();
        countdown.start(0);
        assert!(countdown.is_finished());
    }

    #[test]
    fn test_pause_freezes_value() {
        let mut countdown = Countdown::new();
        countdown.start(10);
        countdown.tick();
        countdown.pause();

        for _ in 0..5 {
            countdown.tick();
        }
        assert_eq!(countdown.remaining(), 9);

        countdown.resume();
        countdown.tick();
        assert_eq!(countdown.remaining(), 8);
    }

    #[test]
    fn test_extend_is_capped() {
        let mut countdown = Countdown::new();
        countdown.start(5);

        assert!(countdown.extend(10, 60));
        assert_eq!(countdown.remaining(), 15);

        assert!(countdown.extend(100, 60));
        assert_eq!(countdown.remaining(), 60);

        assert!(!countdown.extend(1, 60));
        assert_eq!(countdown.remaining(), 60);
    }

    #[test]
    fn test_extend_ignored_when_finished() {
        let mut countdown = Countdown::new();
        countdown.start(1);
        countdown.tick();

        assert!(!countdown.extend(10, 60));
        assert_eq!(countdown.remaining(), 0);
        assert!(countdown.is_finished());
    }

    #[test]
    fn test_stop() {
        let mut countdown = Countdown::new();
        countdown.start(30);
        countdown.stop();
        assert!(countdown.is_finished());
        assert_eq!(countdown.remaining(), 0);
    }
}
