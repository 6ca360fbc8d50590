/// Outcome of a single clock tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// The clock is paused; nothing changed.
    Idle,
    /// One second was taken off the remaining time.
    Counted,
    /// The clock was already at zero. The caller decides what comes next.
    Expired,
}

/// Remaining time of the current interval plus the running flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionClock {
    remaining_seconds: u32,
    running: bool,
}

impl SessionClock {
    pub fn new(remaining_seconds: u32) -> Self {
        Self {
            remaining_seconds,
            running: false,
        }
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn tick(&mut self) -> Tick {
        if !self.running {
            return Tick::Idle;
        }
        match self.remaining_seconds {
            0 => Tick::Expired,
            _ => {
                self.remaining_seconds -= 1;
                Tick::Counted
            }
        }
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    pub fn toggle(&mut self) {
        self.running = !self.running;
    }

    pub(crate) fn set_remaining(&mut self, seconds: u32) {
        self.remaining_seconds = seconds;
    }
}

pub fn format_mm_ss(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paused_clock_ignores_ticks() {
        let mut clock = SessionClock::new(10);
        assert_eq!(clock.tick(), Tick::Idle);
        assert_eq!(clock.remaining_seconds(), 10);
    }

    #[test]
    fn test_counts_down_then_expires() {
        let mut clock = SessionClock::new(2);
        clock.start();
        assert_eq!(clock.tick(), Tick::Counted);
        assert_eq!(clock.tick(), Tick::Counted);
        assert_eq!(clock.remaining_seconds(), 0);
        assert_eq!(clock.tick(), Tick::Expired);
        assert_eq!(clock.remaining_seconds(), 0);
    }

    #[test]
    fn test_start_pause_keep_remaining() {
        let mut clock = SessionClock::new(90);
        clock.start();
        clock.tick();
        clock.pause();
        assert!(!clock.is_running());
        assert_eq!(clock.remaining_seconds(), 89);
        clock.toggle();
        assert!(clock.is_running());
        assert_eq!(clock.remaining_seconds(), 89);
    }

    #[test]
    fn test_format_mm_ss() {
        assert_eq!(format_mm_ss(0), "00:00");
        assert_eq!(format_mm_ss(1500), "25:00");
        assert_eq!(format_mm_ss(299), "04:59");
    }
}
