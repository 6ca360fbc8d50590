//! Pomodoro session state machine.
//!
//! A [`Session`] owns the settings, the current [`IntervalMode`], the cycle
//! counter and the [`SessionClock`]. Clock expiry moves the session to the
//! next interval and pauses it; the user has to start every interval.

use crate::clock::{SessionClock, Tick};
use crate::error::SettingsError;
use serde::Deserialize;

pub const DURATION_BOUNDS: (u32, u32) = (1, 60);
pub const CYCLE_BOUNDS: (u32, u32) = (2, 10);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntervalMode {
    Focus,
    ShortBreak,
    LongBreak,
}

impl IntervalMode {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Focus => "FOCUS TIME",
            Self::ShortBreak => "SHORT BREAK",
            Self::LongBreak => "LONG BREAK",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub focus_minutes: u32,
    pub short_break_minutes: u32,
    pub long_break_minutes: u32,
    pub long_break_after_cycles: u32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            focus_minutes: 25,
            short_break_minutes: 5,
            long_break_minutes: 15,
            long_break_after_cycles: 4,
        }
    }
}

impl SessionSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        let (min, max) = DURATION_BOUNDS;
        for (field, value) in [
            ("focus", self.focus_minutes),
            ("short break", self.short_break_minutes),
            ("long break", self.long_break_minutes),
        ] {
            if !(min..=max).contains(&value) {
                return Err(SettingsError::DurationOutOfRange { field, value, min, max });
            }
        }

        let (min, max) = CYCLE_BOUNDS;
        if !(min..=max).contains(&self.long_break_after_cycles) {
            return Err(SettingsError::CyclesOutOfRange {
                value: self.long_break_after_cycles,
                min,
                max,
            });
        }
        Ok(())
    }

    pub fn minutes_for(&self, mode: IntervalMode) -> u32 {
        match mode {
            IntervalMode::Focus => self.focus_minutes,
            IntervalMode::ShortBreak => self.short_break_minutes,
            IntervalMode::LongBreak => self.long_break_minutes,
        }
    }

    pub fn seconds_for(&self, mode: IntervalMode) -> u32 {
        self.minutes_for(mode) * 60
    }
}

/// Message shown to the user when an interval finishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub body: String,
}

/// Result of an automatic interval boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub finished: IntervalMode,
    pub next: IntervalMode,
}

impl Transition {
    pub fn notice(&self) -> Notice {
        let (title, body) = match (self.finished, self.next) {
            (IntervalMode::Focus, IntervalMode::LongBreak) => {
                ("Long Break Time!", "Great work! Take a longer break.")
            }
            (IntervalMode::Focus, _) => ("Break Time!", "Focus interval done. Time for a short break."),
            (_, _) => ("Back to Focus!", "Break is over. Time to focus on your next session."),
        };
        Notice {
            title: title.into(),
            body: body.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionState {
    pub mode: IntervalMode,
    pub cycle_index: u32,
    pub clock: SessionClock,
    pub completed_focus_count: u32,
}

impl SessionState {
    fn initial(settings: &SessionSettings) -> Self {
        Self {
            mode: IntervalMode::Focus,
            cycle_index: 1,
            clock: SessionClock::new(settings.seconds_for(IntervalMode::Focus)),
            completed_focus_count: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    settings: SessionSettings,
    state: SessionState,
}

impl Session {
    pub fn new(settings: SessionSettings) -> Result<Self, SettingsError> {
        settings.validate()?;
        Ok(Self {
            state: SessionState::initial(&settings),
            settings,
        })
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        self.state.clock.is_running()
    }

    /// Advances the clock by one second. Returns the transition when the
    /// interval expired on this tick.
    pub fn tick(&mut self) -> Option<Transition> {
        match self.state.clock.tick() {
            Tick::Expired => Some(self.on_expiry()),
            Tick::Idle | Tick::Counted => None,
        }
    }

    pub fn on_expiry(&mut self) -> Transition {
        let finished = self.state.mode;
        let next = match finished {
            IntervalMode::Focus => {
                self.state.completed_focus_count += 1;
                if self.state.cycle_index % self.settings.long_break_after_cycles == 0 {
                    IntervalMode::LongBreak
                } else {
                    IntervalMode::ShortBreak
                }
            }
            IntervalMode::ShortBreak => {
                self.state.cycle_index = self.state.cycle_index % self.settings.long_break_after_cycles + 1;
                IntervalMode::Focus
            }
            IntervalMode::LongBreak => {
                self.state.cycle_index = 1;
                IntervalMode::Focus
            }
        };

        self.state.mode = next;
        self.state.clock.pause();
        self.state.clock.set_remaining(self.settings.seconds_for(next));
        Transition { finished, next }
    }

    pub fn toggle_running(&mut self) {
        self.state.clock.toggle();
    }

    pub fn reset(&mut self) {
        self.state.clock.pause();
        self.state
            .clock
            .set_remaining(self.settings.seconds_for(self.state.mode));
    }

    pub fn switch_mode(&mut self, target: IntervalMode) {
        self.state.clock.pause();
        self.state.mode = target;
        self.state.clock.set_remaining(self.settings.seconds_for(target));
    }

    /// Starts over from the first focus interval with the current settings.
    pub fn restart(&mut self) {
        self.state = SessionState::initial(&self.settings);
    }

    /// Replaces the settings. The interval in progress keeps its remaining
    /// time; new durations apply from the next reset, mode switch or boundary.
    pub fn apply_settings(&mut self, settings: SessionSettings) -> Result<(), SettingsError> {
        settings.validate()?;
        self.settings = settings;
        self.state.cycle_index = self.state.cycle_index.min(settings.long_break_after_cycles);
        Ok(())
    }

    /// Elapsed fraction of the current interval, measured against the
    /// configured duration.
    pub fn progress(&self) -> f64 {
        let total = self.settings.seconds_for(self.state.mode) as f64;
        let remaining = self.state.clock.remaining_seconds() as f64;
        (1.0 - remaining / total).clamp(0.0, 1.0)
    }
}
