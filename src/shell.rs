//! Host shell adapter: the typed event channel into the controller, the
//! one-second tick subscription and desktop notifications.

use crate::controller::Intent;
use crate::error::NotifyError;
use crate::session::{Notice, SessionSettings};
use notify_rust::{Notification, Urgency};
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Everything the shell delivers to the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum ShellEvent {
    Tick,
    Intent(Intent),
    SettingsChanged(SessionSettings),
}

pub type EventSender = UnboundedSender<ShellEvent>;
pub type EventReceiver = UnboundedReceiver<ShellEvent>;

pub fn channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

// ============================================================================
// Tick source
// ============================================================================

/// A live one-second tick feed into the controller.
///
/// Only exists while the session runs. Dropping it stops the ticks; any tick
/// already queued is ignored by the paused clock.
pub struct TickSubscription {
    sink: EventSender,
    period: Duration,
    next_due: Instant,
}

impl TickSubscription {
    pub fn arm(sink: EventSender, period: Duration, now: Instant) -> Self {
        tracing::trace!("tick subscription armed");
        Self {
            sink,
            period,
            next_due: now + period,
        }
    }

    /// Emits a tick if one is due. No catch-up: a stalled loop loses ticks
    /// rather than delivering a burst.
    pub fn poll(&mut self, now: Instant) -> bool {
        if now < self.next_due {
            return false;
        }
        self.next_due += self.period;
        if self.next_due <= now {
            self.next_due = now + self.period;
        }
        self.sink.send(ShellEvent::Tick).is_ok()
    }

    pub fn time_until_due(&self, now: Instant) -> Duration {
        self.next_due.saturating_duration_since(now)
    }
}

impl Drop for TickSubscription {
    fn drop(&mut self) {
        tracing::trace!("tick subscription released");
    }
}

/// Owns at most one [`TickSubscription`] and keeps it in step with the
/// session's running flag.
pub struct TickSource {
    sink: EventSender,
    period: Duration,
    subscription: Option<TickSubscription>,
}

impl TickSource {
    pub fn new(sink: EventSender, period: Duration) -> Self {
        Self {
            sink,
            period,
            subscription: None,
        }
    }

    pub fn sync(&mut self, running: bool, now: Instant) {
        match (running, self.subscription.is_some()) {
            (true, false) => {
                self.subscription = Some(TickSubscription::arm(self.sink.clone(), self.period, now));
            }
            (false, true) => self.subscription = None,
            _ => {}
        }
    }

    pub fn poll(&mut self, now: Instant) -> bool {
        self.subscription.as_mut().is_some_and(|s| s.poll(now))
    }

    pub fn is_armed(&self) -> bool {
        self.subscription.is_some()
    }
}

// ============================================================================
// Notifications
// ============================================================================

pub trait Notifier {
    fn notify(&self, notice: &Notice) -> Result<(), NotifyError>;
}

/// Audible cue played at an interval boundary.
pub trait Chime {
    fn play(&self);
}

/// Plays the first freedesktop sound found with `paplay` or `aplay`.
pub struct SystemChime;

impl Chime for SystemChime {
    fn play(&self) {
        std::thread::spawn(|| {
            for (cmd, file) in [
                ("paplay", "/usr/share/sounds/freedesktop/stereo/complete.oga"),
                ("aplay", "/usr/share/sounds/sound-icons/guitar-11.wav"),
                ("aplay", "/usr/share/sounds/generic.wav"),
            ] {
                if std::path::Path::new(file).exists() {
                    let played = std::process::Command::new(cmd)
                        .arg(file)
                        .stdout(std::process::Stdio::null())
                        .stderr(std::process::Stdio::null())
                        .spawn()
                        .and_then(|mut child| child.wait());
                    if let Err(e) = played {
                        tracing::debug!(error = %e, cmd, "completion sound failed");
                    }
                    break;
                }
            }
        });
    }
}

pub struct DesktopNotifier<C = SystemChime> {
    chime: Option<C>,
}

impl DesktopNotifier {
    pub fn new(sound: bool) -> Self {
        Self::with_chime(sound.then_some(SystemChime))
    }
}

impl<C: Chime> DesktopNotifier<C> {
    pub fn with_chime(chime: Option<C>) -> Self {
        Self { chime }
    }

    /// The sound plays whether or not the popup could be shown.
    fn finish(&self, shown: Result<(), NotifyError>) -> Result<(), NotifyError> {
        if let Some(chime) = &self.chime {
            chime.play();
        }
        shown
    }
}

impl<C: Chime> Notifier for DesktopNotifier<C> {
    fn notify(&self, notice: &Notice) -> Result<(), NotifyError> {
        let shown = Notification::new()
            .summary(&notice.title)
            .body(&notice.body)
            .appname("pomo")
            .icon("alarm-clock")
            .urgency(Urgency::Critical)
            .show()
            .map(|_| ())
            .map_err(|e| NotifyError::Delivery(e.to_string()));
        self.finish(shown)
    }
}
