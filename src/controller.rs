//! The single owner of session state and tasks.
//!
//! Surfaces never mutate anything directly: they send [`ShellEvent`]s in and
//! read [`Update`]s from the broadcast bus through a [`SurfaceFeed`].

use crate::error::SettingsError;
use crate::session::{IntervalMode, Notice, Session, SessionSettings, SessionState};
use crate::shell::{Notifier, ShellEvent};
use crate::tasks::{Task, TaskId, TaskList};
use tokio::sync::broadcast::{self, error::TryRecvError};

const UPDATE_CHANNEL_CAPACITY: usize = 64;

/// A user request forwarded verbatim by a surface.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    ToggleRunning,
    Reset,
    SwitchMode(IntervalMode),
    NewSession,
    AddTask(String),
    ToggleTask(TaskId),
    RemoveTask(TaskId),
    ToggleNotifications,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub settings: SessionSettings,
    pub progress: f64,
    pub notifications_enabled: bool,
}

impl SessionSnapshot {
    pub fn is_running(&self) -> bool {
        self.state.clock.is_running()
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.state.clock.remaining_seconds()
    }
}

#[derive(Debug, Clone)]
pub enum Update {
    State(SessionSnapshot),
    Tasks(Vec<Task>),
}

pub struct Controller<N> {
    session: Session,
    tasks: TaskList,
    notifier: N,
    notifications_enabled: bool,
    updates: broadcast::Sender<Update>,
}

impl<N: Notifier> Controller<N> {
    pub fn new(
        settings: SessionSettings,
        notifier: N,
        notifications_enabled: bool,
    ) -> Result<Self, SettingsError> {
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Ok(Self {
            session: Session::new(settings)?,
            tasks: TaskList::new(),
            notifier,
            notifications_enabled,
            updates,
        })
    }

    pub fn subscribe(&self) -> SurfaceFeed {
        SurfaceFeed {
            rx: self.updates.subscribe(),
            session: self.snapshot(),
            tasks: self.tasks.to_vec(),
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: *self.session.state(),
            settings: *self.session.settings(),
            progress: self.session.progress(),
            notifications_enabled: self.notifications_enabled,
        }
    }

    pub fn tasks(&self) -> &TaskList {
        &self.tasks
    }

    pub fn is_running(&self) -> bool {
        self.session.is_running()
    }

    pub fn handle(&mut self, event: ShellEvent) {
        match event {
            ShellEvent::Tick => self.tick(),
            ShellEvent::Intent(intent) => self.apply(intent),
            ShellEvent::SettingsChanged(settings) => self.change_settings(settings),
        }
    }

    fn tick(&mut self) {
        if !self.session.is_running() {
            tracing::trace!("tick ignored while paused");
            return;
        }

        if let Some(transition) = self.session.tick() {
            let state = self.session.state();
            tracing::info!(
                finished = ?transition.finished,
                next = ?transition.next,
                cycle = state.cycle_index,
                completed_focus = state.completed_focus_count,
                "interval finished"
            );
            self.deliver(transition.notice());
        }
        self.publish_state();
    }

    fn apply(&mut self, intent: Intent) {
        tracing::debug!(?intent, "intent");
        match intent {
            Intent::ToggleRunning => self.session.toggle_running(),
            Intent::Reset => self.session.reset(),
            Intent::SwitchMode(mode) => self.session.switch_mode(mode),
            Intent::NewSession => self.session.restart(),
            Intent::ToggleNotifications => {
                self.notifications_enabled = !self.notifications_enabled;
            }
            Intent::AddTask(text) => {
                match self.tasks.add(&text) {
                    Ok(id) => tracing::debug!(%id, "task added"),
                    Err(e) => {
                        tracing::debug!(error = %e, "task rejected");
                        return;
                    }
                }
                self.publish_tasks();
                return;
            }
            Intent::ToggleTask(id) => {
                if self.tasks.toggle(id) {
                    self.publish_tasks();
                } else {
                    tracing::debug!(%id, "toggle for unknown task");
                }
                return;
            }
            Intent::RemoveTask(id) => {
                if self.tasks.remove(id) {
                    self.publish_tasks();
                } else {
                    tracing::debug!(%id, "remove for unknown task");
                }
                return;
            }
        }
        self.publish_state();
    }

    fn change_settings(&mut self, settings: SessionSettings) {
        match self.session.apply_settings(settings) {
            Ok(()) => {
                tracing::info!(?settings, "settings updated");
                self.publish_state();
            }
            Err(e) => tracing::debug!(error = %e, "settings rejected"),
        }
    }

    /// Best effort: a missing notification service never blocks a transition.
    fn deliver(&self, notice: Notice) {
        if !self.notifications_enabled {
            tracing::debug!(title = %notice.title, "notifications off, skipped");
            return;
        }
        if let Err(e) = self.notifier.notify(&notice) {
            tracing::warn!(error = %e, "could not deliver notification");
        }
    }

    fn publish_state(&self) {
        self.publish(Update::State(self.snapshot()));
    }

    fn publish_tasks(&self) {
        self.publish(Update::Tasks(self.tasks.to_vec()));
    }

    fn publish(&self, update: Update) {
        if self.updates.send(update).is_err() {
            tracing::trace!("no surface subscribed");
        }
    }
}

/// A surface's read-only view of the controller.
pub struct SurfaceFeed {
    rx: broadcast::Receiver<Update>,
    pub session: SessionSnapshot,
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStatus {
    Current,
    /// Updates were dropped; resubscribe to get a fresh snapshot.
    Lagged,
}

impl SurfaceFeed {
    pub fn refresh(&mut self) -> FeedStatus {
        loop {
            match self.rx.try_recv() {
                Ok(Update::State(snapshot)) => self.session = snapshot,
                Ok(Update::Tasks(tasks)) => self.tasks = tasks,
                Err(TryRecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "surface feed lagged");
                    return FeedStatus::Lagged;
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => return FeedStatus::Current,
            }
        }
    }

    pub fn task_id_at(&self, index: usize) -> Option<TaskId> {
        self.tasks.get(index).map(|t| t.id)
    }

    pub fn completed_tasks(&self) -> usize {
        self.tasks.iter().filter(|t| t.completed).count()
    }

    pub fn remaining_tasks(&self) -> usize {
        self.tasks.len() - self.completed_tasks()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NotifyError;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct RecordingNotifier {
        notices: Rc<RefCell<Vec<Notice>>>,
        fail: bool,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, notice: &Notice) -> Result<(), NotifyError> {
            if self.fail {
                return Err(NotifyError::Delivery("no notification daemon".into()));
            }
            self.notices.borrow_mut().push(notice.clone());
            Ok(())
        }
    }

    fn controller() -> (Controller<RecordingNotifier>, Rc<RefCell<Vec<Notice>>>) {
        let notifier = RecordingNotifier::default();
        let notices = notifier.notices.clone();
        (Controller::new(SessionSettings::default(), notifier, true).unwrap(), notices)
    }

    fn run_interval<N: Notifier>(controller: &mut Controller<N>) {
        controller.handle(ShellEvent::Intent(Intent::ToggleRunning));
        while controller.is_running() {
            controller.handle(ShellEvent::Tick);
        }
    }

    #[test]
    fn test_focus_completion_notifies_once() {
        let (mut controller, notices) = controller();
        run_interval(&mut controller);

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.state.mode, IntervalMode::ShortBreak);
        assert_eq!(snapshot.remaining_seconds(), 300);
        assert_eq!(snapshot.state.completed_focus_count, 1);
        assert!(!snapshot.is_running());

        let notices = notices.borrow();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].title, "Break Time!");
    }

    #[test]
    fn test_one_notice_per_boundary() {
        let (mut controller, notices) = controller();
        for _ in 0..8 {
            run_interval(&mut controller);
        }
        assert_eq!(notices.borrow().len(), 8);
        let titles: Vec<_> = notices.borrow().iter().map(|n| n.title.clone()).collect();
        assert_eq!(titles[6], "Long Break Time!");
        assert_eq!(titles[7], "Back to Focus!");
        assert_eq!(controller.snapshot().state.cycle_index, 1);
    }

    #[test]
    fn test_failed_notification_still_transitions() {
        let notifier = RecordingNotifier {
            fail: true,
            ..Default::default()
        };
        let mut controller = Controller::new(SessionSettings::default(), notifier, true).unwrap();
        run_interval(&mut controller);
        assert_eq!(controller.snapshot().state.mode, IntervalMode::ShortBreak);
    }

    #[test]
    fn test_notifications_can_be_switched_off() {
        let (mut controller, notices) = controller();
        controller.handle(ShellEvent::Intent(Intent::ToggleNotifications));
        assert!(!controller.snapshot().notifications_enabled);
        run_interval(&mut controller);
        assert!(notices.borrow().is_empty());
        assert_eq!(controller.snapshot().state.mode, IntervalMode::ShortBreak);
    }

    #[test]
    fn test_tick_while_paused_is_ignored() {
        let (mut controller, _) = controller();
        let mut feed = controller.subscribe();
        controller.handle(ShellEvent::Tick);
        assert_eq!(controller.snapshot().remaining_seconds(), 1500);
        feed.refresh();
        assert_eq!(feed.session.remaining_seconds(), 1500);
    }

    #[test]
    fn test_surfaces_observe_the_same_state() {
        let (mut controller, _) = controller();
        let mut main = controller.subscribe();
        let mut overlay = controller.subscribe();

        controller.handle(ShellEvent::Intent(Intent::ToggleRunning));
        for _ in 0..10 {
            controller.handle(ShellEvent::Tick);
        }
        controller.handle(ShellEvent::Intent(Intent::AddTask("plan sprint".into())));

        assert_eq!(main.refresh(), FeedStatus::Current);
        assert_eq!(overlay.refresh(), FeedStatus::Current);
        assert_eq!(main.session, overlay.session);
        assert_eq!(main.session.remaining_seconds(), 1490);
        assert!(main.session.is_running());
        assert_eq!(overlay.tasks.len(), 1);
        assert_eq!(overlay.tasks[0].text, "plan sprint");
    }

    #[test]
    fn test_late_subscriber_starts_from_current_state() {
        let (mut controller, _) = controller();
        controller.handle(ShellEvent::Intent(Intent::SwitchMode(IntervalMode::LongBreak)));
        controller.handle(ShellEvent::Intent(Intent::AddTask("stretch".into())));
        let feed = controller.subscribe();
        assert_eq!(feed.session.state.mode, IntervalMode::LongBreak);
        assert_eq!(feed.session.remaining_seconds(), 900);
        assert_eq!(feed.tasks.len(), 1);
    }

    #[test]
    fn test_task_intents() {
        let (mut controller, _) = controller();
        let mut feed = controller.subscribe();
        for text in ["a", "b", "c", "d", "e", "f", "   "] {
            controller.handle(ShellEvent::Intent(Intent::AddTask(text.into())));
        }
        feed.refresh();
        assert_eq!(feed.tasks.len(), 5);

        let first = feed.task_id_at(0).unwrap();
        controller.handle(ShellEvent::Intent(Intent::ToggleTask(first)));
        feed.refresh();
        assert_eq!(feed.completed_tasks(), 1);

        controller.handle(ShellEvent::Intent(Intent::RemoveTask(first)));
        controller.handle(ShellEvent::Intent(Intent::RemoveTask(first)));
        feed.refresh();
        assert_eq!(feed.tasks.len(), 4);
        assert_eq!(controller.tasks().completed_count(), 0);
    }

    #[test]
    fn test_invalid_settings_change_is_dropped() {
        let (mut controller, _) = controller();
        let bad = SessionSettings {
            focus_minutes: 0,
            ..SessionSettings::default()
        };
        controller.handle(ShellEvent::SettingsChanged(bad));
        assert_eq!(controller.snapshot().settings, SessionSettings::default());

        let good = SessionSettings {
            short_break_minutes: 10,
            ..SessionSettings::default()
        };
        controller.handle(ShellEvent::SettingsChanged(good));
        controller.handle(ShellEvent::Intent(Intent::SwitchMode(IntervalMode::ShortBreak)));
        assert_eq!(controller.snapshot().remaining_seconds(), 600);
    }

    #[test]
    fn test_new_rejects_zero_cycle_count() {
        let settings = SessionSettings {
            long_break_after_cycles: 0,
            ..SessionSettings::default()
        };
        let result = Controller::new(settings, RecordingNotifier::default(), true);
        assert!(matches!(result, Err(SettingsError::CyclesOutOfRange { value: 0, .. })));
    }

    #[test]
    fn test_new_session_keeps_tasks() {
        let (mut controller, _) = controller();
        controller.handle(ShellEvent::Intent(Intent::AddTask("keep me".into())));
        run_interval(&mut controller);
        controller.handle(ShellEvent::Intent(Intent::NewSession));
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.state.mode, IntervalMode::Focus);
        assert_eq!(snapshot.state.completed_focus_count, 0);
        assert_eq!(controller.tasks().len(), 1);
    }

    #[test]
    fn test_lagged_feed_reports_and_resubscribe_recovers() {
        let (mut controller, _) = controller();
        let mut feed = controller.subscribe();
        controller.handle(ShellEvent::Intent(Intent::ToggleRunning));
        for _ in 0..(UPDATE_CHANNEL_CAPACITY + 10) {
            controller.handle(ShellEvent::Tick);
        }
        assert_eq!(feed.refresh(), FeedStatus::Lagged);
        feed = controller.subscribe();
        assert_eq!(feed.session, controller.snapshot());
    }
}
