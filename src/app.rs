use crate::controller::{Intent, SurfaceFeed};
use crate::session::{IntervalMode, SessionSettings};
use crate::shell::{EventSender, ShellEvent};
use crate::tasks::{MAX_TASK_CHARS, MAX_TASKS};
use crate::ui::Theme;
use clap::ValueEnum;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use serde::Deserialize;

/// Which presentation is on screen. All of them observe the same session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Surface {
    #[default]
    Main,
    Overlay,
    Minimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Timer,
    Settings,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsField {
    Focus,
    ShortBreak,
    LongBreak,
    Cycles,
}

impl SettingsField {
    pub const ALL: [SettingsField; 4] = [Self::Focus, Self::ShortBreak, Self::LongBreak, Self::Cycles];

    fn next(self) -> Self {
        match self {
            Self::Focus => Self::ShortBreak,
            Self::ShortBreak => Self::LongBreak,
            Self::LongBreak => Self::Cycles,
            Self::Cycles => Self::Focus,
        }
    }

    fn prev(self) -> Self {
        match self {
            Self::Focus => Self::Cycles,
            Self::ShortBreak => Self::Focus,
            Self::LongBreak => Self::ShortBreak,
            Self::Cycles => Self::LongBreak,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Focus => "🎯 Focus",
            Self::ShortBreak => "☕ Short Break",
            Self::LongBreak => "🌴 Long Break",
            Self::Cycles => "🔄 Cycles Before Long Break",
        }
    }

    pub fn value(self, settings: &SessionSettings) -> u32 {
        match self {
            Self::Focus => settings.focus_minutes,
            Self::ShortBreak => settings.short_break_minutes,
            Self::LongBreak => settings.long_break_minutes,
            Self::Cycles => settings.long_break_after_cycles,
        }
    }

    fn with_value(self, settings: SessionSettings, value: u32) -> SessionSettings {
        let mut updated = settings;
        match self {
            Self::Focus => updated.focus_minutes = value,
            Self::ShortBreak => updated.short_break_minutes = value,
            Self::LongBreak => updated.long_break_minutes = value,
            Self::Cycles => updated.long_break_after_cycles = value,
        }
        updated
    }
}

pub struct App {
    pub feed: SurfaceFeed,
    pub surface: Surface,
    pub panel: Panel,
    pub theme: Theme,
    pub selected_task: Option<usize>,
    pub task_input: Option<String>,
    pub settings_field: SettingsField,
    pub settings_input: Option<String>,
    pub status: Option<String>,
    pub animation_frame: u8,
    pub should_quit: bool,
    events: EventSender,
}

impl App {
    pub fn new(feed: SurfaceFeed, events: EventSender, surface: Surface, theme: Theme) -> Self {
        let mut app = Self {
            feed,
            surface,
            panel: Panel::Timer,
            theme,
            selected_task: None,
            task_input: None,
            settings_field: SettingsField::Focus,
            settings_input: None,
            status: None,
            animation_frame: 0,
            should_quit: false,
            events,
        };
        app.clamp_selection();
        app
    }

    /// Called once per frame after the feed has been refreshed.
    pub fn on_frame(&mut self) {
        self.animation_frame = self.animation_frame.wrapping_add(1) % 20;
        self.clamp_selection();
    }

    pub fn replace_feed(&mut self, feed: SurfaceFeed) {
        self.feed = feed;
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        let len = self.feed.tasks.len();
        self.selected_task = match (len, self.selected_task) {
            (0, _) => None,
            (_, None) => Some(0),
            (_, Some(idx)) => Some(idx.min(len - 1)),
        };
    }

    fn send(&self, intent: Intent) {
        if self.events.send(ShellEvent::Intent(intent)).is_err() {
            tracing::warn!("controller channel closed, intent dropped");
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        if self.task_input.is_some() {
            self.handle_task_input(key);
            return;
        }
        if self.settings_input.is_some() {
            self.handle_settings_input(key);
            return;
        }

        match self.surface {
            Surface::Main => match self.panel {
                Panel::Timer => self.handle_timer_panel(key),
                Panel::Settings => self.handle_settings_panel(key),
                Panel::Help => {
                    if matches!(key.code, KeyCode::Esc | KeyCode::Char('q' | 'h' | '?')) {
                        self.panel = Panel::Timer;
                    }
                }
            },
            Surface::Overlay | Surface::Minimal => self.handle_compact(key),
        }
    }

    /// Timer shortcuts shared by every surface. Returns true if the key was one.
    fn handle_timer_key(&mut self, key: KeyEvent) -> bool {
        let intent = match key.code {
            KeyCode::Char(' ') => Intent::ToggleRunning,
            KeyCode::Char('r') => Intent::Reset,
            KeyCode::Char('1') => Intent::SwitchMode(IntervalMode::Focus),
            KeyCode::Char('2') => Intent::SwitchMode(IntervalMode::ShortBreak),
            KeyCode::Char('3') => Intent::SwitchMode(IntervalMode::LongBreak),
            KeyCode::Char('n') if key.modifiers.contains(KeyModifiers::CONTROL) => Intent::NewSession,
            KeyCode::Char('b') => Intent::ToggleNotifications,
            _ => return false,
        };
        self.send(intent);
        true
    }

    fn handle_compact(&mut self, key: KeyEvent) {
        if self.handle_timer_key(key) {
            return;
        }
        match key.code {
            KeyCode::Char('o') => self.toggle_surface(Surface::Overlay),
            KeyCode::Char('m') => self.toggle_surface(Surface::Minimal),
            KeyCode::Esc | KeyCode::Char('q') => self.surface = Surface::Main,
            _ => {}
        }
    }

    fn toggle_surface(&mut self, target: Surface) {
        self.surface = if self.surface == target { Surface::Main } else { target };
        tracing::debug!(surface = ?self.surface, "surface switched");
    }

    fn handle_timer_panel(&mut self, key: KeyEvent) {
        self.status = None;
        if self.handle_timer_key(key) {
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('a') => {
                if self.feed.tasks.len() >= MAX_TASKS {
                    self.status = Some(format!("Task list is full ({} max)", MAX_TASKS));
                } else {
                    self.task_input = Some(String::new());
                }
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if let Some(idx) = self.selected_task {
                    self.selected_task = Some((idx + 1).min(self.feed.tasks.len().saturating_sub(1)));
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                if let Some(idx) = self.selected_task {
                    self.selected_task = Some(idx.saturating_sub(1));
                }
            }
            KeyCode::Char('x') | KeyCode::Enter => {
                if let Some(id) = self.selected_task.and_then(|i| self.feed.task_id_at(i)) {
                    self.send(Intent::ToggleTask(id));
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(id) = self.selected_task.and_then(|i| self.feed.task_id_at(i)) {
                    self.send(Intent::RemoveTask(id));
                }
            }
            KeyCode::Char('s') => self.panel = Panel::Settings,
            KeyCode::Char('h') | KeyCode::Char('?') => self.panel = Panel::Help,
            KeyCode::Char('o') => self.toggle_surface(Surface::Overlay),
            KeyCode::Char('m') => self.toggle_surface(Surface::Minimal),
            _ => {}
        }
    }

    fn handle_task_input(&mut self, key: KeyEvent) {
        let Some(buffer) = self.task_input.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Char(c) => {
                if buffer.chars().count() < MAX_TASK_CHARS {
                    buffer.push(c);
                }
            }
            KeyCode::Backspace => {
                buffer.pop();
            }
            KeyCode::Enter => {
                if let Some(text) = self.task_input.take() {
                    self.send(Intent::AddTask(text));
                }
            }
            KeyCode::Esc => self.task_input = None,
            _ => {}
        }
    }

    fn handle_settings_panel(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('s') => self.panel = Panel::Timer,
            KeyCode::Down | KeyCode::Char('j') => self.settings_field = self.settings_field.next(),
            KeyCode::Up | KeyCode::Char('k') => self.settings_field = self.settings_field.prev(),
            KeyCode::Enter | KeyCode::Char('e') => {
                self.status = None;
                let current = self.settings_field.value(&self.feed.session.settings);
                self.settings_input = Some(current.to_string());
            }
            _ => {}
        }
    }

    fn handle_settings_input(&mut self, key: KeyEvent) {
        let Some(buffer) = self.settings_input.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Char(c) if c.is_ascii_digit() && buffer.len() < 3 => buffer.push(c),
            KeyCode::Backspace => {
                buffer.pop();
            }
            KeyCode::Enter => self.apply_setting(),
            KeyCode::Esc => self.settings_input = None,
            _ => {}
        }
    }

    fn apply_setting(&mut self) {
        let Some(input) = self.settings_input.take() else {
            return;
        };
        let Ok(value) = input.parse::<u32>() else {
            self.status = Some("Enter a whole number".into());
            return;
        };

        let updated = self.settings_field.with_value(self.feed.session.settings, value);
        match updated.validate() {
            Ok(()) => {
                if self.events.send(ShellEvent::SettingsChanged(updated)).is_err() {
                    tracing::warn!("controller channel closed, settings dropped");
                }
                self.status = Some("Saved for this session, applies from the next interval".into());
            }
            Err(e) => self.status = Some(e.to_string()),
        }
    }
}
