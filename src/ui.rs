use crate::app::{App, Panel, SettingsField, Surface};
use crate::clock::format_mm_ss;
use crate::controller::SessionSnapshot;
use crate::session::IntervalMode;
use crate::tasks::MAX_TASKS;
use ratatui::{prelude::*, widgets::*};

const OVERLAY_WIDTH: u16 = 30;
const OVERLAY_HEIGHT: u16 = 12;

// ============================================================================
// Themes
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Theme {
    pub focus_color: Color,
    pub short_break_color: Color,
    pub long_break_color: Color,
    pub border_color: Color,
    pub accent_color: Color,
}

impl Theme {
    pub const NAMES: &'static [&'static str] = &["default", "ember", "nord", "dracula"];

    pub fn by_name(name: &str) -> Self {
        match name {
            "ember" => Self {
                focus_color: Color::Rgb(225, 68, 41),
                short_break_color: Color::Rgb(255, 184, 117),
                long_break_color: Color::Rgb(230, 168, 102),
                border_color: Color::Rgb(58, 58, 58),
                accent_color: Color::Rgb(242, 237, 234),
            },
            "nord" => Self {
                focus_color: Color::Rgb(136, 192, 255),
                short_break_color: Color::Rgb(255, 20, 60),
                long_break_color: Color::Rgb(0, 255, 100),
                border_color: Color::Rgb(100, 200, 255),
                accent_color: Color::Rgb(255, 100, 255),
            },
            "dracula" => Self {
                focus_color: Color::Rgb(189, 147, 249),
                short_break_color: Color::Rgb(255, 0, 85),
                long_break_color: Color::Rgb(0, 255, 0),
                border_color: Color::Rgb(200, 100, 255),
                accent_color: Color::Rgb(255, 0, 255),
            },
            _ => Self {
                focus_color: Color::Rgb(255, 107, 71),
                short_break_color: Color::Rgb(78, 205, 196),
                long_break_color: Color::Rgb(0, 255, 150),
                border_color: Color::Rgb(0, 200, 255),
                accent_color: Color::Rgb(255, 100, 0),
            },
        }
    }

    pub fn mode_color(&self, mode: IntervalMode) -> Color {
        match mode {
            IntervalMode::Focus => self.focus_color,
            IntervalMode::ShortBreak => self.short_break_color,
            IntervalMode::LongBreak => self.long_break_color,
        }
    }
}

fn mode_icon(mode: IntervalMode) -> &'static str {
    match mode {
        IntervalMode::Focus => "🎯",
        IntervalMode::ShortBreak => "☕",
        IntervalMode::LongBreak => "🌴",
    }
}

// ============================================================================
// Rendering
// ============================================================================

pub fn render(f: &mut Frame, app: &App) {
    match app.surface {
        Surface::Main => {
            render_main(f, app);
            match app.panel {
                Panel::Timer => {}
                Panel::Settings => render_settings(f, app),
                Panel::Help => render_help(f, app),
            }
        }
        Surface::Overlay => render_overlay(f, app),
        Surface::Minimal => render_minimal(f, app),
    }
}

fn rounded_block<'a>(title: &'a str, app: &App) -> Block<'a> {
    Block::default()
        .title(title)
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(app.theme.border_color))
}

fn status_span(session: &SessionSnapshot, app: &App) -> Span<'static> {
    if session.is_running() {
        let dot = if app.animation_frame < 10 { "●" } else { "○" };
        Span::styled(
            format!("{} RUNNING", dot),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled("⏸  PAUSED", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    }
}

fn cycle_dots(session: &SessionSnapshot, color: Color) -> Line<'static> {
    let total = session.settings.long_break_after_cycles;
    let spans: Vec<Span> = (1..=total)
        .map(|i| {
            if i <= session.state.cycle_index {
                Span::styled("● ", Style::default().fg(color))
            } else {
                Span::styled("○ ", Style::default().fg(Color::DarkGray))
            }
        })
        .collect();
    Line::from(spans)
}

fn render_main(f: &mut Frame, app: &App) {
    let session = &app.feed.session;
    let color = app.theme.mode_color(session.state.mode);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1), Constraint::Length(4)])
        .split(f.size());

    let header = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(app.theme.border_color))
        .title(Span::styled(
            " 🍅 POMO ",
            Style::default().fg(app.theme.accent_color).add_modifier(Modifier::BOLD),
        ));
    f.render_widget(header, chunks[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[1]);

    render_timer_column(f, app, columns[0], color);
    render_tasks(f, app, columns[1]);

    let mut footer = vec![
        Line::from(vec![
            span_key("Space", app), Span::raw(" Start/Pause  •  "),
            span_key("R", app), Span::raw(" Reset  •  "),
            span_key("1/2/3", app), Span::raw(" Focus/Short/Long  •  "),
            span_key("O", app), Span::raw(" Overlay  •  "),
            span_key("M", app), Span::raw(" Minimal"),
        ]),
        Line::from(vec![
            span_key("A", app), Span::raw(" Add task  •  "),
            span_key("S", app), Span::raw(" Settings  •  "),
            span_key("H", app), Span::raw(" Help  •  "),
            span_key("Q", app), Span::raw(" Quit"),
        ]),
    ];
    if let Some(status) = &app.status {
        footer.push(Line::from(Span::styled(
            status.clone(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC),
        )));
    }
    f.render_widget(
        Paragraph::new(footer).alignment(Alignment::Center).style(Style::default().fg(Color::DarkGray)),
        chunks[2],
    );
}

fn render_timer_column(f: &mut Frame, app: &App, area: Rect, color: Color) {
    let session = &app.feed.session;
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(10),
            Constraint::Length(2), Constraint::Length(1),
            Constraint::Length(3), Constraint::Length(1),
            Constraint::Length(2), Constraint::Length(1),
            Constraint::Length(1), Constraint::Length(1),
            Constraint::Length(3), Constraint::Length(1),
            Constraint::Length(2),
            Constraint::Percentage(10),
        ])
        .split(area);

    let mode = session.state.mode;
    f.render_widget(
        Paragraph::new(format!("{} {}", mode_icon(mode), mode.label()))
            .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center),
        sections[1],
    );

    f.render_widget(
        Paragraph::new(format_mm_ss(session.remaining_seconds()))
            .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center),
        sections[3],
    );

    let now = chrono::Local::now();
    let date_lines = vec![
        Line::from(Span::styled(now.format("%A, %B %d, %Y").to_string(), Style::default().fg(Color::Gray))),
        Line::from(Span::styled(now.format("%I:%M %p").to_string(), Style::default().fg(Color::DarkGray))),
    ];
    f.render_widget(Paragraph::new(date_lines).alignment(Alignment::Center), sections[5]);

    f.render_widget(
        Paragraph::new(Line::from(status_span(session, app))).alignment(Alignment::Center),
        sections[7],
    );

    f.render_widget(
        Gauge::default()
            .block(Block::default().borders(Borders::ALL).border_type(BorderType::Rounded))
            .gauge_style(Style::default().fg(color).bg(Color::Black))
            .ratio(session.progress),
        sections[9],
    );

    let bell = if session.notifications_enabled { "🔔 on" } else { "🔕 off" };
    let lines = vec![
        Line::from(format!(
            "Cycle {} of {}  •  {} focus sessions completed",
            session.state.cycle_index,
            session.settings.long_break_after_cycles,
            session.state.completed_focus_count,
        )),
        Line::from(format!("Notifications {}", bell)),
    ];
    f.render_widget(
        Paragraph::new(lines).style(Style::default().fg(Color::Gray)).alignment(Alignment::Center),
        sections[11],
    );
}

fn render_tasks(f: &mut Frame, app: &App, area: Rect) {
    let tasks = &app.feed.tasks;
    let title = format!(" Tasks {}/{} done ", app.feed.completed_tasks(), tasks.len());
    let block = rounded_block(&title, app);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut lines = Vec::new();
    if tasks.is_empty() {
        lines.push(Line::from(Span::styled(
            "  No tasks yet! Press 'a' to add one.",
            Style::default().fg(Color::Gray),
        )));
    }

    for (idx, task) in tasks.iter().enumerate() {
        let selected = app.selected_task == Some(idx);
        let prefix = if selected { "► " } else { "  " };
        let check = if task.completed { "[x] " } else { "[ ] " };
        let mut style = if selected {
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        if task.completed {
            style = style.add_modifier(Modifier::CROSSED_OUT).fg(Color::DarkGray);
        }
        lines.push(Line::from(vec![
            Span::styled(prefix, Style::default().fg(app.theme.accent_color)),
            Span::raw(check),
            Span::styled(task.text.clone(), style),
        ]));
    }

    lines.push(Line::from(""));
    if let Some(input) = &app.task_input {
        lines.push(Line::from(Span::styled(
            "  ✏️  NEW TASK  (Enter to save • Esc to cancel)",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(input.clone(), Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
            Span::styled("█", Style::default().fg(Color::Green)),
        ]));
    } else {
        lines.push(Line::from(Span::styled(
            format!(
                "  {} left  •  {} of {} slots used  •  x: toggle  •  d: delete",
                app.feed.remaining_tasks(),
                tasks.len(),
                MAX_TASKS
            ),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn span_key<'a>(text: &'a str, app: &App) -> Span<'a> {
    Span::styled(text, Style::default().fg(app.theme.accent_color).add_modifier(Modifier::BOLD))
}

fn render_settings(f: &mut Frame, app: &App) {
    let area = centered_rect(60, 70, f.size());
    let settings = &app.feed.session.settings;

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled("⚙️  SETTINGS", Style::default().fg(app.theme.accent_color).add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(Span::styled(
            "  ↑↓/jk: Navigate  •  Enter: Edit  •  Esc: Close",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )),
        Line::from(Span::styled(
            "  Changes apply from the next reset or interval",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )),
    ];

    for field in SettingsField::ALL {
        let selected = app.settings_field == field;
        let unit = if field == SettingsField::Cycles { "cycles" } else { "min" };
        lines.push(Line::from(""));

        match (&app.settings_input, selected) {
            (Some(input), true) => {
                lines.push(Line::from(vec![
                    Span::styled("  > ", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
                    Span::styled(field.label(), Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
                ]));
                lines.push(Line::from(vec![
                    Span::raw("    "),
                    Span::styled(input.clone(), Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
                    Span::styled("█", Style::default().fg(Color::Green)),
                ]));
            }
            _ => {
                let (prefix, label_style, value_style) = if selected {
                    (
                        "  > ",
                        Style::default().fg(app.theme.accent_color).add_modifier(Modifier::BOLD),
                        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                    )
                } else {
                    ("    ", Style::default().fg(Color::Gray), Style::default().fg(Color::DarkGray))
                };
                lines.push(Line::from(vec![Span::styled(prefix, label_style), Span::styled(field.label(), label_style)]));
                lines.push(Line::from(vec![
                    Span::raw("    "),
                    Span::styled(format!("{} {}", field.value(settings), unit), value_style),
                ]));
            }
        }
    }

    if let Some(status) = &app.status {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  {}", status),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC),
        )));
    }

    f.render_widget(Clear, area);
    f.render_widget(Paragraph::new(lines).block(rounded_block(" Settings ", app)), area);
}

fn render_help(f: &mut Frame, app: &App) {
    let area = centered_rect(70, 85, f.size());

    let help_text = vec![
        Line::from(""),
        Line::from(Span::styled("⌨️  KEYBOARD SHORTCUTS", Style::default().fg(app.theme.accent_color).add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from("  Timer (every view):"),
        help_line("Space", "Start / pause"),
        help_line("R", "Reset current interval"),
        help_line("1 / 2 / 3", "Switch to focus / short break / long break"),
        help_line("Ctrl+N", "Start a new session"),
        help_line("B", "Notifications on / off"),
        Line::from(""),
        Line::from("  Tasks:"),
        help_line("A", "Add a task"),
        help_line("↑↓ / JK", "Select a task"),
        help_line("X / Enter", "Mark done / not done"),
        help_line("D", "Delete the selected task"),
        Line::from(""),
        Line::from("  Views:"),
        help_line("O", "Overlay view"),
        help_line("M", "Minimal view"),
        help_line("S", "Settings"),
        help_line("H / ?", "Toggle help"),
        help_line("Q / Esc", "Back / quit"),
        help_line("Ctrl+C", "Force quit"),
    ];

    f.render_widget(Clear, area);
    f.render_widget(Paragraph::new(help_text).block(rounded_block(" Help ", app)), area);
}

fn help_line<'a>(key: &'a str, desc: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::raw("    "),
        Span::styled(key, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::raw(format!("  {}", desc)),
    ])
}

/// Compact box pinned to the top-right corner.
fn render_overlay(f: &mut Frame, app: &App) {
    let session = &app.feed.session;
    let color = app.theme.mode_color(session.state.mode);
    let area = overlay_rect(f.size());

    let block = rounded_block(" 🍅 ", app);
    let inner = block.inner(area);
    f.render_widget(Clear, area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), Constraint::Length(1),
            Constraint::Length(1), Constraint::Length(1),
            Constraint::Length(1), Constraint::Length(1),
            Constraint::Length(1), Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

    f.render_widget(
        Paragraph::new(session.state.mode.label())
            .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center),
        rows[0],
    );
    f.render_widget(
        Paragraph::new(format_mm_ss(session.remaining_seconds()))
            .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center),
        rows[2],
    );
    f.render_widget(
        Gauge::default()
            .gauge_style(Style::default().fg(color).bg(Color::Black))
            .label("")
            .ratio(session.progress),
        rows[3],
    );
    f.render_widget(
        Paragraph::new(cycle_dots(session, color)).alignment(Alignment::Center),
        rows[5],
    );
    f.render_widget(
        Paragraph::new(Line::from(status_span(session, app))).alignment(Alignment::Center),
        rows[6],
    );
    f.render_widget(
        Paragraph::new("O: close  •  Space: start/pause")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center),
        rows[8],
    );
}

fn overlay_rect(r: Rect) -> Rect {
    let width = OVERLAY_WIDTH.min(r.width);
    let height = OVERLAY_HEIGHT.min(r.height);
    let x = r.x + r.width.saturating_sub(width + 1);
    let y = r.y + u16::from(r.height > height);
    Rect::new(x, y, width, height)
}

fn render_minimal(f: &mut Frame, app: &App) {
    let session = &app.feed.session;
    let color = app.theme.mode_color(session.state.mode);
    let area = centered_rect(40, 40, f.size());

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            session.state.mode.label(),
            Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format_mm_ss(session.remaining_seconds()),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("Cycle {} / {}", session.state.cycle_index, session.settings.long_break_after_cycles),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(status_span(session, app)),
        Line::from(""),
        Line::from(Span::styled(
            "Press M to restore",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )),
    ];

    f.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(rounded_block(" 🍅 POMO (Minimal) ", app)),
        area,
    );
}

fn centered_rect(w: u16, h: u16, r: Rect) -> Rect {
    let v = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - h) / 2),
            Constraint::Percentage(h),
            Constraint::Percentage((100 - h) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - w) / 2),
            Constraint::Percentage(w),
            Constraint::Percentage((100 - w) / 2),
        ])
        .split(v[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{Controller, Intent};
    use crate::error::NotifyError;
    use crate::session::{Notice, SessionSettings};
    use crate::shell::{self, Notifier, ShellEvent};
    use ratatui::backend::TestBackend;

    struct SilentNotifier;

    impl Notifier for SilentNotifier {
        fn notify(&self, _notice: &Notice) -> Result<(), NotifyError> {
            Ok(())
        }
    }

    fn screen_text(app: &App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| render(f, app)).unwrap();
        terminal.backend().buffer().content.iter().map(|c| c.symbol()).collect()
    }

    fn app_with(intents: &[Intent], surface: Surface) -> App {
        let mut controller = Controller::new(SessionSettings::default(), SilentNotifier, true).unwrap();
        for intent in intents {
            controller.handle(ShellEvent::Intent(intent.clone()));
        }
        let (tx, _rx) = shell::channel();
        App::new(controller.subscribe(), tx, surface, Theme::by_name("default"))
    }

    #[test]
    fn test_main_surface_shows_timer_and_tasks() {
        let app = app_with(&[Intent::AddTask("write tests".into())], Surface::Main);
        let text = screen_text(&app, 120, 40);
        assert!(text.contains("FOCUS TIME"));
        assert!(text.contains("25:00"));
        assert!(text.contains("write tests"));
        assert!(text.contains("Cycle 1 of 4"));
    }

    #[test]
    fn test_overlay_surface_shows_mode_and_time() {
        let app = app_with(&[Intent::SwitchMode(IntervalMode::LongBreak)], Surface::Overlay);
        let text = screen_text(&app, 100, 30);
        assert!(text.contains("LONG BREAK"));
        assert!(text.contains("15:00"));
    }

    #[test]
    fn test_minimal_surface_shows_cycle() {
        let app = app_with(&[], Surface::Minimal);
        let text = screen_text(&app, 100, 30);
        assert!(text.contains("Cycle 1 / 4"));
        assert!(text.contains("PAUSED"));
    }

    #[test]
    fn test_overlay_rect_pins_top_right() {
        let rect = overlay_rect(Rect::new(0, 0, 100, 30));
        assert_eq!(rect, Rect::new(69, 1, OVERLAY_WIDTH, OVERLAY_HEIGHT));
        let tiny = overlay_rect(Rect::new(0, 0, 20, 8));
        assert_eq!(tiny, Rect::new(0, 0, 20, 8));
    }

    #[test]
    fn test_unknown_theme_falls_back() {
        assert_eq!(Theme::by_name("nope"), Theme::by_name("default"));
        for name in Theme::NAMES {
            let theme = Theme::by_name(name);
            assert_ne!(theme.mode_color(IntervalMode::Focus), theme.mode_color(IntervalMode::ShortBreak));
        }
    }
}
