use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use pomo_overlay::{
    app::App,
    config::{Args, Config},
    controller::{Controller, FeedStatus},
    error::Result,
    logging,
    shell::{self, DesktopNotifier, EventReceiver, Notifier, TickSource, TICK_PERIOD},
    ui::{self, Theme},
};
use ratatui::prelude::*;
use std::{
    io,
    time::{Duration, Instant},
};

const FRAME_RATE: Duration = Duration::from_millis(50);

fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load(&args)?;

    let log_path = config.log_path();
    if !logging::init(&config.log_level, &log_path) {
        eprintln!("warning: cannot open log file {}, logging disabled", log_path.display());
    }
    tracing::info!(settings = ?config.settings, surface = ?config.surface, "starting");

    let notifier = DesktopNotifier::new(config.sound_enabled);
    let mut controller = Controller::new(config.settings, notifier, config.notifications_enabled)?;
    let (events, inbox) = shell::channel();
    let mut ticks = TickSource::new(events.clone(), TICK_PERIOD);
    let mut app = App::new(controller.subscribe(), events, config.surface, Theme::by_name(&config.theme));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run(&mut terminal, &mut app, &mut controller, &mut ticks, inbox);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    tracing::info!(
        completed_focus = controller.snapshot().state.completed_focus_count,
        "exiting"
    );
    res
}

fn run<N: Notifier>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    controller: &mut Controller<N>,
    ticks: &mut TickSource,
    mut inbox: EventReceiver,
) -> Result<()> {
    let mut last_frame = Instant::now();

    loop {
        terminal.draw(|f| ui::render(f, app))?;

        let timeout = FRAME_RATE.saturating_sub(last_frame.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key);
            }
        }

        ticks.poll(Instant::now());
        while let Ok(event) = inbox.try_recv() {
            controller.handle(event);
        }
        ticks.sync(controller.is_running(), Instant::now());

        if app.feed.refresh() == FeedStatus::Lagged {
            app.replace_feed(controller.subscribe());
        }

        if last_frame.elapsed() >= FRAME_RATE {
            app.on_frame();
            last_frame = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
