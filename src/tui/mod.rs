//! Terminal editor for the roadmap
//!
//! Outline of the filtered tree with a detail pane, inline edit and
//! new-child forms, time-range and category filters, and save / export /
//! import. The stored tree is read once at startup.

pub mod app;
pub mod msg; // TEA message types (what happened)
pub mod state; // Pure state transformations (functional core)
pub mod ui;
pub mod update; // TEA update function (state transitions)

use std::io;
use std::time::{Duration, Instant};

use crossterm::{
    event::{poll, read, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;

use crate::config::Config;
use crate::store::KeyValueStore;
use app::App;
use msg::{key_to_msg, Msg};

/// Run the TUI application
pub fn run(store: Box<dyn KeyValueStore>, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app, ensuring cleanup happens even on error
    let result = run_app_inner(&mut terminal, store, config);

    // Restore terminal - this MUST run even if app fails
    let _ = disable_raw_mode();
    let _ = execute!(terminal.backend_mut(), LeaveAlternateScreen);
    let _ = terminal.show_cursor();

    result
}

fn run_app_inner<B: Backend>(
    terminal: &mut Terminal<B>,
    store: Box<dyn KeyValueStore>,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let today = chrono::Local::now().date_naive();
    let app = App::new(store, config, today);
    let model = app.initial_model(config);

    let size = terminal.size()?;
    let (model, _) = app.step(model, Msg::Resize(size.width, size.height));

    run_event_loop(terminal, &app, model)
}

fn run_event_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &App,
    mut model: update::Model,
) -> Result<(), Box<dyn std::error::Error>> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui::draw(f, &model))?;

        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        let msg = if poll(timeout)? {
            match read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    key_to_msg(key.code, key.modifiers, model.key_context())
                }
                Event::Resize(width, height) => Msg::Resize(width, height),
                _ => Msg::Noop,
            }
        } else {
            Msg::Noop
        };

        let (next, quit) = app.step(model, msg);
        model = next;
        if quit {
            if model.unsaved {
                tracing::warn!("quit with unsaved changes");
            }
            return Ok(());
        }

        if last_tick.elapsed() >= tick_rate {
            let (next, _) = app.step(model, Msg::Tick);
            model = next;
            last_tick = Instant::now();
        }
    }
}
