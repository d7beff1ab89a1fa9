//! WanderPlan - Terminal Trip Planner
//!
//! A terminal-based trip planner built in Rust. Authenticate, browse
//! destinations, build a day-by-day itinerary by moving activities between
//! the pool and day columns, and estimate booking costs. All state is
//! persisted locally after every change.

use std::io;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::{Backend, CrosstermBackend},
};

mod domain;
mod application;
mod infrastructure;
mod presentation;

use application::App;
use infrastructure::{DEFAULT_STORE_FILE, FileStore};
use presentation::{InputHandler, render_ui};

/// Entry point for the WanderPlan terminal application.
///
/// Opens the local key-value store, sets up the terminal interface, and
/// runs the main event loop until the user quits.
///
/// # Errors
///
/// Returns an error if terminal setup fails or if there are issues with
/// the terminal interface during runtime.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let store = FileStore::open(DEFAULT_STORE_FILE);
    let mut app = App::new(store);
    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

/// Main application event loop.
///
/// Renders the UI and dispatches keyboard and mouse events to the input
/// handler until the quit flag is set.
fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App<FileStore>) -> io::Result<()> {
    loop {
        let mut frame_area = ratatui::layout::Rect::default();
        terminal.draw(|f| {
            frame_area = f.area();
            render_ui(f, app);
        })?;

        match event::read()? {
            Event::Key(key) => {
                if key.kind == KeyEventKind::Press {
                    InputHandler::handle_key_event(app, key.code, key.modifiers);
                }
            }
            Event::Mouse(mouse) => {
                InputHandler::handle_mouse_event(app, mouse, frame_area);
            }
            _ => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
