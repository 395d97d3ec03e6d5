//! Orphanages - Terminal Client
//!
//! Browse the orphanages registered around you on a terminal map, open their
//! details, and register new ones. Network, location, photo library and
//! clipboard calls run on a worker thread so the interface never blocks.

use std::io;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use orphanages::application::App;
use orphanages::infrastructure::{init_logging, Config, Services, Worker};
use orphanages::presentation::{render_ui, InputHandler};

/// How long the loop waits for input before checking for finished requests.
const TICK: Duration = Duration::from_millis(50);

/// Entry point for the orphanages terminal client.
///
/// Reads configuration, installs file logging, wires the services to a
/// background worker and runs the main event loop until the user quits.
///
/// # Errors
///
/// Returns an error if configuration is invalid, if the log file cannot be
/// opened, or if terminal setup fails.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let config = Config::parse();
    init_logging(&config.log_file)?;

    let services = Services::from_config(&config)?;
    let worker = Worker::spawn(services);
    tracing::info!("orphanages started");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::default();
    let res = run_app(&mut terminal, &mut app, &worker);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = %err, "terminal failure");
        println!("{err:?}");
    }
    tracing::info!("orphanages stopped");

    Ok(())
}

/// Main application event loop.
///
/// Each pass hands newly issued requests to the worker, redraws, waits up
/// to one tick for a key or mouse event, then applies whatever requests
/// have finished in the meantime.
///
/// # Errors
///
/// Returns an IO error if terminal operations fail.
fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App, worker: &Worker) -> io::Result<()> {
    loop {
        for effect in app.take_effects() {
            tracing::debug!(id = %effect.id, request = effect.request.name(), "dispatching request");
            worker.submit(effect);
        }

        let area = terminal.draw(|f| render_ui(f, app))?.area;

        if event::poll(TICK)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    InputHandler::handle_key_event(app, key.code, key.modifiers)
                }
                Event::Mouse(mouse) => InputHandler::handle_mouse_event(app, mouse, area),
                _ => {}
            }
        }

        for completion in worker.poll() {
            app.apply_completion(completion);
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
