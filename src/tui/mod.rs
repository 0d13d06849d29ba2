pub mod app;
pub mod ui;

use std::time::{Duration, Instant};
use std::{error::Error, io};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tracing::info;
use app::{App, InputMode};
use ui::ui;
use crate::config::Config;

/// The tracker ticks once per second while the UI is open.
const TICK_RATE: Duration = Duration::from_secs(1);

pub fn run_tui(config: Config) -> Result<(), Box<dyn Error>> {
    // Load before touching the terminal so a bad snapshot is reported plainly.
    let mut app = App::new(config)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    info!("tui started");
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    // Ticking has stopped; nothing changes after this save.
    app.persist();
    info!("tui stopped");

    if let Err(err) = res {
        println!("{:?}", err)
    }

    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    let mut last_tick = Instant::now();
    loop {
        terminal.draw(|f| ui(f, app))?;

        let timeout = TICK_RATE.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match app.input_mode {
                        InputMode::Normal => match key.code {
                            KeyCode::Char('q') => return Ok(()),
                            KeyCode::Down | KeyCode::Char('j') => app.next(),
                            KeyCode::Up | KeyCode::Char('k') => app.previous(),
                            KeyCode::Char(' ') => app.complete_selected(),
                            KeyCode::Char('s') => app.start_selected(),
                            KeyCode::Char('p') => app.pause_selected(),
                            KeyCode::Char('x') => app.stop_selected(),
                            KeyCode::Char('d') | KeyCode::Delete => app.delete_selected(),
                            KeyCode::Char('a') => app.start_add(),
                            KeyCode::Char('c') => app.toggle_completed(),
                            _ => {}
                        },
                        InputMode::Adding => match key.code {
                            KeyCode::Enter => app.handle_input(),
                            KeyCode::Esc => app.cancel_input(),
                            KeyCode::Char(c) => {
                                app.input_buffer.push(c);
                            }
                            KeyCode::Backspace => {
                                app.input_buffer.pop();
                            }
                            _ => {}
                        },
                    }
                }
            }
        }

        if last_tick.elapsed() >= TICK_RATE {
            app.on_tick();
            last_tick = Instant::now();
        }
    }
}
