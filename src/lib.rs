// Configuration, errors and logging
pub mod config;
pub mod error;
pub mod logging;

// Events and their decoding from the terminal
pub mod event;

// Process table and window geometry
pub mod state;

// Screen and per-window surfaces
pub mod surface;

// Scheduler, router and compositor
pub mod manager;

// Built-in tasks
pub mod programs;

pub use config::Config;
pub use error::{Result, WmError};
pub use manager::scheduler::{Resume, Task, TaskContext};
pub use manager::WindowManager;

use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
};
use crossterm::execute;
use log::{error, info, warn};
use ratatui::layout::Position;
use ratatui::DefaultTerminal;
use std::time::{Duration, Instant};
use surface::Screen;

pub fn run() -> Result<()> {
    let config = Config::load()?;
    logging::init(config.log_file.as_deref(), config.log_level)?;
    info!("[CELLWM] starting");

    let mut terminal = ratatui::try_init()?;
    let result = match execute!(terminal.backend_mut(), EnableMouseCapture, EnableBracketedPaste) {
        Ok(()) => run_loop(&mut terminal, config),
        Err(e) => Err(e.into()),
    };

    let _ = execute!(terminal.backend_mut(), DisableBracketedPaste, DisableMouseCapture);
    ratatui::restore();

    match &result {
        Ok(()) => info!("[CELLWM] stopped"),
        Err(e) => error!("[CELLWM] stopped: {}", e),
    }
    result
}

fn run_loop(terminal: &mut DefaultTerminal, config: Config) -> Result<()> {
    let size = terminal.size()?;
    let tick = Duration::from_millis(config.tick_ms.max(1));
    let startup = config.startup_programs();
    let quit_when_empty = config.quit_when_empty;

    let mut wm = WindowManager::new(config, size.width, size.height);
    for spec in &startup {
        match wm.launch_program(spec, None) {
            Ok(Some(id)) => {
                wm.raise(id);
                wm.set_focus(Some(id));
            }
            Ok(None) => info!("[CELLWM] autostart '{}' exited at once", spec.path),
            Err(e) => warn!("[CELLWM] autostart '{}' failed: {}", spec.path, e),
        }
    }
    wm.drain_queue();

    let mut clock = TickClock::new(tick, Instant::now());
    while wm.is_running() {
        wm.render();
        present(terminal, wm.screen())?;

        if crossterm::event::poll(clock.remaining(Instant::now()))? {
            let raw = crossterm::event::read()?;
            wm.handle_input(event::input::translate(raw));
        }
        // Timers keep running while input streams in
        if clock.due(Instant::now()) {
            wm.tick();
        }

        if quit_when_empty && wm.process_count() == 0 {
            info!("[CELLWM] no processes left");
            break;
        }
    }
    Ok(())
}

/// Decides when the next timer broadcast is due.
struct TickClock {
    interval: Duration,
    last: Instant,
}

impl TickClock {
    fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            last: now,
        }
    }

    /// Time left before the next tick.
    fn remaining(&self, now: Instant) -> Duration {
        self.interval
            .saturating_sub(now.saturating_duration_since(self.last))
    }

    fn due(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.last) < self.interval {
            return false;
        }
        self.last = now;
        true
    }
}

/// Copy the composed screen into the terminal's frame.
fn present(terminal: &mut DefaultTerminal, screen: &Screen) -> Result<()> {
    terminal.draw(|frame| {
        let area = frame.area();
        let source = screen.buffer();
        let target = frame.buffer_mut();
        for y in 0..area.height.min(screen.height()) {
            for x in 0..area.width.min(screen.width()) {
                if let (Some(cell), Some(slot)) = (source.cell((x, y)), target.cell_mut((x, y))) {
                    *slot = cell.clone();
                }
            }
        }
        if let Some((x, y)) = screen.cursor() {
            frame.set_cursor_position(Position::new((x - 1) as u16, (y - 1) as u16));
        }
    })?;
    Ok(())
}
