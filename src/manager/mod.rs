// The window manager: one state struct that owns the process table, the
// event queue and the shared screen. Each concern adds an `impl` block in
// its own file.

pub mod compositor;
pub mod interaction;
pub mod lifecycle;
pub mod router;
pub mod scheduler;

use crate::config::{Config, ProgramSpec};
use crate::error::{Result, WmError};
use crate::event::{Event, EventQueue};
use crate::programs::pty::PtyTask;
use crate::state::process::Geometry;
use crate::state::ProcessTable;
use crate::surface::Screen;
use interaction::Drag;
use scheduler::Task;
use log::{debug, info};
use std::collections::HashMap;
use std::path::Path;
use uuid::Uuid;

pub struct WindowManager {
    pub(crate) config: Config,
    pub(crate) table: ProcessTable,
    pub(crate) queue: EventQueue,
    pub(crate) screen: Screen,
    pub(crate) drag: Option<Drag>,
    pub(crate) background_dirty: bool,
    /// Handle of the process whose task is executing, if any.
    pub(crate) current: Option<Uuid>,
    /// Char event still owed to a consumed key chord.
    pub(crate) swallow_char: bool,
    running: bool,
    ticks: u64,
}

impl WindowManager {
    pub fn new(config: Config, width: u16, height: u16) -> Self {
        info!("[WM] display {}x{}", width, height);
        Self {
            config,
            table: ProcessTable::new(),
            queue: EventQueue::new(),
            screen: Screen::new(width, height),
            drag: None,
            background_dirty: true,
            current: None,
            swallow_char: false,
            running: true,
            ticks: 0,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn table(&self) -> &ProcessTable {
        &self.table
    }

    pub fn queue(&self) -> &EventQueue {
        &self.queue
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn drag(&self) -> Option<Drag> {
        self.drag
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub(crate) fn stop(&mut self) {
        self.running = false;
    }

    /// Route the events decoded from one raw input, then deliver everything
    /// they queued.
    pub fn handle_input(&mut self, events: Vec<Event>) {
        for event in events {
            self.dispatch(event);
        }
        self.drain_queue();
    }

    /// Broadcast one timer tick and deliver it.
    pub fn tick(&mut self) {
        self.ticks += 1;
        self.dispatch(Event::Timer { tick: self.ticks });
        self.drain_queue();
    }

    // ===== Process-control API =====

    pub fn focused(&self) -> Option<usize> {
        self.table.focus()
    }

    pub fn title(&self, id: usize) -> Option<&str> {
        self.table.get(id).map(|p| p.title.as_str())
    }

    pub fn set_title(&mut self, id: usize, title: &str) -> Result<()> {
        let process = self.table.get_mut(id).ok_or(WmError::NoSuchProcess(id))?;
        process.title = title.to_string();
        self.invalidate(id, false);
        Ok(())
    }

    /// Id of the process whose task is executing right now.
    pub fn current_id(&self) -> Option<usize> {
        self.current.and_then(|handle| self.table.index_of(handle))
    }

    pub fn process_count(&self) -> usize {
        self.table.len()
    }

    pub fn geometry(&self, id: usize) -> Option<Geometry> {
        self.table.get(id).map(|p| p.geometry)
    }

    /// Launch `path` with `args` and `env` in a new window.
    pub fn launch(
        &mut self,
        env: &HashMap<String, String>,
        path: &str,
        args: &[String],
    ) -> Result<Option<usize>> {
        let spec = ProgramSpec {
            path: path.to_string(),
            args: args.to_vec(),
            env: env.clone(),
            title: None,
        };
        self.launch_program(&spec, None)
    }

    /// Launch a program on a PTY. `None` means it exited before its first
    /// yield.
    pub fn launch_program(
        &mut self,
        spec: &ProgramSpec,
        at: Option<Geometry>,
    ) -> Result<Option<usize>> {
        let title = spec.title.clone().unwrap_or_else(|| {
            Path::new(&spec.path)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| spec.path.clone())
        });
        debug!("[WM] launching '{}' as '{}'", spec.path, title);
        self.create(&title, at, |content| {
            PtyTask::spawn(spec, content).map(|task| Box::new(task) as Box<dyn Task>)
        })
    }
}
