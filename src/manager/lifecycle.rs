// Process creation and termination

use super::interaction::Drag;
use super::scheduler::Task;
use super::WindowManager;
use crate::error::Result;
use crate::event::Event;
use crate::state::process::{Geometry, Process, DEFAULT_GEOMETRY};
use crate::surface::BufferedSurface;
use log::{info, warn};

impl WindowManager {
    /// Create a process on top of the z-order and run its task once,
    /// synchronously, before returning. `spawn` receives the content
    /// rectangle. If it fails the process is torn down again.
    ///
    /// Returns `None` when the task finished during its first resume and
    /// the process is already gone.
    pub fn create<F>(
        &mut self,
        title: &str,
        geometry: Option<Geometry>,
        spawn: F,
    ) -> Result<Option<usize>>
    where
        F: FnOnce(Geometry) -> Result<Box<dyn Task>>,
    {
        let geometry = geometry.unwrap_or(DEFAULT_GEOMETRY);
        let content = geometry.content(true);
        let surface = BufferedSurface::new(content, true);
        let process = Process::new(title.to_string(), geometry, Box::new(surface));
        let handle = process.handle;
        let id = self.table.insert(process);
        self.invalidate_all();
        info!("[LIFECYCLE] created process {} '{}' at {:?}", id, title, geometry);

        match spawn(content) {
            Ok(task) => {
                if let Some(process) = self.table.get_mut(id) {
                    process.task = Some(task);
                }
            }
            Err(e) => {
                warn!("[LIFECYCLE] task for '{}' could not be created: {}", title, e);
                self.end(id);
                self.notify_log(format!("failed to start '{}': {}", title, e));
                return Err(e);
            }
        }

        // Initial resume, not queued
        self.run_task(id, &Event::Start);
        Ok(self.table.index_of(handle))
    }

    /// Remove a process and its surface, renumber everything that refers
    /// to ids above it, and repaint from scratch.
    pub fn end(&mut self, id: usize) {
        let Some(mut process) = self.table.remove(id) else {
            return;
        };
        process.alive = false;
        self.queue.remove_process(id);
        self.drag = match self.drag {
            Some(drag) if drag.target == id => None,
            Some(drag) if drag.target > id => Some(Drag {
                target: drag.target - 1,
                ..drag
            }),
            other => other,
        };
        self.invalidate_all();
        info!("[LIFECYCLE] ended process {} '{}'", id, process.title);
    }

    /// Broadcast a diagnostic line to every live process.
    pub fn notify_log(&mut self, message: String) {
        self.broadcast(Event::Log { message });
    }
}
