// Cooperative scheduler: resumes one task at a time with a filtered event

use super::WindowManager;
use crate::config::FinishPolicy;
use crate::error::Result;
use crate::event::{Event, EventKind};
use crate::programs::exit_prompt::ExitPrompt;
use crate::surface::SurfaceWriter;
use log::{debug, info, trace};
use std::collections::HashMap;
use uuid::Uuid;

/// What a task asks for when it hands control back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resume {
    /// Suspend until an event of this kind arrives (`None` means any).
    Yield(Option<EventKind>),
    /// The task is done; its process ends.
    Finished,
}

/// A resumable execution unit. Each call runs until the task's next
/// suspension point and must return promptly: nothing preempts it.
pub trait Task {
    fn resume(&mut self, ctx: &mut TaskContext<'_>, event: &Event) -> Resume;
}

/// What a running task can reach: its own surface and the narrow
/// process-control API. Never another process's record.
pub struct TaskContext<'a> {
    wm: &'a mut WindowManager,
    handle: Uuid,
}

impl TaskContext<'_> {
    /// This task's current process id.
    pub fn id(&self) -> Option<usize> {
        self.wm.table.index_of(self.handle)
    }

    /// Drawing access to this task's own surface.
    pub fn surface(&mut self) -> Option<SurfaceWriter<'_>> {
        let id = self.id()?;
        let WindowManager { table, screen, .. } = &mut *self.wm;
        let process = table.get_mut(id)?;
        Some(SurfaceWriter::new(process.surface.as_mut(), screen))
    }

    pub fn focus(&self) -> Option<usize> {
        self.wm.focused()
    }

    pub fn set_focus(&mut self, id: usize) -> bool {
        if id >= self.wm.process_count() {
            return false;
        }
        self.wm.set_focus(Some(id));
        true
    }

    pub fn title(&self, id: usize) -> Option<String> {
        self.wm.title(id).map(str::to_string)
    }

    pub fn set_title(&mut self, id: usize, title: &str) -> bool {
        self.wm.set_title(id, title).is_ok()
    }

    pub fn current(&self) -> Option<usize> {
        self.wm.current_id()
    }

    pub fn count(&self) -> usize {
        self.wm.process_count()
    }

    /// Launch a program in a new window. Its first resume runs before this
    /// returns, nested inside the caller's.
    pub fn launch(
        &mut self,
        env: &HashMap<String, String>,
        path: &str,
        args: &[String],
    ) -> Result<Option<usize>> {
        self.wm.launch(env, path, args)
    }

    /// Create a process running `task`, nested like [`TaskContext::launch`].
    pub fn spawn(&mut self, title: &str, task: Box<dyn Task>) -> Result<Option<usize>> {
        self.wm.create(title, None, move |_| Ok(task))
    }

    /// Broadcast a diagnostic line to every process.
    pub fn log(&mut self, message: &str) {
        self.wm.notify_log(message.to_string());
    }
}

impl WindowManager {
    /// Deliver one event to a process. Dead or unknown ids and events the
    /// task is not waiting for are dropped.
    pub fn resume(&mut self, id: usize, event: &Event) {
        let Some(process) = self.table.get_mut(id) else {
            debug!("[SCHED] resume of unknown process {}", id);
            return;
        };
        if !process.alive || process.task.is_none() {
            return;
        }
        if let Some(filter) = process.filter {
            let kind = event.kind();
            if kind != filter && kind != EventKind::Terminate {
                trace!("[SCHED] process {} waits for {:?}, dropped {:?}", id, filter, kind);
                return;
            }
        }
        process.deliveries += 1;
        self.run_task(id, event);
    }

    /// Resume the task unconditionally. The executing-process slot is saved
    /// and restored around the call, so resumes may nest.
    pub(crate) fn run_task(&mut self, id: usize, event: &Event) {
        let Some(process) = self.table.get_mut(id) else {
            return;
        };
        let Some(mut task) = process.task.take() else {
            return;
        };
        let handle = process.handle;

        let previous = self.current.replace(handle);
        let outcome = {
            let mut ctx = TaskContext { wm: self, handle };
            task.resume(&mut ctx, event)
        };
        self.current = previous;

        // Nested resumes may have renumbered the table
        let Some(id) = self.table.index_of(handle) else {
            return;
        };

        match outcome {
            Resume::Yield(filter) => {
                if let Some(process) = self.table.get_mut(id) {
                    process.task = Some(task);
                    process.filter = filter;
                }
                self.invalidate(id, false);
            }
            Resume::Finished => {
                let at_startup = *event == Event::Start
                    && self.table.get(id).is_some_and(|p| p.deliveries == 0);
                if at_startup && self.config.finish_policy == FinishPolicy::Hold {
                    info!("[SCHED] process {} exited during startup, holding window", id);
                    if let Some(process) = self.table.get_mut(id) {
                        process.task = Some(Box::new(ExitPrompt::new(&process.title)));
                        process.filter = None;
                    }
                    self.run_task(id, &Event::Start);
                } else {
                    debug!("[SCHED] process {} finished", id);
                    self.end(id);
                }
            }
        }
    }

    /// Deliver queued events in order until the queue is empty.
    pub fn drain_queue(&mut self) {
        while let Some((id, event)) = self.queue.pop() {
            self.resume(id, &event);
        }
    }
}
