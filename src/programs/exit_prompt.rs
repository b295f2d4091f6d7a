use crate::event::{Event, EventKind};
use crate::manager::scheduler::{Resume, Task, TaskContext};
use ratatui::style::Color;

/// Stands in for a program that exited before it received a single event,
/// so the window stays up until the user acknowledges it.
pub struct ExitPrompt {
    notice: String,
    shown: bool,
}

impl ExitPrompt {
    pub fn new(title: &str) -> Self {
        Self {
            notice: format!("{} has exited.", title),
            shown: false,
        }
    }
}

impl Task for ExitPrompt {
    fn resume(&mut self, ctx: &mut TaskContext<'_>, _event: &Event) -> Resume {
        if self.shown {
            return Resume::Finished;
        }
        if let Some(mut out) = ctx.surface() {
            out.set_colors(Color::White, Color::Black);
            out.clear();
            out.set_cursor(1, 1);
            out.print(&self.notice);
            out.newline();
            out.set_colors(Color::Yellow, Color::Black);
            out.print("Press any key to continue");
        }
        self.shown = true;
        Resume::Yield(Some(EventKind::KeyDown))
    }
}
