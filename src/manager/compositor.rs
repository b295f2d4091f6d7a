// Dirty tracking and painting of window decorations

use super::WindowManager;
use crate::config::Theme;
use crate::state::process::{Dirty, Process};
use crate::surface::Screen;
use ratatui::style::Style;

const CONTROLS: &str = "-+x";
const CONTROLS_MAXIMIZED: &str = "-=x";

impl WindowManager {
    /// Repaint everything on the next render.
    pub fn invalidate_all(&mut self) {
        self.background_dirty = true;
        for process in self.table.iter_mut() {
            if process.visible {
                process.dirty = Dirty::Full;
            }
        }
    }

    /// Mark one window dirty (decorations, or everything with `force`) and
    /// every window stacked above it fully dirty, since they may overlap
    /// whatever changed underneath.
    pub fn invalidate(&mut self, id: usize, force: bool) {
        let Some(process) = self.table.get_mut(id) else {
            return;
        };
        process.mark(if force { Dirty::Full } else { Dirty::BorderOnly });
        for above in self.table.above(id) {
            if let Some(process) = self.table.get_mut(above) {
                process.mark(Dirty::Full);
            }
        }
    }

    /// Paint the background if needed, then every dirty visible window back
    /// to front, then place the cursor for the focused window.
    pub fn render(&mut self) {
        let focus = self.table.focus();
        let order = self.table.z_order().to_vec();
        let WindowManager {
            table,
            screen,
            config,
            background_dirty,
            ..
        } = self;

        if *background_dirty {
            screen.clear(Style::default().bg(config.theme.background));
            *background_dirty = false;
        }

        for id in order {
            let Some(process) = table.get_mut(id) else {
                continue;
            };
            if !process.visible || process.dirty == Dirty::Clean {
                continue;
            }
            if process.border {
                draw_title_band(screen, process, focus == Some(id), &config.theme);
            }
            if config.shadows {
                draw_shadow(screen, process, &config.theme);
            }
            if process.dirty == Dirty::Full {
                process.surface.redraw(screen);
            }
            process.dirty = Dirty::Clean;
        }

        match focus.and_then(|id| table.get(id)) {
            Some(process) if process.visible => process.surface.restore_cursor(screen),
            _ => screen.set_cursor(None),
        }
    }
}

/// Title text padded or cut to fit, followed by the minimize, maximize and
/// close glyphs in the rightmost three cells.
pub fn title_band(title: &str, width: u16, maximized: bool) -> String {
    let controls = if maximized { CONTROLS_MAXIMIZED } else { CONTROLS };
    let width = usize::from(width);
    let label_width = width.saturating_sub(controls.len());
    let label: String = format!(" {}", title)
        .chars()
        .chain(std::iter::repeat(' '))
        .take(label_width)
        .collect();
    let shown = controls.len().min(width);
    format!("{}{}", label, &controls[controls.len() - shown..])
}

fn draw_title_band(screen: &mut Screen, process: &Process, focused: bool, theme: &Theme) {
    let style = if focused {
        Style::default()
            .fg(theme.focused_title_fg)
            .bg(theme.focused_title_bg)
    } else {
        Style::default()
            .fg(theme.unfocused_title_fg)
            .bg(theme.unfocused_title_bg)
    };
    let g = process.geometry;
    screen.put_str(
        g.x,
        g.y,
        &title_band(&process.title, g.w, process.maximized),
        style,
    );
}

/// One-cell shadow along the right and bottom edges, offset by one.
fn draw_shadow(screen: &mut Screen, process: &Process, theme: &Theme) {
    let style = Style::default().bg(theme.shadow);
    let g = process.geometry;
    for y in g.y + 1..=g.bottom() + 1 {
        screen.put_char(g.right() + 1, y, ' ', style);
    }
    for x in g.x + 1..=g.right() + 1 {
        screen.put_char(x, g.bottom() + 1, ' ', style);
    }
}
