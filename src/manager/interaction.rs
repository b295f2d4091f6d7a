// Window geometry changes: drag-move, drag-resize, maximize, minimize

use super::WindowManager;
use crate::event::Event;
use crate::state::process::{Geometry, MIN_HEIGHT, MIN_WIDTH};
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMode {
    /// Title-row grab, `offset` columns right of the window's left edge.
    Move { offset: i32 },
    /// Bottom-right corner grab.
    Resize,
}

/// The window being manipulated while a button is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Drag {
    pub target: usize,
    pub mode: DragMode,
}

fn at_least(value: i32, floor: u16) -> u16 {
    value.clamp(i32::from(floor), i32::from(u16::MAX)) as u16
}

impl WindowManager {
    pub(crate) fn begin_drag(&mut self, target: usize, mode: DragMode) {
        debug!("[DRAG] begin {:?} on process {}", mode, target);
        self.drag = Some(Drag { target, mode });
    }

    /// Follow pointer motion with the active drag.
    pub fn drag_to(&mut self, x: i32, y: i32) {
        let Some(drag) = self.drag else {
            return;
        };
        let Some(current) = self.geometry(drag.target) else {
            self.drag = None;
            return;
        };
        let next = match drag.mode {
            DragMode::Move { offset } => Geometry::new(x - offset, y, current.w, current.h),
            DragMode::Resize => Geometry::new(
                current.x,
                current.y,
                at_least(x - current.x + 1, MIN_WIDTH),
                at_least(y - current.y + 1, MIN_HEIGHT),
            ),
        };
        self.reposition(drag.target, next);
    }

    pub fn release_drag(&mut self) {
        if let Some(drag) = self.drag.take() {
            debug!("[DRAG] release process {}", drag.target);
        }
    }

    /// Move and size a window (never below the minimum size). The surface
    /// follows, the process is told if its content size changed, and the
    /// screen is repainted.
    pub fn reposition(&mut self, id: usize, geometry: Geometry) {
        let Some(process) = self.table.get_mut(id) else {
            return;
        };
        let old = process.geometry;
        process.geometry = Geometry::new(
            geometry.x,
            geometry.y,
            geometry.w.max(MIN_WIDTH),
            geometry.h.max(MIN_HEIGHT),
        );
        let new = process.geometry;
        if new == old {
            return;
        }
        let content = process.content();
        process.surface.reposition(content);

        if new.w != old.w || new.h != old.h {
            self.queue.push(
                id,
                Event::Resize {
                    width: content.w,
                    height: content.h,
                },
            );
        }
        self.invalidate_all();
    }

    /// Fill the display, or go back to the geometry saved when maximizing.
    pub fn toggle_maximize(&mut self, id: usize) {
        let bounds = self.screen.bounds();
        let Some(process) = self.table.get_mut(id) else {
            return;
        };
        let target = if process.maximized {
            process.maximized = false;
            process.saved_geometry.take().unwrap_or(process.geometry)
        } else {
            process.maximized = true;
            process.saved_geometry = Some(process.geometry);
            bounds
        };
        self.reposition(id, target);
        // The maximize glyph changed even if the geometry did not
        self.invalidate(id, false);
    }

    /// Hide a window. It keeps running; focus moves off it.
    pub fn minimize(&mut self, id: usize) {
        if self.table.get(id).is_none() {
            return;
        }
        self.table.hide(id);
        if self.table.focus() == Some(id) {
            self.set_focus(None);
        }
        self.invalidate_all();
    }

    /// The terminal changed size: refit maximized windows and repaint.
    pub fn display_resize(&mut self, width: u16, height: u16) {
        debug!("[WM] display resized to {}x{}", width, height);
        self.screen.resize(width, height);
        let bounds = self.screen.bounds();
        let maximized: Vec<usize> = self
            .table
            .iter()
            .enumerate()
            .filter(|(_, p)| p.maximized)
            .map(|(id, _)| id)
            .collect();
        for id in maximized {
            self.reposition(id, bounds);
        }
        self.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use crate::event::MouseButton;
    use crate::state::process::Dirty;

    fn resizes(wm: &WindowManager, id: usize) -> Vec<Event> {
        queued_for(wm, id)
            .into_iter()
            .filter(|e| matches!(e, Event::Resize { .. }))
            .collect()
    }

    #[test]
    fn test_reposition_round_trip() {
        let mut wm = manager(51, 19);
        let (a, _) = spawn(&mut wm, "a", None);

        wm.reposition(a, Geometry::new(7, 5, 12, 6));
        assert_eq!(wm.geometry(a), Some(Geometry::new(7, 5, 12, 6)));

        wm.reposition(a, Geometry::new(7, 5, 1, 1));
        assert_eq!(wm.geometry(a), Some(Geometry::new(7, 5, MIN_WIDTH, MIN_HEIGHT)));
    }

    #[test]
    fn test_move_does_not_notify() {
        let mut wm = manager(51, 19);
        let (a, _) = spawn(&mut wm, "a", None);
        wm.reposition(a, Geometry::new(10, 8, 20, 10));
        assert!(resizes(&wm, a).is_empty());
        assert_eq!(
            wm.table().get(a).unwrap().surface.geometry(),
            Geometry::new(10, 9, 20, 9)
        );
    }

    #[test]
    fn test_maximize_round_trip() {
        let mut wm = manager(51, 19);
        let (a, _) = spawn(&mut wm, "a", Some(Geometry::new(4, 3, 20, 10)));
        assert_eq!(
            wm.table().get(a).unwrap().content(),
            Geometry::new(4, 4, 20, 9)
        );

        wm.toggle_maximize(a);
        assert_eq!(wm.geometry(a), Some(Geometry::new(1, 1, 51, 19)));
        assert!(wm.table().get(a).unwrap().maximized);
        assert_eq!(
            resizes(&wm, a),
            vec![Event::Resize {
                width: 51,
                height: 18
            }]
        );

        wm.toggle_maximize(a);
        assert_eq!(wm.geometry(a), Some(Geometry::new(4, 3, 20, 10)));
        assert!(!wm.table().get(a).unwrap().maximized);
        assert_eq!(resizes(&wm, a).len(), 2);
        assert_eq!(
            resizes(&wm, a)[1],
            Event::Resize {
                width: 20,
                height: 9
            }
        );
    }

    #[test]
    fn test_move_drag_follows_pointer() {
        let mut wm = manager(51, 19);
        let (a, _) = spawn(&mut wm, "a", None);
        wm.begin_drag(a, DragMode::Move { offset: 3 });

        wm.drag_to(20, 7);
        assert_eq!(wm.geometry(a), Some(Geometry::new(17, 7, 20, 10)));
        wm.drag_to(2, 1);
        assert_eq!(wm.geometry(a), Some(Geometry::new(-1, 1, 20, 10)));
        assert!(resizes(&wm, a).is_empty());

        wm.release_drag();
        wm.drag_to(30, 10);
        assert_eq!(wm.geometry(a), Some(Geometry::new(-1, 1, 20, 10)));
    }

    #[test]
    fn test_resize_drag_clamps_to_floor() {
        let mut wm = manager(51, 19);
        let (a, _) = spawn(&mut wm, "a", None);
        wm.begin_drag(a, DragMode::Resize);

        wm.drag_to(0, -5);
        assert_eq!(wm.geometry(a), Some(Geometry::new(4, 3, MIN_WIDTH, MIN_HEIGHT)));
        assert_eq!(resizes(&wm, a).len(), 1);
    }

    #[test]
    fn test_minimize_hides_and_drops_focus() {
        let mut wm = manager(51, 19);
        let (a, _) = spawn(&mut wm, "a", None);
        let (b, _) = spawn(&mut wm, "b", None);
        wm.set_focus(Some(b));

        wm.minimize(b);
        assert_eq!(wm.table().z_order(), &[a]);
        assert_eq!(wm.focused(), None);
        assert_eq!(wm.table().get(a).unwrap().dirty, Dirty::Full);
        wm.table().check_invariants().unwrap();
    }

    #[test]
    fn test_display_resize_refits_maximized() {
        let mut wm = manager(51, 19);
        let (a, _) = spawn(&mut wm, "a", None);
        let (b, _) = spawn(&mut wm, "b", None);
        wm.toggle_maximize(a);

        wm.dispatch(Event::DisplayResize {
            width: 80,
            height: 24,
        });
        assert_eq!(wm.geometry(a), Some(Geometry::new(1, 1, 80, 24)));
        assert_eq!(wm.geometry(b), Some(Geometry::new(4, 3, 20, 10)));
        assert_eq!(wm.screen().width(), 80);
        assert_eq!(
            resizes(&wm, a).last(),
            Some(&Event::Resize {
                width: 80,
                height: 23
            })
        );
    }

    #[test]
    fn test_release_without_drag_goes_to_focus() {
        let mut wm = manager(51, 19);
        let (a, _) = spawn(&mut wm, "a", None);
        wm.set_focus(Some(a));
        wm.dispatch(Event::MouseUp {
            button: MouseButton::Primary,
            x: 6,
            y: 6,
        });
        assert!(queued_for(&wm, a).contains(&Event::MouseUp {
            button: MouseButton::Primary,
            x: 3,
            y: 3
        }));
    }
}
