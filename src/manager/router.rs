// Event routing: keyboard to the focus, pointer by hit-testing, the rest
// broadcast to everyone

use super::interaction::DragMode;
use super::WindowManager;
use crate::config::Modifier;
use crate::event::{Event, EventClass, KeyCode, KeyModifiers, MouseButton};
use crate::state::process::{Dirty, Geometry, DEFAULT_GEOMETRY};
use log::{debug, info, warn};

impl WindowManager {
    /// Classify one event and queue it for the process(es) it belongs to,
    /// or act on it directly.
    pub fn dispatch(&mut self, event: Event) {
        match event.class() {
            EventClass::Keyboard => self.route_keyboard(event),
            EventClass::Pointer => self.route_pointer(event),
            EventClass::Display => {
                if let Event::DisplayResize { width, height } = event {
                    self.display_resize(width, height);
                }
            }
            EventClass::Broadcast => self.broadcast(event),
        }
    }

    /// Queue an event for every live process, oldest first.
    pub fn broadcast(&mut self, event: Event) {
        let targets: Vec<usize> = self
            .table
            .iter()
            .enumerate()
            .filter(|(_, p)| p.alive)
            .map(|(id, _)| id)
            .collect();
        for id in targets {
            self.queue.push(id, event.clone());
        }
    }

    /// Move the focus, telling the old and new holders.
    pub fn set_focus(&mut self, id: Option<usize>) {
        let id = id.filter(|&i| i < self.table.len());
        let old = self.table.focus();
        if old == id {
            return;
        }
        self.table.set_focus(id);
        if let Some(old) = old {
            self.queue.push(old, Event::FocusChange { focused: false });
            self.invalidate(old, false);
        }
        if let Some(new) = id {
            self.queue.push(new, Event::FocusChange { focused: true });
            self.invalidate(new, false);
        }
    }

    /// Show a window and bring it to the top. The windows it used to sit
    /// under get their decorations repainted.
    pub fn raise(&mut self, id: usize) {
        let Some(process) = self.table.get(id) else {
            return;
        };
        if process.visible && self.table.is_topmost(id) {
            return;
        }
        let covered = self.table.above(id);
        self.table.raise(id);
        for below in covered {
            if let Some(process) = self.table.get_mut(below) {
                process.mark(Dirty::BorderOnly);
            }
        }
        self.invalidate(id, true);
    }

    fn cycle_chord(&self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        let held = match self.config.cycle_modifier {
            Modifier::Control => KeyModifiers::CONTROL,
            Modifier::Alt => KeyModifiers::ALT,
            Modifier::Shift => KeyModifiers::SHIFT,
        };
        matches!(code, KeyCode::Char(c) if c.eq_ignore_ascii_case(&self.config.cycle_key))
            && modifiers.contains(held)
    }

    /// Focus the next process id, wrapping, and bring it forward.
    pub fn cycle_focus(&mut self) {
        let count = self.table.len();
        if count == 0 {
            return;
        }
        let next = match self.table.focus() {
            Some(id) => (id + 1) % count,
            None => 0,
        };
        debug!("[ROUTER] focus cycles to {}", next);
        self.raise(next);
        self.set_focus(Some(next));
    }

    fn route_keyboard(&mut self, event: Event) {
        if let Event::KeyDown {
            code, modifiers, ..
        } = event
        {
            if self.cycle_chord(code, modifiers) {
                self.cycle_focus();
                self.swallow_char = true;
                return;
            }
        }
        if std::mem::take(&mut self.swallow_char) && matches!(event, Event::Char(_)) {
            return;
        }

        match self.table.focus() {
            Some(id) => self.queue.push(id, event),
            None if event == Event::Terminate => {
                info!("[ROUTER] terminate with no focus, shutting down");
                self.stop();
            }
            None => {}
        }
    }

    fn route_pointer(&mut self, event: Event) {
        let Some((x, y)) = event.position() else {
            return;
        };

        if self.drag.is_some() {
            match event {
                Event::MouseDrag { .. } => return self.drag_to(x, y),
                Event::MouseUp { .. } => return self.release_drag(),
                _ => {}
            }
        }

        if !event.is_discrete_pointer() {
            // Drags and releases follow the focus
            if let Some(id) = self.table.focus() {
                self.deliver_to_content(id, &event, x, y);
            }
            return;
        }

        let Some(id) = self.table.hit_test(x, y) else {
            if let Event::MouseClick { button, .. } = event {
                match button {
                    MouseButton::Secondary => self.open_launcher(x, y),
                    _ => self.set_focus(None),
                }
            }
            return;
        };

        if let Event::MouseClick {
            button: MouseButton::Primary,
            ..
        } = event
        {
            self.raise(id);
            self.set_focus(Some(id));
            if self.decoration_hit(id, x, y) {
                return;
            }
        }

        let inside = self
            .table
            .get(id)
            .is_some_and(|p| p.content().contains(x, y));
        if inside {
            self.deliver_to_content(id, &event, x, y);
        }
    }

    /// Queue a pointer event translated into the window's content space.
    fn deliver_to_content(&mut self, id: usize, event: &Event, x: i32, y: i32) {
        let Some(process) = self.table.get(id) else {
            return;
        };
        if !process.visible {
            return;
        }
        let (lx, ly) = process.content().to_local(x, y);
        self.queue.push(id, event.with_position(lx, ly));
    }

    /// Act on a primary press over a window's title row or resize corner.
    /// Returns true when the press was consumed.
    fn decoration_hit(&mut self, id: usize, x: i32, y: i32) -> bool {
        let Some(process) = self.table.get(id) else {
            return false;
        };
        if !process.border {
            return false;
        }
        let g = process.geometry;
        let maximized = process.maximized;

        if y == g.y {
            let right = g.right();
            if x == right {
                info!("[ROUTER] close button on process {}", id);
                self.end(id);
            } else if x == right - 1 {
                self.toggle_maximize(id);
            } else if x == right - 2 {
                self.minimize(id);
            } else if !maximized {
                self.begin_drag(id, DragMode::Move { offset: x - g.x });
            }
            return true;
        }

        if !maximized && x == g.right() && y == g.bottom() {
            self.begin_drag(id, DragMode::Resize);
            return true;
        }
        false
    }

    /// Secondary press on the empty desktop.
    fn open_launcher(&mut self, x: i32, y: i32) {
        let Some(spec) = self.config.launcher.clone() else {
            return;
        };
        let at = Geometry::new(x, y, DEFAULT_GEOMETRY.w, DEFAULT_GEOMETRY.h);
        match self.launch_program(&spec, Some(at)) {
            Ok(Some(id)) => {
                self.raise(id);
                self.set_focus(Some(id));
            }
            Ok(None) => {}
            Err(e) => warn!("[ROUTER] launcher failed: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;

    fn click(x: i32, y: i32) -> Event {
        Event::MouseClick {
            button: MouseButton::Primary,
            x,
            y,
        }
    }

    fn key(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::KeyDown {
            code,
            modifiers,
            repeat: false,
        }
    }

    /// B at the back, A on top and overlapping it.
    fn two_windows(wm: &mut WindowManager) -> (usize, usize) {
        let (b, _) = spawn(wm, "B", Some(Geometry::new(2, 2, 20, 10)));
        let (a, _) = spawn(wm, "A", Some(Geometry::new(15, 5, 20, 10)));
        (a, b)
    }

    #[test]
    fn test_keyboard_goes_to_focus_only() {
        let mut wm = manager(51, 19);
        let (a, b) = two_windows(&mut wm);
        wm.set_focus(Some(b));
        wm.dispatch(Event::Char('z'));

        assert!(queued_for(&wm, b).contains(&Event::Char('z')));
        assert!(!queued_for(&wm, a).contains(&Event::Char('z')));
    }

    #[test]
    fn test_keyboard_without_focus_is_dropped() {
        let mut wm = manager(51, 19);
        two_windows(&mut wm);
        wm.dispatch(Event::Char('z'));
        assert!(wm.queue().is_empty());
        assert!(wm.is_running());
    }

    #[test]
    fn test_terminate_without_focus_stops() {
        let mut wm = manager(51, 19);
        wm.dispatch(Event::Terminate);
        assert!(!wm.is_running());
    }

    #[test]
    fn test_terminate_with_focus_is_forwarded() {
        let mut wm = manager(51, 19);
        let (a, _) = two_windows(&mut wm);
        wm.set_focus(Some(a));
        wm.dispatch(Event::Terminate);
        assert!(wm.is_running());
        assert!(queued_for(&wm, a).contains(&Event::Terminate));
    }

    #[test]
    fn test_broadcast_reaches_everyone_in_order() {
        let mut wm = manager(51, 19);
        let (_, log0) = spawn(&mut wm, "0", None);
        let (_, log1) = spawn(&mut wm, "1", None);
        let (_, log2) = spawn(&mut wm, "2", None);
        let message = Event::Message {
            name: "ping".to_string(),
            payload: "1".to_string(),
        };
        wm.dispatch(message.clone());

        let order: Vec<usize> = wm.queue().iter().map(|(id, _)| *id).collect();
        assert_eq!(order, vec![0, 1, 2]);
        wm.drain_queue();
        for log in [log0, log1, log2] {
            assert_eq!(log.borrow().iter().filter(|e| **e == message).count(), 1);
        }
    }

    #[test]
    fn test_click_in_lower_window_focuses_and_raises() {
        let mut wm = manager(51, 19);
        let (a, b) = two_windows(&mut wm);
        wm.render();

        // Inside B's content, outside A
        wm.dispatch(click(4, 6));

        assert_eq!(wm.focused(), Some(b));
        assert!(wm.table().is_topmost(b));
        assert_eq!(wm.table().get(a).unwrap().dirty, Dirty::BorderOnly);
        assert!(queued_for(&wm, b).contains(&click(3, 4)));
        assert!(queued_for(&wm, b).contains(&Event::FocusChange { focused: true }));
        wm.table().check_invariants().unwrap();
    }

    #[test]
    fn test_click_hits_topmost_only() {
        let mut wm = manager(51, 19);
        let (a, b) = two_windows(&mut wm);
        // Overlap region belongs to A
        wm.dispatch(click(16, 8));
        assert_eq!(wm.focused(), Some(a));
        assert!(queued_for(&wm, a).contains(&click(2, 3)));
        assert!(queued_for(&wm, b).is_empty());
    }

    #[test]
    fn test_close_button_ends_process() {
        let mut wm = manager(51, 19);
        let (a, b) = two_windows(&mut wm);
        let right = wm.geometry(a).unwrap().right();

        wm.dispatch(click(right, 5));

        assert_eq!(wm.process_count(), 1);
        assert_eq!(wm.title(0), Some("B"));
        assert!(wm.table().is_topmost(b));
        assert_eq!(wm.table().z_order(), &[b]);
        assert_eq!(wm.focused(), None);
        wm.table().check_invariants().unwrap();
    }

    #[test]
    fn test_maximize_and_minimize_buttons() {
        let mut wm = manager(51, 19);
        let (a, b) = two_windows(&mut wm);
        let right = wm.geometry(a).unwrap().right();

        wm.dispatch(click(right - 1, 5));
        assert_eq!(wm.geometry(a), Some(Geometry::new(1, 1, 51, 19)));

        wm.dispatch(click(51 - 2, 1));
        assert!(!wm.table().get(a).unwrap().visible);
        assert_eq!(wm.table().z_order(), &[b]);
        assert_eq!(wm.focused(), None);
    }

    #[test]
    fn test_title_drag_moves_window() {
        let mut wm = manager(51, 19);
        let (a, _) = two_windows(&mut wm);

        wm.dispatch(click(18, 5));
        assert_eq!(
            wm.drag().map(|d| d.mode),
            Some(DragMode::Move { offset: 3 })
        );
        wm.dispatch(Event::MouseDrag {
            button: MouseButton::Primary,
            x: 25,
            y: 7,
        });
        assert_eq!(wm.geometry(a), Some(Geometry::new(22, 7, 20, 10)));

        wm.dispatch(Event::MouseUp {
            button: MouseButton::Primary,
            x: 25,
            y: 7,
        });
        assert!(wm.drag().is_none());
        // Title presses and drag motion never reach the content
        assert!(!queued_for(&wm, a)
            .iter()
            .any(|e| matches!(e, Event::MouseClick { .. } | Event::MouseDrag { .. })));
    }

    #[test]
    fn test_corner_drag_resizes_once() {
        let mut wm = manager(51, 19);
        let (a, _) = spawn(&mut wm, "A", Some(Geometry::new(4, 3, 20, 10)));

        wm.dispatch(click(23, 12));
        assert_eq!(wm.drag().map(|d| d.mode), Some(DragMode::Resize));
        wm.dispatch(Event::MouseDrag {
            button: MouseButton::Primary,
            x: 26,
            y: 14,
        });

        assert_eq!(wm.geometry(a), Some(Geometry::new(4, 3, 23, 12)));
        let resizes: Vec<_> = queued_for(&wm, a)
            .into_iter()
            .filter(|e| matches!(e, Event::Resize { .. }))
            .collect();
        assert_eq!(
            resizes,
            vec![Event::Resize {
                width: 23,
                height: 11
            }]
        );
    }

    #[test]
    fn test_maximized_title_row_does_not_drag() {
        let mut wm = manager(51, 19);
        let (a, _) = spawn(&mut wm, "A", None);
        wm.toggle_maximize(a);
        wm.dispatch(click(10, 1));
        assert!(wm.drag().is_none());
        wm.dispatch(click(51, 19));
        assert!(wm.drag().is_none());
    }

    #[test]
    fn test_click_on_desktop_clears_focus() {
        let mut wm = manager(51, 19);
        let (a, _) = two_windows(&mut wm);
        wm.set_focus(Some(a));
        wm.dispatch(click(50, 18));
        assert_eq!(wm.focused(), None);
        assert!(queued_for(&wm, a).contains(&Event::FocusChange { focused: false }));
    }

    #[test]
    fn test_scroll_is_hit_tested_without_focus_change() {
        let mut wm = manager(51, 19);
        let (a, b) = two_windows(&mut wm);
        wm.set_focus(Some(a));
        wm.dispatch(Event::MouseScroll { delta: 1, x: 3, y: 4 });
        assert_eq!(wm.focused(), Some(a));
        assert!(queued_for(&wm, b).contains(&Event::MouseScroll { delta: 1, x: 2, y: 2 }));
    }

    #[test]
    fn test_borderless_window_has_no_decorations() {
        let mut wm = manager(51, 19);
        let (a, _) = spawn(&mut wm, "A", Some(Geometry::new(1, 1, 10, 5)));
        wm.table.get_mut(a).unwrap().border = false;
        wm.dispatch(click(10, 1));
        assert_eq!(wm.process_count(), 1);
        assert!(queued_for(&wm, a).contains(&click(10, 1)));
    }

    #[test]
    fn test_cycle_focus_wraps_and_consumes() {
        let mut wm = manager(51, 19);
        let (a, b) = two_windows(&mut wm);
        let chord = key(KeyCode::Char('n'), KeyModifiers::ALT);

        wm.dispatch(chord.clone());
        assert_eq!(wm.focused(), Some(0));
        assert!(wm.table().is_topmost(b));
        wm.dispatch(chord.clone());
        assert_eq!(wm.focused(), Some(a));
        wm.dispatch(chord.clone());
        assert_eq!(wm.focused(), Some(b));
        assert!(!wm.queue().iter().any(|(_, e)| *e == chord));
    }

    #[test]
    fn test_cycle_focus_shows_minimized() {
        let mut wm = manager(51, 19);
        let (a, _) = two_windows(&mut wm);
        wm.minimize(0);
        wm.set_focus(Some(a));
        wm.cycle_focus();
        assert_eq!(wm.focused(), Some(0));
        assert!(wm.table().get(0).unwrap().visible);
        wm.table().check_invariants().unwrap();
    }

    #[test]
    fn test_chord_char_is_swallowed() {
        let mut wm = crate::manager::WindowManager::new(
            crate::config::Config {
                launcher: None,
                log_file: None,
                cycle_modifier: Modifier::Shift,
                ..crate::config::Config::default()
            },
            51,
            19,
        );
        let (a, _) = two_windows(&mut wm);
        wm.set_focus(Some(a));
        wm.handle_input(vec![
            key(KeyCode::Char('N'), KeyModifiers::SHIFT),
            Event::Char('N'),
        ]);
        assert_eq!(wm.focused(), Some(0));
        wm.dispatch(Event::Char('x'));
        assert!(queued_for(&wm, 0).contains(&Event::Char('x')));
    }

    #[test]
    fn test_secondary_click_without_launcher_is_ignored() {
        let mut wm = manager(51, 19);
        two_windows(&mut wm);
        wm.dispatch(Event::MouseClick {
            button: MouseButton::Secondary,
            x: 50,
            y: 18,
        });
        assert_eq!(wm.process_count(), 2);
    }

    #[test]
    fn test_pointer_state_invariants_hold() {
        let mut wm = manager(51, 19);
        two_windows(&mut wm);
        spawn(&mut wm, "C", Some(Geometry::new(30, 2, 10, 6)));
        let presses = [
            click(4, 6),
            click(16, 8),
            click(39, 2),
            click(37, 2),
            click(1, 19),
        ];
        for event in presses {
            wm.handle_input(vec![event]);
            wm.render();
            wm.table().check_invariants().unwrap();
        }
        assert_eq!(wm.process_count(), 2);
    }
}
