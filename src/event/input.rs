// Decodes raw crossterm input into events, once, at the router boundary

use super::{Event, KeyCode, KeyModifiers, MouseButton};
use crossterm::event::{
    Event as TermEvent, KeyEvent, KeyEventKind, MouseButton as TermButton, MouseEvent,
    MouseEventKind,
};

/// Translate one terminal event. A single raw event can produce several
/// events (a printable key press is both a `KeyDown` and a `Char`).
pub fn translate(raw: TermEvent) -> Vec<Event> {
    match raw {
        TermEvent::Key(key) => translate_key(key),
        TermEvent::Mouse(mouse) => translate_mouse(mouse).into_iter().collect(),
        TermEvent::Paste(text) => vec![Event::Paste(text)],
        TermEvent::Resize(width, height) => vec![Event::DisplayResize { width, height }],
        TermEvent::FocusGained | TermEvent::FocusLost => Vec::new(),
    }
}

fn translate_key(key: KeyEvent) -> Vec<Event> {
    if key.kind == KeyEventKind::Release {
        return vec![Event::KeyUp { code: key.code }];
    }

    // Ctrl+T is the terminate request
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('t') {
        return vec![Event::Terminate];
    }

    let mut events = vec![Event::KeyDown {
        code: key.code,
        modifiers: key.modifiers,
        repeat: key.kind == KeyEventKind::Repeat,
    }];
    if let KeyCode::Char(c) = key.code {
        if !key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
        {
            events.push(Event::Char(c));
        }
    }
    events
}

fn translate_mouse(mouse: MouseEvent) -> Option<Event> {
    // crossterm reports 0-based cells
    let x = i32::from(mouse.column) + 1;
    let y = i32::from(mouse.row) + 1;
    match mouse.kind {
        MouseEventKind::Down(button) => Some(Event::MouseClick {
            button: button_of(button),
            x,
            y,
        }),
        MouseEventKind::Up(button) => Some(Event::MouseUp {
            button: button_of(button),
            x,
            y,
        }),
        MouseEventKind::Drag(button) => Some(Event::MouseDrag {
            button: button_of(button),
            x,
            y,
        }),
        MouseEventKind::ScrollUp => Some(Event::MouseScroll { delta: -1, x, y }),
        MouseEventKind::ScrollDown => Some(Event::MouseScroll { delta: 1, x, y }),
        MouseEventKind::Moved | MouseEventKind::ScrollLeft | MouseEventKind::ScrollRight => None,
    }
}

fn button_of(button: TermButton) -> MouseButton {
    match button {
        TermButton::Left => MouseButton::Primary,
        TermButton::Right => MouseButton::Secondary,
        TermButton::Middle => MouseButton::Middle,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode, modifiers: KeyModifiers, kind: KeyEventKind) -> TermEvent {
        TermEvent::Key(KeyEvent {
            code,
            modifiers,
            kind,
            state: KeyEventState::NONE,
        })
    }

    #[test]
    fn test_printable_key_yields_keydown_and_char() {
        let events = translate(key(
            KeyCode::Char('a'),
            KeyModifiers::NONE,
            KeyEventKind::Press,
        ));
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], Event::KeyDown { code: KeyCode::Char('a'), .. }));
        assert_eq!(events[1], Event::Char('a'));
    }

    #[test]
    fn test_control_chord_has_no_char() {
        let events = translate(key(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL,
            KeyEventKind::Press,
        ));
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_ctrl_t_is_terminate() {
        let events = translate(key(
            KeyCode::Char('t'),
            KeyModifiers::CONTROL,
            KeyEventKind::Press,
        ));
        assert_eq!(events, vec![Event::Terminate]);
    }

    #[test]
    fn test_release_is_keyup() {
        let events = translate(key(KeyCode::Enter, KeyModifiers::NONE, KeyEventKind::Release));
        assert_eq!(events, vec![Event::KeyUp { code: KeyCode::Enter }]);
    }

    #[test]
    fn test_mouse_is_one_based() {
        let events = translate(TermEvent::Mouse(MouseEvent {
            kind: MouseEventKind::Down(TermButton::Right),
            column: 0,
            row: 4,
            modifiers: KeyModifiers::NONE,
        }));
        assert_eq!(
            events,
            vec![Event::MouseClick {
                button: MouseButton::Secondary,
                x: 1,
                y: 5
            }]
        );
    }

    #[test]
    fn test_motion_without_button_is_ignored() {
        let events = translate(TermEvent::Mouse(MouseEvent {
            kind: MouseEventKind::Moved,
            column: 3,
            row: 3,
            modifiers: KeyModifiers::NONE,
        }));
        assert!(events.is_empty());
    }
}
