// Event payloads delivered to processes, and the routing class of each

pub mod input;
pub mod queue;

pub use crossterm::event::{KeyCode, KeyModifiers};
pub use queue::EventQueue;

/// Pointer buttons, decoded from the terminal's mouse reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Primary,
    Secondary,
    Middle,
}

/// Discriminant of an [`Event`], used as the wait filter of a suspended task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Start,
    KeyDown,
    KeyUp,
    Char,
    Paste,
    Terminate,
    MouseClick,
    MouseUp,
    MouseScroll,
    MouseDrag,
    DisplayResize,
    Resize,
    FocusChange,
    Timer,
    Message,
    Log,
}

/// How the router delivers an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventClass {
    /// Delivered to the focused process only.
    Keyboard,
    /// Routed by hit-testing or the active drag.
    Pointer,
    /// Consumed by the manager itself.
    Display,
    /// Delivered to every live process in id order.
    Broadcast,
}

/// One event, with named fields per kind. Pointer coordinates are 1-based
/// screen cells when raw, and 1-based content cells once delivered.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Payload of the initial, unqueued resume of a new task.
    Start,
    KeyDown {
        code: KeyCode,
        modifiers: KeyModifiers,
        repeat: bool,
    },
    KeyUp {
        code: KeyCode,
    },
    Char(char),
    Paste(String),
    Terminate,
    MouseClick {
        button: MouseButton,
        x: i32,
        y: i32,
    },
    MouseUp {
        button: MouseButton,
        x: i32,
        y: i32,
    },
    MouseScroll {
        delta: i32,
        x: i32,
        y: i32,
    },
    MouseDrag {
        button: MouseButton,
        x: i32,
        y: i32,
    },
    DisplayResize {
        width: u16,
        height: u16,
    },
    /// The receiving process's content rectangle changed size.
    Resize {
        width: u16,
        height: u16,
    },
    FocusChange {
        focused: bool,
    },
    Timer {
        tick: u64,
    },
    Message {
        name: String,
        payload: String,
    },
    Log {
        message: String,
    },
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Start => EventKind::Start,
            Event::KeyDown { .. } => EventKind::KeyDown,
            Event::KeyUp { .. } => EventKind::KeyUp,
            Event::Char(_) => EventKind::Char,
            Event::Paste(_) => EventKind::Paste,
            Event::Terminate => EventKind::Terminate,
            Event::MouseClick { .. } => EventKind::MouseClick,
            Event::MouseUp { .. } => EventKind::MouseUp,
            Event::MouseScroll { .. } => EventKind::MouseScroll,
            Event::MouseDrag { .. } => EventKind::MouseDrag,
            Event::DisplayResize { .. } => EventKind::DisplayResize,
            Event::Resize { .. } => EventKind::Resize,
            Event::FocusChange { .. } => EventKind::FocusChange,
            Event::Timer { .. } => EventKind::Timer,
            Event::Message { .. } => EventKind::Message,
            Event::Log { .. } => EventKind::Log,
        }
    }

    pub fn class(&self) -> EventClass {
        match self.kind() {
            EventKind::KeyDown
            | EventKind::KeyUp
            | EventKind::Char
            | EventKind::Paste
            | EventKind::Terminate => EventClass::Keyboard,
            EventKind::MouseClick
            | EventKind::MouseUp
            | EventKind::MouseScroll
            | EventKind::MouseDrag => EventClass::Pointer,
            EventKind::DisplayResize => EventClass::Display,
            _ => EventClass::Broadcast,
        }
    }

    /// Screen (or content) cell of a pointer event.
    pub fn position(&self) -> Option<(i32, i32)> {
        match *self {
            Event::MouseClick { x, y, .. }
            | Event::MouseUp { x, y, .. }
            | Event::MouseScroll { x, y, .. }
            | Event::MouseDrag { x, y, .. } => Some((x, y)),
            _ => None,
        }
    }

    /// Copy of a pointer event moved to another cell. Other events are
    /// returned unchanged.
    pub fn with_position(&self, nx: i32, ny: i32) -> Event {
        match *self {
            Event::MouseClick { button, .. } => Event::MouseClick { button, x: nx, y: ny },
            Event::MouseUp { button, .. } => Event::MouseUp { button, x: nx, y: ny },
            Event::MouseScroll { delta, .. } => Event::MouseScroll { delta, x: nx, y: ny },
            Event::MouseDrag { button, .. } => Event::MouseDrag { button, x: nx, y: ny },
            _ => self.clone(),
        }
    }

    /// Presses and scrolls pick their target by hit-testing; drags and
    /// releases follow the focus.
    pub fn is_discrete_pointer(&self) -> bool {
        matches!(self.kind(), EventKind::MouseClick | EventKind::MouseScroll)
    }
}
