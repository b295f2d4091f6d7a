use crate::event::EventKind;
use crate::manager::scheduler::Task;
use crate::surface::Surface;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Smallest window a resize gesture can produce.
pub const MIN_WIDTH: u16 = 4;
pub const MIN_HEIGHT: u16 = 3;

/// Default window placement when the caller gives none.
pub const DEFAULT_GEOMETRY: Geometry = Geometry {
    x: 4,
    y: 3,
    w: 20,
    h: 10,
};

/// A rectangle of screen cells, 1-based origin.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Geometry {
    pub x: i32,
    pub y: i32,
    pub w: u16,
    pub h: u16,
}

impl Geometry {
    pub const fn new(x: i32, y: i32, w: u16, h: u16) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> i32 {
        self.x + i32::from(self.w) - 1
    }

    pub fn bottom(&self) -> i32 {
        self.y + i32::from(self.h) - 1
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }

    /// Content area: bordered windows give their first row to the title band.
    pub fn content(&self, border: bool) -> Geometry {
        if border {
            Geometry::new(self.x, self.y + 1, self.w, self.h.saturating_sub(1))
        } else {
            *self
        }
    }

    /// Map a screen cell into this rectangle's 1-based local space, clamped
    /// to its bounds.
    pub fn to_local(&self, x: i32, y: i32) -> (i32, i32) {
        let lx = (x - self.x + 1).clamp(1, i32::from(self.w).max(1));
        let ly = (y - self.y + 1).clamp(1, i32::from(self.h).max(1));
        (lx, ly)
    }
}

/// How much of a window the next render must repaint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Dirty {
    Clean,
    /// Decorations only.
    BorderOnly,
    /// Decorations and content.
    Full,
}

/// One running task and the window it owns.
pub struct Process {
    /// Survives renumbering of the table.
    pub handle: Uuid,
    pub title: String,
    pub geometry: Geometry,
    pub border: bool,
    pub maximized: bool,
    pub saved_geometry: Option<Geometry>,
    pub visible: bool,
    pub dirty: Dirty,
    pub task: Option<Box<dyn Task>>,
    /// When set, only this kind (or a terminate request) resumes the task.
    pub filter: Option<EventKind>,
    pub alive: bool,
    /// Events delivered after the initial resume.
    pub deliveries: u64,
    pub surface: Box<dyn Surface>,
}

impl Process {
    pub fn new(title: String, geometry: Geometry, surface: Box<dyn Surface>) -> Self {
        Self {
            handle: Uuid::new_v4(),
            title,
            geometry,
            border: true,
            maximized: false,
            saved_geometry: None,
            visible: true,
            dirty: Dirty::Full,
            task: None,
            filter: None,
            alive: true,
            deliveries: 0,
            surface,
        }
    }

    pub fn content(&self) -> Geometry {
        self.geometry.content(self.border)
    }

    /// Raise to at least `level`; never lowers.
    pub fn mark(&mut self, level: Dirty) {
        self.dirty = self.dirty.max(level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_rect() {
        let g = Geometry::new(4, 3, 20, 10);
        assert_eq!(g.content(true), Geometry::new(4, 4, 20, 9));
        assert_eq!(g.content(false), g);
    }

    #[test]
    fn test_contains_edges() {
        let g = Geometry::new(4, 3, 20, 10);
        assert!(g.contains(4, 3));
        assert!(g.contains(23, 12));
        assert!(!g.contains(24, 12));
        assert!(!g.contains(3, 5));
    }

    #[test]
    fn test_to_local_clamps() {
        let g = Geometry::new(4, 4, 20, 9);
        assert_eq!(g.to_local(4, 4), (1, 1));
        assert_eq!(g.to_local(10, 6), (7, 3));
        assert_eq!(g.to_local(0, 100), (1, 9));
    }

    #[test]
    fn test_dirty_ordering() {
        assert!(Dirty::Clean < Dirty::BorderOnly);
        assert!(Dirty::BorderOnly < Dirty::Full);
    }
}
