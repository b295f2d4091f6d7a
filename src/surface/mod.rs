// The shared display and the per-window drawable surface contract

pub mod buffered;
pub mod writer;

pub use buffered::BufferedSurface;
pub use writer::SurfaceWriter;

use crate::state::process::Geometry;
use ratatui::buffer::{Buffer, Cell};
use ratatui::layout::Rect;
use ratatui::style::Style;

/// The shared character-cell display. Cells are addressed 1-based; writes
/// outside the display are clipped.
pub struct Screen {
    buffer: Buffer,
    cursor: Option<(i32, i32)>,
}

impl Screen {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            buffer: Buffer::empty(Rect::new(0, 0, width, height)),
            cursor: None,
        }
    }

    pub fn width(&self) -> u16 {
        self.buffer.area.width
    }

    pub fn height(&self) -> u16 {
        self.buffer.area.height
    }

    /// Full display bounds, as a window geometry.
    pub fn bounds(&self) -> Geometry {
        Geometry::new(1, 1, self.width(), self.height())
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.buffer = Buffer::empty(Rect::new(0, 0, width, height));
        self.cursor = None;
    }

    pub fn clear(&mut self, style: Style) {
        self.buffer.reset();
        let area = self.buffer.area;
        self.buffer.set_style(area, style);
    }

    fn index(&self, x: i32, y: i32) -> Option<(u16, u16)> {
        if x < 1 || y < 1 || x > i32::from(self.width()) || y > i32::from(self.height()) {
            return None;
        }
        Some(((x - 1) as u16, (y - 1) as u16))
    }

    pub fn cell(&self, x: i32, y: i32) -> Option<&Cell> {
        let pos = self.index(x, y)?;
        self.buffer.cell(pos)
    }

    pub fn put_cell(&mut self, x: i32, y: i32, cell: &Cell) {
        if let Some(pos) = self.index(x, y) {
            if let Some(target) = self.buffer.cell_mut(pos) {
                *target = cell.clone();
            }
        }
    }

    pub fn put_char(&mut self, x: i32, y: i32, ch: char, style: Style) {
        if let Some(pos) = self.index(x, y) {
            if let Some(target) = self.buffer.cell_mut(pos) {
                target.set_char(ch).set_style(style);
            }
        }
    }

    pub fn put_str(&mut self, x: i32, y: i32, text: &str, style: Style) {
        for (i, ch) in text.chars().enumerate() {
            self.put_char(x + i as i32, y, ch, style);
        }
    }

    /// Screen cursor position, `None` when hidden.
    pub fn cursor(&self) -> Option<(i32, i32)> {
        self.cursor
    }

    pub fn set_cursor(&mut self, cursor: Option<(i32, i32)>) {
        self.cursor = cursor.filter(|&(x, y)| self.index(x, y).is_some());
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    /// Text of one row, for inspection.
    pub fn row_text(&self, y: i32) -> String {
        (1..=i32::from(self.width()))
            .filter_map(|x| self.cell(x, y))
            .map(|cell| cell.symbol())
            .collect()
    }
}

/// A window's content area. The manager positions and shows it and asks it
/// to repaint; running tasks draw into it. Drawing coordinates are local
/// and 1-based, and drawing calls take the shared screen so a visible
/// surface can write through immediately.
pub trait Surface {
    fn geometry(&self) -> Geometry;
    fn reposition(&mut self, geometry: Geometry);
    fn set_visible(&mut self, visible: bool);
    fn is_visible(&self) -> bool;

    /// Repaint all buffered content onto the screen.
    fn redraw(&self, screen: &mut Screen);
    /// Put the screen cursor where this surface last left it.
    fn restore_cursor(&self, screen: &mut Screen);

    fn put_str(&mut self, screen: &mut Screen, x: i32, y: i32, text: &str);
    fn clear(&mut self, screen: &mut Screen);
    fn clear_line(&mut self, screen: &mut Screen, y: i32);
    fn scroll(&mut self, screen: &mut Screen, lines: i32);

    fn style(&self) -> Style;
    fn set_style(&mut self, style: Style);
    fn cursor(&self) -> (i32, i32);
    fn set_cursor(&mut self, x: i32, y: i32);
    fn cursor_visible(&self) -> bool;
    fn set_cursor_visible(&mut self, visible: bool);
}
