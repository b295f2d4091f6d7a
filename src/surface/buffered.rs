// Surface backed by its own ratatui buffer

use super::{Screen, Surface};
use crate::state::process::Geometry;
use ratatui::buffer::{Buffer, Cell};
use ratatui::layout::Rect;
use ratatui::style::Style;

pub struct BufferedSurface {
    geometry: Geometry,
    buffer: Buffer,
    visible: bool,
    style: Style,
    cursor: (i32, i32),
    cursor_visible: bool,
}

impl BufferedSurface {
    pub fn new(geometry: Geometry, visible: bool) -> Self {
        Self {
            geometry,
            buffer: Buffer::empty(Rect::new(0, 0, geometry.w, geometry.h)),
            visible,
            style: Style::default(),
            cursor: (1, 1),
            cursor_visible: false,
        }
    }

    fn local(&self, x: i32, y: i32) -> Option<(u16, u16)> {
        if x < 1 || y < 1 || x > i32::from(self.geometry.w) || y > i32::from(self.geometry.h) {
            return None;
        }
        Some(((x - 1) as u16, (y - 1) as u16))
    }

    fn cell(&self, x: i32, y: i32) -> Option<&Cell> {
        let pos = self.local(x, y)?;
        self.buffer.cell(pos)
    }

    /// Text of one content row, for inspection.
    pub fn row_text(&self, y: i32) -> String {
        (1..=i32::from(self.geometry.w))
            .filter_map(|x| self.cell(x, y))
            .map(|cell| cell.symbol())
            .collect()
    }

    fn write_through(&self, screen: &mut Screen, x: i32, y: i32) {
        if !self.visible {
            return;
        }
        if let Some(cell) = self.cell(x, y) {
            screen.put_cell(self.geometry.x + x - 1, self.geometry.y + y - 1, cell);
        }
    }

    fn blank(&self) -> Cell {
        let mut cell = Cell::default();
        cell.set_char(' ').set_style(self.style);
        cell
    }
}

impl Surface for BufferedSurface {
    fn geometry(&self) -> Geometry {
        self.geometry
    }

    fn reposition(&mut self, geometry: Geometry) {
        if geometry.w != self.geometry.w || geometry.h != self.geometry.h {
            // Keep the overlapping top-left region of the old content
            let mut resized = Buffer::empty(Rect::new(0, 0, geometry.w, geometry.h));
            let w = geometry.w.min(self.geometry.w);
            let h = geometry.h.min(self.geometry.h);
            for y in 0..h {
                for x in 0..w {
                    if let (Some(src), Some(dst)) =
                        (self.buffer.cell((x, y)), resized.cell_mut((x, y)))
                    {
                        *dst = src.clone();
                    }
                }
            }
            self.buffer = resized;
        }
        self.geometry = geometry;
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn redraw(&self, screen: &mut Screen) {
        if !self.visible {
            return;
        }
        for y in 1..=i32::from(self.geometry.h) {
            for x in 1..=i32::from(self.geometry.w) {
                self.write_through(screen, x, y);
            }
        }
    }

    fn restore_cursor(&self, screen: &mut Screen) {
        let (x, y) = self.cursor;
        if self.visible && self.cursor_visible && self.local(x, y).is_some() {
            screen.set_cursor(Some((self.geometry.x + x - 1, self.geometry.y + y - 1)));
        } else {
            screen.set_cursor(None);
        }
    }

    fn put_str(&mut self, screen: &mut Screen, x: i32, y: i32, text: &str) {
        let style = self.style;
        for (i, ch) in text.chars().enumerate() {
            let cx = x + i as i32;
            if let Some(pos) = self.local(cx, y) {
                if let Some(cell) = self.buffer.cell_mut(pos) {
                    cell.set_char(ch).set_style(style);
                }
                self.write_through(screen, cx, y);
            }
        }
    }

    fn clear(&mut self, screen: &mut Screen) {
        for y in 1..=i32::from(self.geometry.h) {
            self.clear_line(screen, y);
        }
    }

    fn clear_line(&mut self, screen: &mut Screen, y: i32) {
        let blank = self.blank();
        for x in 1..=i32::from(self.geometry.w) {
            if let Some(pos) = self.local(x, y) {
                if let Some(cell) = self.buffer.cell_mut(pos) {
                    *cell = blank.clone();
                }
                self.write_through(screen, x, y);
            }
        }
    }

    fn scroll(&mut self, screen: &mut Screen, lines: i32) {
        if lines == 0 {
            return;
        }
        let h = i32::from(self.geometry.h);
        let w = i32::from(self.geometry.w);
        let blank = self.blank();
        let mut scrolled = Buffer::empty(Rect::new(0, 0, self.geometry.w, self.geometry.h));
        for y in 1..=h {
            let src_y = y + lines;
            for x in 1..=w {
                let cell = self.cell(x, src_y).cloned().unwrap_or_else(|| blank.clone());
                if let Some(pos) = self.local(x, y) {
                    if let Some(dst) = scrolled.cell_mut(pos) {
                        *dst = cell;
                    }
                }
            }
        }
        self.buffer = scrolled;
        self.redraw(screen);
    }

    fn style(&self) -> Style {
        self.style
    }

    fn set_style(&mut self, style: Style) {
        self.style = style;
    }

    fn cursor(&self) -> (i32, i32) {
        self.cursor
    }

    fn set_cursor(&mut self, x: i32, y: i32) {
        self.cursor = (x, y);
    }

    fn cursor_visible(&self) -> bool {
        self.cursor_visible
    }

    fn set_cursor_visible(&mut self, visible: bool) {
        self.cursor_visible = visible;
    }
}
