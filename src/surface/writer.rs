// Terminal-style drawing API handed to a running task

use super::{Screen, Surface};
use ratatui::style::{Color, Style};

const TAB_WIDTH: i32 = 8;

/// Draws into one surface, writing through to the shared screen.
pub struct SurfaceWriter<'a> {
    surface: &'a mut dyn Surface,
    screen: &'a mut Screen,
}

impl<'a> SurfaceWriter<'a> {
    pub fn new(surface: &'a mut dyn Surface, screen: &'a mut Screen) -> Self {
        Self { surface, screen }
    }

    /// Content size in cells.
    pub fn size(&self) -> (u16, u16) {
        let g = self.surface.geometry();
        (g.w, g.h)
    }

    pub fn cursor(&self) -> (i32, i32) {
        self.surface.cursor()
    }

    pub fn set_cursor(&mut self, x: i32, y: i32) {
        self.surface.set_cursor(x, y);
    }

    pub fn set_cursor_blink(&mut self, blink: bool) {
        self.surface.set_cursor_visible(blink);
    }

    pub fn set_colors(&mut self, fg: Color, bg: Color) {
        self.surface.set_style(Style::default().fg(fg).bg(bg));
    }

    /// Write at the cursor without wrapping; the cursor advances.
    pub fn write(&mut self, text: &str) {
        let (x, y) = self.surface.cursor();
        self.surface.put_str(self.screen, x, y, text);
        self.surface.set_cursor(x + text.chars().count() as i32, y);
    }

    pub fn clear(&mut self) {
        self.surface.clear(self.screen);
    }

    pub fn clear_line(&mut self) {
        let (_, y) = self.surface.cursor();
        self.surface.clear_line(self.screen, y);
    }

    pub fn scroll(&mut self, lines: i32) {
        self.surface.scroll(self.screen, lines);
    }

    /// Move to the start of the next line, scrolling at the bottom.
    pub fn newline(&mut self) {
        let (_, h) = self.size();
        let (_, y) = self.surface.cursor();
        if y >= i32::from(h) {
            self.surface.scroll(self.screen, 1);
            self.surface.set_cursor(1, i32::from(h));
        } else {
            self.surface.set_cursor(1, y + 1);
        }
    }

    /// Write with wrapping and control-character handling.
    pub fn print(&mut self, text: &str) {
        for ch in text.chars() {
            self.print_char(ch);
        }
    }

    pub fn print_char(&mut self, ch: char) {
        let (w, _) = self.size();
        let (x, y) = self.surface.cursor();
        match ch {
            '\n' => self.newline(),
            '\r' => self.surface.set_cursor(1, y),
            '\x08' => self.surface.set_cursor((x - 1).max(1), y),
            '\t' => {
                let next = ((x - 1) / TAB_WIDTH + 1) * TAB_WIDTH + 1;
                self.surface.set_cursor(next.min(i32::from(w)), y);
            }
            c if c.is_control() => {}
            c => {
                if x > i32::from(w) {
                    self.newline();
                }
                let (x, y) = self.surface.cursor();
                let mut tmp = [0u8; 4];
                self.surface.put_str(self.screen, x, y, c.encode_utf8(&mut tmp));
                self.surface.set_cursor(x + 1, y);
            }
        }
    }
}
