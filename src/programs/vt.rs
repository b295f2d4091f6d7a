// Minimal terminal-output decoder: text and a handful of cursor and erase
// sequences. Everything else is swallowed.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TermAction {
    /// A printable character or one of `\n`, `\r`, `\x08`, `\t`.
    Print(char),
    CursorTo { x: i32, y: i32 },
    CursorBy { dx: i32, dy: i32 },
    ClearScreen,
    ClearToEol,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Ground,
    Escape,
    Csi,
    Osc,
    OscEscape,
}

pub struct OutputDecoder {
    state: State,
    params: String,
    /// Bytes of a UTF-8 sequence split across reads.
    pending: Vec<u8>,
}

impl OutputDecoder {
    pub fn new() -> Self {
        Self {
            state: State::Ground,
            params: String::new(),
            pending: Vec::new(),
        }
    }

    pub fn feed(&mut self, bytes: &[u8]) -> Vec<TermAction> {
        self.pending.extend_from_slice(bytes);
        let ready = match std::str::from_utf8(&self.pending) {
            // An incomplete tail is kept for the next read
            Err(e) if e.error_len().is_none() => e.valid_up_to(),
            _ => self.pending.len(),
        };
        let chunk: Vec<u8> = self.pending.drain(..ready).collect();

        let mut actions = Vec::new();
        for ch in String::from_utf8_lossy(&chunk).chars() {
            self.step(ch, &mut actions);
        }
        actions
    }

    fn step(&mut self, ch: char, out: &mut Vec<TermAction>) {
        match self.state {
            State::Ground => match ch {
                '\x1b' => self.state = State::Escape,
                '\n' | '\r' | '\x08' | '\t' => out.push(TermAction::Print(ch)),
                c if c.is_control() => {}
                c => out.push(TermAction::Print(c)),
            },
            State::Escape => match ch {
                '[' => {
                    self.params.clear();
                    self.state = State::Csi;
                }
                ']' => self.state = State::Osc,
                _ => self.state = State::Ground,
            },
            State::Csi => {
                if ('\x40'..='\x7e').contains(&ch) {
                    if let Some(action) = self.csi(ch) {
                        out.push(action);
                    }
                    self.state = State::Ground;
                } else {
                    self.params.push(ch);
                }
            }
            State::Osc => match ch {
                '\x07' => self.state = State::Ground,
                '\x1b' => self.state = State::OscEscape,
                _ => {}
            },
            State::OscEscape => self.state = State::Ground,
        }
    }

    fn param(&self, index: usize, default: i32) -> i32 {
        self.params
            .trim_start_matches('?')
            .split(';')
            .nth(index)
            .and_then(|p| p.parse().ok())
            .filter(|&n: &i32| n != 0)
            .unwrap_or(default)
    }

    fn csi(&self, final_byte: char) -> Option<TermAction> {
        let n = self.param(0, 1);
        match final_byte {
            'A' => Some(TermAction::CursorBy { dx: 0, dy: -n }),
            'B' => Some(TermAction::CursorBy { dx: 0, dy: n }),
            'C' => Some(TermAction::CursorBy { dx: n, dy: 0 }),
            'D' => Some(TermAction::CursorBy { dx: -n, dy: 0 }),
            'H' | 'f' => Some(TermAction::CursorTo {
                x: self.param(1, 1),
                y: self.param(0, 1),
            }),
            'J' if self.params == "2" || self.params == "3" => Some(TermAction::ClearScreen),
            'K' if self.params.is_empty() || self.params == "0" => Some(TermAction::ClearToEol),
            _ => None,
        }
    }
}

impl Default for OutputDecoder {
    fn default() -> Self {
        Self::new()
    }
}
