use super::vt::{OutputDecoder, TermAction};
use crate::config::ProgramSpec;
use crate::error::{Result, WmError};
use crate::event::{Event, KeyCode, KeyModifiers};
use crate::manager::scheduler::{Resume, Task, TaskContext};
use crate::state::process::Geometry;
use crate::surface::SurfaceWriter;
use log::{debug, info, warn};
use portable_pty::{native_pty_system, Child, CommandBuilder, PtyPair, PtySize};
use std::io::{Read, Write};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// A child process on a pseudo-terminal, with a reader thread filling a
/// shared output buffer
pub struct PtySession {
    pair: Option<PtyPair>,
    child: Box<dyn Child + Send + Sync>,
    writer: Box<dyn Write + Send>,
    output_buffer: Arc<Mutex<Vec<u8>>>,
    is_alive: Arc<Mutex<bool>>,
}

impl PtySession {
    pub fn spawn(spec: &ProgramSpec, rows: u16, cols: u16) -> Result<Self> {
        debug!("[PTY] spawn '{}' {:?} at {}x{}", spec.path, spec.args, cols, rows);

        let pty_system = native_pty_system();
        let pair = pty_system
            .openpty(PtySize {
                rows,
                cols,
                pixel_width: 0,
                pixel_height: 0,
            })
            .map_err(|e| WmError::Pty(format!("Failed to open PTY: {}", e)))?;

        let mut cmd = CommandBuilder::new(&spec.path);
        cmd.args(&spec.args);
        for (key, value) in &spec.env {
            cmd.env(key, value);
        }
        if let Ok(cwd) = std::env::current_dir() {
            cmd.cwd(cwd);
        }

        let child = pair.slave.spawn_command(cmd).map_err(|e| {
            WmError::Pty(format!("Failed to spawn '{}': {}", spec.path, e))
        })?;

        let reader = pair
            .master
            .try_clone_reader()
            .map_err(|e| WmError::Pty(format!("Failed to clone PTY reader: {}", e)))?;
        let writer = pair
            .master
            .take_writer()
            .map_err(|e| WmError::Pty(format!("Failed to take PTY writer: {}", e)))?;

        let output_buffer = Arc::new(Mutex::new(Vec::new()));
        let is_alive = Arc::new(Mutex::new(true));

        let buffer_clone = Arc::clone(&output_buffer);
        let alive_clone = Arc::clone(&is_alive);
        let path = spec.path.clone();
        thread::spawn(move || {
            let mut reader = reader;
            let mut buf = [0u8; 1024];

            loop {
                if let Ok(alive) = alive_clone.lock() {
                    if !*alive {
                        break;
                    }
                }

                match reader.read(&mut buf) {
                    Ok(0) => {
                        debug!("[PTY THREAD] EOF from '{}'", path);
                        break;
                    }
                    Ok(n) => {
                        if let Ok(mut buffer) = buffer_clone.lock() {
                            buffer.extend_from_slice(&buf[..n]);
                        }
                    }
                    Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(Duration::from_millis(10));
                    }
                    Err(e) => {
                        debug!("[PTY THREAD] read error from '{}': {}", path, e);
                        break;
                    }
                }
            }
        });

        info!("[PTY] '{}' running", spec.path);
        Ok(Self {
            pair: Some(pair),
            child,
            writer,
            output_buffer,
            is_alive,
        })
    }

    pub fn write(&mut self, data: &[u8]) -> Result<()> {
        self.writer.write_all(data)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Take everything the child has written so far.
    pub fn read(&self) -> Vec<u8> {
        match self.output_buffer.lock() {
            Ok(mut buffer) => std::mem::take(&mut *buffer),
            Err(_) => Vec::new(),
        }
    }

    pub fn resize(&self, rows: u16, cols: u16) -> Result<()> {
        let Some(pair) = &self.pair else {
            return Ok(());
        };
        pair.master
            .resize(PtySize {
                rows,
                cols,
                pixel_width: 0,
                pixel_height: 0,
            })
            .map_err(|e| WmError::Pty(format!("Failed to resize PTY: {}", e)))
    }

    pub fn has_exited(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(Some(_)))
    }

    pub fn close(&mut self) {
        if let Ok(mut alive) = self.is_alive.lock() {
            if !*alive {
                return;
            }
            *alive = false;
        }
        if let Err(e) = self.child.kill() {
            // Usually the child already exited
            debug!("[PTY] kill: {}", e);
        }
        let _ = self.child.wait();

        // Dropping a PtyPair crashes in ConPTY cleanup on Windows; leak it there.
        #[cfg(target_os = "windows")]
        if let Some(pair) = self.pair.take() {
            std::mem::forget(pair);
        }
    }
}

impl Drop for PtySession {
    fn drop(&mut self) {
        self.close();
    }
}

/// Bytes a terminal would send for a key press that is not plain text.
/// Plain characters arrive separately as `Char` events.
pub fn key_bytes(code: KeyCode, modifiers: KeyModifiers) -> Option<Vec<u8>> {
    let bytes: &[u8] = match code {
        KeyCode::Char(c) if modifiers.contains(KeyModifiers::CONTROL) => {
            if !c.is_ascii_alphabetic() {
                return None;
            }
            return Some(vec![(c.to_ascii_lowercase() as u8) & 0x1f]);
        }
        KeyCode::Char(c) if modifiers.contains(KeyModifiers::ALT) => {
            let mut bytes = vec![0x1b];
            bytes.extend_from_slice(c.to_string().as_bytes());
            return Some(bytes);
        }
        KeyCode::Char(_) => return None,
        KeyCode::Enter => b"\r",
        KeyCode::Backspace => b"\x7f",
        KeyCode::Tab => b"\t",
        KeyCode::BackTab => b"\x1b[Z",
        KeyCode::Esc => b"\x1b",
        KeyCode::Up => b"\x1b[A",
        KeyCode::Down => b"\x1b[B",
        KeyCode::Right => b"\x1b[C",
        KeyCode::Left => b"\x1b[D",
        KeyCode::Home => b"\x1b[H",
        KeyCode::End => b"\x1b[F",
        KeyCode::Insert => b"\x1b[2~",
        KeyCode::Delete => b"\x1b[3~",
        KeyCode::PageUp => b"\x1b[5~",
        KeyCode::PageDown => b"\x1b[6~",
        _ => return None,
    };
    Some(bytes.to_vec())
}

/// Apply decoded terminal output to a surface.
pub fn apply(out: &mut SurfaceWriter<'_>, action: &TermAction) {
    let (w, h) = out.size();
    let (w, h) = (i32::from(w), i32::from(h));
    match *action {
        TermAction::Print(c) => out.print_char(c),
        TermAction::CursorTo { x, y } => out.set_cursor(x.clamp(1, w), y.clamp(1, h)),
        TermAction::CursorBy { dx, dy } => {
            let (x, y) = out.cursor();
            out.set_cursor((x + dx).clamp(1, w), (y + dy).clamp(1, h));
        }
        TermAction::ClearScreen => out.clear(),
        TermAction::ClearToEol => {
            let (x, y) = out.cursor();
            if x <= w {
                out.write(&" ".repeat((w - x + 1) as usize));
                out.set_cursor(x, y);
            }
        }
    }
}

/// Runs a program on a PTY inside a window.
pub struct PtyTask {
    session: PtySession,
    decoder: OutputDecoder,
}

impl PtyTask {
    pub fn spawn(spec: &ProgramSpec, content: Geometry) -> Result<Self> {
        let session = PtySession::spawn(spec, content.h.max(1), content.w.max(1))?;
        Ok(Self {
            session,
            decoder: OutputDecoder::new(),
        })
    }

    fn pump(&mut self, ctx: &mut TaskContext<'_>) {
        let output = self.session.read();
        if output.is_empty() {
            return;
        }
        let actions = self.decoder.feed(&output);
        if let Some(mut out) = ctx.surface() {
            for action in &actions {
                apply(&mut out, action);
            }
        }
    }
}

impl Task for PtyTask {
    fn resume(&mut self, ctx: &mut TaskContext<'_>, event: &Event) -> Resume {
        let input = match event {
            Event::Start => {
                if let Some(mut out) = ctx.surface() {
                    out.clear();
                    out.set_cursor(1, 1);
                    out.set_cursor_blink(true);
                }
                None
            }
            Event::Char(c) => Some(c.to_string().into_bytes()),
            Event::Paste(text) => Some(text.as_bytes().to_vec()),
            Event::KeyDown {
                code, modifiers, ..
            } => key_bytes(*code, *modifiers),
            Event::Resize { width, height } => {
                if let Err(e) = self.session.resize(*height, *width) {
                    warn!("[PTY] {}", e);
                }
                None
            }
            Event::Terminate => {
                info!("[PTY] terminate requested");
                self.session.close();
                return Resume::Finished;
            }
            _ => None,
        };

        if let Some(bytes) = input {
            if let Err(e) = self.session.write(&bytes) {
                warn!("[PTY] write failed: {}", e);
                return Resume::Finished;
            }
        }

        self.pump(ctx);
        if self.session.has_exited() {
            self.pump(ctx);
            info!("[PTY] child exited");
            return Resume::Finished;
        }
        Resume::Yield(None)
    }
}
