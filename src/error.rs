use thiserror::Error;

/// Errors surfaced by the window manager and its programs.
#[derive(Debug, Error)]
pub enum WmError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Config(#[from] serde_json::Error),

    #[error("PTY error: {0}")]
    Pty(String),

    #[error("Failed to create task for '{title}': {reason}")]
    TaskCreation { title: String, reason: String },

    #[error("Process {0} not found")]
    NoSuchProcess(usize),
}

pub type Result<T> = std::result::Result<T, WmError>;
