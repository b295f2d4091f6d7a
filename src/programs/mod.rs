// Programs that run inside windows

pub mod exit_prompt;
pub mod pty;
pub mod vt;
