// Log output goes to a file: the terminal belongs to the compositor.

use crate::error::Result;
use env_logger::{Builder, Target, WriteStyle};
use log::LevelFilter;
use std::fs::{File, OpenOptions};
use std::path::Path;

/// An `env_logger` builder that appends plain lines to `file`.
pub fn builder(file: File, level: LevelFilter) -> Builder {
    let mut builder = Builder::new();
    builder
        .target(Target::Pipe(Box::new(file)))
        .write_style(WriteStyle::Never)
        .format_timestamp_millis()
        .filter_level(level);
    builder
}

/// Install the file logger. Without a path logging is switched off. A
/// second install keeps the first logger.
pub fn init(path: Option<&Path>, level: LevelFilter) -> Result<()> {
    let Some(path) = path else {
        log::set_max_level(LevelFilter::Off);
        return Ok(());
    };

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    if builder(file, level).try_init().is_err() {
        log::debug!("[LOG] logger already installed");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::{Level, Log, Record};

    #[test]
    fn test_file_logger_writes_and_filters() {
        let path = std::env::temp_dir().join(format!("cellwm-log-{}.log", uuid::Uuid::new_v4()));
        let file = File::create(&path).unwrap();
        let logger = builder(file, LevelFilter::Info).build();
        assert_eq!(logger.filter(), LevelFilter::Info);

        logger.log(
            &Record::builder()
                .level(Level::Info)
                .target("cellwm")
                .args(format_args!("[TEST] window opened"))
                .build(),
        );
        logger.log(
            &Record::builder()
                .level(Level::Debug)
                .target("cellwm")
                .args(format_args!("[TEST] too chatty"))
                .build(),
        );
        logger.flush();

        let text = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert!(text.contains("[TEST] window opened"));
        assert!(!text.contains("too chatty"));
    }
}
