// Runtime configuration, loaded from JSON with built-in defaults

use crate::error::Result;
use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "CELLWM_CONFIG";
/// Config file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "cellwm.json";

/// What happens when a task finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishPolicy {
    /// Always end the process outright.
    Terminate,
    /// A task that exits during its very first resume is replaced by a
    /// "press any key" prompt so the exit does not go unnoticed.
    Hold,
}

/// Modifier that must be held for the focus-cycle binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modifier {
    Control,
    Alt,
    Shift,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub background: Color,
    pub focused_title_fg: Color,
    pub focused_title_bg: Color,
    pub unfocused_title_fg: Color,
    pub unfocused_title_bg: Color,
    pub shadow: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Color::Cyan,
            focused_title_fg: Color::White,
            focused_title_bg: Color::Yellow,
            unfocused_title_fg: Color::Black,
            unfocused_title_bg: Color::Gray,
            shadow: Color::DarkGray,
        }
    }
}

/// A program to launch, either at startup or from the desktop launcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramSpec {
    pub path: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub env: HashMap<String, String>,
    #[serde(default)]
    pub title: Option<String>,
}

impl ProgramSpec {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            args: Vec::new(),
            env: HashMap::new(),
            title: None,
        }
    }

    /// The user's shell, falling back to a platform default.
    pub fn default_shell() -> Self {
        #[cfg(target_os = "windows")]
        let shell = "powershell.exe".to_string();

        #[cfg(not(target_os = "windows"))]
        let shell = std::env::var("SHELL").unwrap_or_else(|_| "bash".to_string());

        Self::new(shell)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Interval between timer broadcasts when no input arrives.
    pub tick_ms: u64,
    pub finish_policy: FinishPolicy,
    pub shadows: bool,
    pub theme: Theme,
    pub cycle_modifier: Modifier,
    pub cycle_key: char,
    pub log_file: Option<PathBuf>,
    pub log_level: log::LevelFilter,
    pub launcher: Option<ProgramSpec>,
    pub autostart: Vec<ProgramSpec>,
    /// Leave the main loop once the last process has exited.
    pub quit_when_empty: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_ms: 50,
            finish_policy: FinishPolicy::Terminate,
            shadows: false,
            theme: Theme::default(),
            cycle_modifier: Modifier::Alt,
            cycle_key: 'n',
            log_file: Some(PathBuf::from("cellwm.log")),
            log_level: log::LevelFilter::Info,
            launcher: Some(ProgramSpec::default_shell()),
            autostart: Vec::new(),
            quit_when_empty: false,
        }
    }
}

impl Config {
    /// Load from `CELLWM_CONFIG`, then `./cellwm.json`, then defaults.
    pub fn load() -> Result<Self> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Self::from_file(Path::new(&path));
        }
        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.exists() {
            return Self::from_file(local);
        }
        Ok(Self::default())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Programs to launch at startup; a shell when none are configured.
    pub fn startup_programs(&self) -> Vec<ProgramSpec> {
        if self.autostart.is_empty() {
            vec![ProgramSpec::default_shell()]
        } else {
            self.autostart.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_uses_defaults() {
        let config = Config::from_json("{}").unwrap();
        assert_eq!(config.tick_ms, 50);
        assert_eq!(config.finish_policy, FinishPolicy::Terminate);
        assert_eq!(config.cycle_modifier, Modifier::Alt);
        assert!(!config.shadows);
    }

    #[test]
    fn test_partial_override() {
        let config = Config::from_json(
            r#"{
                "finish_policy": "hold",
                "shadows": true,
                "theme": { "background": "Blue" },
                "autostart": [{ "path": "top", "args": ["-d", "1"] }]
            }"#,
        )
        .unwrap();

        assert_eq!(config.finish_policy, FinishPolicy::Hold);
        assert!(config.shadows);
        assert_eq!(config.theme.background, Color::Blue);
        // Unspecified theme fields keep their defaults
        assert_eq!(config.theme.shadow, Color::DarkGray);
        let programs = config.startup_programs();
        assert_eq!(programs.len(), 1);
        assert_eq!(programs[0].path, "top");
        assert_eq!(programs[0].args, vec!["-d", "1"]);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(Config::from_json("{ not json").is_err());
    }

    #[test]
    fn test_startup_falls_back_to_shell() {
        let config = Config::default();
        assert_eq!(config.startup_programs().len(), 1);
    }
}
