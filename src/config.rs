//! `~/.sargon-vice.toml`: where the emulator is and how to play.
//!
//! Every field has a default, so an empty or missing file is valid.
//!
//! ```toml
//! [monitor]
//! host = "127.0.0.1"
//! port = 6502
//!
//! [layout]
//! screen_start = 0x1e00
//! turn_signal = "equal"
//!
//! [game]
//! colour = "white"
//! level = 2
//! poll_interval_ms = 25000
//!
//! [emulator]
//! xvic = "/usr/local/bin/xvic"
//! program = "SargonII-2000.prg"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use sargon_board::{Color, ScreenLayout};
use serde::Deserialize;

pub const CONFIG_FILE_NAME: &str = ".sargon-vice.toml";

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub monitor: MonitorConfig,
    pub layout: ScreenLayout,
    pub game: GameConfig,
    pub emulator: EmulatorConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MonitorConfig {
    pub host: String,
    /// Binary monitor port
    pub port: u16,
    /// Text monitor port
    pub text_port: u16,
    pub connect_timeout_ms: u64,
    pub io_timeout_ms: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        MonitorConfig {
            host: vice_monitor::DEFAULT_HOST.to_string(),
            port: vice_monitor::DEFAULT_BINARY_PORT,
            text_port: vice_monitor::DEFAULT_TEXT_PORT,
            connect_timeout_ms: 2000,
            io_timeout_ms: 5000,
        }
    }
}

impl MonitorConfig {
    pub fn binary_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn text_addr(&self) -> String {
        format!("{}:{}", self.host, self.text_port)
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    pub colour: Color,
    pub level: u32,
    /// Turn-window reads before giving up on the computer
    pub poll_attempts: u32,
    pub poll_interval_ms: u64,
    /// Pause after typing, for the keyboard buffer to drain
    pub settle_ms: u64,
    /// Wait for the program to reach its title screen
    pub startup_delay_ms: u64,
    /// Cursor presses that centre the board in the window
    pub shift_right: usize,
    pub shift_down: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            colour: Color::White,
            level: 2,
            poll_attempts: 10,
            poll_interval_ms: 25_000,
            settle_ms: 2000,
            startup_delay_ms: 8000,
            shift_right: 7,
            shift_down: 8,
        }
    }
}

impl GameConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EmulatorConfig {
    pub xvic: PathBuf,
    pub program: PathBuf,
    /// Passed to xvic with -config
    pub vice_config: PathBuf,
    pub stdout_log: PathBuf,
    pub stderr_log: PathBuf,
    /// Connection attempts while waiting for the monitor port
    pub ready_attempts: u32,
    pub ready_interval_ms: u64,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        EmulatorConfig {
            xvic: PathBuf::from("xvic"),
            program: PathBuf::from("SargonII-2000.prg"),
            vice_config: PathBuf::from("vice.config"),
            stdout_log: PathBuf::from("vice.out.log"),
            stderr_log: PathBuf::from("vice.err.log"),
            ready_attempts: 30,
            ready_interval_ms: 500,
        }
    }
}

impl Config {
    pub fn from_toml(text: &str) -> anyhow::Result<Config> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Config> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Config::from_toml(&text)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// `explicit` if given, else `~/.sargon-vice.toml` if present, else defaults
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Config> {
        if let Some(path) = explicit {
            return Config::from_file(path);
        }
        match home::home_dir().map(|dir| dir.join(CONFIG_FILE_NAME)) {
            Some(path) if path.exists() => {
                log::info!("using config {}", path.display());
                Config::from_file(&path)
            }
            _ => Ok(Config::default()),
        }
    }
}
