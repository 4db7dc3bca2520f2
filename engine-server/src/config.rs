use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Parser};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser, Debug, Clone, Serialize, Deserialize)]
#[command(name = "uttt-server")]
#[command(about = "Ultimate Tic-Tac-Toe room server")]
#[command(long_about = "Room server for networked Ultimate Tic-Tac-Toe.

Clients connect over TCP and exchange newline-delimited JSON messages to
create rooms, join them and play moves. The server owns every game state
and validates each move before broadcasting it.")]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "UTTT_SERVER_ADDR", default_value = "0.0.0.0:3000")]
    pub bind_addr: String,

    /// Create unknown rooms on join instead of rejecting the join
    #[arg(long, env = "UTTT_AUTO_CREATE_ROOMS", default_value = "true", action = ArgAction::Set)]
    pub auto_create_rooms: bool,

    /// Longest accepted message line in bytes
    #[arg(long, env = "UTTT_MAX_LINE_BYTES", default_value = "4096")]
    pub max_line_bytes: usize,

    /// Interval between room statistics log lines in seconds (0 disables)
    #[arg(long, env = "UTTT_STATS_INTERVAL", default_value = "60")]
    pub stats_interval_secs: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "UTTT_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Optional TOML file whose keys override the values above
    #[arg(long, env = "UTTT_CONFIG")]
    #[serde(skip)]
    pub config: Option<PathBuf>,
}

/// Keys accepted in the TOML config file.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub bind_addr: Option<String>,
    pub auto_create_rooms: Option<bool>,
    pub max_line_bytes: Option<usize>,
    pub stats_interval_secs: Option<u64>,
    pub log_level: Option<String>,
}

impl FileConfig {
    pub fn from_toml(source: &str) -> Result<Self> {
        toml::from_str(source).context("invalid config file")
    }

    pub fn read(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml(&source)
    }
}

impl Config {
    /// Parse the command line, then apply the config file if one is named.
    pub fn load() -> Result<Self> {
        let mut config = Config::parse();
        if let Some(path) = config.config.clone() {
            config.apply(FileConfig::read(&path)?);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn apply(&mut self, file: FileConfig) {
        if let Some(bind_addr) = file.bind_addr {
            self.bind_addr = bind_addr;
        }
        if let Some(auto_create_rooms) = file.auto_create_rooms {
            self.auto_create_rooms = auto_create_rooms;
        }
        if let Some(max_line_bytes) = file.max_line_bytes {
            self.max_line_bytes = max_line_bytes;
        }
        if let Some(stats_interval_secs) = file.stats_interval_secs {
            self.stats_interval_secs = stats_interval_secs;
        }
        if let Some(log_level) = file.log_level {
            self.log_level = log_level;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.bind_addr.is_empty() {
            return Err(anyhow!("bind_addr cannot be empty"));
        }

        if self.max_line_bytes == 0 {
            return Err(anyhow!("max_line_bytes must be greater than 0"));
        }

        if self.log_level.is_empty() {
            return Err(anyhow!("log_level cannot be empty"));
        }

        Ok(())
    }

    pub fn stats_interval(&self) -> Option<Duration> {
        (self.stats_interval_secs > 0).then(|| Duration::from_secs(self.stats_interval_secs))
    }
}
