use crate::app::Surface;
use crate::error::ConfigError;
use crate::session::SessionSettings;
use clap::Parser;
use serde::Deserialize;
use std::{
    fs, io,
    path::{Path, PathBuf},
};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Clone, Debug)]
#[command(author, version, about = "🍅 pomo - A Pomodoro timer with an overlay view and a short task list")]
pub struct Args {
    /// Focus interval in minutes
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=60))]
    pub focus: Option<u32>,
    /// Short break in minutes
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=60))]
    pub short_break: Option<u32>,
    /// Long break in minutes
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=60))]
    pub long_break: Option<u32>,
    /// Focus cycles before a long break
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(2..=10))]
    pub cycles: Option<u32>,
    #[arg(short = 't', long)]
    pub theme: Option<String>,
    /// View to open with
    #[arg(long, value_enum)]
    pub surface: Option<Surface>,
    #[arg(long)]
    pub no_sound: bool,
    #[arg(long)]
    pub no_notify: bool,
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

// ============================================================================
// Config file
// ============================================================================

/// Start-up configuration. Read once, never written back.
#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Config {
    #[serde(flatten)]
    pub settings: SessionSettings,
    pub theme: String,
    pub surface: Surface,
    pub sound_enabled: bool,
    pub notifications_enabled: bool,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            settings: SessionSettings::default(),
            theme: "default".into(),
            surface: Surface::Main,
            sound_enabled: true,
            notifications_enabled: true,
            log_level: "info".into(),
            log_file: None,
        }
    }
}

impl Config {
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let path = args.config.clone().unwrap_or_else(default_config_path);
        let mut config = Self::from_file(&path)?;
        config.apply_args(args);
        config.settings.validate()?;
        Ok(config)
    }

    /// A missing file yields the defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(raw) => serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    fn apply_args(&mut self, args: &Args) {
        if let Some(f) = args.focus { self.settings.focus_minutes = f; }
        if let Some(s) = args.short_break { self.settings.short_break_minutes = s; }
        if let Some(l) = args.long_break { self.settings.long_break_minutes = l; }
        if let Some(c) = args.cycles { self.settings.long_break_after_cycles = c; }
        if let Some(t) = &args.theme { self.theme = t.clone(); }
        if let Some(s) = args.surface { self.surface = s; }
        if args.no_sound { self.sound_enabled = false; }
        if args.no_notify { self.notifications_enabled = false; }
        if let Some(p) = &args.log_file { self.log_file = Some(p.clone()); }
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("pomo-overlay.log"))
    }
}

fn default_config_path() -> PathBuf {
    PathBuf::from(".").join("pomo-overlay").join("config.json")
}
