use anyhow::{Context, Result};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Period counts the timetable screens are laid out for.
pub const SUPPORTED_MAX_SLOTS: [u32; 2] = [10, 12];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("max_slot must be 10 or 12, got {0}")]
    UnsupportedMaxSlot(u32),
    #[error("slot_times has {have} periods but max_slot is {need}")]
    MissingSlotTimes { have: usize, need: u32 },
    #[error("slot {slot} ends before it starts")]
    InvertedSlotTime { slot: usize },
    #[error("unknown log level {0:?}")]
    BadLogLevel(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotTime {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl SlotTime {
    pub fn label(&self) -> String {
        format!("{}-{}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// JSON export of the schedule list from the academic-affairs backend.
    #[serde(default)]
    pub schedule_path: Option<PathBuf>,
    #[serde(default = "default_max_slot")]
    pub max_slot: u32,
    /// Week shown on startup; 0 shows all weeks merged.
    #[serde(default)]
    pub default_week: u32,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_slot_times")]
    pub slot_times: Vec<SlotTime>,
}

fn default_max_slot() -> u32 {
    12
}

fn default_log_level() -> String {
    "info".into()
}

fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap_or(NaiveTime::MIN)
}

fn default_slot_times() -> Vec<SlotTime> {
    [
        ((8, 0), (8, 45)),
        ((8, 55), (9, 40)),
        ((10, 0), (10, 45)),
        ((10, 55), (11, 40)),
        ((14, 0), (14, 45)),
        ((14, 55), (15, 40)),
        ((16, 0), (16, 45)),
        ((16, 55), (17, 40)),
        ((19, 0), (19, 45)),
        ((19, 55), (20, 40)),
        ((20, 50), (21, 35)),
        ((21, 45), (22, 30)),
    ]
    .into_iter()
    .map(|((sh, sm), (eh, em))| SlotTime {
        start: hm(sh, sm),
        end: hm(eh, em),
    })
    .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schedule_path: None,
            max_slot: default_max_slot(),
            default_week: 0,
            log_level: default_log_level(),
            slot_times: default_slot_times(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config = match Self::config_path().filter(|p| p.exists()) {
            Some(path) => {
                let contents = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config at {}", path.display()))?;
                Self::from_toml(&contents)?
            }
            None => Self::from_env()?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).with_context(|| "Failed to parse config.toml")
    }

    fn from_env() -> Result<Self> {
        let mut config = Self {
            schedule_path: std::env::var_os("TIMETABLE_SCHEDULE").map(PathBuf::from),
            ..Self::default()
        };
        if let Ok(v) = std::env::var("TIMETABLE_MAX_SLOT") {
            config.max_slot = v
                .parse()
                .with_context(|| format!("TIMETABLE_MAX_SLOT is not a number: {v}"))?;
        }
        if let Ok(v) = std::env::var("TIMETABLE_WEEK") {
            config.default_week = v
                .parse()
                .with_context(|| format!("TIMETABLE_WEEK is not a number: {v}"))?;
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !SUPPORTED_MAX_SLOTS.contains(&self.max_slot) {
            return Err(ConfigError::UnsupportedMaxSlot(self.max_slot));
        }
        if self.slot_times.len() < self.max_slot as usize {
            return Err(ConfigError::MissingSlotTimes {
                have: self.slot_times.len(),
                need: self.max_slot,
            });
        }
        if let Some(idx) = self.slot_times.iter().position(|t| t.end <= t.start) {
            return Err(ConfigError::InvertedSlotTime { slot: idx + 1 });
        }
        self.tracing_level()?;
        Ok(())
    }

    pub fn tracing_level(&self) -> Result<tracing::Level, ConfigError> {
        self.log_level
            .parse()
            .map_err(|_| ConfigError::BadLogLevel(self.log_level.clone()))
    }

    pub fn slot_time(&self, slot: u32) -> Option<&SlotTime> {
        slot.checked_sub(1)
            .and_then(|idx| self.slot_times.get(idx as usize))
    }

    pub fn generate_default() -> Result<PathBuf> {
        let path = Self::config_path()
            .with_context(|| "Could not determine config directory")?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let default = Config {
            schedule_path: Some(PathBuf::from("schedule.json")),
            ..Config::default()
        };

        let toml_str = toml::to_string_pretty(&default)?;
        std::fs::write(&path, toml_str)?;
        Ok(path)
    }

    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("timetable-tui").join("config.toml"))
    }
}
