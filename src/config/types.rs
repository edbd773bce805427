use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::model::DistanceUnit;

/// Root configuration container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub units: UnitsConfig,
    #[serde(default)]
    pub maintenance: MaintenanceConfig,
    #[serde(default)]
    pub animation: AnimationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

/// Where persisted JSON documents live.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    /// Defaults to `dirs::data_dir()/gearshed`.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnitsConfig {
    /// Initial distance unit before any settings are saved.
    #[serde(default)]
    pub distance: DistanceUnit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceConfig {
    #[serde(default = "default_service_interval_km")]
    pub service_interval_km: u32,
}

/// Odometer animation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationConfig {
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,
    #[serde(default = "default_frames")]
    pub frames: u32,
}

fn default_log_filter() -> String {
    "info".to_string()
}

fn default_service_interval_km() -> u32 {
    1500
}

fn default_frame_interval_ms() -> u64 {
    16
}

fn default_frames() -> u32 {
    30
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            service_interval_km: default_service_interval_km(),
        }
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: default_frame_interval_ms(),
            frames: default_frames(),
        }
    }
}

impl AnimationConfig {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}

impl Config {
    /// Directory holding `settings.json`, `garage.json` and
    /// `onboarding.json`.
    pub fn data_dir(&self) -> PathBuf {
        match &self.data.dir {
            Some(dir) => dir.clone(),
            None => dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("gearshed"),
        }
    }
}
