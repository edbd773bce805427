//! TOML configuration for the command-line driver.

mod loader;
mod types;

pub use loader::ConfigError;
pub use types::{
    AnimationConfig, Config, DataConfig, LoggingConfig, MaintenanceConfig, UnitsConfig,
};
