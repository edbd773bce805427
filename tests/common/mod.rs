//! Shared builders for app-level tests.

#![allow(dead_code)]

use std::sync::Arc;

use gearshed::config::Config;
use gearshed::features::app::{AppEnvironment, AppRepositories};
use gearshed::ids::UuidGenerator;
use gearshed::model::{Bike, Settings};
use gearshed::mvi::TestClock;
use gearshed::persistence::{Fallback, InMemoryRepository};

/// In-memory storage handles kept by the test for later inspection.
#[derive(Clone, Default)]
pub struct Storage {
    pub settings: InMemoryRepository<Settings>,
    pub garage: InMemoryRepository<Vec<Bike>>,
    pub onboarding: InMemoryRepository<bool>,
}

impl Storage {
    pub fn repositories(&self) -> AppRepositories {
        AppRepositories {
            settings: Arc::new(self.settings.clone()),
            garage: Arc::new(self.garage.clone()),
            onboarding: Arc::new(Fallback::new(self.onboarding.clone())),
        }
    }
}

/// Four animation frames, 100ms apart.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.animation.frames = 4;
    config.animation.frame_interval_ms = 100;
    config
}

pub fn app_env(storage: &Storage, clock: &TestClock) -> AppEnvironment {
    AppEnvironment::new(
        &test_config(),
        storage.repositories(),
        Arc::new(clock.clone()),
        UuidGenerator::incrementing(),
    )
}
