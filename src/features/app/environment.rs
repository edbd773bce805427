use std::path::Path;
use std::sync::Arc;

use crate::config::Config;
use crate::features::component_detail::ComponentDetailEnvironment;
use crate::features::garage::{GarageEnvironment, GarageRepository};
use crate::features::mileage::MileageEnvironment;
use crate::features::onboarding::{OnboardingEnvironment, OnboardingFlag};
use crate::features::settings::{SettingsEnvironment, SettingsRepository};
use crate::ids::UuidGenerator;
use crate::model::Settings;
use crate::mvi::{Clock, SystemClock};
use crate::persistence::{Fallback, JsonRepository};

pub const SETTINGS_FILE: &str = "settings.json";
pub const GARAGE_FILE: &str = "garage.json";
pub const ONBOARDING_FILE: &str = "onboarding.json";

/// Storage used by the features.
pub struct AppRepositories {
    pub settings: SettingsRepository,
    pub garage: GarageRepository,
    pub onboarding: OnboardingFlag,
}

impl AppRepositories {
    /// JSON documents under `dir`.
    pub fn json(dir: &Path) -> Self {
        Self {
            settings: Arc::new(JsonRepository::new(dir.join(SETTINGS_FILE))),
            garage: Arc::new(JsonRepository::new(dir.join(GARAGE_FILE))),
            onboarding: Arc::new(Fallback::new(JsonRepository::<bool>::new(
                dir.join(ONBOARDING_FILE),
            ))),
        }
    }
}

/// Every collaborator of the app, split per feature.
pub struct AppEnvironment {
    pub onboarding: OnboardingEnvironment,
    pub settings: SettingsEnvironment,
    pub garage: GarageEnvironment,
    pub mileage: MileageEnvironment,
    pub component_detail: ComponentDetailEnvironment,
}

impl AppEnvironment {
    pub fn new(
        config: &Config,
        repositories: AppRepositories,
        clock: Arc<dyn Clock>,
        uuid: UuidGenerator,
    ) -> Self {
        let defaults = Settings {
            distance_unit: config.units.distance,
            service_interval_km: config.maintenance.service_interval_km,
        };
        Self {
            onboarding: OnboardingEnvironment {
                flag: repositories.onboarding,
            },
            settings: SettingsEnvironment {
                repository: repositories.settings,
                defaults,
            },
            garage: GarageEnvironment {
                repository: repositories.garage,
                clock: Arc::clone(&clock),
                uuid: uuid.clone(),
            },
            mileage: MileageEnvironment::from(&config.animation),
            component_detail: ComponentDetailEnvironment { clock, uuid },
        }
    }

    /// Files in the configured data directory, wall clock, random ids.
    pub fn live(config: &Config) -> Self {
        Self::new(
            config,
            AppRepositories::json(&config.data_dir()),
            Arc::new(SystemClock),
            UuidGenerator::live(),
        )
    }
}
