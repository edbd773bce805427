//! Distance unit and service interval preferences.

mod action;
mod reducer;
mod state;

use std::sync::Arc;

use crate::model::Settings;
use crate::persistence::{PersistenceError, Repository};

pub use action::SettingsAction;
pub use reducer::{SettingsReducer, SETTINGS_SAVE_ID};
pub use state::{SettingsState, SettingsStatus};

pub type SettingsRepository = Arc<dyn Repository<Settings, Error = PersistenceError>>;

pub struct SettingsEnvironment {
    pub repository: SettingsRepository,
    /// Used until settings have been saved once.
    pub defaults: Settings,
}
