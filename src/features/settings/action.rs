use crate::model::{DistanceUnit, Settings};
use crate::mvi::Action;
use crate::persistence::PersistenceError;

#[derive(Debug, Clone, PartialEq)]
pub enum SettingsAction {
    Load,
    Loaded(Result<Option<Settings>, PersistenceError>),
    SetDistanceUnit(DistanceUnit),
    SetServiceInterval(u32),
    Save,
    /// Carries the settings that were written.
    Saved(Result<Settings, PersistenceError>),
    DismissError,
}

impl Action for SettingsAction {}
