use crate::model::Settings;
use crate::mvi::State;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SettingsStatus {
    #[default]
    Idle,
    Loading,
    Saving,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsState {
    pub settings: Settings,
    pub status: SettingsStatus,
    /// Edited since the last successful load or save.
    pub dirty: bool,
    pub error: Option<String>,
}

impl State for SettingsState {}
