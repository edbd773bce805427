use crate::mvi::Action;

#[derive(Debug, Clone, PartialEq)]
pub enum ComponentDetailAction {
    SetNote(String),
    /// Record a service now, using the current note.
    LogService,
    Retire,
    ToggleHistory,
}

impl Action for ComponentDetailAction {}
