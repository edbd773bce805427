use crate::mvi::Action;

#[derive(Debug, Clone, PartialEq)]
pub enum OnboardingAction {
    Appear,
    /// Stored completion flag, `false` when nothing was stored.
    Loaded(bool),
    Next,
    Back,
    Skip,
    Complete,
}

impl Action for OnboardingAction {}
