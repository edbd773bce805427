use crate::mvi::State;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OnboardingPage {
    #[default]
    Welcome,
    Bikes,
    Components,
    Maintenance,
}

impl OnboardingPage {
    pub const ALL: [OnboardingPage; 4] = [
        OnboardingPage::Welcome,
        OnboardingPage::Bikes,
        OnboardingPage::Components,
        OnboardingPage::Maintenance,
    ];

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|p| *p == self).unwrap_or(0)
    }

    pub fn next(self) -> Option<Self> {
        Self::ALL.get(self.index() + 1).copied()
    }

    pub fn previous(self) -> Option<Self> {
        self.index().checked_sub(1).map(|i| Self::ALL[i])
    }

    pub fn title(self) -> &'static str {
        match self {
            OnboardingPage::Welcome => "Welcome to gearshed",
            OnboardingPage::Bikes => "Add your bikes",
            OnboardingPage::Components => "Track every component",
            OnboardingPage::Maintenance => "Service on time",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OnboardingState {
    pub page: OnboardingPage,
    pub completed: bool,
    /// Whether the stored flag has been read.
    pub loaded: bool,
}

impl State for OnboardingState {}
