use crate::features::component_detail::ComponentDetailState;
use crate::features::garage::GarageState;
use crate::features::mileage::MileageState;
use crate::features::onboarding::OnboardingState;
use crate::features::settings::SettingsState;
use crate::features::type_selection::TypeSelectionState;
use crate::mvi::State;

/// Garage, maintenance and settings.
pub const TAB_COUNT: usize = 3;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub tab_index: usize,
    pub onboarding: OnboardingState,
    pub settings: SettingsState,
    pub garage: GarageState,
    pub type_selection: TypeSelectionState,
    pub mileage: MileageState,
    /// Present while a component is open.
    pub component_detail: Option<ComponentDetailState>,
}

impl State for AppState {}
