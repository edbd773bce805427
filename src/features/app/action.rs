use uuid::Uuid;

use crate::features::component_detail::ComponentDetailAction;
use crate::features::garage::GarageAction;
use crate::features::mileage::MileageAction;
use crate::features::onboarding::OnboardingAction;
use crate::features::settings::SettingsAction;
use crate::features::type_selection::TypeSelectionAction;
use crate::mvi::Action;

#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    ChangeTabIndex(usize),
    /// Load everything persisted.
    Appear,
    OpenComponent {
        bike: Uuid,
        component: Uuid,
    },
    CloseComponent,
    Onboarding(OnboardingAction),
    Settings(SettingsAction),
    Garage(GarageAction),
    TypeSelection(TypeSelectionAction),
    Mileage(MileageAction),
    ComponentDetail(ComponentDetailAction),
}

impl Action for AppAction {}
