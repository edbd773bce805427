use crate::features::app::action::AppAction;
use crate::features::app::environment::AppEnvironment;
use crate::features::app::state::{AppState, TAB_COUNT};
use crate::features::component_detail::{
    ComponentDetailAction, ComponentDetailReducer, ComponentDetailState,
};
use crate::features::garage::{GarageAction, GarageReducer};
use crate::features::mileage::{MileageAction, MileageReducer};
use crate::features::onboarding::{OnboardingAction, OnboardingReducer};
use crate::features::settings::{SettingsAction, SettingsReducer};
use crate::features::type_selection::TypeSelectionReducer;
use crate::mvi::{Combine, Effect, OptionalScope, Reducer, Scope};

type OnboardingScope = Scope<OnboardingReducer, AppState, AppAction, AppEnvironment>;
type SettingsScope = Scope<SettingsReducer, AppState, AppAction, AppEnvironment>;
type GarageScope = Scope<GarageReducer, AppState, AppAction, AppEnvironment>;
type TypeSelectionScope = Scope<TypeSelectionReducer, AppState, AppAction, AppEnvironment>;
type MileageScope = Scope<MileageReducer, AppState, AppAction, AppEnvironment>;
type ComponentDetailScope =
    OptionalScope<ComponentDetailReducer, AppState, AppAction, AppEnvironment>;

type Features = Combine<
    Combine<Combine<OnboardingScope, SettingsScope>, Combine<GarageScope, TypeSelectionScope>>,
    Combine<MileageScope, ComponentDetailScope>,
>;

/// Root reducer.
///
/// Child features run first; the root logic then sees the state they left
/// behind (e.g. the garage after a ride was recorded).
pub struct AppReducer {
    inner: Combine<Features, AppCore>,
}

impl AppReducer {
    pub fn new() -> Self {
        Self {
            inner: Combine::new(features(), AppCore),
        }
    }
}

impl Default for AppReducer {
    fn default() -> Self {
        Self::new()
    }
}

impl Reducer for AppReducer {
    type State = AppState;
    type Action = AppAction;
    type Environment = AppEnvironment;

    fn reduce(
        &self,
        state: AppState,
        action: AppAction,
        env: &AppEnvironment,
    ) -> (AppState, Effect<AppAction>) {
        self.inner.reduce(state, action, env)
    }
}

fn features() -> Features {
    let onboarding: OnboardingScope = Scope::new(
        OnboardingReducer,
        |s| &mut s.onboarding,
        |a| match a {
            AppAction::Onboarding(a) => Some(a.clone()),
            _ => None,
        },
        AppAction::Onboarding,
        |e| &e.onboarding,
    );
    let settings: SettingsScope = Scope::new(
        SettingsReducer,
        |s| &mut s.settings,
        |a| match a {
            AppAction::Settings(a) => Some(a.clone()),
            _ => None,
        },
        AppAction::Settings,
        |e| &e.settings,
    );
    let garage: GarageScope = Scope::new(
        GarageReducer,
        |s| &mut s.garage,
        |a| match a {
            AppAction::Garage(a) => Some(a.clone()),
            _ => None,
        },
        AppAction::Garage,
        |e| &e.garage,
    );
    let type_selection: TypeSelectionScope = Scope::new(
        TypeSelectionReducer,
        |s| &mut s.type_selection,
        |a| match a {
            AppAction::TypeSelection(a) => Some(a.clone()),
            _ => None,
        },
        AppAction::TypeSelection,
        |_| &(),
    );
    let mileage: MileageScope = Scope::new(
        MileageReducer,
        |s| &mut s.mileage,
        |a| match a {
            AppAction::Mileage(a) => Some(a.clone()),
            _ => None,
        },
        AppAction::Mileage,
        |e| &e.mileage,
    );
    let component_detail: ComponentDetailScope = OptionalScope::new(
        ComponentDetailReducer,
        |s| &mut s.component_detail,
        |a| match a {
            AppAction::ComponentDetail(a) => Some(a.clone()),
            _ => None,
        },
        AppAction::ComponentDetail,
        |e| &e.component_detail,
    );

    Combine::new(
        Combine::new(
            Combine::new(onboarding, settings),
            Combine::new(garage, type_selection),
        ),
        Combine::new(mileage, component_detail),
    )
}

/// Root-only logic, run after every child.
struct AppCore;

impl Reducer for AppCore {
    type State = AppState;
    type Action = AppAction;
    type Environment = AppEnvironment;

    fn reduce(
        &self,
        state: AppState,
        action: AppAction,
        _env: &AppEnvironment,
    ) -> (AppState, Effect<AppAction>) {
        let garage_changed = matches!(action, AppAction::Garage(_));
        let (mut state, effect) = coordinate(state, action);
        if garage_changed {
            refresh_component_detail(&mut state);
        }
        (state, effect)
    }
}

/// The open detail mirrors the garage's copy of its component.
fn refresh_component_detail(state: &mut AppState) {
    let Some(detail) = state.component_detail.as_mut() else {
        return;
    };
    match state.garage.component(detail.bike_id, detail.component.id) {
        Some(current) => {
            if detail.component != *current {
                detail.component = current.clone();
            }
        }
        None => {
            tracing::debug!(component = %detail.component.id, "Open component left the garage");
            state.component_detail = None;
        }
    }
}

fn coordinate(mut state: AppState, action: AppAction) -> (AppState, Effect<AppAction>) {
    match action {
        AppAction::ChangeTabIndex(index) => {
            if index < TAB_COUNT {
                state.tab_index = index;
            } else {
                tracing::debug!(index, "Ignoring out-of-range tab index");
            }
            (state, Effect::none())
        }
        AppAction::Appear => {
            let effect = Effect::concatenate([
                Effect::send(AppAction::Onboarding(OnboardingAction::Appear)),
                Effect::send(AppAction::Settings(SettingsAction::Load)),
                Effect::send(AppAction::Garage(GarageAction::Load)),
            ]);
            (state, effect)
        }
        AppAction::OpenComponent { bike, component } => {
            match state.garage.component(bike, component) {
                Some(found) => {
                    state.component_detail = Some(ComponentDetailState::new(
                        bike,
                        found.clone(),
                        state.settings.settings.service_interval_km,
                    ));
                }
                None => tracing::debug!(%bike, %component, "Cannot open unknown component"),
            }
            (state, Effect::none())
        }
        AppAction::CloseComponent => {
            state.component_detail = None;
            (state, Effect::none())
        }
        AppAction::ComponentDetail(ComponentDetailAction::LogService) => {
            let service = state
                .component_detail
                .as_ref()
                .filter(|detail| !detail.component.retired)
                .and_then(|detail| {
                    let record = detail.component.last_service()?.clone();
                    Some(GarageAction::ServiceComponent {
                        bike: detail.bike_id,
                        component: detail.component.id,
                        record,
                    })
                });
            match service {
                Some(service) => (state, Effect::send(AppAction::Garage(service))),
                None => (state, Effect::none()),
            }
        }
        AppAction::ComponentDetail(ComponentDetailAction::Retire) => {
            let Some(detail) = &state.component_detail else {
                return (state, Effect::none());
            };
            let retire = AppAction::Garage(GarageAction::RetireComponent {
                bike: detail.bike_id,
                component: detail.component.id,
            });
            (state, Effect::send(retire))
        }
        AppAction::Garage(GarageAction::RecordRide { bike, distance_km })
            if distance_km.is_finite() && distance_km > 0.0 =>
        {
            let Some(odometer) = state.garage.bike(bike).map(|b| b.odometer_km) else {
                return (state, Effect::none());
            };
            let animate = AppAction::Mileage(MileageAction::Animate {
                from: odometer - distance_km,
                to: odometer,
            });
            (state, Effect::send(animate))
        }
        AppAction::Settings(_) => {
            let interval = state.settings.settings.service_interval_km;
            if let Some(detail) = state.component_detail.as_mut() {
                detail.service_interval_km = interval;
            }
            (state, Effect::none())
        }
        _ => (state, Effect::none()),
    }
}
