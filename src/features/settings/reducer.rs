use crate::features::settings::action::SettingsAction;
use crate::features::settings::state::{SettingsState, SettingsStatus};
use crate::features::settings::SettingsEnvironment;
use crate::mvi::{Effect, EffectId, Reducer};

pub const SETTINGS_SAVE_ID: EffectId = EffectId::new("settings-save");

pub struct SettingsReducer;

impl Reducer for SettingsReducer {
    type State = SettingsState;
    type Action = SettingsAction;
    type Environment = SettingsEnvironment;

    fn reduce(
        &self,
        mut state: Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> (Self::State, Effect<Self::Action>) {
        match action {
            SettingsAction::Load => {
                state.status = SettingsStatus::Loading;
                let effect = Effect::from_result(env.repository.load(), SettingsAction::Loaded);
                (state, effect)
            }
            SettingsAction::Loaded(result) => {
                state.status = SettingsStatus::Idle;
                state.dirty = false;
                match result {
                    Ok(Some(settings)) => state.settings = settings,
                    Ok(None) => state.settings = env.defaults.clone(),
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to load settings");
                        state.settings = env.defaults.clone();
                        state.error = Some(e.to_string());
                    }
                }
                (state, Effect::none())
            }
            SettingsAction::SetDistanceUnit(unit) => {
                if state.settings.distance_unit != unit {
                    state.settings.distance_unit = unit;
                    state.dirty = true;
                }
                (state, Effect::none())
            }
            SettingsAction::SetServiceInterval(0) => {
                state.error = Some("Service interval must be positive".to_string());
                (state, Effect::none())
            }
            SettingsAction::SetServiceInterval(km) => {
                if state.settings.service_interval_km != km {
                    state.settings.service_interval_km = km;
                    state.dirty = true;
                }
                (state, Effect::none())
            }
            SettingsAction::Save => {
                if !state.dirty {
                    return (state, Effect::none());
                }
                state.status = SettingsStatus::Saving;
                let snapshot = state.settings.clone();
                let save = env.repository.save(snapshot.clone());
                let effect = Effect::from_result(
                    async move { save.await.map(|()| snapshot) },
                    SettingsAction::Saved,
                )
                .cancellable_in_flight(SETTINGS_SAVE_ID);
                (state, effect)
            }
            SettingsAction::Saved(Ok(saved)) => {
                state.status = SettingsStatus::Idle;
                // Edits made while the save was running stay dirty.
                state.dirty = state.settings != saved;
                (state, Effect::none())
            }
            SettingsAction::Saved(Err(e)) => {
                tracing::warn!(error = %e, "Failed to save settings");
                state.status = SettingsStatus::Idle;
                state.error = Some(e.to_string());
                (state, Effect::none())
            }
            SettingsAction::DismissError => {
                state.error = None;
                (state, Effect::none())
            }
        }
    }
}
