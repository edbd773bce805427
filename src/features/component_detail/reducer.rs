use crate::features::component_detail::action::ComponentDetailAction;
use crate::features::component_detail::state::ComponentDetailState;
use crate::features::component_detail::ComponentDetailEnvironment;
use crate::model::MaintenanceRecord;
use crate::mvi::{unix_seconds, Effect, Reducer};

pub struct ComponentDetailReducer;

impl Reducer for ComponentDetailReducer {
    type State = ComponentDetailState;
    type Action = ComponentDetailAction;
    type Environment = ComponentDetailEnvironment;

    fn reduce(
        &self,
        mut state: Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> (Self::State, Effect<Self::Action>) {
        match action {
            ComponentDetailAction::SetNote(note) => state.note = note,
            ComponentDetailAction::LogService => {
                if state.component.retired {
                    tracing::debug!(component = %state.component.id, "Retired component, not logging service");
                    return (state, Effect::none());
                }
                let record = MaintenanceRecord {
                    id: env.uuid.generate(),
                    performed_at: unix_seconds(env.clock.now()),
                    distance_km: state.component.distance_km,
                    note: std::mem::take(&mut state.note).trim().to_string(),
                };
                state.component.history.push(record);
                state.component.distance_since_service_km = 0.0;
            }
            ComponentDetailAction::Retire => state.component.retired = true,
            ComponentDetailAction::ToggleHistory => state.show_history = !state.show_history,
        }
        (state, Effect::none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::UuidGenerator;
    use crate::model::{Component, ComponentType};
    use crate::mvi::{TestClock, TestStore};
    use std::sync::Arc;
    use std::time::Duration;
    use uuid::Uuid;

    fn store() -> TestStore<ComponentDetailReducer> {
        let clock = TestClock::new();
        let mut chain = Component::new(Uuid::from_u128(7), ComponentType::Chain, "KMC X11", 0);
        chain.distance_km = 2100.0;
        chain.distance_since_service_km = 1600.0;
        let env = ComponentDetailEnvironment {
            clock: Arc::new(clock.clone()),
            uuid: UuidGenerator::incrementing(),
        };
        TestStore::with_clock(
            ComponentDetailState::new(Uuid::from_u128(1), chain, 1500),
            ComponentDetailReducer,
            env,
            clock,
        )
    }

    #[test]
    fn log_service_stamps_record_from_environment() {
        let mut store = store();
        assert!(store.state().service_due());
        store.clock().advance(Duration::from_secs(60));

        store.send(ComponentDetailAction::SetNote(" new chain ".into()), |s| {
            s.note = " new chain ".into();
        });
        store.send(ComponentDetailAction::LogService, |s| {
            s.note.clear();
            s.component.distance_since_service_km = 0.0;
            s.component.history.push(MaintenanceRecord {
                id: Uuid::from_u128(1),
                performed_at: 1_704_067_260,
                distance_km: 2100.0,
                note: "new chain".into(),
            });
        });
        assert!(!store.state().service_due());
        store.finish();
    }

    #[test]
    fn retired_components_take_no_service() {
        let mut store = store();
        store.send(ComponentDetailAction::Retire, |s| s.component.retired = true);
        store.send(ComponentDetailAction::LogService, |_| {});
        store.send(ComponentDetailAction::ToggleHistory, |s| s.show_history = true);
        store.finish();
    }
}
