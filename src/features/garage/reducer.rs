use uuid::Uuid;

use crate::features::garage::action::GarageAction;
use crate::features::garage::state::GarageState;
use crate::features::garage::GarageEnvironment;
use crate::model::{Bike, Component};
use crate::mvi::{unix_seconds, Effect, EffectId, Reducer};

pub const GARAGE_SAVE_ID: EffectId = EffectId::new("garage-save");

pub struct GarageReducer;

impl Reducer for GarageReducer {
    type State = GarageState;
    type Action = GarageAction;
    type Environment = GarageEnvironment;

    fn reduce(
        &self,
        mut state: Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> (Self::State, Effect<Self::Action>) {
        match action {
            GarageAction::Load => {
                let effect = Effect::from_result(env.repository.load(), GarageAction::Loaded);
                (state, effect)
            }
            GarageAction::Loaded(result) => {
                state.loaded = true;
                match result {
                    Ok(bikes) => state.bikes = bikes.unwrap_or_default(),
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to load garage");
                        state.error = Some(e.to_string());
                    }
                }
                (state, Effect::none())
            }
            GarageAction::AddBike { name } => {
                let name = name.trim();
                if name.is_empty() {
                    state.error = Some("Bike name must not be empty".to_string());
                    return (state, Effect::none());
                }
                let bike = Bike::new(env.uuid.generate(), name, unix_seconds(env.clock.now()));
                tracing::debug!(id = %bike.id, name = %bike.name, "Adding bike");
                state.bikes.push(bike);
                persist(state, env)
            }
            GarageAction::RemoveBike(id) => {
                let before = state.bikes.len();
                state.bikes.retain(|b| b.id != id);
                if state.bikes.len() == before {
                    return (state, Effect::none());
                }
                persist(state, env)
            }
            GarageAction::RecordRide { bike, distance_km } => {
                if !distance_km.is_finite() || distance_km <= 0.0 {
                    state.error = Some(format!("Invalid ride distance: {distance_km}"));
                    return (state, Effect::none());
                }
                let Some(target) = state.bike_mut(bike) else {
                    state.error = Some(unknown_bike(bike));
                    return (state, Effect::none());
                };
                target.record_ride(distance_km);
                persist(state, env)
            }
            GarageAction::AddComponent { bike, kind, name } => {
                let id = env.uuid.generate();
                let installed_at = unix_seconds(env.clock.now());
                let Some(target) = state.bike_mut(bike) else {
                    state.error = Some(unknown_bike(bike));
                    return (state, Effect::none());
                };
                let name = match name.trim() {
                    "" => kind.label().to_string(),
                    trimmed => trimmed.to_string(),
                };
                target
                    .components
                    .push(Component::new(id, kind, name, installed_at));
                persist(state, env)
            }
            GarageAction::ServiceComponent {
                bike,
                component,
                mut record,
            } => {
                let Some(target) = state.component_mut(bike, component) else {
                    tracing::debug!(%bike, %component, "Component no longer in garage");
                    return (state, Effect::none());
                };
                if target.retired {
                    return (state, Effect::none());
                }
                record.distance_km = target.distance_km;
                target.history.push(record);
                target.distance_since_service_km = 0.0;
                persist(state, env)
            }
            GarageAction::RetireComponent { bike, component } => {
                match state.component_mut(bike, component) {
                    Some(target) if !target.retired => {
                        target.retired = true;
                        persist(state, env)
                    }
                    Some(_) => (state, Effect::none()),
                    None => {
                        tracing::debug!(%bike, %component, "Component no longer in garage");
                        (state, Effect::none())
                    }
                }
            }
            GarageAction::Saved(Ok(())) => (state, Effect::none()),
            GarageAction::Saved(Err(e)) => {
                tracing::warn!(error = %e, "Failed to save garage");
                state.error = Some(e.to_string());
                (state, Effect::none())
            }
            GarageAction::DismissError => {
                state.error = None;
                (state, Effect::none())
            }
        }
    }
}

fn persist(state: GarageState, env: &GarageEnvironment) -> (GarageState, Effect<GarageAction>) {
    let effect = Effect::from_result(env.repository.save(state.bikes.clone()), GarageAction::Saved)
        .cancellable_in_flight(GARAGE_SAVE_ID);
    (state, effect)
}

fn unknown_bike(id: Uuid) -> String {
    format!("No bike with id {id}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::UuidGenerator;
    use crate::model::{ComponentType, MaintenanceRecord};
    use crate::mvi::{TestClock, TestStore};
    use crate::persistence::InMemoryRepository;
    use std::sync::Arc;

    fn env(repository: InMemoryRepository<Vec<Bike>>, clock: TestClock) -> GarageEnvironment {
        GarageEnvironment {
            repository: Arc::new(repository),
            clock: Arc::new(clock),
            uuid: UuidGenerator::incrementing(),
        }
    }

    #[test]
    fn add_bike_uses_environment_ids_and_time() {
        let clock = TestClock::new();
        let repository = InMemoryRepository::new();
        let mut store = TestStore::with_clock(
            GarageState::default(),
            GarageReducer,
            env(repository.clone(), clock.clone()),
            clock,
        );

        store.send(GarageAction::AddBike { name: " Commuter ".into() }, |s| {
            s.bikes.push(Bike::new(Uuid::from_u128(1), "Commuter", 1_704_067_200));
        });
        store.receive(GarageAction::Saved(Ok(())), |_| {});
        store.finish();

        assert_eq!(repository.stored().map(|b| b.len()), Some(1));
    }

    #[test]
    fn ride_updates_components_and_persists() {
        let mut bike = Bike::new(Uuid::from_u128(10), "Gravel", 0);
        bike.components
            .push(Component::new(Uuid::from_u128(11), ComponentType::Chain, "KMC", 0));
        let clock = TestClock::new();
        let mut store = TestStore::with_clock(
            GarageState {
                bikes: vec![bike],
                loaded: true,
                error: None,
            },
            GarageReducer,
            env(InMemoryRepository::new(), clock.clone()),
            clock,
        );

        store.send(
            GarageAction::RecordRide {
                bike: Uuid::from_u128(10),
                distance_km: 42.0,
            },
            |s| {
                s.bikes[0].odometer_km = 42.0;
                s.bikes[0].components[0].distance_km = 42.0;
                s.bikes[0].components[0].distance_since_service_km = 42.0;
            },
        );
        store.receive(GarageAction::Saved(Ok(())), |_| {});
        store.finish();
    }

    #[test]
    fn service_record_takes_the_garage_distance() {
        let mut bike = Bike::new(Uuid::from_u128(10), "Gravel", 0);
        let mut chain = Component::new(Uuid::from_u128(11), ComponentType::Chain, "KMC", 0);
        chain.distance_km = 120.0;
        chain.distance_since_service_km = 120.0;
        bike.components.push(chain);
        let clock = TestClock::new();
        let repository = InMemoryRepository::new();
        let mut store = TestStore::with_clock(
            GarageState {
                bikes: vec![bike],
                loaded: true,
                error: None,
            },
            GarageReducer,
            env(repository.clone(), clock.clone()),
            clock,
        );
        let record = MaintenanceRecord {
            id: Uuid::from_u128(20),
            performed_at: 1_704_067_200,
            distance_km: 80.0,
            note: "cleaned".into(),
        };

        store.send(
            GarageAction::ServiceComponent {
                bike: Uuid::from_u128(10),
                component: Uuid::from_u128(11),
                record: record.clone(),
            },
            |s| {
                let chain = &mut s.bikes[0].components[0];
                chain.distance_since_service_km = 0.0;
                chain.history.push(MaintenanceRecord {
                    distance_km: 120.0,
                    ..record.clone()
                });
            },
        );
        store.receive(GarageAction::Saved(Ok(())), |_| {});

        store.send(
            GarageAction::RetireComponent {
                bike: Uuid::from_u128(10),
                component: Uuid::from_u128(11),
            },
            |s| s.bikes[0].components[0].retired = true,
        );
        store.receive(GarageAction::Saved(Ok(())), |_| {});

        store.send(
            GarageAction::RetireComponent {
                bike: Uuid::from_u128(10),
                component: Uuid::from_u128(11),
            },
            |_| {},
        );
        store.send(
            GarageAction::ServiceComponent {
                bike: Uuid::from_u128(10),
                component: Uuid::from_u128(11),
                record,
            },
            |_| {},
        );
        store.finish();

        assert_eq!(repository.save_count(), 2);
    }

    #[test]
    fn invalid_input_sets_error_without_saving() {
        let clock = TestClock::new();
        let repository = InMemoryRepository::new();
        let mut store = TestStore::with_clock(
            GarageState::default(),
            GarageReducer,
            env(repository.clone(), clock.clone()),
            clock,
        );

        store.send(GarageAction::AddBike { name: "  ".into() }, |s| {
            s.error = Some("Bike name must not be empty".into());
        });
        store.send(
            GarageAction::RecordRide {
                bike: Uuid::from_u128(99),
                distance_km: 5.0,
            },
            |s| s.error = Some(format!("No bike with id {}", Uuid::from_u128(99))),
        );
        store.send(GarageAction::DismissError, |s| s.error = None);
        store.finish();

        assert_eq!(repository.save_count(), 0);
    }

    #[test]
    fn load_missing_file_yields_empty_garage() {
        let clock = TestClock::new();
        let mut store = TestStore::with_clock(
            GarageState::default(),
            GarageReducer,
            env(InMemoryRepository::new(), clock.clone()),
            clock,
        );

        store.send(GarageAction::Load, |_| {});
        store.receive(GarageAction::Loaded(Ok(None)), |s| s.loaded = true);
        store.finish();
    }

    #[test]
    fn add_component_defaults_name_to_kind() {
        let clock = TestClock::new();
        let mut store = TestStore::with_clock(
            GarageState {
                bikes: vec![Bike::new(Uuid::from_u128(10), "Road", 0)],
                loaded: true,
                error: None,
            },
            GarageReducer,
            env(InMemoryRepository::new(), clock.clone()),
            clock,
        );

        store.send(
            GarageAction::AddComponent {
                bike: Uuid::from_u128(10),
                kind: ComponentType::Tires,
                name: String::new(),
            },
            |s| {
                s.bikes[0].components.push(Component::new(
                    Uuid::from_u128(1),
                    ComponentType::Tires,
                    "tires",
                    1_704_067_200,
                ));
            },
        );
        store.receive(GarageAction::Saved(Ok(())), |_| {});
        store.finish();
    }
}
