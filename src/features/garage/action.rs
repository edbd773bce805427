use uuid::Uuid;

use crate::model::{Bike, ComponentType, MaintenanceRecord};
use crate::mvi::Action;
use crate::persistence::PersistenceError;

#[derive(Debug, Clone, PartialEq)]
pub enum GarageAction {
    Load,
    Loaded(Result<Option<Vec<Bike>>, PersistenceError>),
    AddBike {
        name: String,
    },
    RemoveBike(Uuid),
    RecordRide {
        bike: Uuid,
        distance_km: f64,
    },
    AddComponent {
        bike: Uuid,
        kind: ComponentType,
        name: String,
    },
    /// Append a service record and reset the distance since service. The
    /// record's distance is taken from the garage's own copy.
    ServiceComponent {
        bike: Uuid,
        component: Uuid,
        record: MaintenanceRecord,
    },
    RetireComponent {
        bike: Uuid,
        component: Uuid,
    },
    Saved(Result<(), PersistenceError>),
    DismissError,
}

impl Action for GarageAction {}
