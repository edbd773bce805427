//! Bikes and their installed components.
//!
//! Every mutation persists the whole garage. Saves are tagged with
//! [`GARAGE_SAVE_ID`] so only the newest save reports back.

mod action;
mod reducer;
mod state;

use std::sync::Arc;

use crate::ids::UuidGenerator;
use crate::model::Bike;
use crate::mvi::Clock;
use crate::persistence::{PersistenceError, Repository};

pub use action::GarageAction;
pub use reducer::{GarageReducer, GARAGE_SAVE_ID};
pub use state::GarageState;

pub type GarageRepository = Arc<dyn Repository<Vec<Bike>, Error = PersistenceError>>;

pub struct GarageEnvironment {
    pub repository: GarageRepository,
    pub clock: Arc<dyn Clock>,
    pub uuid: UuidGenerator,
}
