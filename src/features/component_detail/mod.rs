//! Single component view: service log, notes, retirement.
//!
//! Changes stay local to this state; the app root writes the edited
//! component back into the garage.

mod action;
mod reducer;
mod state;

use std::sync::Arc;

use crate::ids::UuidGenerator;
use crate::mvi::Clock;

pub use action::ComponentDetailAction;
pub use reducer::ComponentDetailReducer;
pub use state::ComponentDetailState;

pub struct ComponentDetailEnvironment {
    pub clock: Arc<dyn Clock>,
    pub uuid: UuidGenerator,
}
