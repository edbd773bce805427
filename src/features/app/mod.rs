//! Root feature: tabs, child composition and cross-feature wiring.

mod action;
mod environment;
mod reducer;
mod state;

pub use action::AppAction;
pub use environment::{AppEnvironment, AppRepositories};
pub use reducer::AppReducer;
pub use state::{AppState, TAB_COUNT};
