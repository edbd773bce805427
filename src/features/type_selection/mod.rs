//! Component type picker.

mod action;
mod reducer;
mod state;

pub use action::TypeSelectionAction;
pub use reducer::TypeSelectionReducer;
pub use state::TypeSelectionState;
