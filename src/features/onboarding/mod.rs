//! First-run walkthrough.
//!
//! The completion flag is read through an infallible repository: there is
//! no failure action here, so a broken flag file must be absorbed by the
//! repository (see [`Fallback`](crate::persistence::Fallback)).

mod action;
mod reducer;
mod state;

use std::convert::Infallible;
use std::sync::Arc;

use crate::persistence::Repository;

pub use action::OnboardingAction;
pub use reducer::OnboardingReducer;
pub use state::{OnboardingPage, OnboardingState};

/// Persisted "walkthrough finished" flag.
pub type OnboardingFlag = Arc<dyn Repository<bool, Error = Infallible>>;

pub struct OnboardingEnvironment {
    pub flag: OnboardingFlag,
}
