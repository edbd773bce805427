//! Odometer counter animation.

mod action;
mod reducer;
mod state;

use std::time::Duration;

use crate::config::AnimationConfig;

pub use action::MileageAction;
pub use reducer::{MileageReducer, MILEAGE_ANIMATION_ID};
pub use state::MileageState;

#[derive(Debug, Clone)]
pub struct MileageEnvironment {
    pub frames: u32,
    pub frame_interval: Duration,
}

impl From<&AnimationConfig> for MileageEnvironment {
    fn from(config: &AnimationConfig) -> Self {
        Self {
            frames: config.frames.max(1),
            frame_interval: config.frame_interval(),
        }
    }
}
