use std::time::Duration;

use crate::features::mileage::action::MileageAction;
use crate::features::mileage::state::MileageState;
use crate::features::mileage::MileageEnvironment;
use crate::mvi::{Effect, EffectId, Reducer};

pub const MILEAGE_ANIMATION_ID: EffectId = EffectId::new("mileage-animation");

pub struct MileageReducer;

impl Reducer for MileageReducer {
    type State = MileageState;
    type Action = MileageAction;
    type Environment = MileageEnvironment;

    fn reduce(
        &self,
        mut state: Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> (Self::State, Effect<Self::Action>) {
        match action {
            MileageAction::Animate { from, to } => {
                state.target_km = to;
                if from == to {
                    state.displayed_km = to;
                    state.animating = false;
                    return (state, Effect::cancel(MILEAGE_ANIMATION_ID));
                }
                state.displayed_km = from;
                state.animating = true;
                let effect = Effect::keyframes(frames(from, to, env))
                    .cancellable_in_flight(MILEAGE_ANIMATION_ID);
                (state, effect)
            }
            MileageAction::Frame(value) => {
                state.displayed_km = value;
                (state, Effect::none())
            }
            MileageAction::Finished => {
                state.displayed_km = state.target_km;
                state.animating = false;
                (state, Effect::none())
            }
            MileageAction::Stop => {
                if !state.animating {
                    return (state, Effect::none());
                }
                state.animating = false;
                (state, Effect::cancel(MILEAGE_ANIMATION_ID))
            }
        }
    }
}

/// Evenly spaced values ending exactly at `to`, the first shown at once,
/// followed by `Finished`.
fn frames(from: f64, to: f64, env: &MileageEnvironment) -> Vec<(MileageAction, Duration)> {
    let count = env.frames.max(1);
    let step = (to - from) / f64::from(count);
    let mut frames: Vec<_> = (1..=count)
        .map(|i| {
            let value = if i == count { to } else { from + step * f64::from(i) };
            let delay = if i == 1 { Duration::ZERO } else { env.frame_interval };
            (MileageAction::Frame(value), delay)
        })
        .collect();
    frames.push((MileageAction::Finished, Duration::ZERO));
    frames
}
