use crate::mvi::Action;

#[derive(Debug, Clone, PartialEq)]
pub enum MileageAction {
    Animate { from: f64, to: f64 },
    Frame(f64),
    Finished,
    Stop,
}

impl Action for MileageAction {}
