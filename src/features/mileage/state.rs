use crate::mvi::State;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MileageState {
    pub displayed_km: f64,
    pub target_km: f64,
    pub animating: bool,
}

impl State for MileageState {}
