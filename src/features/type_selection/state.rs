use crate::model::ComponentType;
use crate::mvi::State;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeSelectionState {
    pub selected: Option<ComponentType>,
}

impl State for TypeSelectionState {}
