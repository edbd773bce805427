use crate::model::ComponentType;
use crate::mvi::Action;

#[derive(Debug, Clone, PartialEq)]
pub enum TypeSelectionAction {
    DidSelect(ComponentType),
    RemoveSelectedType,
}

impl Action for TypeSelectionAction {}
