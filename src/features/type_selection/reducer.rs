use crate::features::type_selection::action::TypeSelectionAction;
use crate::features::type_selection::state::TypeSelectionState;
use crate::mvi::{Effect, Reducer};

pub struct TypeSelectionReducer;

impl Reducer for TypeSelectionReducer {
    type State = TypeSelectionState;
    type Action = TypeSelectionAction;
    type Environment = ();

    fn reduce(
        &self,
        mut state: Self::State,
        action: Self::Action,
        _env: &(),
    ) -> (Self::State, Effect<Self::Action>) {
        match action {
            TypeSelectionAction::DidSelect(kind) => state.selected = Some(kind),
            TypeSelectionAction::RemoveSelectedType => state.selected = None,
        }
        (state, Effect::none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ComponentType;
    use crate::mvi::TestStore;

    #[test]
    fn select_then_clear() {
        let mut store = TestStore::new(TypeSelectionState::default(), TypeSelectionReducer, ());

        store.send(TypeSelectionAction::DidSelect(ComponentType::Brakes), |s| {
            s.selected = Some(ComponentType::Brakes);
        });
        store.send(TypeSelectionAction::RemoveSelectedType, |s| s.selected = None);

        store.finish();
    }

    #[test]
    fn clearing_nothing_is_a_no_op() {
        let (state, effect) = TypeSelectionReducer.reduce(
            TypeSelectionState::default(),
            TypeSelectionAction::RemoveSelectedType,
            &(),
        );
        assert_eq!(state, TypeSelectionState::default());
        assert!(effect.is_none());
    }
}
