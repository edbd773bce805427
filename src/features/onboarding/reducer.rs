use crate::features::onboarding::action::OnboardingAction;
use crate::features::onboarding::state::OnboardingState;
use crate::features::onboarding::OnboardingEnvironment;
use crate::mvi::{Effect, Reducer};

pub struct OnboardingReducer;

impl Reducer for OnboardingReducer {
    type State = OnboardingState;
    type Action = OnboardingAction;
    type Environment = OnboardingEnvironment;

    fn reduce(
        &self,
        mut state: Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> (Self::State, Effect<Self::Action>) {
        match action {
            OnboardingAction::Appear => {
                let effect = Effect::infallible(env.flag.load(), |stored| {
                    OnboardingAction::Loaded(stored.unwrap_or(false))
                });
                (state, effect)
            }
            OnboardingAction::Loaded(completed) => {
                state.loaded = true;
                // A completion made while the flag was loading wins.
                state.completed |= completed;
                (state, Effect::none())
            }
            OnboardingAction::Next => {
                if let Some(next) = state.page.next() {
                    state.page = next;
                }
                (state, Effect::none())
            }
            OnboardingAction::Back => {
                if let Some(previous) = state.page.previous() {
                    state.page = previous;
                }
                (state, Effect::none())
            }
            OnboardingAction::Skip | OnboardingAction::Complete => {
                if state.completed {
                    return (state, Effect::none());
                }
                state.completed = true;
                tracing::info!(page = ?state.page, "Onboarding completed");
                (state, Effect::fire_and_forget(env.flag.save(true)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::onboarding::OnboardingPage;
    use crate::mvi::TestStore;
    use crate::persistence::{Fallback, InMemoryRepository, PersistenceError};
    use std::path::PathBuf;
    use std::sync::Arc;

    fn store_with(flag: InMemoryRepository<bool>) -> TestStore<OnboardingReducer> {
        let env = OnboardingEnvironment {
            flag: Arc::new(Fallback::new(flag)),
        };
        TestStore::new(OnboardingState::default(), OnboardingReducer, env)
    }

    #[test]
    fn completion_before_load_finishes_is_kept() {
        let flag = InMemoryRepository::new();
        let mut store = store_with(flag.clone()).exhaustive(false);

        store.send(OnboardingAction::Appear, |_| {});
        store.send(OnboardingAction::Complete, |s| s.completed = true);
        store.receive(OnboardingAction::Loaded(false), |s| s.loaded = true);
        store.finish();

        assert_eq!(flag.stored(), Some(true));
    }

    #[test]
    fn walks_pages_and_persists_completion() {
        let flag = InMemoryRepository::new();
        let mut store = store_with(flag.clone());

        store.send(OnboardingAction::Appear, |_| {});
        store.receive(OnboardingAction::Loaded(false), |s| s.loaded = true);

        store.send(OnboardingAction::Back, |_| {});
        store.send(OnboardingAction::Next, |s| s.page = OnboardingPage::Bikes);
        store.send(OnboardingAction::Next, |s| s.page = OnboardingPage::Components);
        store.send(OnboardingAction::Next, |s| s.page = OnboardingPage::Maintenance);
        store.send(OnboardingAction::Next, |_| {});
        store.send(OnboardingAction::Complete, |s| s.completed = true);
        store.send(OnboardingAction::Complete, |_| {});

        store.finish();
        assert_eq!(flag.stored(), Some(true));
        assert_eq!(flag.save_count(), 1);
    }

    #[test]
    fn unreadable_flag_reads_as_not_completed() {
        let flag = InMemoryRepository::with_value(true).failing_loads(PersistenceError::Decode {
            path: PathBuf::from("onboarding.json"),
            message: "expected value".into(),
        });
        let mut store = store_with(flag);

        store.send(OnboardingAction::Appear, |_| {});
        store.receive(OnboardingAction::Loaded(false), |s| s.loaded = true);
        store.finish();
    }

    #[test]
    fn skip_completes_from_any_page() {
        let mut store = store_with(InMemoryRepository::new());
        store.send(OnboardingAction::Next, |s| s.page = OnboardingPage::Bikes);
        store.send(OnboardingAction::Skip, |s| s.completed = true);
        store.finish();
    }
}
