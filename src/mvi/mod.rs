//! Model-View-Intent (MVI) store primitives.
//!
//! This module provides the unidirectional data flow every feature is
//! built on.
//!
//! # Architecture
//!
//! ```text
//!            ┌──────────── Effect ◀───────────┐
//!            ▼                                │
//! Action ──→ Store ──→ Reducer(State, Env) ───┤
//!            │                                │
//!            └──→ State ──→ View              │
//!                 (watch)                     │
//!            Executor ◀───────────────────────┘
//! ```
//!
//! - **State**: plain value owned by one store
//! - **Action**: user input or effect completion
//! - **Reducer**: pure function producing the next state and an effect
//! - **Effect**: async work that feeds follow-up actions back to the store
//! - **Environment**: collaborators injected at store construction

mod action;
mod cancel;
mod clock;
mod effect;
mod executor;
mod reducer;
mod scope;
mod state;
mod store;
pub mod testing;

pub use action::Action;
pub use cancel::{CancellationRegistry, EffectId};
pub use clock::{unix_seconds, Clock, SystemClock, TestClock};
pub use effect::Effect;
pub use executor::Executor;
pub use reducer::Reducer;
pub use scope::{Combine, OptionalScope, Scope};
pub use state::State;
pub use store::{Store, StoreError};
pub use testing::TestStore;
