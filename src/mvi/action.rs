//! Base trait for actions (user/system events) in MVI architecture.

use std::fmt::Debug;

/// Marker trait for action values.
///
/// Actions represent:
/// - User input (a selected tab, an edited field)
/// - Effect completions (a load finished, a timer frame fired)
///
/// Actions are processed by reducers to produce new states. Equality is
/// structural so test harnesses can assert on received actions.
pub trait Action: Clone + PartialEq + Debug + Send + 'static {}
