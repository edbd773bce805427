//! Base trait for feature state in MVI architecture.

use std::fmt::Debug;

/// Marker trait for feature state objects.
///
/// States should be:
/// - Plain values (Clone to create new states)
/// - Self-contained (all data needed to render and drive the feature)
/// - Comparable (PartialEq for detecting changes and asserting in tests)
pub trait State: Clone + PartialEq + Debug + Default + Send + Sync + 'static {}
