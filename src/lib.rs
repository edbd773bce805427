//! gearshed: bike component and maintenance tracking on a unidirectional
//! state store.

pub mod cli;
pub mod config;
pub mod features;
pub mod ids;
pub mod logging;
pub mod model;
pub mod mvi;
pub mod persistence;
pub mod shutdown;
