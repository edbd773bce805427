//! Product features, each a State/Action/Reducer triple with its own
//! environment.

pub mod app;
pub mod component_detail;
pub mod garage;
pub mod mileage;
pub mod onboarding;
pub mod settings;
pub mod type_selection;
