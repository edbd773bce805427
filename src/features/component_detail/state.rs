use uuid::Uuid;

use crate::model::{Component, ComponentType};
use crate::mvi::State;

#[derive(Debug, Clone, PartialEq)]
pub struct ComponentDetailState {
    pub bike_id: Uuid,
    pub component: Component,
    /// Draft note attached to the next service record.
    pub note: String,
    pub show_history: bool,
    pub service_interval_km: u32,
}

impl ComponentDetailState {
    pub fn new(bike_id: Uuid, component: Component, service_interval_km: u32) -> Self {
        Self {
            bike_id,
            component,
            note: String::new(),
            show_history: false,
            service_interval_km,
        }
    }

    pub fn service_due(&self) -> bool {
        self.component.service_due(self.service_interval_km)
    }
}

impl Default for ComponentDetailState {
    fn default() -> Self {
        Self::new(
            Uuid::nil(),
            Component::new(Uuid::nil(), ComponentType::Other, "", 0),
            0,
        )
    }
}

impl State for ComponentDetailState {}
