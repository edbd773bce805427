use uuid::Uuid;

use crate::model::{Bike, Component};
use crate::mvi::State;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GarageState {
    pub bikes: Vec<Bike>,
    pub loaded: bool,
    pub error: Option<String>,
}

impl GarageState {
    pub fn bike(&self, id: Uuid) -> Option<&Bike> {
        self.bikes.iter().find(|b| b.id == id)
    }

    pub fn bike_mut(&mut self, id: Uuid) -> Option<&mut Bike> {
        self.bikes.iter_mut().find(|b| b.id == id)
    }

    pub fn component(&self, bike: Uuid, component: Uuid) -> Option<&Component> {
        self.bike(bike)?.component(component)
    }

    pub fn component_mut(&mut self, bike: Uuid, component: Uuid) -> Option<&mut Component> {
        self.bike_mut(bike)?
            .components
            .iter_mut()
            .find(|c| c.id == component)
    }

    /// First bike whose name matches, ignoring case.
    pub fn find_by_name(&self, name: &str) -> Option<&Bike> {
        self.bikes
            .iter()
            .find(|b| b.name.eq_ignore_ascii_case(name.trim()))
    }
}

impl State for GarageState {}
