//! Pit lane queue, first come first served by car number

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PitQueue {
    cars: VecDeque<u32>,
}

impl PitQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&mut self, car_number: u32) {
        self.cars.push_back(car_number);
        log::info!("Car {} joined pit queue ({} waiting)", car_number, self.cars.len());
    }

    pub fn pop(&mut self) -> Option<u32> {
        self.cars.pop_front()
    }

    /// Waiting cars, front of the queue first
    pub fn iter(&self) -> impl Iterator<Item = &u32> {
        self.cars.iter()
    }

    pub fn len(&self) -> usize {
        self.cars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cars.is_empty()
    }
}
