//! Driver - Roster, lap history and per-driver stats
//!
//! The roster keeps drivers in insertion order and issues IDs from its own
//! counter. Stats live beside the roster, keyed by ID, and follow the driver
//! in and out.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::race_manager::error::{Error, Result};

/// Opaque driver identifier, starting at 1
pub type DriverId = u32;

/// A single recorded lap
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lap {
    /// 1-based lap number for this driver
    pub lap_number: u32,
    /// Lap time in seconds
    pub lap_time: f64,
}

/// Accumulated totals for one driver
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DriverStats {
    pub total_laps: u32,
    pub total_time: f64,
    pub pit_stops: u32,
}

impl DriverStats {
    /// Mean lap time, if any laps were recorded
    pub fn average_lap(&self) -> Option<f64> {
        (self.total_laps > 0).then(|| self.total_time / f64::from(self.total_laps))
    }
}

/// A driver entered in the event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Driver {
    pub id: DriverId,
    pub name: String,
    pub car_number: u32,
    /// Laps in recording order; the last entry is the most recent
    laps: Vec<Lap>,
}

impl Driver {
    pub fn new(id: DriverId, name: String, car_number: u32) -> Self {
        Self {
            id,
            name,
            car_number,
            laps: Vec::new(),
        }
    }

    /// Lap history, most recent first
    pub fn lap_history(&self) -> impl Iterator<Item = &Lap> {
        self.laps.iter().rev()
    }

    pub fn lap_count(&self) -> usize {
        self.laps.len()
    }
}

/// Ordered driver list with stats and an ID counter
#[derive(Debug, Clone)]
pub struct DriverRoster {
    drivers: Vec<Driver>,
    stats: HashMap<DriverId, DriverStats>,
    next_id: DriverId,
}

impl DriverRoster {
    pub fn new() -> Self {
        Self {
            drivers: Vec::new(),
            stats: HashMap::new(),
            next_id: 1,
        }
    }

    /// Add a driver under the next free ID
    pub fn add(&mut self, name: impl Into<String>, car_number: u32) -> DriverId {
        let id = self.next_id;
        self.next_id += 1;

        let name = name.into();
        log::info!("Driver {} added: {} (car {})", id, name, car_number);
        self.drivers.push(Driver::new(id, name, car_number));
        self.stats.insert(id, DriverStats::default());
        id
    }

    pub fn len(&self) -> usize {
        self.drivers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }

    /// Drivers in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Driver> {
        self.drivers.iter()
    }

    /// Driver IDs in insertion order
    pub fn ids(&self) -> Vec<DriverId> {
        self.drivers.iter().map(|d| d.id).collect()
    }

    /// ID to display name lookup for bracket rendering
    pub fn name_map(&self) -> HashMap<DriverId, String> {
        self.drivers
            .iter()
            .map(|d| (d.id, d.name.clone()))
            .collect()
    }

    pub fn get(&self, id: DriverId) -> Option<&Driver> {
        self.drivers.iter().find(|d| d.id == id)
    }

    /// Driver at a 1-based list position, as shown in selection menus
    pub fn by_position(&self, position: usize) -> Result<&Driver> {
        position
            .checked_sub(1)
            .and_then(|i| self.drivers.get(i))
            .ok_or(Error::InvalidSelection(position))
    }

    /// First driver running the given car number
    pub fn find_by_car(&self, car_number: u32) -> Option<&Driver> {
        self.drivers.iter().find(|d| d.car_number == car_number)
    }

    /// Replace name and/or car number, leaving `None` fields untouched
    pub fn edit(
        &mut self,
        id: DriverId,
        name: Option<String>,
        car_number: Option<u32>,
    ) -> Result<&Driver> {
        let driver = self
            .drivers
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or(Error::DriverNotFound(id))?;

        if let Some(name) = name {
            driver.name = name;
        }
        if let Some(car_number) = car_number {
            driver.car_number = car_number;
        }
        log::info!("Driver {} updated", id);
        Ok(driver)
    }

    /// Remove a driver and their stats
    pub fn remove(&mut self, id: DriverId) -> Result<Driver> {
        let index = self
            .drivers
            .iter()
            .position(|d| d.id == id)
            .ok_or(Error::DriverNotFound(id))?;

        self.stats.remove(&id);
        let driver = self.drivers.remove(index);
        log::info!("Driver {} removed: {}", id, driver.name);
        Ok(driver)
    }

    /// Push a lap onto the driver's history and update totals.
    ///
    /// Non-finite times are rejected so they cannot poison the totals.
    pub fn record_lap(&mut self, id: DriverId, lap_time: f64) -> Result<Lap> {
        if !lap_time.is_finite() {
            log::warn!("Rejected lap time {} for driver {}", lap_time, id);
            return Err(Error::InvalidLapTime(lap_time));
        }
        let driver = self
            .drivers
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or(Error::DriverNotFound(id))?;

        let lap = Lap {
            lap_number: driver.laps.len() as u32 + 1,
            lap_time,
        };
        driver.laps.push(lap);

        let stats = self.stats.entry(id).or_default();
        stats.total_laps += 1;
        stats.total_time += lap_time;
        Ok(lap)
    }

    pub fn stats(&self, id: DriverId) -> Option<&DriverStats> {
        self.stats.get(&id)
    }

    pub fn stats_mut(&mut self, id: DriverId) -> Option<&mut DriverStats> {
        self.stats.get_mut(&id)
    }
}

impl Default for DriverRoster {
    fn default() -> Self {
        Self::new()
    }
}
