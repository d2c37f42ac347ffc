//! Manager - Owns the event state and routes operations to it
//!
//! The roster, pit queue, track and bracket are independent of each other;
//! the manager is the only place that combines them (driver IDs into the
//! bracket, car numbers into the pit queue) and the only place that keeps the
//! track a closed lap when turns are added.

use serde::{Deserialize, Serialize};

use crate::race_manager::bracket::{BuildReport, Side, Tournament};
use crate::race_manager::config::RaceConfig;
use crate::race_manager::driver::{Driver, DriverId, DriverRoster, DriverStats, Lap};
use crate::race_manager::error::{Error, Result};
use crate::race_manager::pit::PitQueue;
use crate::race_manager::track::TrackGraph;

/// What `extend_track` did
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TurnAdded {
    /// The track was empty; the turn has no segments yet
    First,
    /// `previous -> added` was linked and `added -> turn 1` now closes the lap
    Linked {
        previous: usize,
        added: usize,
        length: f64,
        closing_length: f64,
    },
}

/// A car leaving the pit lane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PitStop {
    pub car_number: u32,
    /// Driver credited with the stop, if the car is still entered
    pub driver: Option<DriverId>,
}

/// Per-driver row of a snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverSnapshot {
    pub id: DriverId,
    pub name: String,
    pub car_number: u32,
    pub stats: DriverStats,
}

/// Serializable view of the whole event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceSnapshot {
    pub drivers: Vec<DriverSnapshot>,
    pub pit_queue: Vec<u32>,
    pub turn_count: usize,
    pub lap_distance: f64,
    pub bracket_size: usize,
    pub champion: Option<DriverId>,
}

/// Main event state
#[derive(Debug, Clone)]
pub struct RaceManager {
    roster: DriverRoster,
    pit_queue: PitQueue,
    track: TrackGraph,
    bracket: Tournament,
    /// Closing segment length used when the track has none to carry over
    closing_straight: f64,
}

impl RaceManager {
    /// Empty event: no turns, no drivers
    pub fn new() -> Self {
        Self {
            roster: DriverRoster::new(),
            pit_queue: PitQueue::new(),
            track: TrackGraph::new(0),
            bracket: Tournament::new(),
            closing_straight: RaceConfig::default().closing_straight,
        }
    }

    /// Seed the track and roster from configuration
    pub fn from_config(config: &RaceConfig) -> Result<Self> {
        let mut manager = Self::new();
        manager.closing_straight = config.closing_straight;
        manager.track = TrackGraph::new(config.initial_turns);

        for s in &config.segments {
            manager.track.add_segment(s.from, s.to, s.length)?;
        }
        for d in &config.drivers {
            manager.roster.add(d.name.clone(), d.car_number);
        }

        log::info!(
            "Race manager initialized: {} turns, {} drivers",
            manager.track.turn_count(),
            manager.roster.len()
        );
        Ok(manager)
    }

    pub fn roster(&self) -> &DriverRoster {
        &self.roster
    }

    pub fn roster_mut(&mut self) -> &mut DriverRoster {
        &mut self.roster
    }

    pub fn track(&self) -> &TrackGraph {
        &self.track
    }

    pub fn bracket(&self) -> &Tournament {
        &self.bracket
    }

    pub fn pit_queue(&self) -> &PitQueue {
        &self.pit_queue
    }

    /// Append a turn and splice it into the lap.
    ///
    /// The first turn on an empty track takes no segment and ignores
    /// `length`. Otherwise `length` is the distance from the current last
    /// turn to the new one, and the closing segment back to turn 1 moves to
    /// the new turn, keeping its length.
    pub fn extend_track(&mut self, length: f64) -> Result<TurnAdded> {
        let turn_count = self.track.turn_count();
        if turn_count == 0 {
            self.track.add_turn();
            log::info!("First turn added");
            return Ok(TurnAdded::First);
        }

        if !length.is_finite() || length <= 0.0 {
            log::warn!("Rejected turn with distance {}", length);
            return Err(Error::InvalidDistance(length));
        }

        let last = turn_count - 1;
        let closing = match turn_count {
            1 => None,
            _ => self.track.segment_length(last, 0),
        };

        self.track.add_turn();
        let added = turn_count;
        self.track.add_segment(last, added, length)?;

        let closing_length = match closing {
            Some(closing_length) => {
                self.track.remove_segment(last, 0);
                closing_length
            }
            None => self.closing_straight,
        };
        self.track.add_segment(added, 0, closing_length)?;

        log::info!(
            "Turn {} added: {}m from turn {}, {}m back to turn 1",
            added + 1,
            length,
            last + 1,
            closing_length
        );
        Ok(TurnAdded::Linked {
            previous: last,
            added,
            length,
            closing_length,
        })
    }

    pub fn clear_track(&mut self) {
        self.track.clear();
    }

    /// Rebuild the bracket from every entered driver, in roster order
    pub fn rebuild_bracket(&mut self) -> Result<BuildReport> {
        let ids = self.roster.ids();
        self.bracket.build(&ids)
    }

    pub fn set_match_winner(&mut self, match_number: usize, side: Side) -> Result<DriverId> {
        self.bracket.set_winner(match_number, side)
    }

    pub fn record_lap(&mut self, id: DriverId, lap_time: f64) -> Result<Lap> {
        let lap = self.roster.record_lap(id, lap_time)?;
        log::info!("Driver {} lap {}: {}s", id, lap.lap_number, lap_time);
        Ok(lap)
    }

    /// Queue the driver's car for the pit lane
    pub fn queue_pit_stop(&mut self, id: DriverId) -> Result<&Driver> {
        let driver = self.roster.get(id).ok_or(Error::DriverNotFound(id))?;
        self.pit_queue.request(driver.car_number);
        Ok(driver)
    }

    /// Release the car at the front of the pit queue
    pub fn process_pit_stop(&mut self) -> Result<PitStop> {
        let car_number = self.pit_queue.pop().ok_or(Error::PitQueueEmpty)?;

        let driver = self.roster.find_by_car(car_number).map(|d| d.id);
        if let Some(stats) = driver.and_then(|id| self.roster.stats_mut(id)) {
            stats.pit_stops += 1;
        }
        if driver.is_none() {
            log::warn!("Car {} left the pits but no driver runs it", car_number);
        }

        Ok(PitStop { car_number, driver })
    }

    pub fn snapshot(&self) -> RaceSnapshot {
        RaceSnapshot {
            drivers: self
                .roster
                .iter()
                .map(|d| DriverSnapshot {
                    id: d.id,
                    name: d.name.clone(),
                    car_number: d.car_number,
                    stats: self.roster.stats(d.id).copied().unwrap_or_default(),
                })
                .collect(),
            pit_queue: self.pit_queue.iter().copied().collect(),
            turn_count: self.track.turn_count(),
            lap_distance: self.track.lap_distance(),
            bracket_size: self.bracket.leaf_count(),
            champion: self.bracket.root_driver(),
        }
    }
}

impl Default for RaceManager {
    fn default() -> Self {
        Self::new()
    }
}
