//! Race Manager Module
//!
//! In-memory event state: driver roster, pit queue, track layout and
//! tournament bracket. Everything here is synchronous and owned by a single
//! `RaceManager`.

pub mod bracket;
pub mod config;
pub mod driver;
pub mod error;
pub mod manager;
pub mod pit;
pub mod track;

pub use bracket::{BuildReport, Match, Side, Tournament};
pub use config::RaceConfig;
pub use driver::{Driver, DriverId, DriverRoster, DriverStats, Lap};
pub use error::{Error, Result};
pub use manager::{PitStop, RaceManager, RaceSnapshot, TurnAdded};
pub use pit::PitQueue;
pub use track::{Segment, TrackGraph};
