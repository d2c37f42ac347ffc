//! Race manager errors

use thiserror::Error;

use crate::race_manager::driver::DriverId;

/// Race manager result type
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can be rejected by the track, bracket, roster or session.
///
/// None of these abort the process; the menu reports them and carries on.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid segment: turn {origin} -> turn {target} with {turn_count} turn(s) on track")]
    InvalidSegment {
        origin: usize,
        target: usize,
        turn_count: usize,
    },

    #[error("invalid distance: {0}m")]
    InvalidDistance(f64),

    #[error("invalid lap time: {0}s")]
    InvalidLapTime(f64),

    #[error("no drivers available for bracket")]
    NoCompetitors,

    #[error("invalid bracket: {0}")]
    InvalidBracket(String),

    #[error("no bracket built yet")]
    NoBracket,

    #[error("match {index} out of range (1-{count})")]
    MatchOutOfRange { index: usize, count: usize },

    #[error("invalid side {0}, expected 1 (left) or 2 (right)")]
    InvalidSide(i64),

    #[error("match {match_number}: selected slot is still TBD")]
    UndecidedSlot { match_number: usize },

    #[error("driver {0} not found")]
    DriverNotFound(DriverId),

    #[error("invalid selection: {0}")]
    InvalidSelection(usize),

    #[error("nobody in pit queue")]
    PitQueueEmpty,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("readline error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
}
