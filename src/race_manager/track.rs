//! Track - Turn layout as a directed, weighted graph
//!
//! Turns are plain indices into an adjacency list; each turn owns the
//! segments leaving it. The graph itself only stores and mutates; keeping the
//! layout a single closed lap is the job of the caller (see
//! `RaceManager::extend_track`).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::race_manager::error::{Error, Result};

/// A directed segment from its owning turn to `target`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Target turn index
    pub target: usize,
    /// Length in meters
    pub length: f64,
}

/// Adjacency-list track layout
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackGraph {
    turns: Vec<Vec<Segment>>,
}

impl TrackGraph {
    /// Create a track with `turn_count` turns and no segments
    pub fn new(turn_count: usize) -> Self {
        Self {
            turns: vec![Vec::new(); turn_count],
        }
    }

    /// Append a turn with no outgoing segments
    pub fn add_turn(&mut self) {
        self.turns.push(Vec::new());
    }

    pub fn turn_count(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Append a segment `origin -> target`.
    ///
    /// Duplicates and self-loops are accepted; only the indices are checked.
    pub fn add_segment(&mut self, origin: usize, target: usize, length: f64) -> Result<()> {
        let turn_count = self.turns.len();
        if origin >= turn_count || target >= turn_count {
            log::warn!(
                "Invalid segment {} -> {} ({} turns)",
                origin + 1,
                target + 1,
                turn_count
            );
            return Err(Error::InvalidSegment {
                origin,
                target,
                turn_count,
            });
        }

        self.turns[origin].push(Segment { target, length });
        Ok(())
    }

    /// Remove every segment `origin -> target`, returning how many were dropped
    pub fn remove_segment(&mut self, origin: usize, target: usize) -> usize {
        let Some(segments) = self.turns.get_mut(origin) else {
            return 0;
        };

        let before = segments.len();
        segments.retain(|s| s.target != target);
        before - segments.len()
    }

    /// Length of the first segment `origin -> target`, if any
    pub fn segment_length(&self, origin: usize, target: usize) -> Option<f64> {
        let length = self
            .turns
            .get(origin)?
            .iter()
            .find(|s| s.target == target)
            .map(|s| s.length);
        log::debug!("Segment {} -> {}: {:?}", origin + 1, target + 1, length);
        length
    }

    /// Outgoing segments of `turn` in insertion order
    pub fn segments(&self, turn: usize) -> impl Iterator<Item = &Segment> {
        self.turns.get(turn).into_iter().flatten()
    }

    /// Drop every turn and segment
    pub fn clear(&mut self) {
        self.turns.clear();
        log::info!("Track cleared");
    }

    /// Total length of every segment on the track
    pub fn lap_distance(&self) -> f64 {
        self.turns.iter().flatten().map(|s| s.length).sum()
    }
}

impl fmt::Display for TrackGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Track Layout: ")?;
        if self.turns.is_empty() {
            return writeln!(f, "(no turns inputted)");
        }

        for (i, segments) in self.turns.iter().enumerate() {
            write!(f, " Turn {} -> ", i + 1)?;
            for s in segments {
                write!(f, "(Turn {}, {}m) ", s.target + 1, s.length)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stock_track() -> TrackGraph {
        let mut track = TrackGraph::new(4);
        track.add_segment(0, 1, 300.0).unwrap();
        track.add_segment(1, 2, 150.0).unwrap();
        track.add_segment(2, 3, 25.0).unwrap();
        track.add_segment(3, 0, 500.0).unwrap();
        track
    }

    #[test]
    fn test_new_has_turns_without_segments() {
        let track = TrackGraph::new(3);
        assert_eq!(track.turn_count(), 3);
        assert_eq!(track.lap_distance(), 0.0);
        assert_eq!(track.segments(0).count(), 0);
    }

    #[test]
    fn test_stock_lap_distance() {
        assert_eq!(stock_track().lap_distance(), 975.0);
    }

    #[test]
    fn test_add_segment_rejects_out_of_range() {
        let mut track = TrackGraph::new(2);
        assert!(matches!(
            track.add_segment(0, 2, 10.0),
            Err(Error::InvalidSegment {
                origin: 0,
                target: 2,
                turn_count: 2
            })
        ));
        assert!(track.add_segment(2, 0, 10.0).is_err());
        assert_eq!(track.lap_distance(), 0.0);
    }

    #[test]
    fn test_add_segment_accepts_duplicates_and_self_loops() {
        let mut track = TrackGraph::new(2);
        track.add_segment(0, 1, 10.0).unwrap();
        track.add_segment(0, 1, 20.0).unwrap();
        track.add_segment(1, 1, 5.0).unwrap();
        assert_eq!(track.segments(0).count(), 2);
        assert_eq!(track.segment_length(0, 1), Some(10.0));
        assert_eq!(track.segment_length(1, 1), Some(5.0));
        assert_eq!(track.lap_distance(), 35.0);
    }

    #[test]
    fn test_add_then_remove_restores_absence() {
        let mut track = TrackGraph::new(3);
        track.add_segment(1, 2, 42.0).unwrap();
        assert_eq!(track.segment_length(1, 2), Some(42.0));
        assert_eq!(track.remove_segment(1, 2), 1);
        assert_eq!(track.segment_length(1, 2), None);
    }

    #[test]
    fn test_remove_drops_every_duplicate() {
        let mut track = TrackGraph::new(3);
        track.add_segment(0, 1, 10.0).unwrap();
        track.add_segment(0, 2, 7.0).unwrap();
        track.add_segment(0, 1, 20.0).unwrap();
        assert_eq!(track.remove_segment(0, 1), 2);
        assert_eq!(track.segment_length(0, 1), None);
        assert_eq!(track.segment_length(0, 2), Some(7.0));
    }

    #[test]
    fn test_remove_out_of_range_or_missing_is_noop() {
        let mut track = stock_track();
        assert_eq!(track.remove_segment(9, 0), 0);
        assert_eq!(track.remove_segment(0, 3), 0);
        assert_eq!(track.lap_distance(), 975.0);
    }

    #[test]
    fn test_segment_length_bounds_are_strict() {
        let track = stock_track();
        assert_eq!(track.segment_length(4, 0), None);
        assert_eq!(track.segment_length(usize::MAX, 0), None);
        assert_eq!(track.segment_length(3, 0), Some(500.0));
    }

    #[test]
    fn test_clear() {
        let mut track = stock_track();
        track.clear();
        assert!(track.is_empty());
        assert_eq!(track.lap_distance(), 0.0);
        assert_eq!(track.segment_length(0, 1), None);
    }

    #[test]
    fn test_display() {
        let text = stock_track().to_string();
        assert_eq!(
            text,
            "Track Layout: \n \
             Turn 1 -> (Turn 2, 300m) \n \
             Turn 2 -> (Turn 3, 150m) \n \
             Turn 3 -> (Turn 4, 25m) \n \
             Turn 4 -> (Turn 1, 500m) \n"
        );
        assert_eq!(
            TrackGraph::default().to_string(),
            "Track Layout: \n(no turns inputted)\n"
        );
    }

    #[test]
    fn test_lap_distance_is_sum_of_segments() {
        use rand::Rng;

        let mut rng = rand::thread_rng();
        for _ in 0..20 {
            let turns = rng.gen_range(1..12);
            let mut track = TrackGraph::new(turns);
            let mut expected = 0.0;
            for _ in 0..rng.gen_range(0..30) {
                let length = f64::from(rng.gen_range(1..1000u32));
                track
                    .add_segment(rng.gen_range(0..turns), rng.gen_range(0..turns), length)
                    .unwrap();
                expected += length;
            }
            assert_eq!(track.lap_distance(), expected);
        }
    }
}
