//! Track edit submenu

use std::io::Write;

use super::{LineSource, Session};
use crate::race_manager::{Error, Result, TurnAdded};

const TRACK_MENU: &str = "\n=== Track Edit Menu ===\n\
    1. Add Turn (the closing segment back to Turn 1 keeps its length)\n\
    2. Clear Track\n\
    3. Show Track Layout\n\
    4. Show Turn Count & Lap Distance\n\
    0. Back";

impl<S: LineSource, W: Write> Session<S, W> {
    pub(super) fn track_menu(&mut self) -> Result<()> {
        loop {
            writeln!(self.out, "{}", TRACK_MENU)?;
            match self.ask_choice("Choice: ")? {
                None | Some(0) => return Ok(()),
                Some(1) => self.add_turn()?,
                Some(2) => {
                    self.manager.clear_track();
                    writeln!(self.out, "Track cleared, no turns remain.")?;
                }
                Some(3) => write!(self.out, "{}", self.manager.track())?,
                Some(4) => {
                    let track = self.manager.track();
                    writeln!(self.out, "Total turns: {}", track.turn_count())?;
                    writeln!(self.out, "Approx lap distance: {} m", track.lap_distance())?;
                }
                Some(_) => writeln!(self.out, "Invalid choice. Try again.")?,
            }
        }
    }

    fn add_turn(&mut self) -> Result<()> {
        let turn_count = self.manager.track().turn_count();

        let length = if turn_count == 0 {
            0.0
        } else {
            let prompt = format!(
                "Enter distance (m) from Turn {} to Turn {}: ",
                turn_count,
                turn_count + 1
            );
            match self.ask_parsed::<f64>(&prompt)? {
                Some(length) => length,
                None => return self.report("Invalid distance. Turn not added."),
            }
        };

        match self.manager.extend_track(length) {
            Ok(TurnAdded::First) => {
                writeln!(self.out, "First turn added. Total turns: 1")?;
            }
            Ok(TurnAdded::Linked {
                previous,
                added,
                length,
                ..
            }) => {
                writeln!(
                    self.out,
                    "New turn added. Total turns: {}",
                    self.manager.track().turn_count()
                )?;
                writeln!(
                    self.out,
                    "Segment created: Turn {} -> Turn {} ({}m)",
                    previous + 1,
                    added + 1,
                    length
                )?;
            }
            Err(Error::InvalidDistance(_)) => {
                writeln!(self.out, "Invalid distance. Turn not added.")?;
            }
            Err(err) => writeln!(self.out, "Could not add turn: {}", err)?,
        }
        Ok(())
    }
}
