//! Menu - Line-oriented interactive session
//!
//! A `Session` pairs a `RaceManager` with a line source and an output sink.
//! Every rejected operation is printed as a diagnostic and the menu carries
//! on; only I/O failures end the session early.

mod bracket;
mod drivers;
pub mod input;
mod track;

use std::io::Write;
use std::str::FromStr;

use crate::race_manager::{DriverId, RaceManager, Result};

pub use input::{LineSource, Scripted, Terminal};

const MAIN_MENU: &str = "\n=== Track Manager Simulation Menu ===\n\
    1. Show drivers\n\
    2. Record lap\n\
    3. Show lap history for driver\n\
    4. Request pit stop\n\
    5. Process next pit stop\n\
    6. Show pit queue\n\
    7. Show track information\n\
    8. Show tournament bracket\n\
    9. Driver Edit Menu\n\
    10. Track Edit Menu\n\
    11. Bracket Edit Menu\n\
    12. Show event snapshot (JSON)\n\
    0. Exit";

/// Interactive session over a race manager
pub struct Session<S, W> {
    manager: RaceManager,
    input: S,
    out: W,
    /// Input ran out; every menu unwinds
    finished: bool,
}

impl<S: LineSource, W: Write> Session<S, W> {
    pub fn new(manager: RaceManager, input: S, out: W) -> Self {
        Self {
            manager,
            input,
            out,
            finished: false,
        }
    }

    pub fn manager(&self) -> &RaceManager {
        &self.manager
    }

    pub fn into_parts(self) -> (RaceManager, S, W) {
        (self.manager, self.input, self.out)
    }

    /// Main menu loop; returns on `0` or end of input
    pub fn run(&mut self) -> Result<()> {
        loop {
            writeln!(self.out, "{}", MAIN_MENU)?;
            let Some(choice) = self.ask_choice("Enter choice: ")? else {
                break;
            };

            match choice {
                1 => self.show_drivers()?,
                2 => self.record_lap()?,
                3 => self.show_lap_history()?,
                4 => self.request_pit_stop()?,
                5 => self.process_pit_stop()?,
                6 => self.show_pit_queue()?,
                7 => self.show_track_info()?,
                8 => self.show_bracket()?,
                9 => self.driver_menu()?,
                10 => self.track_menu()?,
                11 => self.bracket_menu()?,
                12 => self.show_snapshot()?,
                0 => {
                    writeln!(self.out, "Exiting...")?;
                    break;
                }
                _ => writeln!(self.out, "Invalid choice. Try again.")?,
            }

            if self.finished {
                break;
            }
        }
        self.out.flush()?;
        Ok(())
    }

    /// Raw line, `None` at end of input
    fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        if self.finished {
            return Ok(None);
        }
        let line = self.input.read_line(prompt)?;
        if line.is_none() {
            log::debug!("Input closed");
            self.finished = true;
        }
        Ok(line)
    }

    /// Parsed answer; `None` at end of input or when it does not parse
    fn ask_parsed<T: FromStr>(&mut self, prompt: &str) -> Result<Option<T>> {
        Ok(self
            .ask(prompt)?
            .and_then(|line| line.trim().parse().ok()))
    }

    /// Menu choice; unparsable answers map to -1 so they hit the
    /// invalid-choice arm, end of input maps to `None`
    fn ask_choice(&mut self, prompt: &str) -> Result<Option<i64>> {
        Ok(self
            .ask(prompt)?
            .map(|line| line.trim().parse().unwrap_or(-1)))
    }

    /// Print a diagnostic unless the session is already unwinding
    fn report(&mut self, message: &str) -> Result<()> {
        if !self.finished {
            writeln!(self.out, "{}", message)?;
        }
        Ok(())
    }

    /// Numbered driver list and a pick from it
    fn select_driver(&mut self, heading: &str) -> Result<Option<DriverId>> {
        if self.manager.roster().is_empty() {
            writeln!(self.out, "No drivers available.")?;
            return Ok(None);
        }

        writeln!(self.out, "\n{}", heading)?;
        for (i, d) in self.manager.roster().iter().enumerate() {
            writeln!(self.out, "{}. {} | Car {}", i + 1, d.name, d.car_number)?;
        }

        let Some(position) = self.ask_parsed::<usize>("Enter number: ")? else {
            self.report("Invalid selection.")?;
            return Ok(None);
        };
        match self.manager.roster().by_position(position) {
            Ok(driver) => Ok(Some(driver.id)),
            Err(_) => {
                writeln!(self.out, "Invalid selection.")?;
                Ok(None)
            }
        }
    }

    fn show_drivers(&mut self) -> Result<()> {
        writeln!(self.out, "Drivers (in current order):")?;
        for d in self.manager.roster().iter() {
            writeln!(self.out, "Name: {} | Car: {}", d.name, d.car_number)?;
        }
        Ok(())
    }

    fn record_lap(&mut self) -> Result<()> {
        let Some(id) = self.select_driver("Select a driver:")? else {
            return Ok(());
        };
        let Some(lap_time) = self.ask_parsed::<f64>("Lap time (s): ")? else {
            return self.report("Invalid lap time.");
        };

        match self.manager.record_lap(id, lap_time) {
            Ok(lap) => {
                let name = self.driver_name(id);
                writeln!(
                    self.out,
                    "Recorded lap {} for {} in {} seconds.",
                    lap.lap_number, name, lap.lap_time
                )?;
            }
            Err(err) => writeln!(self.out, "Could not record lap: {}", err)?,
        }
        Ok(())
    }

    fn show_lap_history(&mut self) -> Result<()> {
        let Some(id) = self.select_driver("Select a driver:")? else {
            return Ok(());
        };
        let roster = self.manager.roster();
        let Some(driver) = roster.get(id) else {
            writeln!(self.out, "Driver not found.")?;
            return Ok(());
        };

        writeln!(self.out, "Lap history for {}:", driver.name)?;
        if driver.lap_count() == 0 {
            writeln!(self.out, " (no laps yet)")?;
        }
        for lap in driver.lap_history() {
            writeln!(self.out, " Lap {}: {} s", lap.lap_number, lap.lap_time)?;
        }

        if let Some(stats) = roster.stats(id) {
            write!(
                self.out,
                " Totals: {} lap(s), {} s, {} pit stop(s)",
                stats.total_laps, stats.total_time, stats.pit_stops
            )?;
            match stats.average_lap() {
                Some(average) => writeln!(self.out, ", average {:.3} s", average)?,
                None => writeln!(self.out)?,
            }
        }
        Ok(())
    }

    fn request_pit_stop(&mut self) -> Result<()> {
        let Some(id) = self.select_driver("Select a driver:")? else {
            return Ok(());
        };
        match self.manager.queue_pit_stop(id) {
            Ok(driver) => writeln!(
                self.out,
                "Car {} ({}) has joined pit queue.",
                driver.car_number, driver.name
            )?,
            Err(_) => writeln!(self.out, "Driver not found.")?,
        }
        Ok(())
    }

    fn process_pit_stop(&mut self) -> Result<()> {
        match self.manager.process_pit_stop() {
            Ok(stop) => match stop.driver {
                Some(id) => {
                    let name = self.driver_name(id);
                    writeln!(
                        self.out,
                        "Car {} ({}) is exiting pit stop.",
                        stop.car_number, name
                    )?;
                }
                None => writeln!(self.out, "Car {} is exiting pit stop.", stop.car_number)?,
            },
            Err(_) => writeln!(self.out, "Nobody in queue.")?,
        }
        Ok(())
    }

    fn show_pit_queue(&mut self) -> Result<()> {
        writeln!(self.out, "Pit Queue:")?;
        if self.manager.pit_queue().is_empty() {
            writeln!(self.out, "   (empty)")?;
        }
        for car in self.manager.pit_queue().iter() {
            writeln!(self.out, "Car {}", car)?;
        }
        Ok(())
    }

    fn show_track_info(&mut self) -> Result<()> {
        let track = self.manager.track();
        write!(self.out, "{}", track)?;
        writeln!(self.out, "Lap distance: {}m", track.lap_distance())?;
        Ok(())
    }

    fn show_bracket(&mut self) -> Result<()> {
        if !self.manager.bracket().has_bracket() {
            writeln!(self.out, "No bracket built yet.")?;
            writeln!(
                self.out,
                "Use 'Bracket Edit Menu -> Rebuild Bracket' to create one from current drivers."
            )?;
            return Ok(());
        }
        let names = self.manager.roster().name_map();
        write!(self.out, "{}", self.manager.bracket().render(&names))?;
        Ok(())
    }

    fn show_snapshot(&mut self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.manager.snapshot())?;
        writeln!(self.out, "{}", json)?;
        Ok(())
    }

    fn driver_name(&self, id: DriverId) -> String {
        self.manager
            .roster()
            .get(id)
            .map(|d| d.name.clone())
            .unwrap_or_else(|| format!("Driver {}", id))
    }
}
