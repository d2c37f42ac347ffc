//! Bracket edit submenu

use std::io::Write;

use super::{LineSource, Session};
use crate::race_manager::{Error, Result, Side};

const BRACKET_MENU: &str = "\n=== Bracket Edit Menu ===\n\
    1. Rebuild Bracket (Only the first 4/8/16 drivers will be used.)\n\
    2. Show Bracket\n\
    3. Set Match Winner\n\
    0. Back";

impl<S: LineSource, W: Write> Session<S, W> {
    pub(super) fn bracket_menu(&mut self) -> Result<()> {
        loop {
            writeln!(self.out, "{}", BRACKET_MENU)?;
            match self.ask_choice("Choice: ")? {
                None | Some(0) => return Ok(()),
                Some(1) => self.rebuild_bracket()?,
                Some(2) => {
                    let names = self.manager.roster().name_map();
                    write!(self.out, "{}", self.manager.bracket().render(&names))?;
                }
                Some(3) => self.set_winner()?,
                Some(_) => writeln!(self.out, "Invalid choice. Try again.")?,
            }
        }
    }

    fn rebuild_bracket(&mut self) -> Result<()> {
        let entered = self.manager.roster().len();
        match self.manager.rebuild_bracket() {
            Ok(report) => {
                if !report.excluded.is_empty() {
                    writeln!(
                        self.out,
                        "Bracket can only include {} drivers for matching. \
                         Drivers by ID will not be in the bracket:",
                        report.leaf_count
                    )?;
                    for id in &report.excluded {
                        writeln!(self.out, "  Driver ID {}", id)?;
                    }
                }
            }
            Err(Error::NoCompetitors) => {
                writeln!(self.out, "No drivers available for bracket.")?;
            }
            Err(err) => writeln!(self.out, "Could not build bracket: {}", err)?,
        }
        writeln!(self.out, "Bracket rebuilt for {} driver(s).", entered)?;
        Ok(())
    }

    fn set_winner(&mut self) -> Result<()> {
        if !self.manager.bracket().has_bracket() {
            writeln!(self.out, "No bracket built yet.")?;
            writeln!(self.out, "Use 'Rebuild Bracket' first.")?;
            return Ok(());
        }

        let names = self.manager.roster().name_map();
        writeln!(self.out, "\nCurrent Matches:")?;
        write!(self.out, "{}", self.manager.bracket().render_matches(&names))?;

        let total = self.manager.bracket().matches()?.len();
        if total == 0 {
            writeln!(self.out, "No matches available.")?;
            return Ok(());
        }

        let prompt = format!("Select match number (1-{}): ", total);
        let Some(match_number) = self.ask_parsed::<usize>(&prompt)? else {
            return self.report("Invalid match.");
        };
        if match_number < 1 || match_number > total {
            writeln!(self.out, "Invalid match.")?;
            return Ok(());
        }

        let Some(choice) = self.ask_parsed::<i64>("Choose winner (1 = left, 2 = right): ")? else {
            return self.report("Failed to set winner (invalid input).");
        };

        let outcome = Side::from_choice(choice)
            .and_then(|side| self.manager.set_match_winner(match_number, side));
        match outcome {
            Ok(_) => writeln!(self.out, "Winner advanced.")?,
            Err(err) => writeln!(self.out, "Failed to set winner ({}).", err)?,
        }
        Ok(())
    }
}
