//! Driver edit submenu

use std::io::Write;

use super::{LineSource, Session};
use crate::race_manager::Result;

const DRIVER_MENU: &str = "\n=== Driver Edit Menu ===\n\
    1. Add Driver\n\
    2. Edit Driver\n\
    3. List Drivers\n\
    4. Remove Driver\n\
    0. Back";

impl<S: LineSource, W: Write> Session<S, W> {
    pub(super) fn driver_menu(&mut self) -> Result<()> {
        loop {
            writeln!(self.out, "{}", DRIVER_MENU)?;
            match self.ask_choice("Choice: ")? {
                None | Some(0) => return Ok(()),
                Some(1) => self.add_driver()?,
                Some(2) => self.edit_driver()?,
                Some(3) => self.list_drivers()?,
                Some(4) => self.remove_driver()?,
                Some(_) => writeln!(self.out, "Invalid choice. Try again.")?,
            }
        }
    }

    fn add_driver(&mut self) -> Result<()> {
        let Some(name) = self.ask("Name: ")? else {
            return Ok(());
        };
        let name = name.trim().to_string();
        if name.is_empty() {
            return self.report("Driver name cannot be empty.");
        }
        let Some(car_number) = self.ask_parsed::<u32>("Car Number: ")? else {
            return self.report("Invalid car number.");
        };

        self.manager.roster_mut().add(name, car_number);
        writeln!(self.out, "Driver added.")?;
        Ok(())
    }

    fn edit_driver(&mut self) -> Result<()> {
        if self.manager.roster().is_empty() {
            writeln!(self.out, "No drivers to edit.")?;
            return Ok(());
        }
        let Some(id) = self.select_driver("Select driver to edit:")? else {
            return Ok(());
        };

        let Some(name) = self.ask("New name (blank to keep): ")? else {
            return Ok(());
        };
        let name = Some(name.trim().to_string()).filter(|n| !n.is_empty());

        let Some(car) = self.ask_parsed::<i64>("New car number (-1 to keep): ")? else {
            return self.report("Invalid car number.");
        };
        let car_number = match car {
            -1 => None,
            n => match u32::try_from(n) {
                Ok(n) => Some(n),
                Err(_) => return self.report("Invalid car number."),
            },
        };

        match self.manager.roster_mut().edit(id, name, car_number) {
            Ok(_) => writeln!(self.out, "Driver updated.")?,
            Err(err) => writeln!(self.out, "Could not update driver: {}", err)?,
        }
        Ok(())
    }

    fn list_drivers(&mut self) -> Result<()> {
        writeln!(self.out, "Driver List:")?;
        for d in self.manager.roster().iter() {
            writeln!(self.out, "{} | Car {}", d.name, d.car_number)?;
        }
        Ok(())
    }

    fn remove_driver(&mut self) -> Result<()> {
        if self.manager.roster().is_empty() {
            writeln!(self.out, "No drivers to remove.")?;
            return Ok(());
        }
        let Some(id) = self.select_driver("Select driver to remove:")? else {
            return Ok(());
        };

        match self.manager.roster_mut().remove(id) {
            Ok(driver) => {
                writeln!(
                    self.out,
                    "Removing driver: {} | Car {}",
                    driver.name, driver.car_number
                )?;
                writeln!(self.out, "Driver removed.")?;
                writeln!(
                    self.out,
                    "Note: If you are using the tournament bracket, \
                     rebuild it so it no longer includes this driver."
                )?;
            }
            Err(err) => writeln!(self.out, "Could not remove driver: {}", err)?,
        }
        Ok(())
    }
}
