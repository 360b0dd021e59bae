//! The animal record and the factory that materializes one from a stored
//! row. Identity, birth date and the command log are common to every
//! species; the species tag is plain data (see `species`). Age is derived
//! from the birth date, never stored.

use chrono::{Datelike, Local, NaiveDate};

use crate::commands::CommandLog;
use crate::error::Result;
use crate::species::Species;

#[derive(Debug, Clone, PartialEq)]
pub struct Animal {
    /// Store-assigned id, unique and positive.
    pub id: i64,
    pub name: String,
    pub birth_date: NaiveDate,
    pub species: Species,
    pub commands: CommandLog,
}

impl Animal {
    pub fn new(
        id: i64,
        name: String,
        birth_date: NaiveDate,
        species: Species,
        commands: CommandLog,
    ) -> Self {
        Animal { id, name, birth_date, species, commands }
    }

    /// Factory for raw store fields: resolves the species label and parses
    /// the delimited command column. An unrecognized label yields
    /// `RegistryError::UnknownSpecies`; duplicate-id checking is the
    /// caller's concern.
    pub fn from_record(
        id: i64,
        name: String,
        birth_date: NaiveDate,
        commands_raw: &str,
        species_label: &str,
    ) -> Result<Animal> {
        let species = Species::from_label(species_label)?;
        let commands = CommandLog::parse(commands_raw);
        Ok(Animal::new(id, name, birth_date, species, commands))
    }

    /// Whole years between the birth date and `on`, clamped at zero for
    /// dates in the future.
    pub fn age_on(&self, on: NaiveDate) -> i32 {
        let mut years = on.year() - self.birth_date.year();
        if (on.month(), on.day()) < (self.birth_date.month(), self.birth_date.day()) {
            years -= 1;
        }
        years.max(0)
    }

    /// Age in whole years as of today.
    pub fn age(&self) -> i32 {
        self.age_on(Local::now().date_naive())
    }

    /// Append a freshly taught command. The caller must mirror the new
    /// serialized log to the store.
    pub fn teach(&mut self, command: impl Into<String>) {
        self.commands.append(command);
    }
}
