//! Interactive console loop. Incidental plumbing around the core: it
//! collects validated field tuples, hands them to the store/registry, and
//! renders results or errors. Every failure is printed and the loop
//! regains control; nothing in here aborts the process.
//!
//! Generic over the input/output streams so sessions can be scripted in
//! tests.

use std::io::{self, BufRead, Write};

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::animal::Animal;
use crate::commands::CommandLog;
use crate::db::{NewAnimal, Store};
use crate::registry::{OpGuard, Registry};
use crate::species::{Category, Species};

pub struct Menu<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Menu<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Menu { input, output }
    }

    /// Run the session until the user quits or input ends.
    pub fn run(&mut self, store: &Store, registry: &mut Registry) -> io::Result<()> {
        match registry.reload(store) {
            Ok(count) => writeln!(self.output, "Loaded {count} animals from the store.")?,
            Err(err) => {
                warn!(error = %err, "initial load failed");
                writeln!(self.output, "Failed to load animals: {err}")?;
            }
        }

        loop {
            writeln!(self.output)?;
            writeln!(self.output, "=== Animal Registry ===")?;
            writeln!(self.output, "1. Add a new animal")?;
            writeln!(self.output, "2. Show an animal's commands")?;
            writeln!(self.output, "3. Teach an animal a new command")?;
            writeln!(self.output, "4. List all animals")?;
            writeln!(self.output, "5. Reload from the store")?;
            writeln!(self.output, "6. Quit")?;

            let Some(choice) = self.prompt("Choose an option: ")? else {
                break;
            };

            match choice.trim() {
                "1" => self.add_animal(store, registry)?,
                "2" => self.show_commands(registry)?,
                "3" => self.teach_command(store, registry)?,
                "4" => self.list_all(registry)?,
                "5" => match registry.reload(store) {
                    Ok(count) => {
                        writeln!(self.output, "Loaded {count} animals from the store.")?
                    }
                    Err(err) => writeln!(self.output, "Failed to load animals: {err}")?,
                },
                "6" => {
                    writeln!(self.output, "Bye.")?;
                    break;
                }
                _ => writeln!(self.output, "Invalid choice.")?,
            }
        }

        Ok(())
    }

    /// The whole add flow runs inside an `OpGuard` scope; if the flow ends
    /// without the insert having run (validation abort, store failure),
    /// the guard reports it on close.
    fn add_animal(&mut self, store: &Store, registry: &mut Registry) -> io::Result<()> {
        let mut guard = OpGuard::new();

        writeln!(self.output)?;
        writeln!(self.output, "--- Add a new animal ---")?;

        let Some(name) = self.prompt("Name: ")? else {
            return self.close_guard(guard);
        };
        let name = name.trim().to_string();
        if name.is_empty() {
            writeln!(self.output, "Name cannot be empty.")?;
            return self.close_guard(guard);
        }

        let Some(date_raw) = self.prompt("Birth date (YYYY-MM-DD): ")? else {
            return self.close_guard(guard);
        };
        let birth_date = match NaiveDate::parse_from_str(date_raw.trim(), "%Y-%m-%d") {
            Ok(date) => date,
            Err(_) => {
                writeln!(self.output, "Invalid date, use YYYY-MM-DD.")?;
                return self.close_guard(guard);
            }
        };

        writeln!(self.output, "Species:")?;
        for (index, species) in Species::ALL.iter().enumerate() {
            let category = match species.category() {
                Category::Domestic => "domestic",
                Category::Pack => "pack animal",
            };
            writeln!(self.output, "{}. {} ({category})", index + 1, species.name())?;
        }
        let Some(choice_raw) = self.prompt("Choose a species: ")? else {
            return self.close_guard(guard);
        };
        let species = choice_raw
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(Species::from_menu_choice);
        let Some(species) = species else {
            writeln!(self.output, "Species choice must be between 1 and 6.")?;
            return self.close_guard(guard);
        };

        let Some(commands_raw) = self.prompt("Starting commands (comma separated): ")? else {
            return self.close_guard(guard);
        };
        let commands = CommandLog::parse(&commands_raw);

        let new = NewAnimal { name, birth_date, species, commands };
        match store.insert_animal(&new) {
            Ok(id) => {
                registry.add(Animal::new(
                    id,
                    new.name.clone(),
                    new.birth_date,
                    new.species,
                    new.commands.clone(),
                ));
                guard.mark();
                writeln!(self.output, "Animal added with id {id}.")?;
            }
            Err(err) => writeln!(self.output, "Failed to save the animal: {err}")?,
        }

        self.close_guard(guard)
    }

    fn show_commands(&mut self, registry: &Registry) -> io::Result<()> {
        let Some(index) = self.choose_animal(registry)? else {
            return Ok(());
        };
        let animal = &registry.animals()[index];

        if animal.commands.is_empty() {
            writeln!(self.output, "{} knows no commands yet.", animal.name)?;
        } else {
            writeln!(self.output, "Commands for {}: {}", animal.name, animal.commands)?;
        }
        Ok(())
    }

    fn teach_command(&mut self, store: &Store, registry: &mut Registry) -> io::Result<()> {
        let Some(index) = self.choose_animal(registry)? else {
            return Ok(());
        };

        let Some(command) = self.prompt("New command: ")? else {
            return Ok(());
        };
        let command = command.trim().to_string();
        if command.is_empty() {
            writeln!(self.output, "Command cannot be empty.")?;
            return Ok(());
        }

        // Persist first, then mutate the in-memory copy, so a store
        // failure leaves memory and store in agreement.
        let animal = &registry.animals()[index];
        let id = animal.id;
        let mut updated = animal.commands.clone();
        updated.append(command.clone());

        match store.update_commands(id, &updated) {
            Ok(()) => {
                if let Some(animal) = registry.get_mut(index) {
                    animal.commands = updated;
                    writeln!(self.output, "Command {command:?} added for {}.", animal.name)?;
                }
            }
            Err(err) => writeln!(self.output, "Failed to save the command: {err}")?,
        }
        Ok(())
    }

    fn list_all(&mut self, registry: &Registry) -> io::Result<()> {
        if registry.is_empty() {
            writeln!(self.output, "No animals in the registry.")?;
            return Ok(());
        }

        writeln!(self.output)?;
        writeln!(self.output, "All animals ({} total)", registry.len())?;
        writeln!(self.output, "{}", "=".repeat(40))?;
        for animal in registry.animals() {
            writeln!(self.output, "{}: {}", animal.species.name(), animal.name)?;
            writeln!(self.output, "   Age: {} years", animal.age())?;
            writeln!(self.output, "   Commands: {}", animal.commands)?;
            writeln!(self.output, "   Id: {}", animal.id)?;
        }
        Ok(())
    }

    /// Print the indexed listing and read a 1-based selection. `None`
    /// when the registry is empty, the choice is invalid, or input ended.
    fn choose_animal(&mut self, registry: &Registry) -> io::Result<Option<usize>> {
        if registry.is_empty() {
            writeln!(self.output, "No animals in the registry.")?;
            return Ok(None);
        }

        writeln!(self.output)?;
        writeln!(self.output, "Animals:")?;
        for (index, animal) in registry.animals().iter().enumerate() {
            writeln!(
                self.output,
                "{}. {} (id {}, {} years, {} commands)",
                index + 1,
                animal.name,
                animal.id,
                animal.age(),
                animal.commands.len(),
            )?;
        }

        let Some(choice) = self.prompt("Choose an animal: ")? else {
            return Ok(None);
        };
        let selected = choice
            .trim()
            .parse::<usize>()
            .ok()
            .filter(|&n| n >= 1 && n <= registry.len());
        match selected {
            Some(n) => Ok(Some(n - 1)),
            None => {
                writeln!(self.output, "Invalid choice.")?;
                Ok(None)
            }
        }
    }

    /// Write the prompt and read one line. `None` means input ended.
    fn prompt(&mut self, text: &str) -> io::Result<Option<String>> {
        write!(self.output, "{text}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
    }

    fn close_guard(&mut self, guard: OpGuard) -> io::Result<()> {
        if guard.finish().is_err() {
            debug!("add-animal flow finished without an insert");
        }
        Ok(())
    }
}
