//! In-memory registry of animals plus the next-available-id counter.
//!
//! The registry is rebuilt wholesale on each reload, never diffed. The
//! counter is a strict upper bound over every id the registry has ever
//! seen and only moves forward. A failed reload leaves the previous
//! contents untouched.

use crate::animal::Animal;
use crate::db::Store;
use crate::error::{RegistryError, Result};

#[derive(Debug)]
pub struct Registry {
    animals: Vec<Animal>,
    next_id: i64,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Registry { animals: Vec::new(), next_id: 1 }
    }

    /// Replace the contents with a fresh load from the store. The swap
    /// happens only after the load succeeded; on failure the previous
    /// registry state is preserved for the caller to keep displaying.
    pub fn reload(&mut self, store: &Store) -> Result<usize> {
        let loaded = store.load_animals()?;
        self.replace(loaded);
        Ok(self.animals.len())
    }

    /// Swap in a freshly loaded set, advancing the id counter past every
    /// id it contains.
    pub fn replace(&mut self, animals: Vec<Animal>) {
        for animal in &animals {
            self.observe_id(animal.id);
        }
        self.animals = animals;
    }

    /// Track a newly inserted animal without a full reload.
    pub fn add(&mut self, animal: Animal) {
        self.observe_id(animal.id);
        self.animals.push(animal);
    }

    /// Advance the counter so it stays a strict upper bound. Never moves
    /// backwards.
    pub fn observe_id(&mut self, id: i64) {
        if id >= self.next_id {
            self.next_id = id + 1;
        }
    }

    pub fn next_id(&self) -> i64 {
        self.next_id
    }

    pub fn animals(&self) -> &[Animal] {
        &self.animals
    }

    /// Look up by position in the displayed listing (0-based).
    pub fn get(&self, index: usize) -> Option<&Animal> {
        self.animals.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Animal> {
        self.animals.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.animals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.animals.is_empty()
    }
}

/// Scoped usage guard around a flow that is expected to perform an
/// operation at least once. `mark` records each execution; `finish`
/// signals a logical-misuse error if the flow completed without the
/// guarded operation ever running.
#[derive(Debug)]
pub struct OpGuard {
    count: u32,
    used: bool,
}

impl OpGuard {
    pub fn new() -> Self {
        OpGuard { count: 0, used: false }
    }

    /// Record one execution of the guarded operation.
    pub fn mark(&mut self) {
        self.count += 1;
        self.used = true;
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Close the scope, checking the usage invariant.
    pub fn finish(self) -> Result<u32> {
        if !self.used {
            return Err(RegistryError::GuardUnused);
        }
        Ok(self.count)
    }
}

impl Default for OpGuard {
    fn default() -> Self {
        Self::new()
    }
}
