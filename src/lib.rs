// Animal Registry - Core Library
// Polymorphic classification and persistence mapping for a console-driven
// registry of animals backed by SQLite.

pub mod animal;
pub mod commands;
pub mod db;
pub mod error;
pub mod menu;
pub mod registry;
pub mod species;

// Re-export commonly used types
pub use animal::Animal;
pub use commands::CommandLog;
pub use db::{insert_animal, load_animals, setup_schema, update_commands, NewAnimal, Store};
pub use error::{RegistryError, Result};
pub use menu::Menu;
pub use registry::{OpGuard, Registry};
pub use species::{Category, Species};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
