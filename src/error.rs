//! Typed error surface for the registry core.
//!
//! Every store call can fail at one of two layers: opening the connection
//! (`Connection`) or running a statement (`Statement`). Validation and
//! classification failures are rejected before any store access. None of
//! these are fatal to the process; the interactive loop always regains
//! control.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    /// Input rejected before any store access (empty name, bad date, ...).
    #[error("invalid input: {0}")]
    Validation(String),

    /// A stored species label the factory does not recognize. The row is
    /// skipped during a load; the load itself continues.
    #[error("unknown species label {0:?}")]
    UnknownSpecies(String),

    /// The store could not be reached or opened.
    #[error("failed to open store connection")]
    Connection(#[source] rusqlite::Error),

    /// A statement against an open connection failed.
    #[error("store statement failed")]
    Statement(#[source] rusqlite::Error),

    /// An update addressed an id with no base row.
    #[error("no animal with id {0}")]
    NotFound(i64),

    /// An `OpGuard` scope finished without the guarded operation running.
    #[error("guarded operation finished without ever running")]
    GuardUnused,
}

/// Errors surfacing from inside an open connection are statement errors;
/// connection-open failures are mapped explicitly at the open site.
impl From<rusqlite::Error> for RegistryError {
    fn from(err: rusqlite::Error) -> Self {
        RegistryError::Statement(err)
    }
}

pub type Result<T> = std::result::Result<T, RegistryError>;
