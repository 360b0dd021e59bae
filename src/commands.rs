//! Command log: the ordered list of behaviors taught to one animal.
//!
//! The store keeps the whole log in a single delimited text column, so the
//! log knows how to serialize itself to `"sit, stay"` form and parse back.
//! Insertion order is significant and duplicates are allowed. Empty
//! segments produced by stray commas (`"sit,,stay"`) are dropped on parse.

use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandLog {
    entries: Vec<String>,
}

impl CommandLog {
    pub fn new() -> Self {
        CommandLog { entries: Vec::new() }
    }

    /// Parse the delimited column value. Splits on `,`, trims each piece,
    /// drops empty pieces. Blank input yields an empty log.
    pub fn parse(raw: &str) -> Self {
        let entries = raw
            .split(',')
            .map(str::trim)
            .filter(|piece| !piece.is_empty())
            .map(str::to_string)
            .collect();
        CommandLog { entries }
    }

    /// Append a command to the end of the log. The caller is responsible
    /// for rejecting empty input and for persisting the new serialized
    /// form afterwards.
    pub fn append(&mut self, command: impl Into<String>) {
        self.entries.push(command.into());
    }

    /// Serialized form stored in the `commands` column.
    pub fn to_delimited_string(&self) -> String {
        self.entries.join(", ")
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for CommandLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_delimited_string())
    }
}
