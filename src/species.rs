//! Species classification: a closed set of six species grouped into two
//! categories. The category selects which side table backs an animal's row;
//! the species selects the stored type label. No behavior varies per
//! species beyond these two lookups, so this is tagged data, not a type
//! hierarchy.

use crate::error::RegistryError;

/// One of the two category groupings. Determines the side table an
/// animal's species label lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Domestic,
    Pack,
}

impl Category {
    pub fn table_name(self) -> &'static str {
        match self {
            Category::Domestic => "domestic_animals",
            Category::Pack => "pack_animals",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Domestic => "domestic",
            Category::Pack => "pack",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Species {
    Dog,
    Cat,
    Hamster,
    Horse,
    Camel,
    Donkey,
}

impl Species {
    /// Menu order: domestic species first, then pack animals.
    pub const ALL: [Species; 6] = [
        Species::Dog,
        Species::Cat,
        Species::Hamster,
        Species::Horse,
        Species::Camel,
        Species::Donkey,
    ];

    /// The type label stored in the side tables. The store predates this
    /// rewrite and carries Russian labels.
    pub fn label(self) -> &'static str {
        match self {
            Species::Dog => "Собака",
            Species::Cat => "Кошка",
            Species::Hamster => "Хомяк",
            Species::Horse => "Лошадь",
            Species::Camel => "Верблюд",
            Species::Donkey => "Осел",
        }
    }

    /// Resolve a stored label back to a species. Any other value is an
    /// unknown-species error for the caller to skip or report.
    pub fn from_label(label: &str) -> Result<Species, RegistryError> {
        Species::ALL
            .into_iter()
            .find(|species| species.label() == label)
            .ok_or_else(|| RegistryError::UnknownSpecies(label.to_string()))
    }

    /// Display name for listings.
    pub fn name(self) -> &'static str {
        match self {
            Species::Dog => "Dog",
            Species::Cat => "Cat",
            Species::Hamster => "Hamster",
            Species::Horse => "Horse",
            Species::Camel => "Camel",
            Species::Donkey => "Donkey",
        }
    }

    pub fn category(self) -> Category {
        match self {
            Species::Dog | Species::Cat | Species::Hamster => Category::Domestic,
            Species::Horse | Species::Camel | Species::Donkey => Category::Pack,
        }
    }

    /// Map a 1-based menu choice onto a species.
    pub fn from_menu_choice(choice: usize) -> Option<Species> {
        (1..=Species::ALL.len())
            .contains(&choice)
            .then(|| Species::ALL[choice - 1])
    }
}
