//! Persistence mapping between the flat relational schema and the typed
//! in-memory records.
//!
//! Schema is one base table plus one side table per category:
//!
//! ```text
//! animals(id, name, birth_date, commands)
//! domestic_animals(animal_id, type)
//! pack_animals(animal_id, type)
//! ```
//!
//! Every persisted animal has exactly one base row and exactly one side
//! row, and the species label must belong to the category of the table it
//! is found in. Loading unions the two joins and runs each row through the
//! factory; rows that violate classification are skipped with a warning,
//! not fatal to the load.
//!
//! The free functions operate on an open `Connection`; `Store` wraps them
//! and opens one connection per operation, dropped on every exit path.

use std::path::PathBuf;

use chrono::NaiveDate;
use rusqlite::{params, Connection};
use tracing::{debug, warn};

use crate::animal::Animal;
use crate::commands::CommandLog;
use crate::error::{RegistryError, Result};
use crate::species::Species;

/// Fields for an animal that does not yet have a store-assigned id.
#[derive(Debug, Clone)]
pub struct NewAnimal {
    pub name: String,
    pub birth_date: NaiveDate,
    pub species: Species,
    pub commands: CommandLog,
}

pub fn setup_schema(conn: &Connection) -> Result<()> {
    // WAL for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS animals (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            birth_date TEXT NOT NULL,
            commands TEXT NOT NULL DEFAULT ''
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS domestic_animals (
            animal_id INTEGER NOT NULL REFERENCES animals(id),
            type TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS pack_animals (
            animal_id INTEGER NOT NULL REFERENCES animals(id),
            type TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_domestic_animal_id
         ON domestic_animals(animal_id)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_pack_animal_id
         ON pack_animals(animal_id)",
        [],
    )?;

    Ok(())
}

/// Load every animal: base rows joined with each side table, unioned.
/// Rows with an unknown species label, a label in the wrong category
/// table, or an unparseable stored date are skipped with a warning.
pub fn load_animals(conn: &Connection) -> Result<Vec<Animal>> {
    let mut stmt = conn.prepare(
        "SELECT a.id, a.name, a.birth_date, a.commands, pa.type, 'pack' AS category
         FROM animals a
         JOIN pack_animals pa ON a.id = pa.animal_id
         UNION ALL
         SELECT a.id, a.name, a.birth_date, a.commands, da.type, 'domestic' AS category
         FROM animals a
         JOIN domestic_animals da ON a.id = da.animal_id",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, String>(5)?,
        ))
    })?;

    let mut animals = Vec::new();
    for row in rows {
        let (id, name, birth_date_raw, commands_raw, label, category) = row?;

        let birth_date = match NaiveDate::parse_from_str(&birth_date_raw, "%Y-%m-%d") {
            Ok(date) => date,
            Err(_) => {
                warn!(id, value = %birth_date_raw, "skipping row with unparseable birth date");
                continue;
            }
        };

        let animal = match Animal::from_record(id, name, birth_date, &commands_raw, &label) {
            Ok(animal) => animal,
            Err(RegistryError::UnknownSpecies(label)) => {
                warn!(id, %label, "skipping row with unknown species label");
                continue;
            }
            Err(other) => return Err(other),
        };

        // Side-table invariant: the label must belong to the category of
        // the table the row came from.
        if animal.species.category().as_str() != category {
            warn!(
                id,
                label = animal.species.label(),
                table_category = %category,
                "skipping row whose species does not match its category table"
            );
            continue;
        }

        animals.push(animal);
    }

    debug!(count = animals.len(), "loaded animals from store");
    Ok(animals)
}

/// Insert the base row and the category side row as one transaction,
/// returning the store-assigned id. The side table is selected by the
/// species' category. Running both inserts in a single transaction closes
/// the orphaned-base-row gap a two-step insert would otherwise have.
pub fn insert_animal(conn: &mut Connection, new: &NewAnimal) -> Result<i64> {
    if new.name.trim().is_empty() {
        return Err(RegistryError::Validation("name cannot be empty".to_string()));
    }

    let tx = conn.transaction()?;

    tx.execute(
        "INSERT INTO animals (name, birth_date, commands) VALUES (?1, ?2, ?3)",
        params![
            new.name,
            new.birth_date.format("%Y-%m-%d").to_string(),
            new.commands.to_delimited_string(),
        ],
    )?;
    let id = tx.last_insert_rowid();

    let side_insert = format!(
        "INSERT INTO {} (animal_id, type) VALUES (?1, ?2)",
        new.species.category().table_name()
    );
    tx.execute(&side_insert, params![id, new.species.label()])?;

    tx.commit()?;
    Ok(id)
}

/// Overwrite the base row's command column only; side tables are not
/// touched.
pub fn update_commands(conn: &Connection, id: i64, commands: &CommandLog) -> Result<()> {
    let affected = conn.execute(
        "UPDATE animals SET commands = ?1 WHERE id = ?2",
        params![commands.to_delimited_string(), id],
    )?;

    if affected == 0 {
        return Err(RegistryError::NotFound(id));
    }
    Ok(())
}

/// Handle on the durable store. Holds only the database path; each
/// operation opens its own connection and releases it when the call
/// returns, success or failure.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    /// Open the store at `path`, creating the schema if needed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Store> {
        let store = Store { path: path.into() };
        let conn = store.connect()?;
        setup_schema(&conn)?;
        Ok(store)
    }

    fn connect(&self) -> Result<Connection> {
        Connection::open(&self.path).map_err(RegistryError::Connection)
    }

    pub fn load_animals(&self) -> Result<Vec<Animal>> {
        let conn = self.connect()?;
        load_animals(&conn)
    }

    pub fn insert_animal(&self, new: &NewAnimal) -> Result<i64> {
        let mut conn = self.connect()?;
        insert_animal(&mut conn, new)
    }

    pub fn update_commands(&self, id: i64, commands: &CommandLog) -> Result<()> {
        let conn = self.connect()?;
        update_commands(&conn, id, commands)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::species::Category;

    fn open_test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        setup_schema(&conn).unwrap();
        conn
    }

    fn new_animal(name: &str, species: Species, commands: &str) -> NewAnimal {
        NewAnimal {
            name: name.to_string(),
            birth_date: NaiveDate::from_ymd_opt(2020, 5, 1).unwrap(),
            species,
            commands: CommandLog::parse(commands),
        }
    }

    #[test]
    fn test_insert_then_load_round_trips() {
        let mut conn = open_test_db();

        let id = insert_animal(&mut conn, &new_animal("Rex", Species::Dog, "sit, stay")).unwrap();
        assert!(id > 0);

        let animals = load_animals(&conn).unwrap();
        assert_eq!(animals.len(), 1);
        let rex = &animals[0];
        assert_eq!(rex.id, id);
        assert_eq!(rex.name, "Rex");
        assert_eq!(rex.species, Species::Dog);
        assert_eq!(rex.birth_date, NaiveDate::from_ymd_opt(2020, 5, 1).unwrap());
        assert_eq!(rex.commands.entries(), &["sit", "stay"]);
    }

    #[test]
    fn test_load_joins_both_category_tables() {
        let mut conn = open_test_db();

        insert_animal(&mut conn, &new_animal("Rex", Species::Dog, "sit")).unwrap();
        insert_animal(&mut conn, &new_animal("Орлик", Species::Horse, "гоп")).unwrap();

        let mut animals = load_animals(&conn).unwrap();
        animals.sort_by_key(|a| a.id);

        assert_eq!(animals.len(), 2);
        assert_eq!(animals[0].species, Species::Dog);
        assert_eq!(animals[0].species.category(), Category::Domestic);
        assert_eq!(animals[1].species, Species::Horse);
        assert_eq!(animals[1].species.category(), Category::Pack);
    }

    #[test]
    fn test_load_skips_unknown_species_label() {
        let mut conn = open_test_db();

        insert_animal(&mut conn, &new_animal("Rex", Species::Dog, "sit")).unwrap();
        conn.execute(
            "INSERT INTO animals (name, birth_date, commands) VALUES ('???', '2020-01-01', '')",
            [],
        )
        .unwrap();
        let bad_id = conn.last_insert_rowid();
        conn.execute(
            "INSERT INTO domestic_animals (animal_id, type) VALUES (?1, 'Неизвестно')",
            params![bad_id],
        )
        .unwrap();

        let animals = load_animals(&conn).unwrap();
        assert_eq!(animals.len(), 1);
        assert_eq!(animals[0].name, "Rex");
    }

    #[test]
    fn test_load_skips_label_in_wrong_category_table() {
        let conn = open_test_db();

        // A horse label filed under the domestic side table.
        conn.execute(
            "INSERT INTO animals (name, birth_date, commands) VALUES ('Misfiled', '2020-01-01', '')",
            [],
        )
        .unwrap();
        let id = conn.last_insert_rowid();
        conn.execute(
            "INSERT INTO domestic_animals (animal_id, type) VALUES (?1, 'Лошадь')",
            params![id],
        )
        .unwrap();

        assert!(load_animals(&conn).unwrap().is_empty());
    }

    #[test]
    fn test_insert_is_transactional() {
        let mut conn = open_test_db();

        // Force the side insert to fail; the base row must not survive.
        conn.execute("DROP TABLE pack_animals", []).unwrap();
        let err = insert_animal(&mut conn, &new_animal("Орлик", Species::Horse, "")).unwrap_err();
        assert!(matches!(err, RegistryError::Statement(_)));

        let base_rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM animals", [], |row| row.get(0))
            .unwrap();
        assert_eq!(base_rows, 0);
    }

    #[test]
    fn test_update_commands_touches_base_row_only() {
        let mut conn = open_test_db();

        let id = insert_animal(&mut conn, &new_animal("Rex", Species::Dog, "sit, stay")).unwrap();
        update_commands(&conn, id, &CommandLog::parse("fetch, roll over")).unwrap();

        let animals = load_animals(&conn).unwrap();
        assert_eq!(animals.len(), 1);
        assert_eq!(animals[0].commands.entries(), &["fetch", "roll over"]);
        assert_eq!(animals[0].name, "Rex");
        assert_eq!(animals[0].species, Species::Dog);
    }

    #[test]
    fn test_insert_rejects_empty_name_before_store_access() {
        let mut conn = open_test_db();

        let err = insert_animal(&mut conn, &new_animal("   ", Species::Dog, "")).unwrap_err();
        assert!(matches!(err, RegistryError::Validation(_)));

        let base_rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM animals", [], |row| row.get(0))
            .unwrap();
        assert_eq!(base_rows, 0);
    }

    #[test]
    fn test_update_commands_unknown_id_is_not_found() {
        let conn = open_test_db();
        let err = update_commands(&conn, 42, &CommandLog::parse("sit")).unwrap_err();
        assert!(matches!(err, RegistryError::NotFound(42)));
    }

    #[test]
    fn test_store_round_trip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path().join("animals.db")).unwrap();

        let id = store
            .insert_animal(&new_animal("Бим", Species::Cat, "мяу"))
            .unwrap();

        let animals = store.load_animals().unwrap();
        assert_eq!(animals.len(), 1);
        assert_eq!(animals[0].id, id);
        assert_eq!(animals[0].species, Species::Cat);

        let mut commands = animals[0].commands.clone();
        commands.append("кис-кис");
        store.update_commands(id, &commands).unwrap();

        let reloaded = store.load_animals().unwrap();
        assert_eq!(reloaded[0].commands.entries(), &["мяу", "кис-кис"]);
    }

    #[test]
    fn test_store_open_bad_path_is_connection_error() {
        let err = Store::open("/definitely/not/a/real/dir/animals.db").unwrap_err();
        assert!(matches!(err, RegistryError::Connection(_)));
    }
}
