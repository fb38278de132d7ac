//! Schema and row-level queries.
//!
//! Every function takes a plain [`Connection`] so the same code runs inside
//! and outside a transaction.

use super::connection::sql_error;
use crate::storage::records::{
    FavoriteFilmRecord, FavoritePersonRecord, SelectedFilterRecord, decode_list, decode_set,
    encode_list,
};
use crate::{Error, Result};
use rusqlite::{Connection, OptionalExtension, Row, params};

/// Current schema version.
pub const SCHEMA_VERSION: i64 = 1;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS schema_version (
        version INTEGER NOT NULL
    );
    CREATE TABLE IF NOT EXISTS favorite_films (
        id TEXT PRIMARY KEY NOT NULL,
        title TEXT NOT NULL,
        description TEXT NOT NULL,
        director TEXT NOT NULL,
        producer TEXT NOT NULL,
        release_date TEXT NOT NULL,
        running_time TEXT NOT NULL,
        rt_score TEXT NOT NULL,
        people_urls TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS favorite_people (
        id TEXT PRIMARY KEY NOT NULL,
        name TEXT NOT NULL,
        film_ids TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS selected_filters (
        id TEXT PRIMARY KEY NOT NULL,
        name TEXT NOT NULL,
        kind TEXT NOT NULL
    );
";

const FILM_COLUMNS: &str =
    "id, title, description, director, producer, release_date, running_time, rt_score, people_urls";

/// Creates missing tables and records the schema version.
pub(super) fn initialize(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA).map_err(sql_error("create_schema"))?;
    conn.execute(
        "INSERT INTO schema_version (version)
         SELECT ?1 WHERE NOT EXISTS (SELECT 1 FROM schema_version)",
        params![SCHEMA_VERSION],
    )
    .map_err(sql_error("record_schema_version"))?;

    let version: i64 = conn
        .query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))
        .map_err(sql_error("read_schema_version"))?;
    if version > SCHEMA_VERSION {
        return Err(Error::OperationFailed {
            operation: "open_local_store".to_string(),
            cause: format!("database schema version {version} is newer than {SCHEMA_VERSION}"),
        });
    }
    Ok(())
}

/// Counter that changes whenever another connection commits to the database.
pub(super) fn data_version(conn: &Connection) -> Result<i64> {
    conn.query_row("PRAGMA data_version", [], |row| row.get(0))
        .map_err(sql_error("read_data_version"))
}

fn film_from_row(row: &Row<'_>) -> rusqlite::Result<FavoriteFilmRecord> {
    let people_urls: String = row.get(8)?;
    Ok(FavoriteFilmRecord {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        director: row.get(3)?,
        producer: row.get(4)?,
        release_date: row.get(5)?,
        running_time: row.get(6)?,
        rt_score: row.get(7)?,
        people_references: decode_list(&people_urls),
    })
}

fn person_from_row(row: &Row<'_>) -> rusqlite::Result<FavoritePersonRecord> {
    let film_ids: String = row.get(2)?;
    Ok(FavoritePersonRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        film_ids: decode_set(&film_ids),
    })
}

fn filter_from_row(row: &Row<'_>) -> rusqlite::Result<SelectedFilterRecord> {
    Ok(SelectedFilterRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        kind: row.get(2)?,
    })
}

pub(super) fn upsert_film(conn: &Connection, film: &FavoriteFilmRecord) -> Result<()> {
    conn.execute(
        &format!(
            "INSERT OR REPLACE INTO favorite_films ({FILM_COLUMNS}) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
        ),
        params![
            film.id,
            film.title,
            film.description,
            film.director,
            film.producer,
            film.release_date,
            film.running_time,
            film.rt_score,
            encode_list(&film.people_references),
        ],
    )
    .map_err(sql_error("upsert_favorite_film"))?;
    Ok(())
}

pub(super) fn find_film(conn: &Connection, id: &str) -> Result<Option<FavoriteFilmRecord>> {
    conn.query_row(
        &format!("SELECT {FILM_COLUMNS} FROM favorite_films WHERE id = ?1"),
        params![id],
        film_from_row,
    )
    .optional()
    .map_err(sql_error("read_favorite_film"))
}

pub(super) fn all_films(conn: &Connection) -> Result<Vec<FavoriteFilmRecord>> {
    let mut stmt = conn
        .prepare(&format!("SELECT {FILM_COLUMNS} FROM favorite_films ORDER BY id"))
        .map_err(sql_error("read_favorite_films"))?;
    let rows = stmt
        .query_map([], film_from_row)
        .map_err(sql_error("read_favorite_films"))?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .map_err(sql_error("read_favorite_films"))
}

pub(super) fn remove_film(conn: &Connection, id: &str) -> Result<()> {
    conn.execute("DELETE FROM favorite_films WHERE id = ?1", params![id])
        .map_err(sql_error("delete_favorite_film"))?;
    Ok(())
}

pub(super) fn upsert_person(conn: &Connection, person: &FavoritePersonRecord) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO favorite_people (id, name, film_ids) VALUES (?1, ?2, ?3)",
        params![person.id, person.name, encode_list(&person.film_ids)],
    )
    .map_err(sql_error("upsert_favorite_person"))?;
    Ok(())
}

pub(super) fn find_person(conn: &Connection, id: &str) -> Result<Option<FavoritePersonRecord>> {
    conn.query_row(
        "SELECT id, name, film_ids FROM favorite_people WHERE id = ?1",
        params![id],
        person_from_row,
    )
    .optional()
    .map_err(sql_error("read_favorite_person"))
}

pub(super) fn all_people(conn: &Connection) -> Result<Vec<FavoritePersonRecord>> {
    let mut stmt = conn
        .prepare("SELECT id, name, film_ids FROM favorite_people ORDER BY id")
        .map_err(sql_error("read_favorite_people"))?;
    let rows = stmt
        .query_map([], person_from_row)
        .map_err(sql_error("read_favorite_people"))?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .map_err(sql_error("read_favorite_people"))
}

pub(super) fn remove_person(conn: &Connection, id: &str) -> Result<()> {
    conn.execute("DELETE FROM favorite_people WHERE id = ?1", params![id])
        .map_err(sql_error("delete_favorite_person"))?;
    Ok(())
}

pub(super) fn upsert_filter(conn: &Connection, filter: &SelectedFilterRecord) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO selected_filters (id, name, kind) VALUES (?1, ?2, ?3)",
        params![filter.id, filter.name, filter.kind],
    )
    .map_err(sql_error("upsert_selected_filter"))?;
    Ok(())
}

pub(super) fn all_filters(conn: &Connection) -> Result<Vec<SelectedFilterRecord>> {
    let mut stmt = conn
        .prepare("SELECT id, name, kind FROM selected_filters ORDER BY id")
        .map_err(sql_error("read_selected_filters"))?;
    let rows = stmt
        .query_map([], filter_from_row)
        .map_err(sql_error("read_selected_filters"))?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .map_err(sql_error("read_selected_filters"))
}

pub(super) fn remove_filter(conn: &Connection, id: &str) -> Result<()> {
    conn.execute("DELETE FROM selected_filters WHERE id = ?1", params![id])
        .map_err(sql_error("delete_selected_filter"))?;
    Ok(())
}

pub(super) fn remove_all_filters(conn: &Connection) -> Result<()> {
    conn.execute("DELETE FROM selected_filters", [])
        .map_err(sql_error("delete_selected_filters"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let conn = conn();
        initialize(&conn).unwrap();
        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn test_newer_schema_is_rejected() {
        let conn = conn();
        conn.execute("UPDATE schema_version SET version = 99", [])
            .unwrap();
        assert!(matches!(
            initialize(&conn),
            Err(Error::OperationFailed { .. })
        ));
    }

    #[test]
    fn test_film_with_no_people_round_trips() {
        let conn = conn();
        let film = FavoriteFilmRecord {
            id: "f1".to_string(),
            title: "Only Yesterday".to_string(),
            description: "-".to_string(),
            director: "Isao Takahata".to_string(),
            producer: "Toshio Suzuki".to_string(),
            release_date: "1991".to_string(),
            running_time: "118".to_string(),
            rt_score: "100".to_string(),
            people_references: Vec::new(),
        };
        upsert_film(&conn, &film).unwrap();

        let stored: String = conn
            .query_row("SELECT people_urls FROM favorite_films", [], |row| row.get(0))
            .unwrap();
        assert_eq!(stored, "");
        assert_eq!(find_film(&conn, "f1").unwrap(), Some(film));
        assert_eq!(find_film(&conn, "missing").unwrap(), None);
    }
}
