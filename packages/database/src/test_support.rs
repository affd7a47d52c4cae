//! Throwaway `SQLite` stores seeded with hand-written incidents.

use std::path::Path;

use switchy_database::{Database, DatabaseValue};
use switchy_database_connection::init_sqlite_rusqlite;
use tempfile::TempDir;

const SCHEMA: &str = "CREATE TABLE attacks (
    eventid INTEGER PRIMARY KEY,
    iyear INTEGER,
    latitude REAL,
    longitude REAL,
    country_txt TEXT,
    gname TEXT,
    attacktype1_txt TEXT,
    weaptype1_txt TEXT,
    targtype1_txt TEXT,
    nkill REAL,
    nwound REAL,
    summary TEXT,
    motive TEXT
)";

enum Kills {
    Unknown,
    Number(f64),
    Raw(&'static str),
}

/// One incident to seed.
pub struct Fixture {
    id: i64,
    year: i64,
    country: &'static str,
    group: Option<&'static str>,
    attack: Option<&'static str>,
    weapon: Option<&'static str>,
    location: Option<(f64, f64)>,
    kills: Kills,
}

impl Fixture {
    pub const fn new(id: i64, year: i64, country: &'static str) -> Self {
        Self {
            id,
            year,
            country,
            group: None,
            attack: None,
            weapon: None,
            location: None,
            kills: Kills::Unknown,
        }
    }

    pub fn kills(mut self, kills: f64) -> Self {
        self.kills = Kills::Number(kills);
        self
    }

    pub fn raw_kills(mut self, raw: &'static str) -> Self {
        self.kills = Kills::Raw(raw);
        self
    }

    pub fn group(mut self, group: &'static str) -> Self {
        self.group = Some(group);
        self
    }

    pub fn attack(mut self, attack: &'static str) -> Self {
        self.attack = Some(attack);
        self
    }

    pub fn weapon(mut self, weapon: &'static str) -> Self {
        self.weapon = Some(weapon);
        self
    }

    pub fn at(mut self, longitude: f64, latitude: f64) -> Self {
        self.location = Some((longitude, latitude));
        self
    }
}

/// A store in its own temporary directory, removed on drop.
pub struct TestDb {
    db: Box<dyn Database>,
    dir: TempDir,
}

impl TestDb {
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }
}

impl AsRef<dyn Database> for TestDb {
    fn as_ref(&self) -> &(dyn Database + 'static) {
        self.db.as_ref()
    }
}

fn text(value: Option<&str>) -> DatabaseValue {
    value.map_or(DatabaseValue::Null, |v| DatabaseValue::String(v.to_string()))
}

/// A fresh store with no tables.
pub fn empty_db() -> TestDb {
    let dir = tempfile::tempdir().unwrap();
    let db = init_sqlite_rusqlite(Some(&dir.path().join("gtd.db"))).unwrap();
    TestDb { db, dir }
}

/// A fresh store with an `attacks` table holding `fixtures`, inserted in
/// order.
pub async fn seeded_db(fixtures: &[Fixture]) -> TestDb {
    let store = empty_db();
    let db = store.as_ref();
    db.exec_raw(SCHEMA).await.unwrap();

    for f in fixtures {
        let kills = match f.kills {
            Kills::Unknown => DatabaseValue::Null,
            Kills::Number(n) => DatabaseValue::Real64(n),
            Kills::Raw(raw) => DatabaseValue::String(raw.to_string()),
        };

        db.exec_raw_params(
            "INSERT INTO attacks (
                eventid, iyear, longitude, latitude, country_txt, gname,
                attacktype1_txt, weaptype1_txt, nkill
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
            &[
                DatabaseValue::Int64(f.id),
                DatabaseValue::Int64(f.year),
                f.location
                    .map_or(DatabaseValue::Null, |(lon, _)| DatabaseValue::Real64(lon)),
                f.location
                    .map_or(DatabaseValue::Null, |(_, lat)| DatabaseValue::Real64(lat)),
                DatabaseValue::String(f.country.to_string()),
                text(f.group),
                text(f.attack),
                text(f.weapon),
                kills,
            ],
        )
        .await
        .unwrap();
    }

    store
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_directory_is_removed_on_drop() {
        let store = empty_db();
        let dir = store.dir().to_path_buf();
        assert!(dir.join("gtd.db").exists());

        drop(store);
        assert!(!dir.exists());
    }
}
