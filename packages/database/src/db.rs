//! Incident store connection utilities.

use std::path::{Path, PathBuf};

use switchy_database::Database;
use switchy_database_connection::init_sqlite_rusqlite;

use crate::DbError;

/// Default location of the GTD `SQLite` file.
pub const DEFAULT_DB_PATH: &str = "data/gtd.db";

/// Resolves the store path from the `GTD_DB_PATH` environment variable,
/// falling back to [`DEFAULT_DB_PATH`].
#[must_use]
pub fn db_path_from_env() -> PathBuf {
    std::env::var("GTD_DB_PATH").map_or_else(|_| PathBuf::from(DEFAULT_DB_PATH), PathBuf::from)
}

/// Opens the incident store at `path`.
///
/// The file must already exist. Opening a missing path would silently
/// create an empty database, which would then answer every query with
/// zero rows.
///
/// # Errors
///
/// Returns [`DbError::MissingStore`] if the file does not exist, or
/// [`DbError::Connection`] if `SQLite` fails to open it.
pub fn open(path: &Path) -> Result<Box<dyn Database>, DbError> {
    if !path.is_file() {
        return Err(DbError::MissingStore {
            path: path.to_path_buf(),
        });
    }

    log::debug!("Opening incident database at {}", path.display());

    init_sqlite_rusqlite(Some(path)).map_err(|e| DbError::Connection(e.to_string()))
}

/// Opens the incident store at the path given by [`db_path_from_env`].
///
/// # Errors
///
/// See [`open`].
pub fn open_from_env() -> Result<Box<dyn Database>, DbError> {
    open(&db_path_from_env())
}
