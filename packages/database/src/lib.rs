#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Read-only access to the GTD incident store.
//!
//! Uses `switchy_database` over the pre-built `SQLite` file holding the
//! `attacks` table. The application never writes to it: every function
//! here issues parameterized `SELECT`s built from an
//! [`gtd_map_database_models::IncidentFilter`], and both the page query and
//! the count query are derived from one [`filter::FilterClause`] so they
//! can never disagree about which rows match.

pub mod db;
pub mod export;
pub mod filter;
pub mod projection;
pub mod queries;

#[cfg(test)]
pub(crate) mod test_support;

use std::path::PathBuf;

/// Errors that can occur during incident store operations.
///
/// Callers treat every variant the same way: the operation failed and
/// produced no partial result.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// Database query error.
    #[error("Database error: {0}")]
    Database(#[from] switchy_database::DatabaseError),

    /// The store could not be opened.
    #[error("Failed to open incident database: {0}")]
    Connection(String),

    /// The store file does not exist.
    #[error("Incident database not found at {}", path.display())]
    MissingStore {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// Data conversion error.
    #[error("Data conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },

    /// CSV serialization error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
