//! Mapping between incident row shapes and the `attacks` columns they read.

use gtd_map_incident_models::{Incident, MapIncident, SearchIncident};
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::Row;

use crate::DbError;

/// A column of the `attacks` table and how it is read.
///
/// Numeric columns are normalized in SQL: values that are missing or not
/// stored as numbers come back as `NULL` instead of failing conversion or
/// being coerced to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    /// Free-text column, read as-is.
    Text(&'static str),
    /// Integer column.
    Integer(&'static str),
    /// Floating point column.
    Real(&'static str),
}

impl Column {
    /// The column name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Text(name) | Self::Integer(name) | Self::Real(name) => name,
        }
    }

    /// The `SELECT` list expression for this column, aliased back to the
    /// column's own name.
    #[must_use]
    pub fn select_expr(self) -> String {
        match self {
            Self::Text(name) => name.to_string(),
            Self::Integer(name) => numeric_expr(name, "INTEGER"),
            Self::Real(name) => numeric_expr(name, "REAL"),
        }
    }
}

fn numeric_expr(name: &str, ty: &str) -> String {
    format!("CASE WHEN typeof({name}) IN ('integer', 'real') THEN CAST({name} AS {ty}) END AS {name}")
}

/// Renders a `SELECT` list from a column set.
#[must_use]
pub fn select_list(columns: &[Column]) -> String {
    columns
        .iter()
        .map(|c| c.select_expr())
        .collect::<Vec<_>>()
        .join(", ")
}

/// A row shape that can be read from the `attacks` table.
pub trait IncidentProjection: Sized {
    /// Columns this projection selects.
    const COLUMNS: &'static [Column];

    /// Converts one result row.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Conversion`] if the row has no usable `eventid`.
    fn from_row(row: &Row) -> Result<Self, DbError>;
}

/// Reads an optional cell, treating an unreadable value as unknown.
fn cell<T, E: std::fmt::Display>(value: Result<Option<T>, E>, column: &str) -> Option<T> {
    value.unwrap_or_else(|e| {
        log::debug!("Treating unreadable {column} value as unknown: {e}");
        None
    })
}

fn eventid(row: &Row) -> Result<i64, DbError> {
    let id: Option<i64> = cell(row.to_value("eventid"), "eventid");
    id.ok_or_else(|| DbError::Conversion {
        message: "Incident row has no eventid".to_string(),
    })
}

fn year(row: &Row) -> Option<i32> {
    let year: Option<i64> = cell(row.to_value("iyear"), "iyear");
    year.and_then(|y| i32::try_from(y).ok())
}

impl IncidentProjection for Incident {
    const COLUMNS: &'static [Column] = &[
        Column::Integer("eventid"),
        Column::Integer("iyear"),
        Column::Real("latitude"),
        Column::Real("longitude"),
        Column::Text("country_txt"),
        Column::Text("gname"),
        Column::Text("attacktype1_txt"),
        Column::Text("weaptype1_txt"),
        Column::Text("targtype1_txt"),
        Column::Integer("nkill"),
        Column::Integer("nwound"),
        Column::Text("summary"),
        Column::Text("motive"),
    ];

    fn from_row(row: &Row) -> Result<Self, DbError> {
        Ok(Self {
            eventid: eventid(row)?,
            iyear: year(row),
            latitude: cell(row.to_value("latitude"), "latitude"),
            longitude: cell(row.to_value("longitude"), "longitude"),
            country_txt: cell(row.to_value("country_txt"), "country_txt"),
            gname: cell(row.to_value("gname"), "gname"),
            attacktype1_txt: cell(row.to_value("attacktype1_txt"), "attacktype1_txt"),
            weaptype1_txt: cell(row.to_value("weaptype1_txt"), "weaptype1_txt"),
            targtype1_txt: cell(row.to_value("targtype1_txt"), "targtype1_txt"),
            nkill: cell(row.to_value("nkill"), "nkill"),
            nwound: cell(row.to_value("nwound"), "nwound"),
            summary: cell(row.to_value("summary"), "summary"),
            motive: cell(row.to_value("motive"), "motive"),
        })
    }
}

impl IncidentProjection for MapIncident {
    const COLUMNS: &'static [Column] = &[
        Column::Integer("eventid"),
        Column::Real("latitude"),
        Column::Real("longitude"),
        Column::Integer("iyear"),
        Column::Text("country_txt"),
        Column::Text("gname"),
        Column::Integer("nkill"),
    ];

    fn from_row(row: &Row) -> Result<Self, DbError> {
        Ok(Self {
            eventid: eventid(row)?,
            latitude: cell(row.to_value("latitude"), "latitude"),
            longitude: cell(row.to_value("longitude"), "longitude"),
            iyear: year(row),
            country_txt: cell(row.to_value("country_txt"), "country_txt"),
            gname: cell(row.to_value("gname"), "gname"),
            nkill: cell(row.to_value("nkill"), "nkill"),
        })
    }
}

impl IncidentProjection for SearchIncident {
    const COLUMNS: &'static [Column] = &[
        Column::Integer("eventid"),
        Column::Integer("iyear"),
        Column::Text("country_txt"),
        Column::Text("attacktype1_txt"),
        Column::Text("weaptype1_txt"),
        Column::Integer("nkill"),
        Column::Text("gname"),
    ];

    fn from_row(row: &Row) -> Result<Self, DbError> {
        Ok(Self {
            eventid: eventid(row)?,
            iyear: year(row),
            country_txt: cell(row.to_value("country_txt"), "country_txt"),
            attacktype1_txt: cell(row.to_value("attacktype1_txt"), "attacktype1_txt"),
            weaptype1_txt: cell(row.to_value("weaptype1_txt"), "weaptype1_txt"),
            nkill: cell(row.to_value("nkill"), "nkill"),
            gname: cell(row.to_value("gname"), "gname"),
        })
    }
}
