//! Database query functions for incident data.
//!
//! All queries are raw, parameterized `SELECT`s issued through
//! `query_raw_params()`. Filtering goes through [`FilterClause`]; column
//! names interpolated into SQL only ever come from [`IncidentField`] or a
//! projection's fixed column set.

use std::collections::BTreeMap;

use gtd_map_database_models::{IncidentFilter, IncidentPage, Pagination, Summary};
use gtd_map_incident_models::{FilterValue, Incident, IncidentField};
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue, Row};

use crate::DbError;
use crate::filter::{FilterClause, NKILL_EXPR};
use crate::projection::{IncidentProjection, select_list};

/// Queries one page of incidents matching `filter`, plus the total number
/// of matching rows.
///
/// The count runs first. When the page starts at or beyond that count the
/// page query is skipped and an empty page is returned with the total still
/// populated, so callers can step back to the last valid page.
///
/// # Errors
///
/// Returns [`DbError`] if either database operation fails.
pub async fn query_incidents<T: IncidentProjection>(
    db: &dyn Database,
    filter: &IncidentFilter,
    pagination: Pagination,
) -> Result<IncidentPage<T>, DbError> {
    let clause = FilterClause::new(filter);

    let total_count = count_matching(db, &clause).await?;

    let rows = if pagination.is_beyond(total_count) {
        log::debug!(
            "Page {} (size {}) is past the {total_count} matching incidents",
            pagination.page(),
            pagination.page_size(),
        );
        Vec::new()
    } else {
        fetch_page(db, &clause, pagination).await?
    };

    Ok(IncidentPage {
        rows,
        total_count,
        pagination,
    })
}

/// Counts the incidents matching `filter`.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn count_incidents(db: &dyn Database, filter: &IncidentFilter) -> Result<u64, DbError> {
    count_matching(db, &FilterClause::new(filter)).await
}

pub(crate) async fn count_matching(db: &dyn Database, clause: &FilterClause) -> Result<u64, DbError> {
    let (sql, params) = clause.count_query();
    let rows = db.query_raw_params(&sql, &params).await?;

    let total: i64 = rows
        .first()
        .ok_or_else(|| DbError::Conversion {
            message: "Count query returned no rows".to_string(),
        })?
        .to_value("total")
        .map_err(|e| DbError::Conversion {
            message: format!("Failed to parse incident count: {e}"),
        })?;

    to_count(total)
}

pub(crate) async fn fetch_page<T: IncidentProjection>(
    db: &dyn Database,
    clause: &FilterClause,
    pagination: Pagination,
) -> Result<Vec<T>, DbError> {
    let (sql, params) = clause.page_query(&select_list(T::COLUMNS), pagination);
    let rows = db.query_raw_params(&sql, &params).await?;

    rows.iter().map(T::from_row).collect()
}

/// Looks up the full record for a single incident.
///
/// Returns `None` when no incident has this identifier.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn get_incident(db: &dyn Database, eventid: i64) -> Result<Option<Incident>, DbError> {
    let sql = format!(
        "SELECT {} FROM attacks WHERE eventid = $1 LIMIT 1",
        select_list(Incident::COLUMNS)
    );
    let rows = db
        .query_raw_params(&sql, &[DatabaseValue::Int64(eventid)])
        .await?;

    rows.first().map(Incident::from_row).transpose()
}

/// Returns the distinct values of `field`, ascending.
///
/// `NULL` and empty values are left out. Years are returned as integers
/// sorted numerically; labels are sorted bytewise.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn distinct_values(
    db: &dyn Database,
    field: IncidentField,
) -> Result<Vec<FilterValue>, DbError> {
    let column = field.column();

    let sql = if field.is_numeric() {
        format!(
            "SELECT DISTINCT CAST({column} AS INTEGER) AS value FROM attacks
             WHERE typeof({column}) IN ('integer', 'real')
             ORDER BY value ASC"
        )
    } else {
        format!(
            "SELECT DISTINCT CAST({column} AS TEXT) AS value FROM attacks
             WHERE {column} IS NOT NULL AND CAST({column} AS TEXT) <> ''
             ORDER BY value ASC"
        )
    };

    let rows = db.query_raw_params(&sql, &[]).await?;

    let mut values = Vec::with_capacity(rows.len());
    for row in &rows {
        let value = if field.is_numeric() {
            row.to_value::<i64>("value").map(FilterValue::Integer)
        } else {
            row.to_value::<String>("value").map(FilterValue::Text)
        };

        match value {
            Ok(v) => values.push(v),
            Err(e) => log::warn!("Skipping unreadable {field} value: {e}"),
        }
    }

    Ok(values)
}

/// Runs [`distinct_values`] for each field, keyed by
/// [`IncidentField::options_key`].
///
/// # Errors
///
/// Returns [`DbError`] if any of the queries fail.
pub async fn filter_options(
    db: &dyn Database,
    fields: &[IncidentField],
) -> Result<BTreeMap<&'static str, Vec<FilterValue>>, DbError> {
    let mut options = BTreeMap::new();
    for field in fields {
        options.insert(field.options_key(), distinct_values(db, *field).await?);
    }
    Ok(options)
}

/// Computes aggregate statistics over the incidents matching `filter`.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn summarize(db: &dyn Database, filter: &IncidentFilter) -> Result<Summary, DbError> {
    let clause = FilterClause::new(filter);

    let totals_sql = format!(
        "SELECT COUNT(*) AS total,
                COALESCE(SUM(COALESCE({NKILL_EXPR}, 0)), 0) AS deaths,
                COUNT(DISTINCT NULLIF(country_txt, '')) AS country_count,
                COUNT(DISTINCT NULLIF(gname, '')) AS group_count
         FROM attacks{}",
        clause.sql()
    );
    let rows = db.query_raw_params(&totals_sql, clause.params()).await?;
    let row = rows.first().ok_or_else(|| DbError::Conversion {
        message: "Summary query returned no rows".to_string(),
    })?;

    let per_year_sql = format!(
        "SELECT CAST(iyear AS INTEGER) AS year, COUNT(*) AS incidents
         FROM attacks{} AND typeof(iyear) IN ('integer', 'real')
         GROUP BY CAST(iyear AS INTEGER)
         ORDER BY year",
        clause.sql()
    );
    let year_rows = db.query_raw_params(&per_year_sql, clause.params()).await?;

    let mut per_year = BTreeMap::new();
    for year_row in &year_rows {
        let year: i64 = read_i64(year_row, "year")?;
        let Ok(year) = i32::try_from(year) else {
            log::warn!("Skipping out-of-range year {year} in summary");
            continue;
        };
        per_year.insert(year, to_count(read_i64(year_row, "incidents")?)?);
    }

    Ok(Summary {
        total: to_count(read_i64(row, "total")?)?,
        deaths: read_i64(row, "deaths")?,
        countries: to_count(read_i64(row, "country_count")?)?,
        groups: to_count(read_i64(row, "group_count")?)?,
        per_year,
    })
}

fn read_i64(row: &Row, column: &str) -> Result<i64, DbError> {
    row.to_value(column).map_err(|e| DbError::Conversion {
        message: format!("Failed to parse {column}: {e}"),
    })
}

fn to_count(value: i64) -> Result<u64, DbError> {
    u64::try_from(value).map_err(|_| DbError::Conversion {
        message: format!("Negative count: {value}"),
    })
}
