//! CSV export of full incident records.

use std::io::Write;

use gtd_map_database_models::{IncidentFilter, Pagination, SIZE_MAX};
use gtd_map_incident_models::Incident;
use switchy_database::Database;

use crate::DbError;
use crate::filter::FilterClause;
use crate::projection::IncidentProjection as _;
use crate::queries::{count_matching, fetch_page};

/// Writes every incident matching `filter` to `writer` as CSV, with a
/// header row of column names. Unknown values become empty cells.
///
/// Rows are read in pages of [`SIZE_MAX`] through the same filter clause
/// the API uses. Returns the number of records written.
///
/// # Errors
///
/// Returns [`DbError`] if a query fails or the output cannot be written.
pub async fn export_csv<W: Write>(
    db: &dyn Database,
    filter: &IncidentFilter,
    writer: W,
) -> Result<u64, DbError> {
    let clause = FilterClause::new(filter);
    let total = count_matching(db, &clause).await?;

    log::info!("Exporting {total} incidents");

    let mut wtr = csv::Writer::from_writer(writer);
    let mut pagination = Pagination::first(SIZE_MAX);
    let mut written = 0u64;

    while !pagination.is_beyond(total) {
        let rows: Vec<Incident> = fetch_page(db, &clause, pagination).await?;
        if rows.is_empty() {
            break;
        }

        for row in &rows {
            wtr.serialize(row)?;
        }
        written += rows.len() as u64;

        log::debug!("Exported {written}/{total} incidents");

        let next = pagination.next();
        if next == pagination {
            break;
        }
        pagination = next;
    }

    if written == 0 {
        wtr.write_record(Incident::COLUMNS.iter().map(|c| c.name()))?;
    }

    wtr.flush()?;

    Ok(written)
}
