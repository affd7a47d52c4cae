//! Translation of an [`IncidentFilter`] into a parameterized `WHERE` clause.
//!
//! [`FilterClause`] is the single source of truth for which rows match a
//! filter. The count query and the page query are both rendered from the
//! same clause, so the total reported alongside a page always describes
//! the rows that page was cut from.

use gtd_map_database_models::{IncidentFilter, Pagination};
use switchy_database::DatabaseValue;

/// Kill count as an integer, or `NULL` when the stored value is missing or
/// non-numeric.
pub const NKILL_EXPR: &str =
    "CASE WHEN typeof(nkill) IN ('integer', 'real') THEN CAST(nkill AS INTEGER) END";

/// A `WHERE` clause with its bound parameters.
///
/// Placeholders are numbered `$1..$n` in the order the parameters appear.
#[derive(Debug, Clone)]
pub struct FilterClause {
    sql: String,
    params: Vec<DatabaseValue>,
}

impl FilterClause {
    /// Builds the clause for `filter`.
    ///
    /// Absent filters add nothing. A `min_kills` of zero adds nothing either,
    /// so rows with an unknown kill count are kept.
    #[must_use]
    pub fn new(filter: &IncidentFilter) -> Self {
        let mut clause = Self {
            sql: String::from(" WHERE 1=1"),
            params: Vec::new(),
        };

        if let Some(year) = filter.year {
            clause.push_eq("iyear", DatabaseValue::Int64(i64::from(year)));
        }
        if let Some(country) = &filter.country {
            clause.push_eq("country_txt", DatabaseValue::String(country.clone()));
        }
        if let Some(group) = &filter.group {
            clause.push_eq("gname", DatabaseValue::String(group.clone()));
        }
        if let Some(attack_type) = &filter.attack_type {
            clause.push_eq(
                "attacktype1_txt",
                DatabaseValue::String(attack_type.clone()),
            );
        }
        if let Some(weapon_type) = &filter.weapon_type {
            clause.push_eq("weaptype1_txt", DatabaseValue::String(weapon_type.clone()));
        }

        if filter.min_kills > 0 {
            let idx = clause.next_index();
            clause
                .sql
                .push_str(&format!(" AND COALESCE({NKILL_EXPR}, 0) >= ${idx}"));
            clause
                .params
                .push(DatabaseValue::Int64(i64::from(filter.min_kills)));
        }

        if let Some(bbox) = &filter.bbox {
            let idx = clause.next_index();
            clause.sql.push_str(&format!(
                " AND latitude BETWEEN ${} AND ${} AND longitude BETWEEN ${} AND ${}",
                idx,
                idx + 1,
                idx + 2,
                idx + 3,
            ));
            clause.params.push(DatabaseValue::Real64(bbox.south));
            clause.params.push(DatabaseValue::Real64(bbox.north));
            clause.params.push(DatabaseValue::Real64(bbox.west));
            clause.params.push(DatabaseValue::Real64(bbox.east));
        }

        clause
    }

    fn push_eq(&mut self, column: &str, value: DatabaseValue) {
        let idx = self.next_index();
        self.sql.push_str(&format!(" AND {column} = ${idx}"));
        self.params.push(value);
    }

    /// Index of the next placeholder after this clause's own parameters.
    #[must_use]
    pub fn next_index(&self) -> usize {
        self.params.len() + 1
    }

    /// The rendered clause, starting with a space and `WHERE`.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Parameters bound to the clause's placeholders.
    #[must_use]
    pub fn params(&self) -> &[DatabaseValue] {
        &self.params
    }

    /// `SELECT COUNT(*) AS total` over the matching rows.
    #[must_use]
    pub fn count_query(&self) -> (String, Vec<DatabaseValue>) {
        (
            format!("SELECT COUNT(*) AS total FROM attacks{}", self.sql),
            self.params.clone(),
        )
    }

    /// `SELECT <columns>` over the matching rows, limited to one page.
    #[must_use]
    pub fn page_query(
        &self,
        columns: &str,
        pagination: Pagination,
    ) -> (String, Vec<DatabaseValue>) {
        let idx = self.next_index();
        let sql = format!(
            "SELECT {columns} FROM attacks{} LIMIT ${} OFFSET ${}",
            self.sql,
            idx,
            idx + 1,
        );

        let mut params = self.params.clone();
        params.push(DatabaseValue::Int64(to_sql_int(pagination.page_size())));
        params.push(DatabaseValue::Int64(to_sql_int(pagination.offset())));

        (sql, params)
    }
}

fn to_sql_int(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
