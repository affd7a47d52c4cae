#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Query parameter definitions and result shapes for the incident store.
//!
//! These types describe *what* to fetch. They carry the bounds that keep a
//! query cheap regardless of what the client asked for: page numbers and
//! page sizes are clamped on construction, and bounding boxes that do not
//! decompose into four finite coordinates never exist.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Largest page number honoured. Keeps `(page - 1) * size` far from overflow.
pub const PAGE_MAX: u64 = 10_000_000;

/// Server-enforced ceiling on rows per page.
pub const SIZE_MAX: u64 = 20_000;

/// Default page size for the map view.
pub const DEFAULT_MAP_PAGE_SIZE: u64 = 500;

/// Default page size for the search table.
pub const DEFAULT_SEARCH_PAGE_SIZE: u64 = 100;

/// A geographic bounding box in WGS84 coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Western longitude boundary.
    pub west: f64,
    /// Southern latitude boundary.
    pub south: f64,
    /// Eastern longitude boundary.
    pub east: f64,
    /// Northern latitude boundary.
    pub north: f64,
}

impl BoundingBox {
    /// Creates a new bounding box from the given coordinates.
    #[must_use]
    pub const fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// Parses `"minLon,minLat,maxLon,maxLat"`.
    ///
    /// Returns `None` unless the string holds exactly four comma-separated
    /// finite numbers. A partially valid box is never produced.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let mut coords = [0.0_f64; 4];
        let mut parts = s.split(',');

        for slot in &mut coords {
            let value: f64 = parts.next()?.trim().parse().ok()?;
            if !value.is_finite() {
                return None;
            }
            *slot = value;
        }

        if parts.next().is_some() {
            return None;
        }

        Some(Self::new(coords[0], coords[1], coords[2], coords[3]))
    }

    /// Whether the point lies inside the box, edges included.
    #[must_use]
    pub fn contains(&self, longitude: f64, latitude: f64) -> bool {
        (self.west..=self.east).contains(&longitude)
            && (self.south..=self.north).contains(&latitude)
    }
}

/// Equality and threshold filters applied to the `attacks` table.
///
/// Every `None` imposes no constraint. Text filters are exact,
/// case-sensitive matches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IncidentFilter {
    /// Exact year.
    pub year: Option<i32>,
    /// Exact `country_txt`.
    pub country: Option<String>,
    /// Exact `gname`.
    pub group: Option<String>,
    /// Exact `attacktype1_txt`.
    pub attack_type: Option<String>,
    /// Exact `weaptype1_txt`.
    pub weapon_type: Option<String>,
    /// Minimum kill count. Unknown counts compare as zero; `0` disables
    /// the predicate entirely.
    pub min_kills: u32,
    /// Spatial filter on `latitude`/`longitude`.
    pub bbox: Option<BoundingBox>,
}

impl IncidentFilter {
    /// Whether the filter constrains nothing.
    #[must_use]
    pub fn is_unconstrained(&self) -> bool {
        self == &Self::default()
    }
}

/// A clamped page request.
///
/// Construction always succeeds; out-of-range input is pulled back into
/// `[1, PAGE_MAX]` for the page and `[1, SIZE_MAX]` for the size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    page: u64,
    page_size: u64,
}

impl Pagination {
    /// Clamps the requested page number and page size.
    #[must_use]
    pub fn new(page: i64, page_size: i64) -> Self {
        Self {
            page: clamp_positive(page, PAGE_MAX),
            page_size: clamp_positive(page_size, SIZE_MAX),
        }
    }

    /// The first page with the given size.
    #[must_use]
    pub fn first(page_size: u64) -> Self {
        Self::new(1, i64::try_from(page_size).unwrap_or(i64::MAX))
    }

    /// Effective page number (1-based).
    #[must_use]
    pub const fn page(&self) -> u64 {
        self.page
    }

    /// Effective page size.
    #[must_use]
    pub const fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Number of matching rows skipped before this page begins.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.page - 1) * self.page_size
    }

    /// Whether this page starts at or past the end of `total` rows.
    #[must_use]
    pub const fn is_beyond(&self, total: u64) -> bool {
        self.offset() >= total
    }

    /// The last page that holds at least one of `total` rows, or page 1
    /// when there are none.
    #[must_use]
    pub const fn last_page(&self, total: u64) -> u64 {
        if total == 0 {
            1
        } else {
            total.div_ceil(self.page_size)
        }
    }

    /// The following page.
    #[must_use]
    pub fn next(&self) -> Self {
        Self {
            page: (self.page + 1).min(PAGE_MAX),
            page_size: self.page_size,
        }
    }
}

fn clamp_positive(value: i64, max: u64) -> u64 {
    u64::try_from(value).unwrap_or(0).clamp(1, max)
}

/// One page of query results plus the unpaginated match count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncidentPage<T> {
    /// Rows on this page, in store order.
    pub rows: Vec<T>,
    /// Number of rows matching the filter, independent of pagination.
    pub total_count: u64,
    /// The effective (clamped) pagination used.
    pub pagination: Pagination,
}

impl<T> IncidentPage<T> {
    /// Whether the requested page lies past the last matching row while
    /// the filter itself does match something.
    ///
    /// Callers should step back to [`Pagination::last_page`] instead of
    /// reporting "no results".
    #[must_use]
    pub const fn is_out_of_range(&self) -> bool {
        self.total_count > 0 && self.pagination.is_beyond(self.total_count)
    }
}

/// Aggregate statistics over the incidents matching a filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// Number of matching incidents.
    pub total: u64,
    /// Sum of kill counts, unknown counts taken as zero.
    pub deaths: i64,
    /// Number of distinct non-empty country names.
    pub countries: u64,
    /// Number of distinct non-empty group names.
    pub groups: u64,
    /// Incident count per year. Incidents without a year are omitted.
    pub per_year: BTreeMap<i32, u64>,
}
