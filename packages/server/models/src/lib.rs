#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the GTD map server.
//!
//! Query-string parameters are accepted as raw strings and coerced here.
//! Anything that does not parse is treated as absent (or as the default
//! for pagination) rather than rejected: the browser routinely sends
//! half-initialized state, such as a map viewport that has not loaded yet.

use gtd_map_database_models::{BoundingBox, IncidentFilter, Pagination};
use serde::{Deserialize, Serialize};

/// Response header carrying the unpaginated match count.
pub const TOTAL_COUNT_HEADER: &str = "x-total-count";

/// Response header carrying the effective (clamped) page number.
pub const PAGE_HEADER: &str = "x-page";

/// Response header carrying the effective (clamped) page size.
pub const PAGE_SIZE_HEADER: &str = "x-page-size";

/// Query parameters shared by the incident list endpoints.
///
/// `victims` and `nkill` are two names for the same minimum kill count;
/// `victims` wins when both are present.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentQueryParams {
    /// Single-incident lookup by `eventid`.
    pub id: Option<String>,
    /// Exact year.
    pub year: Option<String>,
    /// Exact country name.
    pub country: Option<String>,
    /// Exact perpetrator group name.
    pub group: Option<String>,
    /// Exact attack type label.
    pub attack_type: Option<String>,
    /// Exact weapon type label.
    pub weapon_type: Option<String>,
    /// Minimum kill count.
    pub victims: Option<String>,
    /// Minimum kill count (search page spelling).
    pub nkill: Option<String>,
    /// Bounding box as `minLon,minLat,maxLon,maxLat`.
    pub bbox: Option<String>,
    /// 1-based page number.
    pub page: Option<String>,
    /// Page size.
    pub limit: Option<String>,
}

impl IncidentQueryParams {
    /// Builds the parameters from raw `key=value` pairs.
    ///
    /// A repeated key keeps its first value, and unknown keys are ignored,
    /// so one odd pair never discards the rest of the query.
    #[must_use]
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut params = Self::default();

        for (key, value) in pairs {
            let slot = match key.as_ref() {
                "id" => &mut params.id,
                "year" => &mut params.year,
                "country" => &mut params.country,
                "group" => &mut params.group,
                "attackType" => &mut params.attack_type,
                "weaponType" => &mut params.weapon_type,
                "victims" => &mut params.victims,
                "nkill" => &mut params.nkill,
                "bbox" => &mut params.bbox,
                "page" => &mut params.page,
                "limit" => &mut params.limit,
                _ => continue,
            };

            if slot.is_none() {
                *slot = Some(value.into());
            }
        }

        params
    }

    /// The identifier requested via `id`, if it parses.
    #[must_use]
    pub fn event_id(&self) -> Option<i64> {
        self.id.as_deref().and_then(parse_int)
    }

    /// Builds the row filter, dropping anything malformed.
    #[must_use]
    pub fn filter(&self) -> IncidentFilter {
        let min_kills = self
            .victims
            .as_deref()
            .or(self.nkill.as_deref())
            .and_then(parse_int)
            .map_or(0, |n| u32::try_from(n.max(0)).unwrap_or(u32::MAX));

        IncidentFilter {
            year: self
                .year
                .as_deref()
                .and_then(parse_int)
                .and_then(|y| i32::try_from(y).ok()),
            country: non_empty(self.country.as_deref()),
            group: non_empty(self.group.as_deref()),
            attack_type: non_empty(self.attack_type.as_deref()),
            weapon_type: non_empty(self.weapon_type.as_deref()),
            min_kills,
            bbox: self.bbox.as_deref().and_then(BoundingBox::parse),
        }
    }

    /// Builds the clamped pagination, using `default_size` when `limit` is
    /// missing or malformed.
    #[must_use]
    pub fn pagination(&self, default_size: u64) -> Pagination {
        let page = self.page.as_deref().and_then(parse_int).unwrap_or(1);
        let size = self
            .limit
            .as_deref()
            .and_then(parse_int)
            .unwrap_or_else(|| i64::try_from(default_size).unwrap_or(i64::MAX));

        Pagination::new(page, size)
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(ToString::to_string)
}

/// Parses the leading integer of `s`, ignoring leading whitespace and any
/// trailing garbage (`"12abc"` is `12`). Values too large for `i64`
/// saturate. Returns `None` when there are no leading digits.
#[must_use]
pub fn parse_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let magnitude = digits[..end].bytes().fold(0i64, |acc, b| {
        acc.saturating_mul(10).saturating_add(i64::from(b - b'0'))
    });

    Some(if negative { -magnitude } else { magnitude })
}

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

/// Body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Human-readable message. Never includes store internals.
    pub error: String,
}

impl ApiError {
    /// Creates an error body with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
