#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Incident record types for the Global Terrorism Database.
//!
//! Field names deliberately mirror the column names of the `attacks` table
//! (`eventid`, `iyear`, `country_txt`, ...) because the browser frontend
//! consumes them as-is. Numeric severity fields are `Option`s: `None` means
//! the dataset recorded no usable value, which is displayed differently
//! from a recorded zero.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A full incident record, as returned by single-id lookups and exports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    /// Unique, stable event identifier.
    pub eventid: i64,
    /// Year the event occurred.
    pub iyear: Option<i32>,
    /// Latitude (WGS84). `None` when the location is unknown.
    pub latitude: Option<f64>,
    /// Longitude (WGS84). `None` when the location is unknown.
    pub longitude: Option<f64>,
    /// Country name.
    pub country_txt: Option<String>,
    /// Perpetrator group name.
    pub gname: Option<String>,
    /// Primary attack type label.
    pub attacktype1_txt: Option<String>,
    /// Primary weapon type label.
    pub weaptype1_txt: Option<String>,
    /// Primary target type label.
    pub targtype1_txt: Option<String>,
    /// Number of people killed, if known.
    pub nkill: Option<i64>,
    /// Number of people wounded, if known.
    pub nwound: Option<i64>,
    /// Free-text event summary.
    pub summary: Option<String>,
    /// Free-text motive description.
    pub motive: Option<String>,
}

/// The reduced field set used by the map view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapIncident {
    /// Unique event identifier.
    pub eventid: i64,
    /// Latitude, `None` when unknown.
    pub latitude: Option<f64>,
    /// Longitude, `None` when unknown.
    pub longitude: Option<f64>,
    /// Year the event occurred.
    pub iyear: Option<i32>,
    /// Country name.
    pub country_txt: Option<String>,
    /// Perpetrator group name.
    pub gname: Option<String>,
    /// Number of people killed, if known.
    pub nkill: Option<i64>,
}

impl MapIncident {
    /// Returns the `(longitude, latitude)` pair when both are known.
    ///
    /// Incidents without a location must be skipped when plotting rather
    /// than drawn at `0,0`.
    #[must_use]
    pub const fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.longitude, self.latitude) {
            (Some(lon), Some(lat)) => Some((lon, lat)),
            _ => None,
        }
    }
}

/// The reduced field set used by the search results table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchIncident {
    /// Unique event identifier.
    pub eventid: i64,
    /// Year the event occurred.
    pub iyear: Option<i32>,
    /// Country name.
    pub country_txt: Option<String>,
    /// Primary attack type label.
    pub attacktype1_txt: Option<String>,
    /// Primary weapon type label.
    pub weaptype1_txt: Option<String>,
    /// Number of people killed, if known.
    pub nkill: Option<i64>,
    /// Perpetrator group name.
    pub gname: Option<String>,
}

/// Columns that can populate a filter dropdown.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum IncidentField {
    /// `iyear`
    Year,
    /// `country_txt`
    Country,
    /// `gname`
    Group,
    /// `attacktype1_txt`
    AttackType,
    /// `weaptype1_txt`
    WeaponType,
    /// `targtype1_txt`
    TargetType,
}

impl IncidentField {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Year,
            Self::Country,
            Self::Group,
            Self::AttackType,
            Self::WeaponType,
            Self::TargetType,
        ]
    }

    /// The `attacks` column backing this field.
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Year => "iyear",
            Self::Country => "country_txt",
            Self::Group => "gname",
            Self::AttackType => "attacktype1_txt",
            Self::WeaponType => "weaptype1_txt",
            Self::TargetType => "targtype1_txt",
        }
    }

    /// The key this field's option list is published under
    /// (e.g. `countries`, `attackTypes`).
    #[must_use]
    pub const fn options_key(self) -> &'static str {
        match self {
            Self::Year => "years",
            Self::Country => "countries",
            Self::Group => "groups",
            Self::AttackType => "attackTypes",
            Self::WeaponType => "weaponTypes",
            Self::TargetType => "targetTypes",
        }
    }

    /// Whether values of this field are integers rather than labels.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Year)
    }
}

/// A single distinct value of an [`IncidentField`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// A numeric value such as a year.
    Integer(i64),
    /// A text label such as a country name.
    Text(String),
}
