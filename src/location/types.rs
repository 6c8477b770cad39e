//! Core types for the location subsystem.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type DistrictId = u32;
pub type SettlementId = u32;
pub type WardId = u32;
pub type PlotId = u32;

/// Top-level administrative region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct District {
    pub id: DistrictId,
    pub code: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub region: String,
    pub population: u64,
    pub area_km2: f64,
}

/// City, town or village inside a district.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    pub id: SettlementId,
    pub district_id: DistrictId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub population: u64,
    #[serde(default)]
    pub is_major: bool,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub post_code: Option<String>,
}

/// Suburb or area inside a settlement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ward {
    pub id: WardId,
    pub settlement_id: SettlementId,
    pub name: String,
    pub ward_number: u32,
    pub constituency: String,
    #[serde(default)]
    pub population: Option<u64>,
}

/// An addressable parcel inside a ward.
///
/// `settlement_id` duplicates the ward's parent so plots can be filtered by
/// settlement without a join; the store rejects datasets where they disagree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plot {
    pub id: PlotId,
    pub ward_id: WardId,
    pub settlement_id: SettlementId,
    pub full_address: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// One level of the District → Settlement → Ward → Plot hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    District,
    Settlement,
    Ward,
    Plot,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::District => write!(f, "district"),
            Self::Settlement => write!(f, "settlement"),
            Self::Ward => write!(f, "ward"),
            Self::Plot => write!(f, "plot"),
        }
    }
}

impl FromStr for Level {
    type Err = LocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "district" => Ok(Self::District),
            "settlement" => Ok(Self::Settlement),
            "ward" => Ok(Self::Ward),
            "plot" => Ok(Self::Plot),
            other => Err(LocationError::InvalidParameter(format!(
                "unknown level '{}'. Use district, settlement, ward or plot",
                other
            ))),
        }
    }
}

/// Which entity types a search covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    #[default]
    All,
    District,
    Settlement,
    Ward,
    Plot,
}

impl SearchType {
    pub fn includes(self, level: Level) -> bool {
        match self {
            Self::All => true,
            Self::District => level == Level::District,
            Self::Settlement => level == Level::Settlement,
            Self::Ward => level == Level::Ward,
            Self::Plot => level == Level::Plot,
        }
    }
}

impl fmt::Display for SearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::District => write!(f, "district"),
            Self::Settlement => write!(f, "settlement"),
            Self::Ward => write!(f, "ward"),
            Self::Plot => write!(f, "plot"),
        }
    }
}

impl FromStr for SearchType {
    type Err = LocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "all" => Ok(Self::All),
            "district" => Ok(Self::District),
            "settlement" => Ok(Self::Settlement),
            "ward" => Ok(Self::Ward),
            "plot" => Ok(Self::Plot),
            other => Err(LocationError::InvalidParameter(format!(
                "unknown search type '{}'. Use all, district, settlement, ward or plot",
                other
            ))),
        }
    }
}

/// An entity returned by exact-match resolution.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "level", rename_all = "lowercase")]
pub enum ResolvedEntity {
    District(District),
    Settlement(Settlement),
    Ward(Ward),
    Plot(Plot),
}

impl ResolvedEntity {
    pub fn level(&self) -> Level {
        match self {
            Self::District(_) => Level::District,
            Self::Settlement(_) => Level::Settlement,
            Self::Ward(_) => Level::Ward,
            Self::Plot(_) => Level::Plot,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::District(d) => &d.name,
            Self::Settlement(s) => &s.name,
            Self::Ward(w) => &w.name,
            Self::Plot(p) => &p.full_address,
        }
    }
}

/// Location subsystem errors.
///
/// An empty search result or a missing exact match is never an error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LocationError {
    #[error("query must be at least {min} characters, got {len}")]
    QueryTooShort { len: usize, min: usize },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("{level} not found: {id}")]
    NotFound { level: Level, id: u32 },

    #[error("dataset integrity violation: {0}")]
    Integrity(String),

    #[error("cannot load dataset {path}: {message}")]
    Dataset { path: String, message: String },
}

impl LocationError {
    /// True for errors caused by caller input rather than missing data.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::QueryTooShort { .. } | Self::InvalidParameter(_))
    }
}
