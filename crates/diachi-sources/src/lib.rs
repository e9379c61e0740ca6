//! Data-source adapters for the diachi address core.
//!
//! The core crate reconciles addresses against an administrative directory
//! (province → district → ward) and an optional reverse geocoder, but it never
//! talks to the network itself. This crate supplies the seams it consumes:
//!
//! - [`DirectorySource`]: lists administrative units level by level.
//! - [`ReverseGeocoder`]: turns a coordinate pair into a free-text address.
//! - [`ProvincesApi`] / [`NominatimGeocoder`]: HTTP implementations of the two
//!   traits (behind the default `http` feature).
//! - [`StaticDirectory`] / [`ScriptedGeocoder`]: in-memory implementations for
//!   tests and demos, plus a small Vietnamese fixture hierarchy.
//!
//! All sources return plain `Vec<GeoUnit>` / `String` payloads; caching,
//! de-duplication and failure degradation are the core's responsibility.

use serde::{Deserialize, Serialize};

pub mod directory;
mod error;
pub mod geocode;
pub mod test_data;

pub use directory::DirectorySource;
#[cfg(feature = "http")]
pub use directory::http::ProvincesApi;
pub use error::{Result, SourceError};
#[cfg(feature = "http")]
pub use geocode::nominatim::NominatimGeocoder;
pub use geocode::ReverseGeocoder;
pub use test_data::{ScriptedGeocoder, StaticDirectory};

/// One administrative unit: a province, district, or ward.
///
/// Districts are meaningful only relative to the province whose listing
/// produced them, and wards relative to their district; no parent reference is
/// stored on the unit itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoUnit {
    pub code: String,
    pub name: String,
}

impl GeoUnit {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

/// Look up a unit's display name by code.
#[must_use]
pub fn unit_name<'a>(units: &'a [GeoUnit], code: &str) -> Option<&'a str> {
    if code.is_empty() {
        return None;
    }
    units
        .iter()
        .find(|unit| unit.code == code)
        .map(|unit| unit.name.as_str())
}
