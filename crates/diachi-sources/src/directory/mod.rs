//! The administrative-directory seam.

use crate::{GeoUnit, Result};

#[cfg(feature = "http")]
pub mod http;

/// A source of administrative units, one level at a time.
///
/// Implementations fetch fresh data on every call; the core's directory cache
/// decides how often that actually happens. Errors should be reported, not
/// swallowed; the cache degrades them to empty lists at its boundary.
pub trait DirectorySource {
    /// All top-level provinces.
    fn list_provinces(&self) -> impl Future<Output = Result<Vec<GeoUnit>>>;

    /// Districts belonging to `province_code`. The code is guaranteed
    /// non-empty by the caller.
    fn list_districts(&self, province_code: &str) -> impl Future<Output = Result<Vec<GeoUnit>>>;

    /// Wards belonging to `district_code`. The code is guaranteed non-empty
    /// by the caller.
    fn list_wards(&self, district_code: &str) -> impl Future<Output = Result<Vec<GeoUnit>>>;
}
