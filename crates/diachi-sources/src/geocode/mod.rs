//! The reverse-geocoding seam.

use crate::Result;

#[cfg(feature = "http")]
pub mod nominatim;

/// Turns a coordinate pair into a free-text address, best effort.
///
/// The returned string is treated as opaque by the core and may be empty when
/// the service has nothing for the coordinates. Providers typically format it
/// with increasing specificity right to left (street … ward, district,
/// province), comma separated.
pub trait ReverseGeocoder {
    fn reverse_geocode(&self, lat: f64, lng: f64) -> impl Future<Output = Result<String>>;
}
