//! In-memory sources for tests, demos, and offline development.

use std::collections::HashMap;

use crate::{DirectorySource, GeoUnit, Result, ReverseGeocoder};

/// A directory source serving fixed in-memory data.
///
/// Lookups for unknown parent codes return empty lists, matching how the HTTP
/// API behaves for units without children.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    provinces: Vec<GeoUnit>,
    districts: HashMap<String, Vec<GeoUnit>>,
    wards: HashMap<String, Vec<GeoUnit>>,
}

impl StaticDirectory {
    #[must_use]
    pub fn new(provinces: Vec<GeoUnit>) -> Self {
        Self {
            provinces,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_districts(
        mut self,
        province_code: impl Into<String>,
        districts: Vec<GeoUnit>,
    ) -> Self {
        self.districts.insert(province_code.into(), districts);
        self
    }

    #[must_use]
    pub fn with_wards(mut self, district_code: impl Into<String>, wards: Vec<GeoUnit>) -> Self {
        self.wards.insert(district_code.into(), wards);
        self
    }
}

impl DirectorySource for StaticDirectory {
    async fn list_provinces(&self) -> Result<Vec<GeoUnit>> {
        Ok(self.provinces.clone())
    }

    async fn list_districts(&self, province_code: &str) -> Result<Vec<GeoUnit>> {
        Ok(self.districts.get(province_code).cloned().unwrap_or_default())
    }

    async fn list_wards(&self, district_code: &str) -> Result<Vec<GeoUnit>> {
        Ok(self.wards.get(district_code).cloned().unwrap_or_default())
    }
}

/// A reverse geocoder that always returns the same canned string.
#[derive(Debug, Clone, Default)]
pub struct ScriptedGeocoder {
    response: String,
}

impl ScriptedGeocoder {
    #[must_use]
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
        }
    }
}

impl ReverseGeocoder for ScriptedGeocoder {
    async fn reverse_geocode(&self, _lat: f64, _lng: f64) -> Result<String> {
        Ok(self.response.clone())
    }
}

/// A small slice of the real Vietnamese hierarchy, enough to exercise every
/// reconciliation path without touching the network.
#[must_use]
pub fn vietnam_fixture() -> StaticDirectory {
    StaticDirectory::new(vec![
        GeoUnit::new("01", "Thành phố Hà Nội"),
        GeoUnit::new("48", "Thành phố Đà Nẵng"),
        GeoUnit::new("79", "Thành phố Hồ Chí Minh"),
    ])
    .with_districts(
        "01",
        vec![
            GeoUnit::new("001", "Quận Ba Đình"),
            GeoUnit::new("002", "Quận Hoàn Kiếm"),
        ],
    )
    .with_districts(
        "79",
        vec![
            GeoUnit::new("760", "Quận 1"),
            GeoUnit::new("765", "Quận Bình Thạnh"),
            GeoUnit::new("770", "Quận 3"),
        ],
    )
    .with_wards(
        "001",
        vec![
            GeoUnit::new("00001", "Phường Phúc Xá"),
            GeoUnit::new("00004", "Phường Trúc Bạch"),
        ],
    )
    .with_wards(
        "760",
        vec![
            GeoUnit::new("26734", "Phường Bến Nghé"),
            GeoUnit::new("26737", "Phường Bến Thành"),
            GeoUnit::new("26740", "Phường Nguyễn Thái Bình"),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_directory_serves_fixture_levels() {
        let directory = vietnam_fixture();

        let provinces = directory.list_provinces().await.unwrap();
        assert_eq!(provinces.len(), 3);

        let districts = directory.list_districts("79").await.unwrap();
        assert!(districts.iter().any(|d| d.name == "Quận Bình Thạnh"));

        let wards = directory.list_wards("760").await.unwrap();
        assert_eq!(wards.len(), 3);
    }

    #[tokio::test]
    async fn unknown_parent_yields_empty_list() {
        let directory = vietnam_fixture();
        assert!(directory.list_districts("94").await.unwrap().is_empty());
        assert!(directory.list_wards("999").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn scripted_geocoder_replays_response() {
        let geocoder = ScriptedGeocoder::new("12 Hàng Bài, Quận Hoàn Kiếm, Thành phố Hà Nội");
        let text = geocoder.reverse_geocode(21.024, 105.852).await.unwrap();
        assert!(text.contains("Hoàn Kiếm"));
    }
}
