//! HTTP directory source for the open provinces REST API.
//!
//! The API shape is the one served by <https://provinces.open-api.vn/api>:
//!
//! - `GET {base}/p/`: every province as a flat list.
//! - `GET {base}/p/{code}?depth=2`: one province with its `districts` array.
//! - `GET {base}/d/{code}?depth=2`: one district with its `wards` array.
//!
//! Unit codes are numeric on the wire and normalized to strings here, since
//! nothing downstream does arithmetic on them.

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::DirectorySource;
use crate::{GeoUnit, Result};

pub const DEFAULT_BASE_URL: &str = "https://provinces.open-api.vn/api";

const USER_AGENT: &str = concat!("diachi/", env!("CARGO_PKG_VERSION"));

/// Directory source backed by the provinces REST API.
#[derive(Debug, Clone)]
pub struct ProvincesApi {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct UnitRecord {
    code: u32,
    name: String,
}

#[derive(Debug, Deserialize)]
struct ProvinceDetail {
    #[serde(default)]
    districts: Vec<UnitRecord>,
}

#[derive(Debug, Deserialize)]
struct DistrictDetail {
    #[serde(default)]
    wards: Vec<UnitRecord>,
}

impl UnitRecord {
    fn into_unit(self) -> GeoUnit {
        GeoUnit::new(self.code.to_string(), self.name)
    }
}

impl ProvincesApi {
    /// Create a client against the public API endpoint.
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a client against a custom endpoint serving the same API shape
    /// (a self-hosted mirror, or a stub server in tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, url: String) -> Result<T> {
        debug!(url, "directory request");
        let response = self.client.get(&url).send().await?.error_for_status()?;
        Ok(response.json::<T>().await?)
    }
}

impl DirectorySource for ProvincesApi {
    #[instrument(name = "List provinces", level = "debug", skip_all)]
    async fn list_provinces(&self) -> Result<Vec<GeoUnit>> {
        let records: Vec<UnitRecord> = self.get_json(format!("{}/p/", self.base_url)).await?;
        Ok(records.into_iter().map(UnitRecord::into_unit).collect())
    }

    #[instrument(name = "List districts", level = "debug", skip(self))]
    async fn list_districts(&self, province_code: &str) -> Result<Vec<GeoUnit>> {
        let detail: ProvinceDetail = self
            .get_json(format!("{}/p/{province_code}?depth=2", self.base_url))
            .await?;
        Ok(detail
            .districts
            .into_iter()
            .map(UnitRecord::into_unit)
            .collect())
    }

    #[instrument(name = "List wards", level = "debug", skip(self))]
    async fn list_wards(&self, district_code: &str) -> Result<Vec<GeoUnit>> {
        let detail: DistrictDetail = self
            .get_json(format!("{}/d/{district_code}?depth=2", self.base_url))
            .await?;
        Ok(detail.wards.into_iter().map(UnitRecord::into_unit).collect())
    }
}
