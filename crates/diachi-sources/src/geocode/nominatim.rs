//! Reverse geocoding against a Nominatim-style endpoint.

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::ReverseGeocoder;
use crate::Result;

pub const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";

// Nominatim's usage policy rejects requests without an identifying agent.
const USER_AGENT: &str = concat!("diachi/", env!("CARGO_PKG_VERSION"));

/// Reverse geocoder backed by a Nominatim `/reverse` endpoint.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    display_name: String,
}

impl NominatimGeocoder {
    /// Create a client against the public OpenStreetMap endpoint.
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a client against a custom endpoint serving the same API shape.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

impl ReverseGeocoder for NominatimGeocoder {
    #[instrument(name = "Reverse geocode", level = "debug", skip(self))]
    async fn reverse_geocode(&self, lat: f64, lng: f64) -> Result<String> {
        let response = self
            .client
            .get(format!("{}/reverse", self.base_url))
            .query(&[
                ("format", "jsonv2"),
                ("lat", lat.to_string().as_str()),
                ("lon", lng.to_string().as_str()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let reverse: ReverseResponse = response.json().await?;
        debug!(display_name = %reverse.display_name, "reverse geocode response");
        Ok(reverse.display_name)
    }
}
