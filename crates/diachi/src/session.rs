//! High-level form-session facade.
//!
//! [`AddressSession`] ties one [`CascadeController`] to one [`GeoDirectory`]
//! and drives the fetches the controller is waiting on. Entry points mirror
//! the controller's but take `&self` and suspend where directory data may be
//! needed, so concurrent UI events interleave naturally; the controller's
//! freshness checks make the last selection win.
//!
//! # Quick Start
//!
//! ```rust
//! use diachi::AddressSession;
//! use diachi_sources::test_data;
//!
//! let rt = tokio::runtime::Builder::new_current_thread()
//!     .build()
//!     .unwrap();
//! rt.block_on(async {
//!     let session = AddressSession::new(test_data::vietnam_fixture());
//!
//!     // Map click path: free text in, structured draft out.
//!     session
//!         .apply_reverse_geocode("123 Lê Lợi, Phường Bến Thành, Quận 1, Thành phố Hồ Chí Minh")
//!         .await;
//!
//!     let draft = session.draft();
//!     assert_eq!(draft.province_code, "79");
//!     assert_eq!(draft.district_code, "760");
//!     assert_eq!(draft.ward_code, "26737");
//! });
//! ```

use std::sync::{Mutex, MutexGuard};

use tracing::{debug, instrument, warn};

use diachi_sources::{DirectorySource, ReverseGeocoder};

use crate::cascade::{AddressDraft, CascadeController};
use crate::directory::GeoDirectory;

/// One product form's address state plus the directory cache backing it.
///
/// Created per form open, discarded on close or submit. The surrounding UI
/// binds a display field to [`canonical_address`](Self::canonical_address) and
/// populates its dependent dropdowns from [`directory`](Self::directory).
pub struct AddressSession<S: DirectorySource> {
    directory: GeoDirectory<S>,
    state: Mutex<CascadeController>,
}

impl<S: DirectorySource> AddressSession<S> {
    /// Create an empty session over a fresh directory cache (create flow).
    pub fn new(source: S) -> Self {
        Self::with_directory(GeoDirectory::new(source))
    }

    /// Create a session over an existing directory cache handle.
    pub fn with_directory(directory: GeoDirectory<S>) -> Self {
        Self {
            directory,
            state: Mutex::new(CascadeController::new()),
        }
    }

    /// Start building a session, optionally seeded from a persisted address.
    pub fn builder(source: S) -> AddressSessionBuilder<S> {
        AddressSessionBuilder::new(source)
    }

    // === Structured entry points (dropdowns) ===

    /// Select a province; district and ward are cleared unconditionally.
    #[instrument(name = "Set province", level = "debug", skip_all)]
    pub async fn set_province(&self, code: impl AsRef<str>) {
        debug!(code = code.as_ref(), "province selected");
        self.lock().set_province(code.as_ref());
        self.refresh().await;
    }

    /// Select a district; ward is cleared.
    #[instrument(name = "Set district", level = "debug", skip_all)]
    pub async fn set_district(&self, code: impl AsRef<str>) {
        debug!(code = code.as_ref(), "district selected");
        self.lock().set_district(code.as_ref());
        self.refresh().await;
    }

    /// Select a ward.
    #[instrument(name = "Set ward", level = "debug", skip_all)]
    pub async fn set_ward(&self, code: impl AsRef<str>) {
        debug!(code = code.as_ref(), "ward selected");
        self.lock().set_ward(code.as_ref());
        self.refresh().await;
    }

    /// Edit the street text. Needs no directory data.
    pub fn set_street(&self, text: impl AsRef<str>) {
        self.lock().set_street(text.as_ref());
    }

    // === Text entry points (map click / persisted address) ===

    /// Reconcile free-text geocoder output into the draft.
    #[instrument(name = "Apply reverse geocode", level = "debug", skip_all)]
    pub async fn apply_reverse_geocode(&self, text: impl AsRef<str>) {
        let provinces = self.directory.provinces().await;
        {
            let mut state = self.lock();
            state.on_provinces_loaded(provinces);
            state.apply_reverse_geocode(text.as_ref());
        }
        self.refresh().await;
    }

    /// Map click path: reverse geocode the coordinates, then reconcile the
    /// resulting text. A failed or empty geocode leaves the draft untouched.
    #[instrument(name = "Apply map location", level = "debug", skip(self, geocoder))]
    pub async fn apply_map_location<G: ReverseGeocoder>(&self, geocoder: &G, lat: f64, lng: f64) {
        let text = match geocoder.reverse_geocode(lat, lng).await {
            Ok(text) => text,
            Err(error) => {
                warn!(%error, "reverse geocoding failed, draft left untouched");
                return;
            }
        };
        if text.trim().is_empty() {
            debug!("reverse geocoder returned nothing, draft left untouched");
            return;
        }
        self.apply_reverse_geocode(&text).await;
    }

    // === Observable state ===

    /// Snapshot of the current draft.
    pub fn draft(&self) -> AddressDraft {
        self.lock().draft().clone()
    }

    /// The derived display string (names, never codes).
    pub fn canonical_address(&self) -> String {
        self.lock().canonical_address().to_string()
    }

    /// The session's directory cache, for populating dependent dropdowns.
    pub fn directory(&self) -> &GeoDirectory<S> {
        &self.directory
    }

    /// Fetch whatever lists the current selection depends on and hand them to
    /// the controller. Each delivery is freshness-checked against the draft,
    /// so responses outrun by a newer selection are dropped there.
    async fn refresh(&self) {
        let provinces = self.directory.provinces().await;
        self.lock().on_provinces_loaded(provinces);

        let province_code = self.lock().draft().province_code.clone();
        if !province_code.is_empty() {
            let districts = self.directory.districts(&province_code).await;
            self.lock().on_districts_loaded(&province_code, districts);
        }

        let district_code = self.lock().draft().district_code.clone();
        if !district_code.is_empty() {
            let wards = self.directory.wards(&district_code).await;
            self.lock().on_wards_loaded(&district_code, wards);
        }
    }

    fn lock(&self) -> MutexGuard<'_, CascadeController> {
        // Never held across an await.
        self.state.lock().expect("session state mutex poisoned")
    }
}

/// Builder for [`AddressSession`] with optional seeding (edit flow).
#[derive(Debug)]
pub struct AddressSessionBuilder<S: DirectorySource> {
    source: S,
    seed_address: Option<String>,
}

impl<S: DirectorySource> AddressSessionBuilder<S> {
    #[must_use]
    pub fn new(source: S) -> Self {
        Self {
            source,
            seed_address: None,
        }
    }

    /// Seed the draft from a persisted address string. Runs through the same
    /// reconciliation path as a map click, so create and edit flows cannot
    /// drift apart.
    #[must_use]
    pub fn seed_address(mut self, address: impl Into<String>) -> Self {
        self.seed_address = Some(address.into());
        self
    }

    /// Build the session, resolving the seed address if one was given.
    pub async fn build(self) -> AddressSession<S> {
        let session = AddressSession::new(self.source);
        if let Some(address) = self.seed_address {
            debug!("seeding draft from persisted address");
            session.apply_reverse_geocode(&address).await;
        }
        session
    }
}
