//! Session-scoped directory cache.
//!
//! Wraps a [`DirectorySource`] with lazy, per-key caching: each list is
//! fetched at most once per session, concurrent callers for the same key
//! collapse into a single in-flight request, and source failures degrade to an
//! empty list at this boundary instead of propagating. One `GeoDirectory` is
//! owned per form session and passed explicitly; there is no global cache.

use std::sync::{Arc, Mutex, MutexGuard};

use ahash::AHashMap;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use diachi_sources::{DirectorySource, GeoUnit, SourceError};

/// A cached, immutable unit list shared between the cache and its consumers.
pub type UnitList = Arc<[GeoUnit]>;

type LevelCells = Mutex<AHashMap<String, Arc<OnceCell<UnitList>>>>;

fn empty_list() -> UnitList {
    Arc::from(Vec::new())
}

fn degrade(result: Result<Vec<GeoUnit>, SourceError>, level: &str, key: &str) -> UnitList {
    match result {
        Ok(units) => {
            debug!(level, key, count = units.len(), "directory list fetched");
            Arc::from(units)
        }
        Err(error) => {
            warn!(level, key, %error, "directory fetch failed, serving empty list");
            empty_list()
        }
    }
}

/// Cached, lazily fetched administrative hierarchy.
pub struct GeoDirectory<S> {
    source: S,
    provinces: OnceCell<UnitList>,
    districts: LevelCells,
    wards: LevelCells,
}

impl<S: DirectorySource> GeoDirectory<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            provinces: OnceCell::new(),
            districts: Mutex::new(AHashMap::new()),
            wards: Mutex::new(AHashMap::new()),
        }
    }

    /// All provinces, fetched once per session.
    pub async fn provinces(&self) -> UnitList {
        self.provinces
            .get_or_init(|| async { degrade(self.source.list_provinces().await, "province", "") })
            .await
            .clone()
    }

    /// Districts of a province, fetched once per province code. An empty code
    /// resolves to an empty list without touching the source.
    pub async fn districts(&self, province_code: &str) -> UnitList {
        if province_code.is_empty() {
            return empty_list();
        }
        let cell = Self::cell(&self.districts, province_code);
        cell.get_or_init(|| async {
            degrade(
                self.source.list_districts(province_code).await,
                "district",
                province_code,
            )
        })
        .await
        .clone()
    }

    /// Wards of a district; identical pattern one level down.
    pub async fn wards(&self, district_code: &str) -> UnitList {
        if district_code.is_empty() {
            return empty_list();
        }
        let cell = Self::cell(&self.wards, district_code);
        cell.get_or_init(|| async {
            degrade(
                self.source.list_wards(district_code).await,
                "ward",
                district_code,
            )
        })
        .await
        .clone()
    }

    /// Access the underlying source for advanced use.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// The province list, if it has already been fetched.
    pub fn provinces_loaded(&self) -> Option<UnitList> {
        self.provinces.get().cloned()
    }

    /// The district list for a province, if already fetched.
    pub fn districts_loaded(&self, province_code: &str) -> Option<UnitList> {
        Self::peek(&self.districts, province_code)
    }

    /// The ward list for a district, if already fetched.
    pub fn wards_loaded(&self, district_code: &str) -> Option<UnitList> {
        Self::peek(&self.wards, district_code)
    }

    fn cell(cells: &LevelCells, key: &str) -> Arc<OnceCell<UnitList>> {
        Self::locked(cells).entry(key.to_string()).or_default().clone()
    }

    fn peek(cells: &LevelCells, key: &str) -> Option<UnitList> {
        Self::locked(cells).get(key).and_then(|cell| cell.get().cloned())
    }

    fn locked(cells: &LevelCells) -> MutexGuard<'_, AHashMap<String, Arc<OnceCell<UnitList>>>> {
        // Held only for map access, never across an await.
        cells.lock().expect("directory cache mutex poisoned")
    }
}
