//! diachi - address resolution and reconciliation for Vietnamese
//! administrative hierarchies.
//!
//! diachi reconciles a free-text address (typed by a user, or produced by
//! reverse-geocoding a map click) against the three-level province → district
//! → ward hierarchy, manages the cascading dependent selections of an address
//! form, and derives a canonical display string from whatever has resolved so
//! far.
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
//!     // Dropdown path: structured selections cascade downward.
//!     session.set_province("79").await;
//!     session.set_district("760").await;
//!     session.set_ward("26737").await;
//!     session.set_street("123 Lê Lợi");
//!
//!     assert_eq!(
//!         session.canonical_address(),
//!         "123 Lê Lợi, Phường Bến Thành, Quận 1, Thành phố Hồ Chí Minh"
//!     );
//! });
//! ```
//!
//! # Design
//!
//! - **Degrade, don't fail**: directory or geocoder outages resolve to empty
//!   lists and untouched drafts, never to errors surfacing mid-form.
//! - **Last selection wins**: responses that arrive after a newer selection
//!   are detected by freshness checks and discarded silently.
//! - **One algorithm**: map clicks, persisted addresses, and manual edits all
//!   flow through the same reconciler and state machine.
//!
//! Matching is deliberately plain: case-insensitive substring containment,
//! first match in list order, no diacritic normalization. See
//! [`reconcile::match_unit`] for the exact policy.

use once_cell::sync::OnceCell;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

pub mod cascade;
pub mod directory;
pub mod error;
mod format;
pub mod reconcile;
mod session;

pub use cascade::{AddressDraft, CascadeController, PendingLevel, PendingResolution};
pub use diachi_sources as sources;
pub use diachi_sources::{DirectorySource, GeoUnit, ReverseGeocoder, unit_name};
pub use directory::{GeoDirectory, UnitList};
pub use format::format_address;
pub use reconcile::{ParsedAddress, match_unit, parse_free_text};
pub use session::{AddressSession, AddressSessionBuilder};

static LOGGER_INIT: OnceCell<()> = OnceCell::new();

/// Initialize logging for the diachi library.
///
/// Sets up structured logging with configurable levels and filtering. Call
/// once at the start of your application to see reconciliation decisions
/// (matches, abandoned lookups, discarded stale responses) as they happen.
///
/// # Examples
///
/// ```rust
/// use diachi::init_logging;
/// use tracing::Level;
///
/// init_logging(Level::INFO)?;
/// # Ok::<(), diachi::error::DiachiError>(())
/// ```
pub fn init_logging(level: impl Into<LevelFilter>) -> Result<&'static (), error::DiachiError> {
    LOGGER_INIT.get_or_try_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(level.into().to_string()))?
            .add_directive("hyper_util=warn".parse().unwrap())
            .add_directive("reqwest=warn".parse().unwrap());

        tracing_subscriber::fmt::fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .init();
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use diachi_sources::test_data;

    fn setup_test_env() {
        let _ = init_logging(tracing::Level::WARN);
    }

    #[tokio::test]
    async fn test_session_creation() {
        setup_test_env();

        let session = AddressSession::new(test_data::vietnam_fixture());
        let draft = session.draft();

        assert_eq!(draft.province_code, "");
        assert_eq!(draft.canonical_address, "");
    }

    #[tokio::test]
    async fn test_dropdown_flow() {
        setup_test_env();

        let session = AddressSession::new(test_data::vietnam_fixture());
        session.set_province("01").await;
        session.set_district("001").await;
        session.set_street("8 Phan Đình Phùng");

        assert_eq!(
            session.canonical_address(),
            "8 Phan Đình Phùng, Quận Ba Đình, Thành phố Hà Nội"
        );
    }

    #[tokio::test]
    async fn test_reverse_geocode_flow() {
        setup_test_env();

        let session = AddressSession::new(test_data::vietnam_fixture());
        session
            .apply_reverse_geocode("123 Lê Lợi, Phường Bến Thành, Quận 1, Thành phố Hồ Chí Minh")
            .await;

        let draft = session.draft();
        assert_eq!(draft.province_code, "79");
        assert_eq!(draft.district_code, "760");
        assert_eq!(draft.ward_code, "26737");
    }

    #[tokio::test]
    async fn test_seeded_builder() {
        setup_test_env();

        let session = AddressSession::builder(test_data::vietnam_fixture())
            .seed_address("45 Trúc Bạch, Phường Trúc Bạch, Quận Ba Đình, Thành phố Hà Nội")
            .build()
            .await;

        let draft = session.draft();
        assert_eq!(draft.province_code, "01");
        assert_eq!(draft.district_code, "001");
        assert_eq!(draft.ward_code, "00004");
        assert_eq!(draft.street, "45 Trúc Bạch");
    }
}
