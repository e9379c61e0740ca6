//! End-to-end run against the live provinces API and OpenStreetMap's
//! Nominatim. Needs network access; both services are free but rate limited.

use diachi::AddressSession;
use diachi_sources::{NominatimGeocoder, ProvincesApi};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), diachi::error::DiachiError> {
    diachi::init_logging(tracing::Level::INFO)?;

    let session = AddressSession::new(ProvincesApi::new()?);
    let geocoder = NominatimGeocoder::new()?;

    // Somewhere near the Bến Thành market, Hồ Chí Minh City.
    session.apply_map_location(&geocoder, 10.7721, 106.6983).await;

    let draft = session.draft();
    println!("canonical   → {}", session.canonical_address());
    println!(
        "resolved    → province={:?} district={:?} ward={:?}",
        draft.province_code, draft.district_code, draft.ward_code
    );

    Ok(())
}
