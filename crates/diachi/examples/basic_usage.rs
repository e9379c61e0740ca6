//! Basic usage: dropdown selections and a simulated map click over the
//! offline fixture hierarchy.

use diachi::AddressSession;
use diachi_sources::test_data::{ScriptedGeocoder, vietnam_fixture};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), diachi::error::DiachiError> {
    diachi::init_logging(tracing::Level::INFO)?;

    let session = AddressSession::new(vietnam_fixture());

    // Dropdown path: each selection cascades and the display string follows.
    session.set_province("79").await;
    session.set_district("760").await;
    session.set_ward("26737").await;
    session.set_street("123 Lê Lợi");
    println!("dropdowns   → {}", session.canonical_address());

    // Map path: the pin lands in Hà Nội, the reverse geocoder hands back free
    // text, and the draft re-resolves against the directory.
    let geocoder = ScriptedGeocoder::new("12 Hàng Bài, Phường Trúc Bạch, Quận Ba Đình, Thành phố Hà Nội");
    session.apply_map_location(&geocoder, 21.024, 105.852).await;

    let draft = session.draft();
    println!("map click   → {}", session.canonical_address());
    println!(
        "resolved    → province={} district={} ward={}",
        draft.province_code, draft.district_code, draft.ward_code
    );

    Ok(())
}
