//! Edit flow: seed a session from a persisted address string, then adjust.

use diachi::AddressSession;
use diachi_sources::test_data::vietnam_fixture;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), diachi::error::DiachiError> {
    diachi::init_logging(tracing::Level::INFO)?;

    // The product was saved with this address; on form open the draft is
    // seeded through the same reconciler the map path uses.
    let session = AddressSession::builder(vietnam_fixture())
        .seed_address("123 Lê Lợi, Phường Bến Thành, Quận 1, Thành phố Hồ Chí Minh")
        .build()
        .await;

    let draft = session.draft();
    println!(
        "seeded      → province={} district={} ward={}",
        draft.province_code, draft.district_code, draft.ward_code
    );

    // The user moves the listing one ward over.
    session.set_ward("26734").await;
    println!("after edit  → {}", session.canonical_address());

    Ok(())
}
