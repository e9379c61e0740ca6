//! Canonical address formatting.

use itertools::Itertools;

/// Join the non-empty address parts, smallest unit first, with `", "`.
///
/// Empty parts are omitted entirely, so the output never contains empty
/// segments or doubled delimiters. Pure and total over any combination of
/// empty strings.
///
/// ```rust
/// use diachi::format_address;
///
/// assert_eq!(
///     format_address("123 Lê Lợi", "Phường Bến Thành", "Quận 1", "Thành phố Hồ Chí Minh"),
///     "123 Lê Lợi, Phường Bến Thành, Quận 1, Thành phố Hồ Chí Minh"
/// );
/// assert_eq!(format_address("", "", "", "Hà Nội"), "Hà Nội");
/// ```
#[must_use]
pub fn format_address(street: &str, ward: &str, district: &str, province: &str) -> String {
    [street, ward, district, province]
        .iter()
        .filter(|part| !part.is_empty())
        .join(", ")
}
