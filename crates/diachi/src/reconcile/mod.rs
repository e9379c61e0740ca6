//! Free-text address reconciliation.
//!
//! Reverse geocoders (and persisted address strings) produce comma-separated
//! text with increasing specificity right to left: `street …, ward, district,
//! province`. This module splits such text into roles with a fixed
//! tail-anchored heuristic, and matches the named units against directory
//! lists.
//!
//! Matching is case-insensitive bidirectional substring containment with
//! first-match-wins and no scoring. There is deliberately no diacritic or
//! locale normalization beyond case folding: a renamed or unaccented locality
//! silently fails to match and leaves the corresponding selection unset.

use itertools::Itertools;

use diachi_sources::GeoUnit;

/// The role assignment produced by [`parse_free_text`].
///
/// A `None` level means the input did not carry a segment for that role;
/// an empty segment is treated the same way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedAddress {
    pub street: String,
    pub province: Option<String>,
    pub district: Option<String>,
    pub ward: Option<String>,
}

fn non_empty(segment: &str) -> Option<String> {
    (!segment.is_empty()).then(|| segment.to_string())
}

/// Split free text into address roles, tail-anchored.
///
/// - ≥ 4 segments: province = last, district = second-last, ward = third-last,
///   street = the remaining leading segments re-joined with `", "`.
/// - exactly 3: province = last, district = second-last, street = the rest;
///   ward stays unset.
/// - ≤ 2: the entire (trimmed) string is street.
#[must_use]
pub fn parse_free_text(text: &str) -> ParsedAddress {
    let segments: Vec<&str> = text.split(',').map(str::trim).collect();
    let n = segments.len();

    match n {
        0..=2 => ParsedAddress {
            street: text.trim().to_string(),
            ..ParsedAddress::default()
        },
        3 => ParsedAddress {
            street: segments[..n - 2].iter().join(", "),
            province: non_empty(segments[n - 1]),
            district: non_empty(segments[n - 2]),
            ward: None,
        },
        _ => ParsedAddress {
            street: segments[..n - 3].iter().join(", "),
            province: non_empty(segments[n - 1]),
            district: non_empty(segments[n - 2]),
            ward: non_empty(segments[n - 3]),
        },
    }
}

/// Find the first unit whose name contains, or is contained by, `name`
/// (case-folded). Returns `None` for an empty needle or when nothing in the
/// list matches; list order decides ties.
#[must_use]
pub fn match_unit<'a>(units: &'a [GeoUnit], name: &str) -> Option<&'a GeoUnit> {
    let needle = name.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    units.iter().find(|unit| {
        let haystack = unit.name.to_lowercase();
        haystack.contains(&needle) || needle.contains(&haystack)
    })
}
