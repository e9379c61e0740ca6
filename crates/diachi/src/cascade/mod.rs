//! The address draft state machine.
//!
//! [`CascadeController`] owns one [`AddressDraft`] for the lifetime of a form
//! session. Structured edits (dropdowns) and text-path edits (map clicks,
//! persisted addresses) both flow through it. It enforces the cascade rule
//! (selecting a higher-level unit clears everything below it) and the
//! last-selection-wins rule: directory lists and pending lookups that arrive
//! after a newer selection are discarded, never applied.
//!
//! The controller is synchronous and does no I/O. Directory lists are handed
//! to it through the `on_*_loaded` callbacks whenever a fetch resolves; the
//! async orchestration lives in [`crate::AddressSession`].

use tracing::debug;

use diachi_sources::{GeoUnit, unit_name};

use crate::directory::UnitList;
use crate::format::format_address;
use crate::reconcile::{self, ParsedAddress};

/// The form-session address state, observable by the surrounding UI.
///
/// `canonical_address` is a derived projection recomputed on every mutation,
/// except that it holds raw geocoder text verbatim while a reverse-geocode
/// reconciliation is still waiting on directory data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AddressDraft {
    pub street: String,
    pub province_code: String,
    pub district_code: String,
    pub ward_code: String,
    pub canonical_address: String,
}

/// The two levels a reverse-geocoded name can wait on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingLevel {
    District,
    Ward,
}

/// A single-shot name→code lookup awaiting its directory list.
///
/// Consumed exactly once: matched, or permanently abandoned when the list
/// arrives without a match or a newer selection has superseded it.
#[derive(Debug, Clone)]
pub struct PendingResolution {
    pub level: PendingLevel,
    pub target_name: String,
    generation: u64,
}

/// State machine over [`AddressDraft`] with cascade-clear and stale-discard
/// rules.
#[derive(Debug, Default)]
pub struct CascadeController {
    draft: AddressDraft,
    provinces: UnitList,
    /// Last delivered district list, keyed by the province it belongs to.
    districts: Option<(String, UnitList)>,
    /// Last delivered ward list, keyed by the district it belongs to.
    wards: Option<(String, UnitList)>,
    pending: Vec<PendingResolution>,
    /// Bumped on every selection-changing mutation; pending entries issued
    /// against an older generation are stale.
    generation: u64,
    /// Raw geocoder text shown verbatim until structured resolution completes.
    raw_override: Option<String>,
}

impl CascadeController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &AddressDraft {
        &self.draft
    }

    pub fn canonical_address(&self) -> &str {
        &self.draft.canonical_address
    }

    /// Lookups still waiting for a directory list.
    pub fn pending_resolutions(&self) -> &[PendingResolution] {
        &self.pending
    }

    // === Structured entry points (dropdowns) ===

    /// Select a province. Unconditionally clears district and ward.
    pub fn set_province(&mut self, code: impl Into<String>) {
        self.generation += 1;
        self.draft.province_code = code.into();
        self.draft.district_code.clear();
        self.draft.ward_code.clear();
        self.raw_override = None;
        self.recompute_canonical();
    }

    /// Select a district. Clears ward.
    pub fn set_district(&mut self, code: impl Into<String>) {
        self.generation += 1;
        self.draft.district_code = code.into();
        self.draft.ward_code.clear();
        self.raw_override = None;
        self.recompute_canonical();
    }

    /// Select a ward.
    pub fn set_ward(&mut self, code: impl Into<String>) {
        self.generation += 1;
        self.draft.ward_code = code.into();
        self.raw_override = None;
        self.recompute_canonical();
    }

    /// Edit the street text. Does not invalidate in-flight lookups.
    pub fn set_street(&mut self, text: impl Into<String>) {
        self.draft.street = text.into();
        self.raw_override = None;
        self.recompute_canonical();
    }

    // === Text entry point (map click / persisted address) ===

    /// Reconcile a reverse-geocoded (or persisted) address string.
    ///
    /// The province is matched immediately against the delivered province
    /// list. District and ward names become pending lookups resolved when
    /// their lists arrive; lists already delivered for the matching parent are
    /// consulted at once. The draft shows the raw text verbatim until the last
    /// pending lookup is consumed.
    pub fn apply_reverse_geocode(&mut self, raw: &str) {
        let raw = raw.trim();
        if raw.is_empty() {
            debug!("empty reverse geocode text, draft left untouched");
            return;
        }
        let parsed = reconcile::parse_free_text(raw);
        self.apply_parsed(&parsed, raw);
    }

    fn apply_parsed(&mut self, parsed: &ParsedAddress, raw: &str) {
        self.generation += 1;
        self.draft.street = parsed.street.clone();
        self.draft.province_code.clear();
        self.draft.district_code.clear();
        self.draft.ward_code.clear();

        if let Some(province_name) = parsed.province.as_deref() {
            match reconcile::match_unit(&self.provinces, province_name) {
                Some(unit) => {
                    debug!(province_name, code = %unit.code, "province matched");
                    self.draft.province_code = unit.code.clone();
                }
                None => debug!(province_name, "no province match, selection left unset"),
            }
        }

        // District and ward names can only resolve under a known parent chain.
        if !self.draft.province_code.is_empty() {
            if let Some(district_name) = parsed.district.clone() {
                self.pending.push(PendingResolution {
                    level: PendingLevel::District,
                    target_name: district_name,
                    generation: self.generation,
                });
                if let Some(ward_name) = parsed.ward.clone() {
                    self.pending.push(PendingResolution {
                        level: PendingLevel::Ward,
                        target_name: ward_name,
                        generation: self.generation,
                    });
                }
            }
        }

        self.raw_override = Some(raw.to_string());

        // Lists already on hand settle their level without another fetch.
        if let Some((parent, units)) = self.districts.clone() {
            if parent == self.draft.province_code {
                self.resolve_pending(PendingLevel::District, &units);
            }
        }
        if let Some((parent, units)) = self.wards.clone() {
            if parent == self.draft.district_code && !parent.is_empty() {
                self.resolve_pending(PendingLevel::Ward, &units);
            }
        }

        self.recompute_canonical();
    }

    // === Directory arrival callbacks ===

    /// The province list arrived (or was refreshed from cache).
    pub fn on_provinces_loaded(&mut self, units: UnitList) {
        self.provinces = units;
        self.recompute_canonical();
    }

    /// A district list arrived. Ignored wholesale if the draft has moved to a
    /// different province since the fetch was issued.
    pub fn on_districts_loaded(&mut self, province_code: &str, units: UnitList) {
        if province_code.is_empty() || province_code != self.draft.province_code {
            debug!(province_code, "district list for superseded province discarded");
            return;
        }
        self.districts = Some((province_code.to_string(), units.clone()));
        self.resolve_pending(PendingLevel::District, &units);
        self.recompute_canonical();
    }

    /// A ward list arrived; same freshness rule one level down.
    pub fn on_wards_loaded(&mut self, district_code: &str, units: UnitList) {
        if district_code.is_empty() || district_code != self.draft.district_code {
            debug!(district_code, "ward list for superseded district discarded");
            return;
        }
        self.wards = Some((district_code.to_string(), units.clone()));
        self.resolve_pending(PendingLevel::Ward, &units);
        self.recompute_canonical();
    }

    /// Consume every pending entry for `level` against its freshly arrived
    /// list: stale entries are dropped, the rest are matched once and never
    /// retried.
    fn resolve_pending(&mut self, level: PendingLevel, units: &[GeoUnit]) {
        let (mine, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|entry| entry.level == level);
        self.pending = rest;

        if mine.is_empty() {
            return;
        }

        for entry in mine {
            if entry.generation != self.generation {
                debug!(?level, target = %entry.target_name, "stale pending lookup discarded");
                continue;
            }
            match reconcile::match_unit(units, &entry.target_name) {
                Some(unit) => {
                    debug!(?level, target = %entry.target_name, code = %unit.code, "pending lookup matched");
                    match level {
                        PendingLevel::District => self.draft.district_code = unit.code.clone(),
                        PendingLevel::Ward => self.draft.ward_code = unit.code.clone(),
                    }
                }
                None => {
                    debug!(?level, target = %entry.target_name, "pending lookup abandoned, no match");
                }
            }
        }

        if self.pending.is_empty() {
            // Structured resolution complete: the derived projection takes
            // over from the raw geocoder text.
            self.raw_override = None;
        }
    }

    // === Derived state ===

    fn recompute_canonical(&mut self) {
        if let Some(raw) = &self.raw_override {
            self.draft.canonical_address = raw.clone();
            return;
        }
        let province = unit_name(&self.provinces, &self.draft.province_code).unwrap_or_default();
        let district = self
            .districts
            .as_ref()
            .filter(|(parent, _)| *parent == self.draft.province_code)
            .and_then(|(_, units)| unit_name(units, &self.draft.district_code))
            .unwrap_or_default();
        let ward = self
            .wards
            .as_ref()
            .filter(|(parent, _)| *parent == self.draft.district_code)
            .and_then(|(_, units)| unit_name(units, &self.draft.ward_code))
            .unwrap_or_default();

        self.draft.canonical_address =
            format_address(&self.draft.street, ward, district, province);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn provinces() -> UnitList {
        Arc::from(vec![
            GeoUnit::new("01", "Thành phố Hà Nội"),
            GeoUnit::new("79", "Thành phố Hồ Chí Minh"),
        ])
    }

    fn hcmc_districts() -> UnitList {
        Arc::from(vec![
            GeoUnit::new("760", "Quận 1"),
            GeoUnit::new("770", "Quận 3"),
        ])
    }

    fn d1_wards() -> UnitList {
        Arc::from(vec![
            GeoUnit::new("26737", "Phường Bến Thành"),
            GeoUnit::new("26740", "Ward 5"),
        ])
    }

    fn loaded_controller() -> CascadeController {
        let mut controller = CascadeController::new();
        controller.on_provinces_loaded(provinces());
        controller
    }

    #[test]
    fn set_province_clears_lower_levels() {
        let mut controller = loaded_controller();
        controller.set_province("79");
        controller.on_districts_loaded("79", hcmc_districts());
        controller.set_district("760");
        controller.on_wards_loaded("760", d1_wards());
        controller.set_ward("26737");

        controller.set_province("01");
        assert_eq!(controller.draft().province_code, "01");
        assert_eq!(controller.draft().district_code, "");
        assert_eq!(controller.draft().ward_code, "");
    }

    #[test]
    fn set_district_clears_ward_only() {
        let mut controller = loaded_controller();
        controller.set_province("79");
        controller.on_districts_loaded("79", hcmc_districts());
        controller.set_district("760");
        controller.on_wards_loaded("760", d1_wards());
        controller.set_ward("26737");

        controller.set_district("770");
        assert_eq!(controller.draft().province_code, "79");
        assert_eq!(controller.draft().district_code, "770");
        assert_eq!(controller.draft().ward_code, "");
    }

    #[test]
    fn canonical_uses_names_not_codes() {
        let mut controller = loaded_controller();
        controller.set_province("79");
        controller.on_districts_loaded("79", hcmc_districts());
        controller.set_district("760");
        controller.on_wards_loaded("760", d1_wards());
        controller.set_ward("26737");
        controller.set_street("123 Lê Lợi");

        assert_eq!(
            controller.canonical_address(),
            "123 Lê Lợi, Phường Bến Thành, Quận 1, Thành phố Hồ Chí Minh"
        );
    }

    #[test]
    fn canonical_omits_unresolvable_names() {
        let mut controller = loaded_controller();
        controller.set_province("79");
        // District list never delivered: the code would be unreadable, so the
        // display shows only what has names.
        controller.set_district("760");
        controller.set_street("123 Lê Lợi");

        assert_eq!(
            controller.canonical_address(),
            "123 Lê Lợi, Thành phố Hồ Chí Minh"
        );
    }

    #[test]
    fn reverse_geocode_matches_province_synchronously() {
        let mut controller = loaded_controller();
        controller.apply_reverse_geocode("123 Le Loi, Ward 5, District 1, Hồ Chí Minh");

        assert_eq!(controller.draft().province_code, "79");
        assert_eq!(controller.draft().street, "123 Le Loi");
        assert_eq!(controller.pending_resolutions().len(), 2);
        // Raw text shown verbatim while lookups are in flight.
        assert_eq!(
            controller.canonical_address(),
            "123 Le Loi, Ward 5, District 1, Hồ Chí Minh"
        );
    }

    #[test]
    fn arrival_orders_converge_to_same_draft() {
        let geocoded = "123 Le Loi, Ward 5, Quận 1, Hồ Chí Minh";

        // District list first, then wards.
        let mut first = loaded_controller();
        first.apply_reverse_geocode(geocoded);
        first.on_districts_loaded("79", hcmc_districts());
        first.on_wards_loaded("760", d1_wards());

        // Ward list delivered early: its parent is not current yet, so it is
        // ignored; redelivery after the district resolves completes the draft.
        let mut second = loaded_controller();
        second.apply_reverse_geocode(geocoded);
        second.on_wards_loaded("760", d1_wards());
        assert_eq!(second.draft().ward_code, "");
        second.on_districts_loaded("79", hcmc_districts());
        second.on_wards_loaded("760", d1_wards());

        assert_eq!(first.draft(), second.draft());
        assert_eq!(first.draft().district_code, "760");
        assert_eq!(first.draft().ward_code, "26740");
        assert!(first.pending_resolutions().is_empty());
    }

    #[test]
    fn override_clears_once_resolution_completes() {
        let mut controller = loaded_controller();
        controller.apply_reverse_geocode("123 Le Loi, Phường Bến Thành, Quận 1, Hồ Chí Minh");
        controller.on_districts_loaded("79", hcmc_districts());
        assert_eq!(
            controller.canonical_address(),
            "123 Le Loi, Phường Bến Thành, Quận 1, Hồ Chí Minh"
        );

        controller.on_wards_loaded("760", d1_wards());
        assert_eq!(
            controller.canonical_address(),
            "123 Le Loi, Phường Bến Thành, Quận 1, Thành phố Hồ Chí Minh"
        );
    }

    #[test]
    fn manual_edit_supersedes_pending_lookups() {
        let mut controller = loaded_controller();
        controller.apply_reverse_geocode("123 Le Loi, Ward 5, Quận 1, Hồ Chí Minh");

        // User picks a district by hand before the list arrives.
        controller.set_district("770");
        controller.on_districts_loaded("79", hcmc_districts());

        // The stale lookup must not overwrite the manual choice.
        assert_eq!(controller.draft().district_code, "770");
    }

    #[test]
    fn stale_district_list_is_discarded() {
        let mut controller = loaded_controller();
        controller.set_province("79");
        controller.set_province("01");

        // The response for the superseded province arrives late.
        controller.on_districts_loaded("79", hcmc_districts());

        assert_eq!(controller.draft().province_code, "01");
        assert_eq!(controller.draft().district_code, "");
        assert_eq!(
            controller.canonical_address(),
            "Thành phố Hà Nội"
        );
    }

    #[test]
    fn unmatched_pending_is_abandoned_not_retried() {
        let mut controller = loaded_controller();
        controller.apply_reverse_geocode("5 Phố Huế, Quận Mới Đổi Tên, Hồ Chí Minh");
        controller.on_districts_loaded("79", hcmc_districts());
        assert_eq!(controller.draft().district_code, "");
        assert!(controller.pending_resolutions().is_empty());

        // Even a later list containing the name must not resurrect the lookup.
        let renamed: UnitList = Arc::from(vec![GeoUnit::new("999", "Quận Mới Đổi Tên")]);
        controller.on_districts_loaded("79", renamed);
        assert_eq!(controller.draft().district_code, "");
    }

    #[test]
    fn short_text_is_street_only() {
        let mut controller = loaded_controller();
        controller.apply_reverse_geocode("Đường ABC, Việt Nam");

        let draft = controller.draft();
        assert_eq!(draft.street, "Đường ABC, Việt Nam");
        assert_eq!(draft.province_code, "");
        assert_eq!(draft.district_code, "");
        assert_eq!(draft.ward_code, "");
        assert!(controller.pending_resolutions().is_empty());
    }

    #[test]
    fn unmatched_province_creates_no_pendings() {
        let mut controller = loaded_controller();
        controller.apply_reverse_geocode("1 Main St, Some Ward, Some District, Narnia");

        assert_eq!(controller.draft().province_code, "");
        assert!(controller.pending_resolutions().is_empty());
        // The raw text is still the best available display.
        assert_eq!(
            controller.canonical_address(),
            "1 Main St, Some Ward, Some District, Narnia"
        );
    }

    #[test]
    fn empty_geocode_text_is_a_no_op() {
        let mut controller = loaded_controller();
        controller.set_province("79");
        let before = controller.draft().clone();

        controller.apply_reverse_geocode("   ");
        assert_eq!(controller.draft(), &before);
    }

    #[test]
    fn cached_lists_settle_lookups_without_arrival() {
        let mut controller = loaded_controller();
        controller.set_province("79");
        controller.on_districts_loaded("79", hcmc_districts());
        controller.set_district("760");
        controller.on_wards_loaded("760", d1_wards());

        // Re-geocoding within the same province: both lists are on hand, so
        // the whole chain resolves synchronously.
        controller.apply_reverse_geocode("45 Nguyễn Huệ, Phường Bến Thành, Quận 1, Hồ Chí Minh");
        assert!(controller.pending_resolutions().is_empty());
        assert_eq!(controller.draft().district_code, "760");
        assert_eq!(controller.draft().ward_code, "26737");
        assert_eq!(
            controller.canonical_address(),
            "45 Nguyễn Huệ, Phường Bến Thành, Quận 1, Thành phố Hồ Chí Minh"
        );
    }

    #[test]
    fn manual_edit_clears_raw_override() {
        let mut controller = loaded_controller();
        controller.apply_reverse_geocode("1 Main St, Some Ward, Some District, Narnia");
        assert_eq!(
            controller.canonical_address(),
            "1 Main St, Some Ward, Some District, Narnia"
        );

        controller.set_street("2 Side St");
        assert_eq!(controller.canonical_address(), "2 Side St");
    }
}
