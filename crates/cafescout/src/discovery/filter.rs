//! Café filtering.
//!
//! [`compute_visible`] is the heart of discovery: given the full café set, the
//! committed search text and the committed [`FilterConfig`], it returns the
//! subset to display. It is a pure function: the input slice is never touched,
//! original order is preserved, and identical inputs always produce identical
//! output.
//!
//! A café is kept iff every active criterion holds:
//!
//! 1. **Search**: non-empty search text is a case-insensitive substring of the name.
//! 2. **Amenities**: every enabled toggle's tag token is in the café's [`TagSet`](crate::tags::TagSet).
//! 3. **Price**: `price <= price_range`.
//! 4. **Rating**: `overall_rating >= min_rating`. An unrated café only passes
//!    when `min_rating` is zero.
//! 5. **Distance**: only with a [`DistanceSource`]; see [`compute_visible_with`].

use crate::model::{Cafe, MAX_PRICE, MAX_RATING, MIN_PRICE, RATING_STEP};
use crate::tags::Amenity;
use serde::{Deserialize, Serialize};

pub const MIN_DISTANCE: u8 = 1;
pub const MAX_DISTANCE: u8 = 10;

/// User-controlled filter settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterConfig {
    pub wifi: bool,
    pub bathrooms: bool,
    pub outlets: bool,
    pub metro: bool,
    /// Inclusive upper bound on price tier (1-3).
    pub price_range: u8,
    /// Inclusive lower bound on rating (0.0-5.0, step 0.5).
    pub min_rating: f64,
    /// Miles (1-10). Ignored unless a [`DistanceSource`] is supplied.
    pub max_distance: u8,
}

impl Default for FilterConfig {
    /// The unrestricted config: every café passes.
    fn default() -> Self {
        Self {
            wifi: false,
            bathrooms: false,
            outlets: false,
            metro: false,
            price_range: MAX_PRICE,
            min_rating: 0.0,
            max_distance: MAX_DISTANCE,
        }
    }
}

impl FilterConfig {
    pub fn amenity(&self, amenity: Amenity) -> bool {
        match amenity {
            Amenity::Wifi => self.wifi,
            Amenity::Bathrooms => self.bathrooms,
            Amenity::Outlets => self.outlets,
            Amenity::Metro => self.metro,
        }
    }

    pub fn set_amenity(&mut self, amenity: Amenity, enabled: bool) {
        match amenity {
            Amenity::Wifi => self.wifi = enabled,
            Amenity::Bathrooms => self.bathrooms = enabled,
            Amenity::Outlets => self.outlets = enabled,
            Amenity::Metro => self.metro = enabled,
        }
    }

    pub fn toggle_amenity(&mut self, amenity: Amenity) {
        let current = self.amenity(amenity);
        self.set_amenity(amenity, !current);
    }

    pub fn enabled_amenities(&self) -> Vec<Amenity> {
        Amenity::ALL
            .into_iter()
            .filter(|a| self.amenity(*a))
            .collect()
    }

    /// Clamps every field into the range its panel control allows.
    pub fn normalized(mut self) -> Self {
        self.price_range = self.price_range.clamp(MIN_PRICE, MAX_PRICE);
        self.max_distance = self.max_distance.clamp(MIN_DISTANCE, MAX_DISTANCE);
        self.min_rating = snap_rating(self.min_rating);
        self
    }

    /// True when no criterion can exclude a café.
    pub fn is_unrestricted(&self) -> bool {
        self.enabled_amenities().is_empty()
            && self.price_range >= MAX_PRICE
            && self.min_rating <= 0.0
    }

    /// Tests a single café against this config (search and distance excluded).
    pub fn admits(&self, cafe: &Cafe) -> bool {
        let enabled = self.enabled_amenities();
        if !enabled.is_empty() {
            let tags = cafe.tag_set();
            if !enabled.iter().all(|a| tags.has(*a)) {
                return false;
            }
        }

        if cafe.price > self.price_range {
            return false;
        }

        match cafe.overall_rating {
            Some(rating) => rating >= self.min_rating,
            None => self.min_rating <= 0.0,
        }
    }
}

/// Snaps a rating onto the 0.5 grid within 0.0..=5.0. NaN becomes 0.0.
pub fn snap_rating(rating: f64) -> f64 {
    if rating.is_nan() {
        return 0.0;
    }
    ((rating / RATING_STEP).round() * RATING_STEP).clamp(0.0, MAX_RATING)
}

/// External geolocation collaborator.
///
/// The library ships no distance formula: without a source the
/// `max_distance` field is inert.
pub trait DistanceSource {
    /// Distance in miles from the user to `cafe`, or `None` when unknown.
    fn distance_miles(&self, cafe: &Cafe) -> Option<f64>;
}

/// True when `name` contains `search`, ignoring case. Empty search matches all.
pub fn name_matches(name: &str, search: &str) -> bool {
    search.is_empty() || name.to_lowercase().contains(&search.to_lowercase())
}

/// Returns the visible subset of `cafes`, in input order.
pub fn compute_visible(cafes: &[Cafe], search: &str, filters: &FilterConfig) -> Vec<Cafe> {
    compute_visible_with(cafes, search, filters, None)
}

/// Like [`compute_visible`], additionally enforcing `max_distance` when a
/// distance source is supplied. Cafés the source cannot place are excluded.
pub fn compute_visible_with(
    cafes: &[Cafe],
    search: &str,
    filters: &FilterConfig,
    distance: Option<&dyn DistanceSource>,
) -> Vec<Cafe> {
    cafes
        .iter()
        .filter(|cafe| name_matches(&cafe.name, search))
        .filter(|cafe| filters.admits(cafe))
        .filter(|cafe| match distance {
            Some(source) => source
                .distance_miles(cafe)
                .is_some_and(|miles| miles <= f64::from(filters.max_distance)),
            None => true,
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cafe(id: i64, name: &str, price: u8, rating: Option<f64>, tags: &str) -> Cafe {
        let mut c = Cafe::new(id, name);
        c.price = price;
        c.overall_rating = rating;
        c.tags = Some(tags.to_string());
        c
    }

    fn bluebird() -> Cafe {
        cafe(1, "Bluebird Cafe", 2, Some(4.5), "wifi,metro-friendly")
    }

    fn names(cafes: &[Cafe]) -> Vec<&str> {
        cafes.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn bluebird_included_at_its_price() {
        let filters = FilterConfig {
            wifi: true,
            metro: true,
            price_range: 2,
            min_rating: 4.0,
            ..Default::default()
        };
        let visible = compute_visible(&[bluebird()], "", &filters);
        assert_eq!(names(&visible), vec!["Bluebird Cafe"]);
    }

    #[test]
    fn bluebird_excluded_below_its_price() {
        let filters = FilterConfig {
            wifi: true,
            metro: true,
            price_range: 1,
            min_rating: 4.0,
            ..Default::default()
        };
        assert!(compute_visible(&[bluebird()], "", &filters).is_empty());
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let cafes = vec![
            cafe(1, "Java House", 1, Some(4.0), ""),
            cafe(2, "Downtown Coffee", 3, Some(3.8), ""),
        ];
        let filters = FilterConfig::default();
        assert_eq!(names(&compute_visible(&cafes, "java", &filters)), vec!["Java House"]);
        assert_eq!(names(&compute_visible(&cafes, "JAVA", &filters)), vec!["Java House"]);
        assert_eq!(names(&compute_visible(&cafes, "own", &filters)), vec!["Downtown Coffee"]);
    }

    #[test]
    fn empty_tags_never_satisfy_an_amenity() {
        let cafes = vec![cafe(1, "Plain", 1, Some(5.0), "")];
        let filters = FilterConfig {
            outlets: true,
            ..Default::default()
        };
        assert!(compute_visible(&cafes, "", &filters).is_empty());

        let mut untagged = Cafe::new(2, "Untagged");
        untagged.overall_rating = Some(5.0);
        assert!(compute_visible(&[untagged], "", &filters).is_empty());
    }

    #[test]
    fn metro_flag_requires_metro_friendly_tag() {
        let cafes = vec![
            cafe(1, "Says metro", 1, Some(4.0), "metro"),
            cafe(2, "Says metro-friendly", 1, Some(4.0), "Metro-Friendly"),
        ];
        let filters = FilterConfig {
            metro: true,
            ..Default::default()
        };
        assert_eq!(
            names(&compute_visible(&cafes, "", &filters)),
            vec!["Says metro-friendly"]
        );
    }

    #[test]
    fn all_enabled_amenities_must_be_present() {
        let cafes = vec![
            cafe(1, "Both", 1, Some(4.0), "wifi, outlets"),
            cafe(2, "Wifi only", 1, Some(4.0), "wifi"),
        ];
        let filters = FilterConfig {
            wifi: true,
            outlets: true,
            ..Default::default()
        };
        assert_eq!(names(&compute_visible(&cafes, "", &filters)), vec!["Both"]);
    }

    #[test]
    fn unrated_cafe_passes_only_zero_min_rating() {
        let cafes = vec![cafe(1, "New", 1, None, "")];
        assert_eq!(compute_visible(&cafes, "", &FilterConfig::default()).len(), 1);

        let filters = FilterConfig {
            min_rating: 0.5,
            ..Default::default()
        };
        assert!(compute_visible(&cafes, "", &filters).is_empty());
    }

    #[test]
    fn rating_bound_is_inclusive() {
        let cafes = vec![cafe(1, "Exactly four", 1, Some(4.0), "")];
        let filters = FilterConfig {
            min_rating: 4.0,
            ..Default::default()
        };
        assert_eq!(compute_visible(&cafes, "", &filters).len(), 1);
    }

    #[test]
    fn unrestricted_is_identity_in_order() {
        let cafes = vec![
            cafe(3, "C", 3, None, ""),
            cafe(1, "A", 1, Some(1.0), "wifi"),
            cafe(2, "B", 2, Some(5.0), "outlets"),
        ];
        let filters = FilterConfig::default();
        assert!(filters.is_unrestricted());
        assert_eq!(compute_visible(&cafes, "", &filters), cafes);
    }

    #[test]
    fn input_is_not_mutated() {
        let cafes = vec![bluebird(), cafe(2, "Other", 3, None, "")];
        let before = cafes.clone();
        let filters = FilterConfig {
            price_range: 1,
            ..Default::default()
        };
        let _ = compute_visible(&cafes, "blue", &filters);
        assert_eq!(cafes, before);
    }

    #[test]
    fn max_distance_is_inert_without_source() {
        let filters = FilterConfig {
            max_distance: 1,
            ..Default::default()
        };
        assert_eq!(compute_visible(&[bluebird()], "", &filters).len(), 1);
    }

    struct FixedDistances(Vec<(i64, f64)>);

    impl DistanceSource for FixedDistances {
        fn distance_miles(&self, cafe: &Cafe) -> Option<f64> {
            self.0
                .iter()
                .find(|(id, _)| *id == cafe.cafe_id)
                .map(|(_, d)| *d)
        }
    }

    #[test]
    fn max_distance_applies_with_source() {
        let cafes = vec![
            cafe(1, "Near", 1, Some(4.0), ""),
            cafe(2, "Far", 1, Some(4.0), ""),
            cafe(3, "Unknown", 1, Some(4.0), ""),
        ];
        let source = FixedDistances(vec![(1, 0.8), (2, 6.5)]);
        let filters = FilterConfig {
            max_distance: 4,
            ..Default::default()
        };
        let visible = compute_visible_with(&cafes, "", &filters, Some(&source));
        assert_eq!(names(&visible), vec!["Near"]);
    }

    #[test]
    fn normalized_clamps_and_snaps() {
        let filters = FilterConfig {
            price_range: 9,
            min_rating: 3.7,
            max_distance: 0,
            ..Default::default()
        }
        .normalized();
        assert_eq!(filters.price_range, 3);
        assert_eq!(filters.min_rating, 3.5);
        assert_eq!(filters.max_distance, 1);

        assert_eq!(snap_rating(-2.0), 0.0);
        assert_eq!(snap_rating(7.0), 5.0);
        assert_eq!(snap_rating(f64::NAN), 0.0);
    }

    #[test]
    fn toggle_amenity_flips_flag() {
        let mut filters = FilterConfig::default();
        filters.toggle_amenity(Amenity::Metro);
        assert!(filters.metro);
        assert_eq!(filters.enabled_amenities(), vec![Amenity::Metro]);
        filters.toggle_amenity(Amenity::Metro);
        assert!(!filters.metro);
    }

    #[test]
    fn name_matches_empty_search() {
        assert!(name_matches("Anything", ""));
        assert!(name_matches("Java House", "HOUSE"));
        assert!(!name_matches("Java House", "tea"));
    }
}
