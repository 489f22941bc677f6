//! Footfall proxy: pedestrian/commercial activity inferred from landmark
//! category counts, with a name-keyword fallback for providers that return
//! only free-text POI names.

use crate::keywords::{tier_weight, FOOTFALL_NAME_DEFAULT, FOOTFALL_NAME_TIERS};
use crate::types::{CompetitorsBundle, LandmarksBundle};

const MAX_SCORE: f64 = 100.0;

/// Footfall proxy score in `[0, 100]`.
///
/// The structured path accumulates capped per-category terms; if that yields
/// exactly 0 while landmarks exist, the name-heuristic path scans `all_pois`
/// instead. The competitors argument is accepted for call-site compatibility
/// but carries no signal in the current formula.
#[must_use]
pub fn footfall_proxy(landmarks: &LandmarksBundle, _competitors: &CompetitorsBundle) -> f64 {
    let count = |category: &str| -> f64 {
        landmarks
            .by_category
            .get(category)
            .map_or(0.0, |bucket| bucket.count as f64)
    };

    let mut score = 0.0;

    // Transit points are strong footfall indicators.
    score += (count("metro_station") * 20.0).min(40.0);
    score += (count("bus_stop") * 5.0).min(15.0);

    // Commercial zones indicate high activity.
    score += (count("mall") * 15.0).min(25.0);
    score += (count("office") * 10.0).min(20.0);

    // Educational institutions bring regular footfall.
    score += (count("school") * 5.0).min(10.0);
    score += (count("college") * 8.0).min(15.0);

    // Residential areas mean local customers.
    score += (count("residential") * 5.0).min(15.0);

    // Name-heuristic fallback: any landmark at all is a sign of activity.
    if score == 0.0 && landmarks.total_count > 0 {
        for poi in &landmarks.all_pois {
            let name = poi.name.to_lowercase();
            score += tier_weight(&[&name], FOOTFALL_NAME_TIERS, FOOTFALL_NAME_DEFAULT);
        }
        score = score.min(MAX_SCORE);
    }

    score.min(MAX_SCORE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CategoryBucket, Poi};

    fn poi(name: &str) -> Poi {
        Poi {
            name: name.to_string(),
            lat: 0.0,
            lng: 0.0,
            category: String::new(),
        }
    }

    fn bundle_with_counts(counts: &[(&str, usize)]) -> LandmarksBundle {
        let mut bundle = LandmarksBundle::default();
        for (category, count) in counts {
            bundle.by_category.insert(
                (*category).to_string(),
                CategoryBucket {
                    count: *count,
                    pois: Vec::new(),
                },
            );
            bundle.total_count += count;
        }
        bundle
    }

    #[test]
    fn empty_bundle_scores_zero() {
        let score = footfall_proxy(&LandmarksBundle::default(), &CompetitorsBundle::default());
        assert_eq!(score, 0.0);
    }

    #[test]
    fn metro_term_caps_at_forty() {
        let two = bundle_with_counts(&[("metro_station", 2)]);
        let ten = bundle_with_counts(&[("metro_station", 10)]);
        let competitors = CompetitorsBundle::default();
        assert!((footfall_proxy(&two, &competitors) - 40.0).abs() < f64::EPSILON);
        assert!((footfall_proxy(&ten, &competitors) - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn monotonic_in_each_category_count() {
        let competitors = CompetitorsBundle::default();
        for category in [
            "metro_station",
            "bus_stop",
            "mall",
            "office",
            "school",
            "college",
            "residential",
        ] {
            let mut prev = 0.0;
            for count in 0..8 {
                let score = footfall_proxy(&bundle_with_counts(&[(category, count)]), &competitors);
                assert!(score >= prev, "{category} not monotonic at count {count}");
                assert!((0.0..=100.0).contains(&score));
                prev = score;
            }
        }
    }

    #[test]
    fn combined_terms_sum_without_global_cap() {
        let bundle = bundle_with_counts(&[
            ("metro_station", 2),
            ("bus_stop", 3),
            ("mall", 2),
            ("office", 2),
            ("school", 2),
            ("college", 2),
            ("residential", 3),
        ]);
        // 40 + 15 + 25 + 20 + 10 + 15 + 15 = 140, clamped to 100.
        let score = footfall_proxy(&bundle, &CompetitorsBundle::default());
        assert!((score - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn name_fallback_fires_when_categories_unrecognized() {
        let mut bundle = LandmarksBundle::default();
        bundle.all_pois = vec![poi("MG Road Metro"), poi("Corner Shop")];
        bundle.total_count = 2;
        let score = footfall_proxy(&bundle, &CompetitorsBundle::default());
        // 20 for the metro keyword + 3 default.
        assert!((score - 23.0).abs() < f64::EPSILON);
    }

    #[test]
    fn structured_path_suppresses_fallback() {
        let mut bundle = bundle_with_counts(&[("bus_stop", 1)]);
        bundle.all_pois = vec![poi("MG Road Metro")];
        let score = footfall_proxy(&bundle, &CompetitorsBundle::default());
        assert!((score - 5.0).abs() < f64::EPSILON);
    }
}
