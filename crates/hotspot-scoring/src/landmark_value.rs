//! Weighted landmark valuation with diminishing returns: the i-th landmark of
//! a category contributes `weight * 0.8^i`, so the second hospital nearby is
//! worth less than the first.

use hotspot_core::ScoringWeights;

use crate::keywords::{tier_weight, LANDMARK_NAME_DEFAULT, LANDMARK_NAME_TIERS};
use crate::types::LandmarksBundle;

const MAX_SCORE: f64 = 50.0;
const DECAY: f64 = 0.8;
const MAX_PER_CATEGORY: usize = 5;
const MAX_FALLBACK_POIS: usize = 10;

/// Landmark value score in `[0, 50]`.
///
/// Categories absent from the weight table use its default weight. When the
/// structured path yields 0 but landmarks exist, up to the first ten
/// `all_pois` are valued by name keywords with the same decay, indexed by
/// their position in the list.
#[must_use]
pub fn landmark_value(landmarks: &LandmarksBundle, weights: &ScoringWeights) -> f64 {
    let mut score = 0.0;

    for (category, bucket) in &landmarks.by_category {
        let weight = weights.landmark_weight(category);
        for i in 0..bucket.count.min(MAX_PER_CATEGORY) {
            score += weight * DECAY.powi(i as i32);
        }
    }

    if score == 0.0 && landmarks.total_count > 0 {
        for (i, poi) in landmarks.all_pois.iter().take(MAX_FALLBACK_POIS).enumerate() {
            let name = poi.name.to_lowercase();
            let weight = tier_weight(&[&name], LANDMARK_NAME_TIERS, LANDMARK_NAME_DEFAULT);
            score += weight * DECAY.powi(i as i32);
        }
    }

    score.min(MAX_SCORE)
}
