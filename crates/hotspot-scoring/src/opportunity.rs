//! Opportunity score composer and its qualitative interpretation bands.

use std::collections::BTreeMap;

use hotspot_core::ScoringWeights;

use crate::density::competitor_density;
use crate::footfall::footfall_proxy;
use crate::landmark_value::landmark_value;
use crate::types::{Breakdown, CompetitorsBundle, Interpretation, LandmarksBundle, OpportunityResult};

/// Compose the final opportunity score in `[0, 100]`.
///
/// Landmark value acts as a multiplicative quality modifier on footfall
/// (zero landmark value zeroes the score); competitor density divides the
/// result but never fully zeroes it thanks to the `+1` floor.
#[must_use]
pub fn opportunity_score(footfall: f64, landmark_value: f64, competitor_density: f64) -> u32 {
    let raw = footfall * (landmark_value / 50.0) / (competitor_density + 1.0);
    raw.clamp(0.0, 100.0).round() as u32
}

const PRIME: Interpretation = Interpretation {
    category: "Prime Location",
    color: "green",
    emoji: "\u{1f7e2}",
    recommendation: "Excellent opportunity! This location shows strong potential with good \
                     footfall and manageable competition. Move fast before others discover it.",
    action: "Move fast!",
};

const MODERATE: Interpretation = Interpretation {
    category: "Moderate Potential",
    color: "yellow",
    emoji: "\u{1f7e1}",
    recommendation: "This location has potential but may require differentiation. Consider \
                     your unique value proposition and marketing strategy.",
    action: "Needs differentiation",
};

const HIGH_RISK: Interpretation = Interpretation {
    category: "High Risk",
    color: "red",
    emoji: "\u{1f534}",
    recommendation: "This location shows challenging conditions with high competition or low \
                     footfall. Consider alternative locations or a very niche strategy.",
    action: "Reconsider or pivot",
};

/// Map a score onto its interpretation band. The bands partition `[0, 100]`
/// with no gaps: `>= 70` prime, `40..70` moderate, `< 40` high risk.
#[must_use]
pub fn interpret(score: u32) -> Interpretation {
    if score >= 70 {
        PRIME
    } else if score >= 40 {
        MODERATE
    } else {
        HIGH_RISK
    }
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10_f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Run the full top-level analysis: component scores, composed score,
/// interpretation, and display summaries.
#[must_use]
pub fn analyze_location(
    landmarks: &LandmarksBundle,
    competitors: &CompetitorsBundle,
    weights: &ScoringWeights,
    radius_m: f64,
) -> OpportunityResult {
    let footfall = footfall_proxy(landmarks, competitors);
    let value = landmark_value(landmarks, weights);
    let density = competitor_density(competitors, radius_m);

    let score = opportunity_score(footfall, value, density);

    let landmarks_summary: BTreeMap<String, usize> = landmarks
        .by_category
        .iter()
        .map(|(category, bucket)| (category.clone(), bucket.count))
        .collect();

    OpportunityResult {
        opportunity_score: score,
        interpretation: interpret(score),
        breakdown: Breakdown {
            footfall_proxy: round_to(footfall, 1),
            landmark_value: round_to(value, 1),
            competitor_density: round_to(density, 2),
            competitor_count: competitors.count,
        },
        landmarks_summary,
        competitors: competitors.clone(),
    }
}
