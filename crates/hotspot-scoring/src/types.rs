//! Request-scoped data shapes consumed and produced by the scoring pipeline.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A named point of interest. Landmarks and competitors are structurally
/// identical; the distinction is which list a `Poi` arrives in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Poi {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub category: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryBucket {
    pub count: usize,
    pub pois: Vec<Poi>,
}

/// Aggregate landmark view consumed by the scorers.
///
/// `total_count` always equals `all_pois.len()`. Category buckets need not
/// cover every POI; uncategorized landmarks are only visible via `all_pois`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LandmarksBundle {
    #[serde(default)]
    pub by_category: BTreeMap<String, CategoryBucket>,
    #[serde(default)]
    pub total_count: usize,
    #[serde(default)]
    pub all_pois: Vec<Poi>,
}

impl LandmarksBundle {
    /// Build a bundle from a flat landmark list, bucketing by each POI's
    /// category tag. POIs with an empty or `"default"` category stay out of
    /// the buckets but remain in `all_pois`.
    #[must_use]
    pub fn from_pois(pois: Vec<Poi>) -> Self {
        let mut by_category: BTreeMap<String, CategoryBucket> = BTreeMap::new();
        for poi in &pois {
            if poi.category.is_empty() || poi.category == "default" {
                continue;
            }
            let bucket = by_category.entry(poi.category.clone()).or_default();
            bucket.count += 1;
            bucket.pois.push(poi.clone());
        }
        Self {
            total_count: pois.len(),
            by_category,
            all_pois: pois,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompetitorsBundle {
    pub count: usize,
    pub nearby: Vec<Poi>,
}

impl CompetitorsBundle {
    #[must_use]
    pub fn from_pois(nearby: Vec<Poi>) -> Self {
        Self {
            count: nearby.len(),
            nearby,
        }
    }
}

/// One sampled cell of the spatial grid. Produced by the grid scorer,
/// consumed by the spot selector.
#[derive(Debug, Clone, Serialize)]
pub struct GridCell {
    pub lat: f64,
    pub lng: f64,
    pub opportunity_score: f64,
    pub nearby_competitors: usize,
    pub min_competitor_distance: Option<f64>,
    pub nearby_landmarks: usize,
    pub footfall_score: f64,
    pub landmark_names: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Rating {
    Excellent,
    Good,
    Moderate,
    Fair,
}

impl Rating {
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score >= 50.0 {
            Rating::Excellent
        } else if score >= 30.0 {
            Rating::Good
        } else if score >= 15.0 {
            Rating::Moderate
        } else {
            Rating::Fair
        }
    }

    #[must_use]
    pub fn color(self) -> &'static str {
        match self {
            Rating::Excellent => "green",
            Rating::Good => "cyan",
            Rating::Moderate => "yellow",
            Rating::Fair => "orange",
        }
    }
}

/// A ranked recommendation inside the search radius. Immutable once created;
/// `rank` starts at 1 for the best spot.
#[derive(Debug, Clone, Serialize)]
pub struct RecommendedSpot {
    pub lat: f64,
    pub lng: f64,
    pub score: f64,
    pub rating: Rating,
    pub rating_color: &'static str,
    pub reasons: Vec<String>,
    pub nearby_competitors: usize,
    pub nearby_landmarks: usize,
    pub min_competitor_distance: Option<f64>,
    pub rank: usize,
}

/// Qualitative reading of an opportunity score. The advisory strings are
/// fixed configuration data, not derived logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Interpretation {
    pub category: &'static str,
    pub color: &'static str,
    pub emoji: &'static str,
    pub recommendation: &'static str,
    pub action: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Breakdown {
    pub footfall_proxy: f64,
    pub landmark_value: f64,
    pub competitor_density: f64,
    pub competitor_count: usize,
}

/// Complete analysis output: the composed score, its interpretation, the
/// component breakdown, and the inputs echoed for display.
#[derive(Debug, Clone, Serialize)]
pub struct OpportunityResult {
    pub opportunity_score: u32,
    pub interpretation: Interpretation,
    pub breakdown: Breakdown,
    pub landmarks_summary: BTreeMap<String, usize>,
    pub competitors: CompetitorsBundle,
}
