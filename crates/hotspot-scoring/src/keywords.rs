//! Keyword tier tables for the name-heuristic scoring paths.
//!
//! Tiers are matched in order; the first tier containing a keyword found in
//! the haystack wins. Point values are empirically tuned constants carried
//! over unchanged from the original model.

/// Footfall fallback tiers: applied to POI names when no structured category
/// produced a score.
pub(crate) const FOOTFALL_NAME_TIERS: &[(&[&str], f64)] = &[
    (&["metro", "station", "railway", "train"], 20.0),
    (&["mall", "plaza", "center", "centre"], 15.0),
    (&["hospital", "clinic", "medical"], 12.0),
    (&["school", "college", "university", "institute"], 10.0),
    (&["office", "corporate", "tech", "park"], 10.0),
    (&["hotel", "restaurant", "cafe", "food"], 8.0),
    (&["temple", "church", "mosque", "gurudwara"], 5.0),
];

pub(crate) const FOOTFALL_NAME_DEFAULT: f64 = 3.0;

/// Landmark value fallback tiers: per-POI weights fed into the diminishing
/// returns decay.
pub(crate) const LANDMARK_NAME_TIERS: &[(&[&str], f64)] = &[
    (&["metro", "station", "railway"], 12.0),
    (&["mall", "plaza", "market"], 10.0),
    (&["hospital", "medical"], 8.0),
    (&["school", "college", "university"], 8.0),
    (&["hotel", "restaurant"], 6.0),
    (&["bank", "atm"], 5.0),
];

pub(crate) const LANDMARK_NAME_DEFAULT: f64 = 3.0;

/// Grid scorer tiers: multipliers for the linear proximity bonus of nearby
/// landmarks. Matched against both name and category.
pub(crate) const GRID_FOOTFALL_TIERS: &[(&[&str], f64)] = &[
    (&["metro", "station", "railway"], 25.0),
    (&["mall", "plaza", "market"], 20.0),
    (&["hospital", "medical", "clinic"], 15.0),
    (&["school", "college", "university"], 15.0),
    (&["office", "corporate", "tech"], 12.0),
    (&["bank", "atm"], 10.0),
];

pub(crate) const GRID_FOOTFALL_DEFAULT: f64 = 5.0;

/// Resolve the tier weight for a set of lowercase haystacks (name, category).
pub(crate) fn tier_weight(
    haystacks: &[&str],
    tiers: &[(&[&str], f64)],
    default_weight: f64,
) -> f64 {
    for (keywords, weight) in tiers {
        if keywords
            .iter()
            .any(|kw| haystacks.iter().any(|hay| hay.contains(kw)))
        {
            return *weight;
        }
    }
    default_weight
}
