//! Static category vocabularies shared by the providers and the API layer.

/// Business type → competitor POI categories used when querying providers.
pub const COMPETITOR_MAPPING: &[(&str, &[&str])] = &[
    ("cafe", &["cafe", "coffee_shop", "bakery", "tea_house"]),
    ("restaurant", &["restaurant", "fast_food", "food_court", "dhaba"]),
    ("retail", &["supermarket", "convenience_store", "grocery", "retail"]),
    ("gym", &["gym", "fitness_center", "yoga_studio", "sports_club"]),
    ("pharmacy", &["pharmacy", "medical_store", "clinic"]),
    ("salon", &["salon", "spa", "beauty_parlor", "barbershop"]),
    ("electronics", &["electronics_store", "mobile_shop", "computer_store"]),
    ("clothing", &["clothing_store", "boutique", "fashion_store"]),
    ("bookstore", &["bookstore", "stationery_shop", "library"]),
];

/// Proximity filter name → POI category.
pub const FILTER_POI_MAPPING: &[(&str, &str)] = &[
    ("near_metro", "metro_station"),
    ("near_bus", "bus_stop"),
    ("near_school", "school"),
    ("near_college", "college"),
    ("near_hospital", "hospital"),
    ("near_mall", "mall"),
    ("near_office", "office"),
    ("near_residential", "residential"),
    ("near_temple", "temple"),
    ("near_park", "park"),
    ("near_atm", "atm"),
    ("near_bar", "bar"),
];

/// Name keywords used to tag free-text landmarks with a category.
const LANDMARK_CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    ("metro_station", &["metro", "subway"]),
    ("bus_stop", &["bus stop", "bus stand", "bus station"]),
    ("railway_station", &["railway", "train station", "rail"]),
    ("school", &["school", "vidyalaya", "vidya"]),
    ("college", &["college", "university", "institute", "iit", "nit"]),
    ("hospital", &["hospital", "medical", "clinic", "healthcare"]),
    ("mall", &["mall", "plaza", "shopping"]),
    ("office", &["office", "corporate", "tech park", "business"]),
    ("residential", &["apartment", "residency", "housing", "colony"]),
    ("temple", &["temple", "mandir", "church", "mosque", "gurudwara", "masjid"]),
    ("park", &["park", "garden", "ground"]),
    ("atm", &["atm", "bank"]),
    ("bar", &["bar", "pub", "brewery"]),
    ("restaurant", &["restaurant", "dhaba", "food", "kitchen", "cafe", "diner"]),
    ("hotel", &["hotel", "lodge", "guest house", "inn", "oyo", "capital o"]),
];

/// Detect a landmark category from its display name.
///
/// Returns `"default"` when no keyword matches; callers must treat that value
/// the same as any other unknown category.
#[must_use]
pub fn detect_landmark_category(name: &str) -> &'static str {
    let name_lower = name.to_lowercase();
    for (category, keywords) in LANDMARK_CATEGORY_KEYWORDS {
        if keywords.iter().any(|kw| name_lower.contains(kw)) {
            return category;
        }
    }
    "default"
}

/// Competitor POI categories for a business type, empty for unknown types.
#[must_use]
pub fn competitor_categories(business_type: &str) -> &'static [&'static str] {
    COMPETITOR_MAPPING
        .iter()
        .find(|(bt, _)| *bt == business_type)
        .map_or(&[], |(_, categories)| categories)
}

/// POI category for a proximity filter name, if the filter is known.
#[must_use]
pub fn filter_poi_category(filter: &str) -> Option<&'static str> {
    FILTER_POI_MAPPING
        .iter()
        .find(|(name, _)| *name == filter)
        .map(|(_, category)| *category)
}
