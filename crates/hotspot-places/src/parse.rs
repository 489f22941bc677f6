//! Parsing of free-text landmark mentions from reverse-geocode responses.
//!
//! The reverse-geocode `landmark` field arrives as a comma-separated list of
//! mentions like `"< 0.5km from Cafe Noir, ~ 1.2km from City Mall"`. Each
//! mention is parsed into a name and distance, tagged with a category, and
//! flagged as a competitor when the name matches keywords for the requested
//! business type.

use hotspot_core::categories::detect_landmark_category;
use regex::Regex;
use serde::Serialize;

/// Name keywords that mark a parsed landmark as a competitor for a given
/// business type.
const COMPETITOR_NAME_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "cafe",
        &[
            "cafe", "coffee", "tea", "bakery", "starbucks", "barista", "roasters", "brew", "chai",
        ],
    ),
    (
        "restaurant",
        &[
            "restaurant", "food", "kitchen", "dhaba", "biryani", "pizza", "burger", "diner",
            "sweets", "hotel", "eatery", "cuisine", "tandoor", "grill",
        ],
    ),
    (
        "gym",
        &["gym", "fitness", "yoga", "sports", "crossfit", "health club", "workout"],
    ),
    (
        "pharmacy",
        &["pharmacy", "medical", "chemist", "medicine", "drugstore", "pharma"],
    ),
    (
        "salon",
        &["salon", "spa", "beauty", "hair", "parlour", "parlor", "barber"],
    ),
    (
        "retail",
        &["store", "mart", "shop", "retail", "boutique", "emporium", "showroom"],
    ),
    (
        "grocery",
        &["grocery", "kirana", "supermarket", "mart", "provision", "general store"],
    ),
];

/// A landmark mention parsed from reverse-geocode text.
#[derive(Debug, Clone, Serialize)]
pub struct ParsedLandmark {
    pub name: String,
    /// Approximate distance from the queried point, in metres.
    pub distance_m: u32,
    pub category: String,
    pub is_competitor: bool,
}

/// Parses landmark mentions out of reverse-geocode text.
///
/// Mentions that do not match the `"<distance>km from <name>"` shape are
/// skipped. Distances are converted to whole metres. The category is the
/// business type for competitor matches and the keyword-detected landmark
/// category otherwise.
#[must_use]
pub fn parse_landmarks_from_text(landmark_text: &str, business_type: &str) -> Vec<ParsedLandmark> {
    if landmark_text.trim().is_empty() {
        return Vec::new();
    }

    // Accepts "< 0.5km from X", "~ 0.5km from X", "> 0.5km from X",
    // and "0.5km from X".
    let mention_re = Regex::new(r"(?i)^[<>~]?\s*([\d.]+)\s*km\s+from\s+(.+)$")
        .expect("valid landmark mention regex");

    let competitor_keywords = COMPETITOR_NAME_KEYWORDS
        .iter()
        .find(|(bt, _)| *bt == business_type)
        .map_or(&[][..], |(_, keywords)| keywords);

    let mut parsed = Vec::new();
    for part in landmark_text.split(',') {
        let Some(captures) = mention_re.captures(part.trim()) else {
            continue;
        };
        let Ok(distance_km) = captures[1].parse::<f64>() else {
            continue;
        };
        let name = captures[2].trim().to_owned();
        let name_lower = name.to_lowercase();

        let is_competitor = competitor_keywords.iter().any(|kw| name_lower.contains(kw));
        let category = if is_competitor {
            business_type.to_owned()
        } else {
            detect_landmark_category(&name).to_owned()
        };

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let distance_m = (distance_km * 1000.0).max(0.0) as u32;

        parsed.push(ParsedLandmark {
            name,
            distance_m,
            category,
            is_competitor,
        });
    }

    parsed
}
