//! Landmark weight table used by the landmark value score.
//!
//! Defaults are baked in; deployments can override individual categories with
//! a YAML file pointed at by `HOTSPOT_WEIGHTS_PATH`.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::ConfigError;

/// Per-category landmark weights, unknown categories fall back to
/// `default_weight`.
#[derive(Debug, Clone)]
pub struct ScoringWeights {
    landmark_weights: BTreeMap<String, f64>,
    default_weight: f64,
}

const DEFAULT_LANDMARK_WEIGHTS: &[(&str, f64)] = &[
    ("metro_station", 15.0),
    ("bus_stop", 5.0),
    ("school", 10.0),
    ("college", 12.0),
    ("hospital", 8.0),
    ("mall", 15.0),
    ("office", 12.0),
    ("residential", 8.0),
    ("temple", 6.0),
    ("park", 5.0),
    ("atm", 4.0),
    ("bar", 7.0),
];

const DEFAULT_WEIGHT: f64 = 5.0;

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            landmark_weights: DEFAULT_LANDMARK_WEIGHTS
                .iter()
                .map(|(category, weight)| ((*category).to_string(), *weight))
                .collect(),
            default_weight: DEFAULT_WEIGHT,
        }
    }
}

impl ScoringWeights {
    /// Weight for a landmark category, falling back to the default weight for
    /// categories absent from the table.
    #[must_use]
    pub fn landmark_weight(&self, category: &str) -> f64 {
        self.landmark_weights
            .get(category)
            .copied()
            .unwrap_or(self.default_weight)
    }

    #[must_use]
    pub fn default_weight(&self) -> f64 {
        self.default_weight
    }
}

#[derive(Debug, Deserialize)]
struct WeightsFile {
    #[serde(default)]
    landmark_weights: BTreeMap<String, f64>,
    default_weight: Option<f64>,
}

/// Load scoring weights from a YAML override file, merged over the defaults.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or contains a
/// negative weight.
pub fn load_weights(path: &Path) -> Result<ScoringWeights, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::WeightsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let file: WeightsFile = serde_yaml::from_str(&content)?;

    let mut weights = ScoringWeights::default();
    for (category, weight) in file.landmark_weights {
        if weight < 0.0 {
            return Err(ConfigError::Validation(format!(
                "negative weight {weight} for category '{category}'"
            )));
        }
        weights.landmark_weights.insert(category, weight);
    }
    if let Some(default_weight) = file.default_weight {
        if default_weight < 0.0 {
            return Err(ConfigError::Validation(format!(
                "negative default weight {default_weight}"
            )));
        }
        weights.default_weight = default_weight;
    }

    Ok(weights)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_matches_known_categories() {
        let weights = ScoringWeights::default();
        assert!((weights.landmark_weight("metro_station") - 15.0).abs() < f64::EPSILON);
        assert!((weights.landmark_weight("atm") - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn unknown_category_uses_default_weight() {
        let weights = ScoringWeights::default();
        assert!((weights.landmark_weight("heliport") - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn yaml_override_merges_over_defaults() {
        let yaml = "landmark_weights:\n  metro_station: 20\n  heliport: 9\n";
        let file: WeightsFile = serde_yaml::from_str(yaml).unwrap();
        let mut weights = ScoringWeights::default();
        for (category, weight) in file.landmark_weights {
            weights.landmark_weights.insert(category, weight);
        }
        assert!((weights.landmark_weight("metro_station") - 20.0).abs() < f64::EPSILON);
        assert!((weights.landmark_weight("heliport") - 9.0).abs() < f64::EPSILON);
        // Untouched entries keep their defaults.
        assert!((weights.landmark_weight("mall") - 15.0).abs() < f64::EPSILON);
    }
}
