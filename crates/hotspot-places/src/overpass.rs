//! OpenStreetMap Overpass API client.
//!
//! Fetches competitor POIs, landmark POIs, road-proximity answers, and
//! water-feature checks from the public Overpass mirrors. Queries are built
//! as Overpass QL unions over nodes, ways, and relations; ways and relations
//! are requested with `out center` so area features resolve to a point.
//!
//! The client holds an ordered list of mirror endpoints and fails over to the
//! next mirror when one is unreachable or returns a server error.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use hotspot_scoring::spots::RoadProbe;
use hotspot_scoring::types::Poi;
use serde::Deserialize;

use crate::error::PlacesError;
use crate::retry::retry_with_backoff;

/// Public Overpass mirrors, tried in order.
pub const DEFAULT_ENDPOINTS: [&str; 2] = [
    "https://overpass-api.de/api/interpreter",
    "https://overpass.kumi.systems/api/interpreter",
];

/// OSM tag filters per business category. Categories not listed here fall
/// back to a generic `amenity=<category>` filter.
const CATEGORY_TAG_MAPPING: &[(&str, &[(&str, &str)])] = &[
    // Food and beverage
    (
        "cafe",
        &[
            ("amenity", "cafe"),
            ("shop", "coffee"),
            ("cuisine", "coffee_shop"),
            // Many cafes are tagged as fast_food.
            ("amenity", "fast_food"),
        ],
    ),
    ("coffee", &[("amenity", "cafe"), ("shop", "coffee")]),
    (
        "restaurant",
        &[
            ("amenity", "restaurant"),
            ("amenity", "fast_food"),
            ("amenity", "food_court"),
        ],
    ),
    ("fast_food", &[("amenity", "fast_food")]),
    ("bar", &[("amenity", "bar"), ("amenity", "pub")]),
    ("pub", &[("amenity", "pub"), ("amenity", "bar")]),
    ("bakery", &[("shop", "bakery"), ("shop", "pastry")]),
    (
        "ice_cream",
        &[
            ("amenity", "ice_cream"),
            ("shop", "ice_cream"),
            ("shop", "frozen_yogurt"),
        ],
    ),
    // Health and fitness
    ("gym", &[("leisure", "fitness_centre"), ("amenity", "gym")]),
    ("pharmacy", &[("amenity", "pharmacy")]),
    ("hospital", &[("amenity", "hospital")]),
    ("clinic", &[("amenity", "clinic")]),
    ("dentist", &[("amenity", "dentist")]),
    // Retail
    ("supermarket", &[("shop", "supermarket")]),
    ("grocery", &[("shop", "grocery"), ("shop", "convenience")]),
    ("convenience", &[("shop", "convenience")]),
    ("clothing", &[("shop", "clothes")]),
    ("electronics", &[("shop", "electronics")]),
    ("mall", &[("shop", "mall")]),
    ("retail", &[("shop", "retail")]),
    // Services
    ("salon", &[("shop", "hairdresser"), ("shop", "beauty")]),
    ("spa", &[("leisure", "spa"), ("shop", "massage")]),
    ("laundry", &[("shop", "laundry")]),
    ("bank", &[("amenity", "bank")]),
    ("atm", &[("amenity", "atm")]),
    // Education
    ("school", &[("amenity", "school")]),
    ("college", &[("amenity", "college")]),
    ("university", &[("amenity", "university")]),
    ("tuition", &[("amenity", "tutoring")]),
    // Entertainment
    ("cinema", &[("amenity", "cinema")]),
    ("theatre", &[("amenity", "theatre")]),
    ("nightclub", &[("amenity", "nightclub")]),
    // Accommodation
    ("hotel", &[("tourism", "hotel")]),
    ("hostel", &[("tourism", "hostel")]),
    ("guest_house", &[("tourism", "guest_house")]),
];

/// OSM tag filters per landmark category, fetched one category at a time so
/// each result carries its category label.
const LANDMARK_TAG_MAPPING: &[(&str, &[(&str, &str)])] = &[
    ("metro", &[("railway", "station"), ("station", "subway")]),
    (
        "bus_stop",
        &[("highway", "bus_stop"), ("amenity", "bus_station")],
    ),
    ("school", &[("amenity", "school")]),
    (
        "college",
        &[("amenity", "college"), ("amenity", "university")],
    ),
    ("hospital", &[("amenity", "hospital")]),
    ("mall", &[("shop", "mall")]),
    ("park", &[("leisure", "park")]),
    ("bank", &[("amenity", "bank")]),
    ("atm", &[("amenity", "atm")]),
    ("temple", &[("amenity", "place_of_worship")]),
];

/// Road classes that count as accessible for the road-proximity probe.
const ROAD_HIGHWAY_PATTERN: &str = "primary|secondary|tertiary|residential|unclassified|service";

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize)]
struct OverpassElement {
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
    #[serde(default)]
    center: Option<OverpassCenter>,
    #[serde(default)]
    tags: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct OverpassCenter {
    lat: f64,
    lon: f64,
}

impl OverpassElement {
    /// Nodes carry `lat`/`lon` directly; ways and relations queried with
    /// `out center` carry a `center` object. Elements with neither resolve
    /// to the query center.
    fn position(&self, fallback_lat: f64, fallback_lng: f64) -> (f64, f64) {
        match (self.lat, self.lon, &self.center) {
            (Some(lat), Some(lon), _) => (lat, lon),
            (_, _, Some(center)) => (center.lat, center.lon),
            _ => (fallback_lat, fallback_lng),
        }
    }

    fn name(&self) -> Option<&str> {
        self.tags.get("name").map(String::as_str).filter(|n| !n.is_empty())
    }
}

/// Client for the OpenStreetMap Overpass API with mirror failover.
pub struct OverpassClient {
    client: reqwest::Client,
    endpoints: Vec<String>,
    road_timeout_secs: u64,
    max_retries: u32,
    retry_backoff_base_secs: u64,
}

impl OverpassClient {
    /// Creates a client pointed at the public Overpass mirrors.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        road_timeout_secs: u64,
        max_retries: u32,
        retry_backoff_base_secs: u64,
    ) -> Result<Self, PlacesError> {
        let endpoints = DEFAULT_ENDPOINTS.iter().map(|&e| e.to_owned()).collect();
        Self::with_endpoints(
            timeout_secs,
            road_timeout_secs,
            max_retries,
            retry_backoff_base_secs,
            endpoints,
        )
    }

    /// Creates a client with custom mirror endpoints (for testing with
    /// wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn with_endpoints(
        timeout_secs: u64,
        road_timeout_secs: u64,
        max_retries: u32,
        retry_backoff_base_secs: u64,
        endpoints: Vec<String>,
    ) -> Result<Self, PlacesError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("hotspot-iq/0.1 (location-intelligence)")
            .build()?;

        Ok(Self {
            client,
            endpoints,
            road_timeout_secs,
            max_retries,
            retry_backoff_base_secs,
        })
    }

    /// Fetches competitor POIs of `category` within `radius_m` of the point.
    ///
    /// Unnamed elements are kept with the name `"Unknown"` so competitor
    /// counts stay accurate even where OSM coverage is thin.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::AllEndpointsFailed`] when every mirror fails,
    /// or [`PlacesError::Deserialize`] on a malformed response body.
    pub async fn fetch_competitors(
        &self,
        lat: f64,
        lng: f64,
        radius_m: u32,
        category: &str,
    ) -> Result<Vec<Poi>, PlacesError> {
        let tags = competitor_tags(category);
        let query = build_detailed_query(lat, lng, radius_m, &tags, 25);
        let response = self.run_query(&query).await?;

        let competitors = response
            .elements
            .into_iter()
            .map(|element| {
                let (poi_lat, poi_lng) = element.position(lat, lng);
                Poi {
                    name: element.name().unwrap_or("Unknown").to_owned(),
                    lat: poi_lat,
                    lng: poi_lng,
                    category: category.to_lowercase(),
                }
            })
            .collect();

        Ok(competitors)
    }

    /// Fetches landmark POIs of every known landmark category within
    /// `radius_m` of the point. Unnamed elements are skipped; a category
    /// whose query fails on all mirrors is logged and skipped rather than
    /// failing the whole fetch.
    ///
    /// # Errors
    ///
    /// Returns an error only when every category query fails.
    pub async fn fetch_landmarks(
        &self,
        lat: f64,
        lng: f64,
        radius_m: u32,
    ) -> Result<Vec<Poi>, PlacesError> {
        let mut landmarks = Vec::new();
        let mut last_err = None;
        let mut any_succeeded = false;

        for (category, tags) in LANDMARK_TAG_MAPPING {
            let query = build_detailed_query(lat, lng, radius_m, tags, 25);
            match self.run_query(&query).await {
                Ok(response) => {
                    any_succeeded = true;
                    for element in response.elements {
                        let Some(name) = element.name() else {
                            continue;
                        };
                        let (poi_lat, poi_lng) = element.position(lat, lng);
                        landmarks.push(Poi {
                            name: name.to_owned(),
                            lat: poi_lat,
                            lng: poi_lng,
                            category: (*category).to_owned(),
                        });
                    }
                }
                Err(err) => {
                    tracing::warn!(category, error = %err, "landmark category query failed, skipping");
                    last_err = Some(err);
                }
            }
        }

        match (any_succeeded, last_err) {
            (false, Some(err)) => Err(err),
            _ => Ok(landmarks),
        }
    }

    /// Checks whether a drivable road passes within `max_distance_m` of the
    /// point. Only the first mirror is queried, with a short timeout, because
    /// this runs inside the rate-limited spot-search loop.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] or [`PlacesError::UnexpectedStatus`] on
    /// transport failure, or [`PlacesError::Deserialize`] on a malformed body.
    pub async fn road_within(
        &self,
        lat: f64,
        lng: f64,
        max_distance_m: f64,
    ) -> Result<bool, PlacesError> {
        let query = format!(
            "[out:json][timeout:{timeout}];\n(\n  \
             way[\"highway\"~\"{ROAD_HIGHWAY_PATTERN}\"](around:{max_distance_m},{lat},{lng});\n);\n\
             out body;",
            timeout = self.road_timeout_secs,
        );

        let endpoint = self
            .endpoints
            .first()
            .ok_or_else(|| PlacesError::Api("no Overpass endpoints configured".to_owned()))?;
        let response = self.post_query(endpoint, &query).await?;
        Ok(!response.elements.is_empty())
    }

    /// Checks whether the point sits in or immediately beside a water
    /// feature. Returns the kind of water found (`"ocean or sea"`,
    /// `"lake or reservoir"`, a waterway type, or `"water body"`), or `None`
    /// when the location is dry land.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::AllEndpointsFailed`] when every mirror fails.
    pub async fn water_feature_at(
        &self,
        lat: f64,
        lng: f64,
    ) -> Result<Option<String>, PlacesError> {
        let query = format!(
            "[out:json][timeout:20];\n(\n  \
             way[\"natural\"=\"water\"](around:100,{lat},{lng});\n  \
             relation[\"natural\"=\"water\"](around:100,{lat},{lng});\n  \
             way[\"natural\"=\"coastline\"](around:1000,{lat},{lng});\n  \
             way[\"water\"](around:100,{lat},{lng});\n  \
             relation[\"water\"](around:100,{lat},{lng});\n  \
             way[\"waterway\"~\"river|stream|canal\"](around:100,{lat},{lng});\n  \
             way[\"place\"~\"sea|ocean\"](around:500,{lat},{lng});\n  \
             relation[\"place\"~\"sea|ocean\"](around:500,{lat},{lng});\n);\n\
             out body;"
        );
        let response = self.run_query(&query).await?;

        if response.elements.is_empty() {
            return Ok(None);
        }

        let mut water_type = "water body".to_owned();
        for element in &response.elements {
            let tags = &element.tags;
            if tags.get("natural").is_some_and(|v| v == "coastline")
                || tags
                    .get("place")
                    .is_some_and(|v| v == "sea" || v == "ocean")
            {
                water_type = "ocean or sea".to_owned();
                break;
            }
            if tags.get("natural").is_some_and(|v| v == "water") {
                water_type = tags
                    .get("water")
                    .cloned()
                    .unwrap_or_else(|| "lake or reservoir".to_owned());
                break;
            }
            if let Some(waterway) = tags.get("waterway") {
                water_type = waterway.clone();
                break;
            }
        }

        Ok(Some(water_type))
    }

    /// Runs an Overpass QL query against the mirrors in order, with retries
    /// on transient errors per mirror, returning the first successful
    /// response.
    async fn run_query(&self, query: &str) -> Result<OverpassResponse, PlacesError> {
        let mut last_err = None;

        for endpoint in &self.endpoints {
            let result = retry_with_backoff(self.max_retries, self.retry_backoff_base_secs, || {
                self.post_query(endpoint, query)
            })
            .await;

            match result {
                Ok(response) => return Ok(response),
                Err(err) => {
                    tracing::warn!(endpoint, error = %err, "Overpass mirror failed, trying next");
                    last_err = Some(err);
                }
            }
        }

        Err(PlacesError::AllEndpointsFailed {
            attempted: self.endpoints.len(),
            last_error: last_err
                .map_or_else(|| "no endpoints configured".to_owned(), |e| e.to_string()),
        })
    }

    /// Posts a query to a single endpoint as `data=<query>` form content,
    /// the wire format the Overpass interpreter expects.
    async fn post_query(
        &self,
        endpoint: &str,
        query: &str,
    ) -> Result<OverpassResponse, PlacesError> {
        let response = self
            .client
            .post(endpoint)
            .form(&[("data", query)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PlacesError::UnexpectedStatus {
                status: status.as_u16(),
                url: endpoint.to_owned(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| PlacesError::Deserialize {
            context: endpoint.to_owned(),
            source: e,
        })
    }
}

#[async_trait]
impl RoadProbe for OverpassClient {
    /// Conservative probe: any transport or parse failure reports the point
    /// as not near a road, so spot recommendations never rest on an
    /// unverified road check.
    async fn is_near_road(&self, lat: f64, lng: f64, max_distance_m: f64) -> bool {
        match self.road_within(lat, lng, max_distance_m).await {
            Ok(near) => near,
            Err(err) => {
                tracing::warn!(lat, lng, error = %err, "road probe failed, treating as not near road");
                false
            }
        }
    }
}

/// Resolves the OSM tag filters for a business category, falling back to a
/// generic `amenity=<category>` filter for unmapped categories.
fn competitor_tags(category: &str) -> Vec<(String, String)> {
    let lower = category.to_lowercase();
    if let Some((_, tags)) = CATEGORY_TAG_MAPPING.iter().find(|(name, _)| *name == lower) {
        return tags
            .iter()
            .map(|&(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
    }
    tracing::debug!(category, "unmapped business category, using generic amenity filter");
    vec![("amenity".to_owned(), lower)]
}

/// Builds an Overpass QL union query over nodes, ways, and relations for
/// every tag filter, requesting `out body center` so area features resolve
/// to a representative point.
fn build_detailed_query(
    lat: f64,
    lng: f64,
    radius_m: u32,
    tags: &[(impl AsRef<str>, impl AsRef<str>)],
    timeout_secs: u64,
) -> String {
    let mut parts = String::new();
    for (key, value) in tags {
        let filter = format!(
            "[\"{}\"=\"{}\"](around:{radius_m},{lat},{lng});",
            key.as_ref(),
            value.as_ref()
        );
        for element in ["node", "way", "relation"] {
            parts.push_str("  ");
            parts.push_str(element);
            parts.push_str(&filter);
            parts.push('\n');
        }
    }
    format!("[out:json][timeout:{timeout_secs}];\n(\n{parts});\nout body center;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_category_maps_to_osm_tags() {
        let tags = competitor_tags("Cafe");
        assert!(tags.contains(&("amenity".to_owned(), "cafe".to_owned())));
        assert!(tags.contains(&("shop".to_owned(), "coffee".to_owned())));
    }

    #[test]
    fn unknown_category_falls_back_to_generic_amenity() {
        let tags = competitor_tags("Florist");
        assert_eq!(tags, vec![("amenity".to_owned(), "florist".to_owned())]);
    }

    #[test]
    fn detailed_query_unions_all_element_kinds() {
        let tags = vec![("amenity", "cafe")];
        let query = build_detailed_query(12.9716, 77.5946, 500, &tags, 25);
        assert!(query.contains("[out:json][timeout:25];"));
        assert!(query.contains("node[\"amenity\"=\"cafe\"](around:500,12.9716,77.5946);"));
        assert!(query.contains("way[\"amenity\"=\"cafe\"](around:500,12.9716,77.5946);"));
        assert!(query.contains("relation[\"amenity\"=\"cafe\"](around:500,12.9716,77.5946);"));
        assert!(query.ends_with("out body center;"));
    }

    #[test]
    fn element_position_prefers_node_coordinates() {
        let element = OverpassElement {
            lat: Some(12.98),
            lon: Some(77.60),
            center: Some(OverpassCenter {
                lat: 0.0,
                lon: 0.0,
            }),
            tags: BTreeMap::new(),
        };
        assert_eq!(element.position(1.0, 2.0), (12.98, 77.60));
    }

    #[test]
    fn element_position_falls_back_to_center_then_query_point() {
        let with_center = OverpassElement {
            lat: None,
            lon: None,
            center: Some(OverpassCenter {
                lat: 12.97,
                lon: 77.59,
            }),
            tags: BTreeMap::new(),
        };
        assert_eq!(with_center.position(1.0, 2.0), (12.97, 77.59));

        let bare = OverpassElement {
            lat: None,
            lon: None,
            center: None,
            tags: BTreeMap::new(),
        };
        assert_eq!(bare.position(1.0, 2.0), (1.0, 2.0));
    }
}
