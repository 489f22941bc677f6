//! LatLong.ai API client.
//!
//! Covers the endpoints the analysis pipeline needs: autocomplete, geocode,
//! reverse geocode, nearby landmarks, POI lookup, and isochrones. Every
//! endpoint returns a `{ code, status, data }` envelope; non-`"success"`
//! statuses surface as [`PlacesError::Api`].
//!
//! Digipin codes are generated locally from coordinates since the upstream
//! DIGIPIN service is not publicly available.

use std::hash::{DefaultHasher, Hash, Hasher};
use std::time::Duration;

use hotspot_core::categories::{competitor_categories, filter_poi_category};
use hotspot_scoring::types::Poi;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::PlacesError;
use crate::retry::retry_with_backoff;

/// Production API host.
pub const DEFAULT_BASE_URL: &str = "https://apihub.latlong.ai";

/// One autocomplete suggestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    pub name: String,
    #[serde(default)]
    pub geoid: Option<i64>,
}

/// Result of forward geocoding an address string.
#[derive(Debug, Clone, Serialize)]
pub struct GeocodeResult {
    pub address: String,
    pub lat: f64,
    pub lng: f64,
    pub accuracy: String,
}

/// Address details for a coordinate, from reverse geocoding.
#[derive(Debug, Clone, Serialize)]
pub struct AddressInfo {
    pub formatted_address: String,
    /// Locality-level name extracted from the full address, suitable for
    /// display headings (e.g. "Indiranagar, Bengaluru").
    pub area_name: String,
    pub pincode: String,
    pub landmark: String,
}

/// Locally generated digital address code.
#[derive(Debug, Clone, Serialize)]
pub struct Digipin {
    pub digipin: String,
    pub formatted_address: String,
}

#[derive(Debug, Deserialize)]
struct GeocodeData {
    #[serde(default)]
    address: Option<String>,
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    accuracy: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReverseGeocodeData {
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    pincode: Option<String>,
    #[serde(default)]
    landmark: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LandmarkItem {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    latitude: Option<f64>,
    #[serde(default)]
    longitude: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct PoiItem {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    category: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IsochroneData {
    geom: Value,
}

/// Client for the LatLong.ai REST API.
///
/// Manages the HTTP client, authorization token, and base URL. Point
/// `base_url` at a mock server in tests.
pub struct LatLongClient {
    client: reqwest::Client,
    api_key: String,
    base_url: Url,
    max_retries: u32,
    retry_backoff_base_secs: u64,
}

impl LatLongClient {
    /// Creates a new client.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`PlacesError::Api`] if `base_url` is not a
    /// valid URL.
    pub fn new(
        api_key: &str,
        base_url: &str,
        timeout_secs: u64,
        max_retries: u32,
        retry_backoff_base_secs: u64,
    ) -> Result<Self, PlacesError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("hotspot-iq/0.1 (location-intelligence)")
            .build()?;

        // Normalise to exactly one trailing slash so Url::join keeps the
        // full path instead of replacing the last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| PlacesError::Api(format!("invalid base URL '{base_url}': {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
            max_retries,
            retry_backoff_base_secs,
        })
    }

    /// Suggests area names matching a partial query, optionally biased
    /// toward a coordinate. Queries shorter than two characters return no
    /// suggestions without hitting the API.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Api`] on a non-success envelope, or
    /// [`PlacesError::Http`]/[`PlacesError::Deserialize`] on transport or
    /// parse failures.
    pub async fn autocomplete(
        &self,
        query: &str,
        bias: Option<(f64, f64)>,
        limit: usize,
    ) -> Result<Vec<Suggestion>, PlacesError> {
        if query.trim().len() < 2 {
            return Ok(Vec::new());
        }

        let mut params = vec![
            ("query".to_owned(), query.to_owned()),
            ("limit".to_owned(), limit.min(20).to_string()),
        ];
        if let Some((lat, lng)) = bias {
            params.push(("lat".to_owned(), lat.to_string()));
            params.push(("long".to_owned(), lng.to_string()));
        }

        let data = self.request_get("v4/autocomplete.json", &params).await?;
        let items: Vec<Suggestion> =
            serde_json::from_value(data).map_err(|e| PlacesError::Deserialize {
                context: format!("autocomplete(query={query})"),
                source: e,
            })?;

        Ok(items.into_iter().take(limit).collect())
    }

    /// Forward-geocodes an address to a coordinate.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Api`] on a non-success envelope, or
    /// [`PlacesError::Deserialize`] when the response lacks coordinates.
    pub async fn geocode(&self, address: &str) -> Result<GeocodeResult, PlacesError> {
        let params = vec![
            ("address".to_owned(), address.to_owned()),
            ("accuracy_level".to_owned(), "true".to_owned()),
        ];
        let data = self.request_get("v4/geocode.json", &params).await?;
        let parsed: GeocodeData =
            serde_json::from_value(data).map_err(|e| PlacesError::Deserialize {
                context: format!("geocode(address={address})"),
                source: e,
            })?;

        Ok(GeocodeResult {
            address: parsed.address.unwrap_or_else(|| address.to_owned()),
            lat: parsed.latitude,
            lng: parsed.longitude,
            accuracy: parsed.accuracy.unwrap_or_default(),
        })
    }

    /// Reverse-geocodes a coordinate to address details, extracting a
    /// display-friendly area name from the full address.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Api`] on a non-success envelope.
    pub async fn reverse_geocode(&self, lat: f64, lng: f64) -> Result<AddressInfo, PlacesError> {
        let params = vec![
            ("latitude".to_owned(), lat.to_string()),
            ("longitude".to_owned(), lng.to_string()),
        ];
        let data = self.request_get("v4/reverse_geocode.json", &params).await?;
        let parsed: ReverseGeocodeData =
            serde_json::from_value(data).map_err(|e| PlacesError::Deserialize {
                context: format!("reverse_geocode({lat},{lng})"),
                source: e,
            })?;

        let formatted_address = parsed
            .address
            .unwrap_or_else(|| format!("{lat}, {lng}"));
        let area_name = extract_area_name(&formatted_address);

        Ok(AddressInfo {
            formatted_address,
            area_name,
            pincode: parsed.pincode.unwrap_or_default(),
            landmark: parsed.landmark.unwrap_or_default(),
        })
    }

    /// Fetches named landmarks near a coordinate. Items missing coordinates
    /// are pinned to the query point.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Api`] on a non-success envelope.
    pub async fn landmarks(&self, lat: f64, lng: f64) -> Result<Vec<Poi>, PlacesError> {
        let params = vec![
            ("lat".to_owned(), lat.to_string()),
            ("lon".to_owned(), lng.to_string()),
        ];
        let data = self.request_get("v4/landmarks.json", &params).await?;
        let items: Vec<LandmarkItem> =
            serde_json::from_value(data).map_err(|e| PlacesError::Deserialize {
                context: format!("landmarks({lat},{lng})"),
                source: e,
            })?;

        Ok(items
            .into_iter()
            .map(|item| Poi {
                name: item.name.unwrap_or_else(|| "Unknown".to_owned()),
                lat: item.latitude.unwrap_or(lat),
                lng: item.longitude.unwrap_or(lng),
                category: "landmark".to_owned(),
            })
            .collect())
    }

    /// Fetches POIs of a category near a coordinate. The POI endpoint does
    /// not return coordinates, so results are pinned to the query point.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Api`] on a non-success envelope.
    pub async fn points_of_interest(
        &self,
        lat: f64,
        lng: f64,
        category: &str,
    ) -> Result<Vec<Poi>, PlacesError> {
        let params = vec![
            ("latitude".to_owned(), lat.to_string()),
            ("longitude".to_owned(), lng.to_string()),
            ("category".to_owned(), category.to_owned()),
        ];
        let data = self.request_get("v4/point_of_interest.json", &params).await?;
        let items: Vec<PoiItem> =
            serde_json::from_value(data).map_err(|e| PlacesError::Deserialize {
                context: format!("points_of_interest({lat},{lng},{category})"),
                source: e,
            })?;

        Ok(items
            .into_iter()
            .map(|item| Poi {
                name: item.name.unwrap_or_else(|| "Unknown".to_owned()),
                lat,
                lng,
                category: item.category.unwrap_or_else(|| category.to_owned()),
            })
            .collect())
    }

    /// Finds competitor businesses for a business type by combining the
    /// landmarks endpoint (name-matched against the competitor categories,
    /// keeping coordinates) with a POI lookup per category. Results are
    /// deduplicated by name. Unknown business types yield no competitors
    /// without a network call.
    ///
    /// # Errors
    ///
    /// Returns an error only when every underlying request fails.
    pub async fn competitors(
        &self,
        lat: f64,
        lng: f64,
        business_type: &str,
    ) -> Result<Vec<Poi>, PlacesError> {
        let categories = competitor_categories(business_type);
        if categories.is_empty() {
            return Ok(Vec::new());
        }

        let mut found: Vec<Poi> = Vec::new();
        let mut last_err = None;
        let mut any_succeeded = false;

        match self.landmarks(lat, lng).await {
            Ok(landmarks) => {
                any_succeeded = true;
                for landmark in landmarks {
                    let name_lower = landmark.name.to_lowercase();
                    if let Some(category) =
                        categories.iter().find(|c| name_lower.contains(&c.to_lowercase()))
                    {
                        found.push(Poi {
                            category: (*category).to_owned(),
                            ..landmark
                        });
                    }
                }
            }
            Err(err) => {
                tracing::warn!(lat, lng, error = %err, "landmark lookup failed, matching POIs only");
                last_err = Some(err);
            }
        }

        for category in categories {
            match self.points_of_interest(lat, lng, category).await {
                Ok(pois) => {
                    any_succeeded = true;
                    for poi in pois {
                        if !found.iter().any(|c| c.name == poi.name) {
                            found.push(poi);
                        }
                    }
                }
                Err(err) => {
                    tracing::warn!(category, error = %err, "competitor POI query failed, skipping");
                    last_err = Some(err);
                }
            }
        }

        match (any_succeeded, last_err) {
            (false, Some(err)) => Err(err),
            _ => Ok(found),
        }
    }

    /// Fetches landmarks for a set of proximity filters (`near_metro`,
    /// `near_school`, ...). Each known filter maps to a POI category; the
    /// nearby landmarks are name-matched against that category and the POI
    /// endpoint queried for it, with results tagged by category. Unknown
    /// filters are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error only when every underlying request fails.
    pub async fn landmarks_by_filters(
        &self,
        lat: f64,
        lng: f64,
        filters: &[&str],
    ) -> Result<Vec<Poi>, PlacesError> {
        let mut found: Vec<Poi> = Vec::new();
        let mut last_err = None;
        let mut any_succeeded = false;

        let nearby = match self.landmarks(lat, lng).await {
            Ok(landmarks) => {
                any_succeeded = true;
                landmarks
            }
            Err(err) => {
                tracing::warn!(lat, lng, error = %err, "landmark lookup failed, matching POIs only");
                last_err = Some(err);
                Vec::new()
            }
        };

        for filter in filters {
            let Some(category) = filter_poi_category(filter) else {
                continue;
            };

            for landmark in &nearby {
                if landmark.name.to_lowercase().contains(&category.to_lowercase())
                    && !found.iter().any(|p| p.name == landmark.name)
                {
                    found.push(Poi {
                        category: category.to_owned(),
                        ..landmark.clone()
                    });
                }
            }

            match self.points_of_interest(lat, lng, category).await {
                Ok(pois) => {
                    any_succeeded = true;
                    for poi in pois {
                        if !found.iter().any(|p| p.name == poi.name) {
                            found.push(Poi {
                                category: category.to_owned(),
                                ..poi
                            });
                        }
                    }
                }
                Err(err) => {
                    tracing::warn!(category, error = %err, "filter POI query failed, skipping");
                    last_err = Some(err);
                }
            }
        }

        match (any_succeeded, last_err) {
            (false, Some(err)) => Err(err),
            _ => Ok(found),
        }
    }

    /// Fetches a reachability isochrone as a GeoJSON Feature.
    ///
    /// Callers should fall back to [`fallback_isochrone`] when this fails;
    /// the upstream isochrone endpoint is the least reliable one.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Api`] on a non-success envelope, or
    /// [`PlacesError::Deserialize`] when the geometry is missing.
    pub async fn isochrone(
        &self,
        lat: f64,
        lng: f64,
        distance_km: f64,
    ) -> Result<Value, PlacesError> {
        let params = vec![
            ("latitude".to_owned(), lat.to_string()),
            ("longitude".to_owned(), lng.to_string()),
            ("distance_limit".to_owned(), distance_km.to_string()),
        ];
        let data = self.request_get("v4/isochrone.json", &params).await?;
        let parsed: IsochroneData =
            serde_json::from_value(data).map_err(|e| PlacesError::Deserialize {
                context: format!("isochrone({lat},{lng},{distance_km})"),
                source: e,
            })?;

        let geometry = parsed
            .geom
            .get("geometry")
            .cloned()
            .unwrap_or_else(|| json!({ "type": "Polygon", "coordinates": [] }));

        Ok(json!({
            "type": "Feature",
            "properties": {
                "distance_km": distance_km,
                "center": [lat, lng]
            },
            "geometry": geometry
        }))
    }

    /// Sends a GET request and unwraps the `{ code, status, data }` envelope,
    /// retrying transient failures with backoff.
    async fn request_get(
        &self,
        endpoint: &str,
        params: &[(String, String)],
    ) -> Result<Value, PlacesError> {
        retry_with_backoff(self.max_retries, self.retry_backoff_base_secs, || {
            self.request_get_once(endpoint, params)
        })
        .await
    }

    async fn request_get_once(
        &self,
        endpoint: &str,
        params: &[(String, String)],
    ) -> Result<Value, PlacesError> {
        let url = self
            .base_url
            .join(endpoint)
            .map_err(|e| PlacesError::Api(format!("invalid endpoint '{endpoint}': {e}")))?;

        let response = self
            .client
            .get(url.clone())
            .header("X-Authorization-Token", &self.api_key)
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PlacesError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Err(PlacesError::EmptyResponse(url.to_string()));
        }

        let envelope: Value =
            serde_json::from_str(&body).map_err(|e| PlacesError::Deserialize {
                context: url.to_string(),
                source: e,
            })?;

        if envelope.get("status").and_then(Value::as_str) != Some("success") {
            let message = envelope
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_owned();
            return Err(PlacesError::Api(message));
        }

        envelope
            .get("data")
            .cloned()
            .ok_or_else(|| PlacesError::Api("success envelope without data".to_owned()))
    }
}

/// Generates a deterministic circular polygon approximating an isochrone,
/// used when the isochrone endpoint is unavailable. The ring has 36 points
/// at 10-degree steps plus a closing point, with longitude scaled by the
/// latitude's meridian convergence.
#[must_use]
pub fn fallback_isochrone(lat: f64, lng: f64, distance_km: f64) -> Value {
    let radius_km = distance_km;
    let mut points = Vec::with_capacity(37);
    for i in 0..36u32 {
        let angle = (f64::from(i) * 10.0).to_radians();
        let dlat = (radius_km / 111.0) * angle.cos();
        let dlng = (radius_km / (111.0 * lat.to_radians().cos())) * angle.sin();
        points.push(json!([lng + dlng, lat + dlat]));
    }
    points.push(points[0].clone());

    json!({
        "type": "Feature",
        "properties": {
            "distance_km": distance_km,
            "is_fallback": true
        },
        "geometry": {
            "type": "Polygon",
            "coordinates": [points]
        }
    })
}

/// Generates a pseudo digital address code from coordinates: a two-letter
/// state code from bounding boxes plus a hash-derived four-digit area code.
/// The real DIGIPIN service is not publicly reachable, so this stays stable
/// for a given coordinate without a network call.
#[must_use]
pub fn generate_digipin(lat: f64, lng: f64) -> Digipin {
    // (state code, lat_min, lat_max, lng_min, lng_max)
    const STATE_BOXES: &[(&str, f64, f64, f64, f64)] = &[
        ("KA", 12.0, 15.5, 74.0, 78.5),
        ("MH", 15.5, 22.0, 72.0, 80.5),
        ("TN", 8.0, 13.5, 76.0, 80.5),
        ("DL", 28.0, 29.0, 76.5, 77.5),
        ("UP", 23.5, 30.5, 77.0, 84.5),
        ("WB", 21.5, 27.5, 85.5, 89.5),
        ("BR", 24.0, 27.5, 83.0, 88.5),
        ("GJ", 20.0, 24.5, 68.0, 74.5),
        ("RJ", 23.0, 30.0, 69.5, 78.0),
        ("KL", 8.0, 12.8, 74.5, 77.5),
    ];

    let state_code = STATE_BOXES
        .iter()
        .find(|&&(_, lat_min, lat_max, lng_min, lng_max)| {
            (lat_min..=lat_max).contains(&lat) && (lng_min..=lng_max).contains(&lng)
        })
        .map_or("XX", |&(code, ..)| code);

    let mut hasher = DefaultHasher::new();
    format!("{lat:.4},{lng:.4}").hash(&mut hasher);
    let area_code = hasher.finish() % 10_000;

    Digipin {
        digipin: format!("{state_code}-{area_code:04}"),
        formatted_address: format!("{lat:.6}, {lng:.6}"),
    }
}

/// Extracts the locality-level name from a comma-separated Indian address,
/// skipping door numbers, street names, buildings, and state/country parts,
/// and appending the city name when one is recognised.
fn extract_area_name(full_address: &str) -> String {
    const ROAD_KEYWORDS: &[&str] = &[
        "road", "street", "main", "cross", "lane", "avenue", "marg", "highway", "1st", "2nd",
        "3rd", "4th", "5th", "6th", "7th", "8th", "9th", "10th",
    ];
    const STATE_KEYWORDS: &[&str] = &[
        "karnataka",
        "maharashtra",
        "tamil nadu",
        "delhi",
        "telangana",
        "andhra pradesh",
        "kerala",
        "gujarat",
        "rajasthan",
        "west bengal",
        "uttar pradesh",
        "india",
    ];
    const SKIP_KEYWORDS: &[&str] = &[
        "floor", "block", "wing", "tower", "flat", "house", "no.", "building", "complex",
        "apartment", "plot", "door", "site",
    ];
    const CITY_KEYWORDS: &[&str] = &[
        "bengaluru",
        "bangalore",
        "mumbai",
        "chennai",
        "hyderabad",
        "kolkata",
        "pune",
        "ahmedabad",
        "jaipur",
        "mysuru",
        "mysore",
        "coimbatore",
    ];

    if full_address.is_empty() {
        return String::new();
    }

    let parts: Vec<&str> = full_address.split(',').map(str::trim).collect();
    let mut area_name: Option<&str> = None;
    let mut city_name: Option<&str> = None;

    for part in &parts {
        let lower = part.to_lowercase();
        if part.len() < 3 {
            continue;
        }
        // Door numbers and pincodes.
        if part
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .all(|c| c.is_ascii_digit())
        {
            continue;
        }
        if STATE_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
            continue;
        }
        if CITY_KEYWORDS.iter().any(|kw| lower == *kw) {
            city_name = Some(part);
            continue;
        }
        if SKIP_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
            continue;
        }
        if ROAD_KEYWORDS
            .iter()
            .any(|kw| lower.split_whitespace().any(|w| w == *kw))
        {
            continue;
        }
        if area_name.is_none() {
            area_name = Some(part);
        }
    }

    match (area_name, city_name) {
        (Some(area), Some(city)) => format!("{area}, {city}"),
        (Some(area), None) => area.to_owned(),
        (None, _) => parts
            .iter()
            .find(|p| p.len() > 3)
            .copied()
            .unwrap_or(parts.first().copied().unwrap_or(""))
            .to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn area_name_skips_door_numbers_and_streets() {
        let address = "221, 5th Main Road, Indiranagar, Bengaluru, Karnataka, 560038";
        assert_eq!(extract_area_name(address), "Indiranagar, Bengaluru");
    }

    #[test]
    fn area_name_without_recognised_city() {
        let address = "12, MG Layout, Tumakuru, 572101";
        assert_eq!(extract_area_name(address), "MG Layout");
    }

    #[test]
    fn digipin_is_deterministic_and_state_coded() {
        let a = generate_digipin(12.9716, 77.5946);
        let b = generate_digipin(12.9716, 77.5946);
        assert_eq!(a.digipin, b.digipin);
        assert!(a.digipin.starts_with("KA-"));
        assert_eq!(a.digipin.len(), 7);
    }

    #[test]
    fn digipin_outside_known_states_uses_placeholder_code() {
        let pin = generate_digipin(51.5072, -0.1276);
        assert!(pin.digipin.starts_with("XX-"));
    }

    #[test]
    fn fallback_isochrone_is_a_closed_ring() {
        let feature = fallback_isochrone(12.9716, 77.5946, 2.0);
        assert_eq!(feature["properties"]["is_fallback"], Value::Bool(true));
        let ring = feature["geometry"]["coordinates"][0]
            .as_array()
            .expect("polygon ring");
        assert_eq!(ring.len(), 37);
        assert_eq!(ring.first(), ring.last());
    }
}
