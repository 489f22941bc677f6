//! External place-data providers.
//!
//! Two upstream sources feed the analysis pipeline: the OpenStreetMap
//! Overpass API (competitors, landmarks, road proximity, water features)
//! and the LatLong.ai API (geocoding, landmarks, POIs, isochrones). This
//! crate also parses the free-text landmark mentions that reverse geocoding
//! returns, and runs the location viability gates.

pub mod error;
pub mod latlong;
pub mod overpass;
pub mod parse;
mod retry;
pub mod validation;

pub use error::PlacesError;
pub use latlong::{
    fallback_isochrone, generate_digipin, AddressInfo, Digipin, GeocodeResult, LatLongClient,
    Suggestion,
};
pub use overpass::OverpassClient;
pub use parse::{parse_landmarks_from_text, ParsedLandmark};
pub use validation::{validate_location, ValidationReport};
