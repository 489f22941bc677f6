//! Deterministic opportunity scoring for candidate business locations.
//!
//! Converts raw landmark/competitor lists into a single 0-100 opportunity
//! score with interpretation, and into a ranked set of recommended
//! sub-locations via grid-based spatial scoring with road-proximity
//! filtering. Pure and request-scoped: the only I/O is the injected
//! [`RoadProbe`] capability.

pub mod density;
pub mod footfall;
pub mod geo;
pub mod grid;
mod keywords;
pub mod landmark_value;
pub mod opportunity;
pub mod spots;
pub mod types;

pub use density::competitor_density;
pub use footfall::footfall_proxy;
pub use geo::{haversine_distance, Coordinate};
pub use grid::{grid_scores, DEFAULT_GRID_SIZE};
pub use landmark_value::landmark_value;
pub use opportunity::{analyze_location, interpret, opportunity_score};
pub use spots::{find_recommended_spots, RoadProbe, SpotParams};
pub use types::{
    Breakdown, CategoryBucket, CompetitorsBundle, GridCell, Interpretation, LandmarksBundle,
    OpportunityResult, Poi, Rating, RecommendedSpot,
};
