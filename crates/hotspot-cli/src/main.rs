use clap::{Parser, Subcommand};
use serde_json::json;

use hotspot_core::{AppConfig, ScoringWeights};
use hotspot_places::{
    generate_digipin, validate_location, validation::DEFAULT_ROAD_ACCESS_M, OverpassClient,
};
use hotspot_scoring::{
    analyze_location, find_recommended_spots, CompetitorsBundle, Coordinate, LandmarksBundle,
    SpotParams,
};

#[derive(Debug, Parser)]
#[command(name = "hotspot-cli")]
#[command(about = "Hotspot IQ command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Score a location for a business type.
    Analyze {
        #[arg(long)]
        lat: f64,
        #[arg(long)]
        lng: f64,
        #[arg(long, default_value = "cafe")]
        business_type: String,
        #[arg(long)]
        radius: Option<f64>,
    },
    /// Find the best open spots inside a search radius.
    Spots {
        #[arg(long)]
        lat: f64,
        #[arg(long)]
        lng: f64,
        #[arg(long, default_value = "cafe")]
        business_type: String,
        #[arg(long)]
        radius: Option<f64>,
    },
    /// Run the water-body and road-access gates for a point.
    Validate {
        #[arg(long)]
        lat: f64,
        #[arg(long)]
        lng: f64,
        #[arg(long, default_value_t = DEFAULT_ROAD_ACCESS_M)]
        max_road_distance_m: f64,
    },
    /// Generate the digital address code for a point.
    Digipin {
        #[arg(long)]
        lat: f64,
        #[arg(long)]
        lng: f64,
    },
}

fn osm_category(business_type: &str) -> &str {
    match business_type {
        "grocery" => "supermarket",
        other => other,
    }
}

fn build_overpass(config: &AppConfig) -> anyhow::Result<OverpassClient> {
    Ok(OverpassClient::new(
        config.http_timeout_secs,
        config.road_check_timeout_secs,
        config.max_retries,
        config.retry_backoff_base_secs,
    )?)
}

fn load_weights(config: &AppConfig) -> anyhow::Result<ScoringWeights> {
    Ok(match &config.weights_path {
        Some(path) => hotspot_core::load_weights(path)?,
        None => ScoringWeights::default(),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = hotspot_core::load_app_config()?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            lat,
            lng,
            business_type,
            radius,
        } => {
            let radius_m = radius.unwrap_or(config.default_radius_m);
            let overpass = build_overpass(&config)?;
            let weights = load_weights(&config)?;

            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let radius_u = radius_m.max(0.0).round() as u32;
            let competitors = overpass
                .fetch_competitors(lat, lng, radius_u, osm_category(&business_type))
                .await?;
            let landmarks = overpass.fetch_landmarks(lat, lng, radius_u).await?;

            let result = analyze_location(
                &LandmarksBundle::from_pois(landmarks),
                &CompetitorsBundle::from_pois(competitors),
                &weights,
                radius_m,
            );
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Spots {
            lat,
            lng,
            business_type,
            radius,
        } => {
            let radius_m = radius.unwrap_or(config.default_radius_m);
            let overpass = build_overpass(&config)?;

            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let radius_u = radius_m.max(0.0).round() as u32;
            let competitors = overpass
                .fetch_competitors(lat, lng, radius_u, osm_category(&business_type))
                .await?;
            let landmarks = overpass.fetch_landmarks(lat, lng, radius_u).await?;

            let spots = find_recommended_spots(
                Coordinate::new(lat, lng),
                radius_m,
                &competitors,
                &landmarks,
                &SpotParams::default(),
                &overpass,
            )
            .await;
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "center": { "lat": lat, "lng": lng },
                    "radius_m": radius_m,
                    "count": spots.len(),
                    "spots": spots,
                }))?
            );
        }
        Commands::Validate {
            lat,
            lng,
            max_road_distance_m,
        } => {
            let overpass = build_overpass(&config)?;
            let report = validate_location(&overpass, lat, lng, max_road_distance_m).await;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Digipin { lat, lng } => {
            println!("{}", serde_json::to_string_pretty(&generate_digipin(lat, lng))?);
        }
    }

    Ok(())
}
