mod api;
mod middleware;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use hotspot_chat::CompletionClient;
use hotspot_core::ScoringWeights;
use hotspot_places::{LatLongClient, OverpassClient};

use crate::api::{build_app, default_rate_limit_state, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(hotspot_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let weights = match &config.weights_path {
        Some(path) => hotspot_core::load_weights(path)?,
        None => ScoringWeights::default(),
    };

    let overpass = OverpassClient::new(
        config.http_timeout_secs,
        config.road_check_timeout_secs,
        config.max_retries,
        config.retry_backoff_base_secs,
    )?;

    if config.latlong_api_key.is_none() {
        tracing::warn!("LATLONG_API_KEY not set; geocoding and landmark requests will be rejected upstream");
    }
    let latlong = LatLongClient::new(
        config.latlong_api_key.as_deref().unwrap_or_default(),
        &config.latlong_base_url,
        config.http_timeout_secs,
        config.max_retries,
        config.retry_backoff_base_secs,
    )?;

    let chat = match &config.openai_api_key {
        Some(key) => Some(Arc::new(CompletionClient::new(
            key,
            &config.openai_model,
            config.http_timeout_secs,
        )?)),
        None => {
            tracing::info!("OPENAI_API_KEY not set; chat runs on template answers");
            None
        }
    };

    let state = AppState {
        weights: Arc::new(weights),
        overpass: Arc::new(overpass),
        latlong: Arc::new(latlong),
        chat,
        config: Arc::clone(&config),
    };
    let app = build_app(state, default_rate_limit_state());

    tracing::info!(addr = %config.bind_addr, "starting server");
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
