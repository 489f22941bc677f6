use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub latlong_api_key: Option<String>,
    pub latlong_base_url: String,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub weights_path: Option<PathBuf>,
    pub http_timeout_secs: u64,
    pub road_check_timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_base_secs: u64,
    pub default_lat: f64,
    pub default_lng: f64,
    pub default_radius_m: f64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field(
                "latlong_api_key",
                &self.latlong_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("latlong_base_url", &self.latlong_base_url)
            .field(
                "openai_api_key",
                &self.openai_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("openai_model", &self.openai_model)
            .field("weights_path", &self.weights_path)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("road_check_timeout_secs", &self.road_check_timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_secs", &self.retry_backoff_base_secs)
            .field("default_lat", &self.default_lat)
            .field("default_lng", &self.default_lng)
            .field("default_radius_m", &self.default_radius_m)
            .finish()
    }
}
