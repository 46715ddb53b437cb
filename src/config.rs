use serde::Deserialize;

/// Sentinel left in place when no mapping-service key has been configured.
/// The maps adapters short-circuit to their fallback values when they see it,
/// so a deployment without a key still answers every request.
pub const UNCONFIGURED_MAPS_KEY: &str = "YOUR_MAPS_API_KEY";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub gemini_api_key: String,
    pub gemini_base_url: String,
    pub gemini_model: String,
    pub maps_api_key: String,
    pub maps_base_url: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://travel_planner.db".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            gemini_api_key: std::env::var("GEMINI_API_KEY")
                .map_err(|_| anyhow::anyhow!("GEMINI_API_KEY environment variable required"))
                .and_then(|key| {
                    if key.trim().is_empty() {
                        anyhow::bail!("GEMINI_API_KEY cannot be empty");
                    }
                    Ok(key)
                })?,
            gemini_base_url: std::env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string())
                .trim_end_matches('/')
                .to_string(),
            gemini_model: std::env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-2.0-flash".to_string()),
            // Missing maps key is tolerated: the adapters degrade to fallback
            // text instead of refusing to start.
            maps_api_key: std::env::var("MAPS_API_KEY")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| UNCONFIGURED_MAPS_KEY.to_string()),
            maps_base_url: std::env::var("MAPS_BASE_URL")
                .unwrap_or_else(|_| "https://maps.googleapis.com".to_string())
                .trim_end_matches('/')
                .to_string(),
        };

        if !config.gemini_base_url.starts_with("http://")
            && !config.gemini_base_url.starts_with("https://")
        {
            anyhow::bail!("GEMINI_BASE_URL must start with http:// or https://");
        }
        if !config.maps_base_url.starts_with("http://")
            && !config.maps_base_url.starts_with("https://")
        {
            anyhow::bail!("MAPS_BASE_URL must start with http:// or https://");
        }

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Database URL: {}", config.database_url);
        tracing::debug!("Gemini base URL: {}", config.gemini_base_url);
        tracing::debug!("Gemini model: {}", config.gemini_model);
        tracing::debug!("Maps base URL: {}", config.maps_base_url);
        if !config.maps_configured() {
            tracing::warn!("MAPS_API_KEY not set; mapping lookups will degrade to fallback text");
        }
        tracing::debug!("Server port: {}", config.port);

        Ok(config)
    }

    /// Whether a real mapping-service key is present.
    pub fn maps_configured(&self) -> bool {
        self.maps_api_key != UNCONFIGURED_MAPS_KEY
    }
}
