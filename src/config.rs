use serde::Deserialize;

pub const DEFAULT_API_URL: &str = "https://api.sailthru.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api_key: String,
    pub api_secret: String,
    pub api_url: String,
    pub timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            api_key: std::env::var("SAILTHRU_API_KEY")
                .map_err(|_| anyhow::anyhow!("SAILTHRU_API_KEY environment variable required"))
                .and_then(|key| {
                    if key.trim().is_empty() {
                        anyhow::bail!("SAILTHRU_API_KEY cannot be empty");
                    }
                    Ok(key)
                })?,
            api_secret: std::env::var("SAILTHRU_API_SECRET")
                .map_err(|_| {
                    anyhow::anyhow!("SAILTHRU_API_SECRET environment variable required")
                })
                .and_then(|secret| {
                    if secret.trim().is_empty() {
                        anyhow::bail!("SAILTHRU_API_SECRET cannot be empty");
                    }
                    Ok(secret)
                })?,
            api_url: std::env::var("SAILTHRU_API_URL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map_or_else(
                    || Ok(DEFAULT_API_URL.to_string()),
                    |url| {
                        if !url.starts_with("http://") && !url.starts_with("https://") {
                            anyhow::bail!("SAILTHRU_API_URL must start with http:// or https://");
                        }
                        Ok(url.trim_end_matches('/').to_string())
                    },
                )?,
            timeout_secs: match std::env::var("SAILTHRU_TIMEOUT_SECS") {
                Ok(raw) => raw
                    .trim()
                    .parse::<u64>()
                    .ok()
                    .filter(|secs| *secs > 0)
                    .ok_or_else(|| {
                        anyhow::anyhow!("SAILTHRU_TIMEOUT_SECS must be a positive number")
                    })?,
                Err(_) => DEFAULT_TIMEOUT_SECS,
            },
        };

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Sailthru API URL: {}", config.api_url);
        tracing::debug!("Sailthru request timeout: {}s", config.timeout_secs);

        Ok(config)
    }
}
