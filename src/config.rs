//! Sink configuration from the environment (optionally a `.env` file).

use crate::error::AppError;

pub const ENV_URL: &str = "INFLUX_URL";
pub const ENV_TOKEN: &str = "INFLUX_TOKEN";
pub const ENV_BUCKET: &str = "INFLUX_BUCKET";
pub const ENV_ORG: &str = "INFLUX_ORG";

/// Where and as whom points are written.
#[derive(Clone)]
pub struct InfluxConfig {
    pub url: String,
    pub token: String,
    pub bucket: String,
    pub org: String,
}

impl InfluxConfig {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Missing and empty values are both rejected.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let require = |key: &str| -> Result<String, AppError> {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| AppError::new(2, format!("Environment variable `{key}` is required.")))
        };

        Ok(Self {
            url: require(ENV_URL)?.trim_end_matches('/').to_string(),
            token: require(ENV_TOKEN)?,
            bucket: require(ENV_BUCKET)?,
            org: require(ENV_ORG)?,
        })
    }
}

impl std::fmt::Debug for InfluxConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InfluxConfig")
            .field("url", &self.url)
            .field("token", &"<redacted>")
            .field("bucket", &self.bucket)
            .field("org", &self.org)
            .finish()
    }
}
