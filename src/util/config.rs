//! Process configuration read from environment variables.
//!
//! Missing credentials are never an error: the matching data category simply
//! serves sample data.

use std::{num::ParseIntError, time::Duration};

use thiserror::Error;

pub const AGMARKNET_KEY_VAR: &str = "AGMARKNET_API_KEY";
pub const SOIL_HEALTH_KEY_VAR: &str = "SOIL_HEALTH_API_KEY";
pub const UPAG_KEY_VAR: &str = "UPAG_API_KEY";
pub const OPENWEATHER_KEY_VAR: &str = "OPENWEATHER_API_KEY";
pub const GEMINI_KEY_VAR: &str = "GEMINI_API_KEY";
pub const REFRESH_SECS_VAR: &str = "KRISHI_REFRESH_SECS";

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(10);

const AGMARKNET_URL: &str =
    "https://api.data.gov.in/resource/9ef84268-d588-465a-a308-a864a43d0070";
const SOIL_HEALTH_URL: &str = "https://soilhealth.dac.gov.in/api/soil/";
const UPAG_URL: &str = "https://upag.gov.in/api/market-trends";
const OPENWEATHER_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
const GEMINI_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} must be a whole number of seconds: {source}")]
    InvalidNumber {
        var: &'static str,
        #[source]
        source: ParseIntError,
    },
    #[error("{var} must be greater than zero")]
    Zero { var: &'static str },
}

/// API credentials, one per data category.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub agmarknet: Option<String>,
    pub soil_health: Option<String>,
    pub upag: Option<String>,
    pub openweather: Option<String>,
    pub gemini: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mask = |value: &Option<String>| if value.is_some() { "set" } else { "unset" };
        f.debug_struct("Credentials")
            .field("agmarknet", &mask(&self.agmarknet))
            .field("soil_health", &mask(&self.soil_health))
            .field("upag", &mask(&self.upag))
            .field("openweather", &mask(&self.openweather))
            .field("gemini", &mask(&self.gemini))
            .finish()
    }
}

impl Credentials {
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |var: &str| {
            lookup(var)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        Self {
            agmarknet: read(AGMARKNET_KEY_VAR),
            soil_health: read(SOIL_HEALTH_KEY_VAR),
            upag: read(UPAG_KEY_VAR),
            openweather: read(OPENWEATHER_KEY_VAR),
            gemini: read(GEMINI_KEY_VAR),
        }
    }

    pub fn configured_count(&self) -> usize {
        [
            &self.agmarknet,
            &self.soil_health,
            &self.upag,
            &self.openweather,
            &self.gemini,
        ]
        .iter()
        .filter(|value| value.is_some())
        .count()
    }
}

/// Upstream endpoint per data category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoints {
    pub mandi_prices: String,
    /// Base for `{district}` lookups; must end with a slash.
    pub soil_health: String,
    pub market_trends: String,
    pub weather: String,
    pub advisory: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            mandi_prices: AGMARKNET_URL.to_string(),
            soil_health: SOIL_HEALTH_URL.to_string(),
            market_trends: UPAG_URL.to_string(),
            weather: OPENWEATHER_URL.to_string(),
            advisory: GEMINI_URL.to_string(),
        }
    }
}

impl Endpoints {
    /// All categories served below one base URL, e.g. a local stub server.
    #[cfg(test)]
    pub fn rooted_at(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            mandi_prices: format!("{base}/mandi-prices"),
            soil_health: format!("{base}/soil/"),
            market_trends: format!("{base}/market-trends"),
            weather: format!("{base}/weather"),
            advisory: format!("{base}/advisory"),
        }
    }
}

/// Everything the data gateway needs, passed in at construction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GatewayConfig {
    pub credentials: Credentials,
    pub endpoints: Endpoints,
}

impl GatewayConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            credentials: Credentials::from_lookup(lookup),
            endpoints: Endpoints::default(),
        }
    }
}

/// Reads the shipment refresh interval; `None` when the variable is unset.
pub fn refresh_interval_from<F>(lookup: F) -> Result<Option<Duration>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(REFRESH_SECS_VAR) else {
        return Ok(None);
    };
    let secs: u64 = raw
        .trim()
        .parse()
        .map_err(|source| ConfigError::InvalidNumber {
            var: REFRESH_SECS_VAR,
            source,
        })?;
    if secs == 0 {
        return Err(ConfigError::Zero {
            var: REFRESH_SECS_VAR,
        });
    }
    Ok(Some(Duration::from_secs(secs)))
}
