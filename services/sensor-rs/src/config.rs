use std::time::Duration;

use figment::{
    providers::{Env, Serialized},
    Figment,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Path of the ingestion route, appended to `API_BASE_URL`.
pub const READINGS_PATH: &str = "/api/v1/readings";

const BASE_URL_KEY: &str = "api_base_url";
const INTERVAL_KEY: &str = "simulator_interval_seconds";

/// Process-wide settings, resolved once at startup and passed down explicitly.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base_url: String,
    #[serde(rename = "simulator_interval_seconds")]
    pub interval_seconds: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080".to_string(),
            interval_seconds: 10,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} is not a valid value ({source}); falling back to default {default}")]
    Invalid {
        var: String,
        default: String,
        #[source]
        source: figment::Error,
    },
}

impl Settings {
    /// Defaults overlaid with the two environment variables the simulator reads.
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Settings::default()))
            .merge(Env::raw().only(&["API_BASE_URL", "SIMULATOR_INTERVAL_SECONDS"]))
    }

    /// Resolves every field independently. An invalid field keeps its default
    /// and yields a warning; the rest of the configuration is unaffected.
    pub fn from_figment(figment: &Figment) -> (Self, Vec<ConfigError>) {
        let defaults = Settings::default();
        let mut warnings = Vec::new();

        let api_base_url = field(figment, BASE_URL_KEY, defaults.api_base_url, &mut warnings);
        let interval_seconds =
            field(figment, INTERVAL_KEY, defaults.interval_seconds, &mut warnings);

        (
            Self {
                api_base_url,
                interval_seconds,
            },
            warnings,
        )
    }

    /// Reads the process environment and logs every fallback taken.
    pub fn load() -> Self {
        let (settings, warnings) = Self::from_figment(&Self::figment());
        for warning in &warnings {
            warn!("{}", warning);
        }
        settings
    }

    pub fn readings_endpoint(&self) -> String {
        format!("{}{}", self.api_base_url.trim_end_matches('/'), READINGS_PATH)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }
}

fn field<T>(figment: &Figment, key: &str, default: T, warnings: &mut Vec<ConfigError>) -> T
where
    T: for<'de> Deserialize<'de> + ToString,
{
    match figment.extract_inner::<T>(key) {
        Ok(value) => value,
        Err(source) => {
            warnings.push(ConfigError::Invalid {
                var: key.to_uppercase(),
                default: default.to_string(),
                source,
            });
            default
        }
    }
}
