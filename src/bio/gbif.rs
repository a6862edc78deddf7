/// GBIF species API client used to find common names for higher taxa
use crate::{EggcycError, Result};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_GBIF_URL: &str = "https://api.gbif.org/v1";

/// The part of a GBIF name usage we care about
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameUsage {
    pub key: Option<u64>,
    #[serde(default)]
    pub scientific_name: Option<String>,
    #[serde(default)]
    pub vernacular_name: Option<String>,
}

/// Anything that can resolve a GBIF usage key to a name usage
pub trait NameUsageSource {
    fn name_usage(&self, key: u64) -> Result<NameUsage>;
}

/// Blocking client for `GET /species/{key}`
pub struct GbifClient {
    base_url: String,
    language: String,
    client: reqwest::blocking::Client,
}

impl GbifClient {
    pub fn new(base_url: &str, language: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("eggcyc/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            language: language.to_string(),
            client,
        })
    }

    fn usage_url(&self, key: u64) -> String {
        format!("{}/species/{}?language={}", self.base_url, key, self.language)
    }
}

impl NameUsageSource for GbifClient {
    fn name_usage(&self, key: u64) -> Result<NameUsage> {
        let url = self.usage_url(key);
        debug!("GET {}", url);

        // Transport failures surface as Network errors; a bad answer for one
        // key is reported as Other so callers can carry on with the next key
        let response = self.client.get(&url).send()?;
        if !response.status().is_success() {
            return Err(EggcycError::Other(format!(
                "GBIF returned status {} for key {}",
                response.status(),
                key
            )));
        }
        response
            .json::<NameUsage>()
            .map_err(|e| EggcycError::Serialization(format!("GBIF usage {}: {}", key, e)))
    }
}
