/// Open Tree of Life TNRS client used to find OTT ids for species
use crate::{EggcycError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_OTT_URL: &str = "https://api.opentreeoflife.org/v3";

/// Anything that can resolve a scientific name to an OTT id
pub trait OttSource {
    /// Best TNRS match for `species`; `None` when nothing matched
    fn match_name(&self, species: &str) -> Result<Option<u64>>;
}

#[derive(Serialize)]
struct MatchNamesRequest<'a> {
    names: [&'a str; 1],
}

#[derive(Debug, Deserialize)]
pub struct MatchNamesResponse {
    #[serde(default)]
    pub results: Vec<NameResult>,
}

#[derive(Debug, Deserialize)]
pub struct NameResult {
    #[serde(default)]
    pub matches: Vec<TaxonMatch>,
}

#[derive(Debug, Deserialize)]
pub struct TaxonMatch {
    pub taxon: MatchedTaxon,
}

#[derive(Debug, Deserialize)]
pub struct MatchedTaxon {
    pub ott_id: u64,
}

impl MatchNamesResponse {
    /// OTT id of the first match for the first name
    pub fn first_ott_id(&self) -> Option<u64> {
        self.results
            .first()
            .and_then(|r| r.matches.first())
            .map(|m| m.taxon.ott_id)
    }
}

/// Blocking client for `POST /tnrs/match_names`
pub struct OttClient {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl OttClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("eggcyc/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn match_url(&self) -> String {
        format!("{}/tnrs/match_names", self.base_url)
    }
}

impl OttSource for OttClient {
    fn match_name(&self, species: &str) -> Result<Option<u64>> {
        let url = self.match_url();
        debug!("POST {} ({})", url, species);

        let response = self
            .client
            .post(&url)
            .json(&MatchNamesRequest { names: [species] })
            .send()?;
        if !response.status().is_success() {
            return Err(EggcycError::Other(format!(
                "TNRS returned status {} for {}",
                response.status(),
                species
            )));
        }
        let body = response
            .json::<MatchNamesResponse>()
            .map_err(|e| EggcycError::Serialization(format!("TNRS match for {}: {}", species, e)))?;
        Ok(body.first_ott_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_url() {
        let client = OttClient::new("https://api.opentreeoflife.org/v3/", Duration::from_secs(5)).unwrap();
        assert_eq!(
            client.match_url(),
            "https://api.opentreeoflife.org/v3/tnrs/match_names"
        );
    }

    #[test]
    fn test_request_body() {
        let body = serde_json::to_string(&MatchNamesRequest {
            names: ["Quercus rubra"],
        })
        .unwrap();
        assert_eq!(body, r#"{"names":["Quercus rubra"]}"#);
    }

    #[test]
    fn test_first_ott_id() {
        let body = r#"{
            "governing_code": "ICN",
            "results": [{
                "name": "Quercus rubra",
                "matches": [
                    {"score": 1.0, "taxon": {"ott_id": 791115, "name": "Quercus rubra"}},
                    {"score": 0.8, "taxon": {"ott_id": 1, "name": "Quercus rubrum"}}
                ]
            }]
        }"#;
        let response: MatchNamesResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.first_ott_id(), Some(791115));

        let empty: MatchNamesResponse =
            serde_json::from_str(r#"{"results": [{"name": "Nothing", "matches": []}]}"#).unwrap();
        assert_eq!(empty.first_ott_id(), None);
    }
}
