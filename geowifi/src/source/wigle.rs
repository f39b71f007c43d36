//! Wigle network search.
//!
//! # API Endpoint
//!
//! `https://api.wigle.net/api/v2/network/search?netid={bssid}` or `?ssid={ssid}`
//!
//! Requires an encoded API name/token pair sent as HTTP Basic credentials
//! (`wigle_auth` in the configuration). Wigle reports success through an
//! embedded `success` flag; failures (quota, bad credentials) carry a
//! `message` and usually a 4xx status.
//!
//! Results are a list which may include neighbouring networks, so records are
//! returned as [`SourceOutcome::Many`] and filtered by the dispatcher.

use serde::Deserialize;
use tracing::debug;

use crate::record::{LookupKey, SearchKind};
use crate::source::{
    AsyncHttpClient, RawCoordinate, Source, SourceError, SourceId, SourceOutcome, SourceRecord,
};

/// Wigle search endpoint.
const WIGLE_SEARCH_URL: &str = "https://api.wigle.net/api/v2/network/search";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    success: bool,
    #[serde(default)]
    total_results: u64,
    #[serde(default)]
    results: Vec<WigleNetwork>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WigleNetwork {
    netid: Option<String>,
    ssid: Option<String>,
    trilat: Option<RawCoordinate>,
    trilong: Option<RawCoordinate>,
    country: Option<String>,
    city: Option<String>,
}

/// Wigle geolocation source.
pub struct WigleSource<C: AsyncHttpClient> {
    http_client: C,
    auth: Option<String>,
}

impl<C: AsyncHttpClient> WigleSource<C> {
    /// Creates a Wigle source.
    ///
    /// # Arguments
    ///
    /// * `http_client` - HTTP client for making requests
    /// * `auth` - Base64 `name:token` pair; `None` disables the source
    pub fn new(http_client: C, auth: Option<String>) -> Self {
        Self { http_client, auth }
    }

    fn build_url(&self, key: &LookupKey) -> Result<String, SourceError> {
        let param = match key.kind() {
            SearchKind::Bssid => "netid",
            SearchKind::Ssid => "ssid",
        };
        reqwest::Url::parse_with_params(WIGLE_SEARCH_URL, &[(param, key.value())])
            .map(String::from)
            .map_err(|e| SourceError::HttpError(format!("Invalid URL: {}", e)))
    }

    async fn search(&self, key: &LookupKey) -> Result<SourceOutcome, SourceError> {
        let auth = self
            .auth
            .as_deref()
            .ok_or(SourceError::NotConfigured("wigle_auth"))?;

        let url = self.build_url(key)?;
        let authorization = format!("Basic {}", auth);
        let response = self
            .http_client
            .get_with_headers(
                &url,
                &[
                    ("Accept", "application/json"),
                    ("Authorization", &authorization),
                ],
            )
            .await?;

        let parsed: SearchResponse = response.json().map_err(|e| {
            if response.is_success() {
                e
            } else {
                SourceError::Provider(format!("Request failed with status {}", response.status))
            }
        })?;

        if !parsed.success {
            return Err(SourceError::Provider(
                parsed
                    .message
                    .unwrap_or_else(|| format!("Request failed with status {}", response.status)),
            ));
        }

        if parsed.total_results == 0 || parsed.results.is_empty() {
            return Err(SourceError::Provider("No results detected".to_string()));
        }

        debug!(count = parsed.results.len(), "Wigle returned networks");

        let records = parsed
            .results
            .into_iter()
            .map(|network| {
                let mut record =
                    SourceRecord::with_raw(self.module(), network.trilat, network.trilong);
                record.bssid = network.netid;
                record.ssid = network.ssid;
                if let Some(country) = network.country {
                    record.extra.insert("country".to_string(), country);
                }
                if let Some(city) = network.city {
                    record.extra.insert("city".to_string(), city);
                }
                record
            })
            .collect();

        Ok(SourceOutcome::Many(records))
    }
}

impl<C: AsyncHttpClient> Source for WigleSource<C> {
    fn id(&self) -> SourceId {
        SourceId::Wigle
    }

    async fn lookup(&self, key: &LookupKey) -> SourceOutcome {
        SourceOutcome::from_result(self.module(), self.search(key).await)
    }
}
