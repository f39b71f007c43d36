//! Google Geolocation API.
//!
//! `POST https://www.googleapis.com/geolocation/v1/geolocate?key={google_api}`
//!
//! The request pairs the queried BSSID with a fixed companion access point
//! because the service will not resolve a single access point.

use tracing::debug;

use super::geolocate::{self, GeolocateRequest};
use crate::record::{LookupKey, SearchKind};
use crate::source::{AsyncHttpClient, Source, SourceError, SourceId, SourceOutcome, SourceRecord};

const GOOGLE_GEOLOCATE_URL: &str = "https://www.googleapis.com/geolocation/v1/geolocate";

/// Access point sent alongside the queried BSSID.
const COMPANION_AP: &str = "00:25:9c:cf:1c:ad";

/// Google geolocation source.
pub struct GoogleSource<C: AsyncHttpClient> {
    http_client: C,
    api_key: Option<String>,
}

impl<C: AsyncHttpClient> GoogleSource<C> {
    pub fn new(http_client: C, api_key: Option<String>) -> Self {
        Self {
            http_client,
            api_key,
        }
    }

    fn build_url(&self, api_key: &str) -> Result<String, SourceError> {
        reqwest::Url::parse_with_params(GOOGLE_GEOLOCATE_URL, &[("key", api_key)])
            .map(String::from)
            .map_err(|e| SourceError::HttpError(format!("Invalid URL: {}", e)))
    }

    async fn locate(&self, bssid: &str) -> Result<SourceOutcome, SourceError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(SourceError::NotConfigured("google_api"))?;

        let url = self.build_url(api_key)?;
        let body = GeolocateRequest::pair(bssid, COMPANION_AP)
            .consider_ip(false)
            .to_body()?;

        let response = self
            .http_client
            .post_with_headers(
                &url,
                &[
                    ("Accept", "application/json"),
                    ("Content-Type", "application/json"),
                ],
                body,
            )
            .await?;

        let parsed = geolocate::parse_response(&response)?;
        debug!(lat = parsed.location.lat, lng = parsed.location.lng, "Google located BSSID");

        let mut record = SourceRecord::new(self.module(), parsed.location.lat, parsed.location.lng)
            .with_bssid(bssid);
        if let Some(accuracy) = parsed.accuracy {
            record = record.with_extra("accuracy", accuracy.to_string());
        }
        Ok(SourceOutcome::Single(record))
    }
}

impl<C: AsyncHttpClient> Source for GoogleSource<C> {
    fn id(&self) -> SourceId {
        SourceId::Google
    }

    async fn lookup(&self, key: &LookupKey) -> SourceOutcome {
        let result = match key.kind() {
            SearchKind::Bssid => self.locate(key.value()).await,
            kind => Err(SourceError::UnsupportedKind(kind)),
        };
        SourceOutcome::from_result(self.module(), result)
    }
}
