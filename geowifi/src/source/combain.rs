//! Combain positioning API.
//!
//! `POST https://apiv2.combain.com?key={combain_api}` with a Google-compatible
//! body plus `indoor: 1`, which makes the service report the building name
//! for indoor fixes. The request carries two access points: the queried
//! BSSID and a fixed companion.

use super::geolocate::{self, GeolocateRequest};
use crate::record::{LookupKey, SearchKind};
use crate::source::{AsyncHttpClient, Source, SourceError, SourceId, SourceOutcome, SourceRecord};

const COMBAIN_URL: &str = "https://apiv2.combain.com";

/// Access point sent alongside the queried BSSID.
const COMPANION_AP: &str = "28:28:5d:d6:39:8a";

/// Combain geolocation source.
pub struct CombainSource<C: AsyncHttpClient> {
    http_client: C,
    api_key: Option<String>,
}

impl<C: AsyncHttpClient> CombainSource<C> {
    pub fn new(http_client: C, api_key: Option<String>) -> Self {
        Self {
            http_client,
            api_key,
        }
    }

    fn build_url(&self, api_key: &str) -> Result<String, SourceError> {
        reqwest::Url::parse_with_params(COMBAIN_URL, &[("key", api_key)])
            .map(String::from)
            .map_err(|e| SourceError::HttpError(format!("Invalid URL: {}", e)))
    }

    async fn locate(&self, bssid: &str) -> Result<SourceOutcome, SourceError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(SourceError::NotConfigured("combain_api"))?;

        let url = self.build_url(api_key)?;
        let body = GeolocateRequest::pair(bssid, COMPANION_AP)
            .indoor(1)
            .to_body()?;

        let response = self
            .http_client
            .post_with_headers(&url, &[("Content-Type", "application/json")], body)
            .await?;

        let parsed = geolocate::parse_response(&response)?;

        let mut record = SourceRecord::new(self.module(), parsed.location.lat, parsed.location.lng)
            .with_bssid(bssid);
        if let Some(building) = parsed.indoor.and_then(|indoor| indoor.building) {
            let building = match building {
                serde_json::Value::String(name) => name,
                other => other.to_string(),
            };
            record = record.with_extra("building", building);
        }
        Ok(SourceOutcome::Single(record))
    }
}

impl<C: AsyncHttpClient> Source for CombainSource<C> {
    fn id(&self) -> SourceId {
        SourceId::Combain
    }

    async fn lookup(&self, key: &LookupKey) -> SourceOutcome {
        let result = match key.kind() {
            SearchKind::Bssid => self.locate(key.value()).await,
            kind => Err(SourceError::UnsupportedKind(kind)),
        };
        SourceOutcome::from_result(self.module(), result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MockAsyncHttpClient;

    fn key() -> LookupKey {
        LookupKey::bssid("AA:BB:CC:DD:EE:FF").unwrap()
    }

    #[test]
    fn test_url_carries_key() {
        let source = CombainSource::new(MockAsyncHttpClient::json("{}"), None);
        assert_eq!(
            source.build_url("abc").unwrap(),
            "https://apiv2.combain.com/?key=abc"
        );
    }

    #[tokio::test]
    async fn test_missing_key() {
        let client = MockAsyncHttpClient::json("{}");
        let source = CombainSource::new(client.clone(), None);

        assert_eq!(
            source.lookup(&key()).await,
            SourceOutcome::failed("combain", "combain_api not configured")
        );
        assert!(client.requests().is_empty());
    }

    #[tokio::test]
    async fn test_request_sends_both_access_points() {
        let client = MockAsyncHttpClient::json(r#"{"location":{"lat":1.0,"lng":2.0}}"#);
        let source = CombainSource::new(client.clone(), Some("k".into()));

        source.lookup(&key()).await;

        let body: serde_json::Value = serde_json::from_slice(&client.requests()[0].body).unwrap();
        let macs: Vec<_> = body["wifiAccessPoints"]
            .as_array()
            .unwrap()
            .iter()
            .map(|ap| ap["macAddress"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(macs, vec!["AA:BB:CC:DD:EE:FF", COMPANION_AP]);
        assert_eq!(body["indoor"], 1);
    }

    #[tokio::test]
    async fn test_success_with_building() {
        let body = r#"{"location":{"lat":59.33,"lng":18.06},"accuracy":10,"indoor":{"building":"Central Station","floor":2}}"#;
        let source = CombainSource::new(MockAsyncHttpClient::json(body), Some("k".into()));

        match source.lookup(&key()).await {
            SourceOutcome::Single(record) => {
                assert_eq!(record.module, "combain");
                assert_eq!(
                    record.extra.get("building").map(String::as_str),
                    Some("Central Station")
                );
            }
            other => panic!("Expected Single, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_success_without_indoor() {
        let body = r#"{"location":{"lat":59.33,"lng":18.06}}"#;
        let source = CombainSource::new(MockAsyncHttpClient::json(body), Some("k".into()));

        match source.lookup(&key()).await {
            SourceOutcome::Single(record) => assert!(record.extra.is_empty()),
            other => panic!("Expected Single, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_error_message() {
        let body = r#"{"error":{"code":404,"message":"Not Found"}}"#;
        let source = CombainSource::new(MockAsyncHttpClient::status(404, body), Some("k".into()));

        assert_eq!(
            source.lookup(&key()).await,
            SourceOutcome::failed("combain", "Not Found")
        );
    }
}
