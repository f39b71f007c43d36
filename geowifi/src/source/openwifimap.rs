//! OpenWiFiMap node lookup by hostname.
//!
//! `POST https://api.openwifimap.net/view_nodes` with `{"keys": [ssid]}`.
//! Only the first matching row is reported.

use serde::{Deserialize, Serialize};

use crate::record::{LookupKey, SearchKind};
use crate::source::{AsyncHttpClient, Source, SourceError, SourceId, SourceOutcome, SourceRecord};

const VIEW_NODES_URL: &str = "https://api.openwifimap.net/view_nodes";

#[derive(Debug, Serialize)]
struct ViewNodesRequest<'a> {
    keys: [&'a str; 1],
}

#[derive(Debug, Deserialize)]
struct ViewNodesResponse {
    #[serde(default)]
    rows: Vec<Row>,
}

#[derive(Debug, Deserialize)]
struct Row {
    value: Node,
}

#[derive(Debug, Deserialize)]
struct Node {
    hostname: Option<String>,
    latlng: (f64, f64),
}

/// OpenWiFiMap source. SSID queries only.
pub struct OpenWifiMapSource<C: AsyncHttpClient> {
    http_client: C,
}

impl<C: AsyncHttpClient> OpenWifiMapSource<C> {
    pub fn new(http_client: C) -> Self {
        Self { http_client }
    }

    async fn find_node(&self, ssid: &str) -> Result<SourceOutcome, SourceError> {
        let body = serde_json::to_vec(&ViewNodesRequest { keys: [ssid] })
            .map_err(|e| SourceError::InvalidResponse(format!("Failed to encode request: {}", e)))?;

        let response = self
            .http_client
            .post_with_headers(
                VIEW_NODES_URL,
                &[
                    ("Content-Type", "application/json"),
                    ("Accept", "application/json"),
                ],
                body,
            )
            .await?;

        if response.status != 200 {
            return Err(SourceError::Provider(format!(
                "Request to openwifimap.net failed with status code {}",
                response.status
            )));
        }

        let parsed: ViewNodesResponse = response.json()?;
        let Some(row) = parsed.rows.into_iter().next() else {
            return Err(SourceError::Provider(format!(
                "No node found with SSID \"{}\"",
                ssid
            )));
        };

        let (lat, lon) = row.value.latlng;
        let mut record = SourceRecord::new(self.module(), lat, lon).with_ssid(ssid);
        if let Some(hostname) = row.value.hostname {
            record = record.with_extra("hostname", hostname);
        }
        Ok(SourceOutcome::Single(record))
    }
}

impl<C: AsyncHttpClient> Source for OpenWifiMapSource<C> {
    fn id(&self) -> SourceId {
        SourceId::OpenWifiMap
    }

    async fn lookup(&self, key: &LookupKey) -> SourceOutcome {
        let result = match key.kind() {
            SearchKind::Ssid => self.find_node(key.value()).await,
            kind => Err(SourceError::UnsupportedKind(kind)),
        };
        SourceOutcome::from_result(self.module(), result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{MockAsyncHttpClient, RawCoordinate};

    #[tokio::test]
    async fn test_request_body() {
        let client = MockAsyncHttpClient::json(r#"{"rows":[]}"#);
        let source = OpenWifiMapSource::new(client.clone());

        source.lookup(&LookupKey::ssid("node-1")).await;

        let requests = client.requests();
        assert_eq!(requests[0].url, VIEW_NODES_URL);
        assert_eq!(requests[0].body, br#"{"keys":["node-1"]}"#.to_vec());
    }

    #[tokio::test]
    async fn test_first_row_used() {
        let body = r#"{"total_rows":2,"offset":0,"rows":[
            {"id":"node-1","key":"node-1","value":{"hostname":"node-1.berlin","latlng":[52.52,13.40]}},
            {"id":"node-1b","key":"node-1","value":{"hostname":"other","latlng":[1.0,1.0]}}
        ]}"#;
        let source = OpenWifiMapSource::new(MockAsyncHttpClient::json(body));

        match source.lookup(&LookupKey::ssid("node-1")).await {
            SourceOutcome::Single(record) => {
                assert_eq!(record.module, "openwifimap");
                assert_eq!(record.ssid.as_deref(), Some("node-1"));
                assert_eq!(record.latitude, Some(RawCoordinate::Number(52.52)));
                assert_eq!(
                    record.extra.get("hostname").map(String::as_str),
                    Some("node-1.berlin")
                );
            }
            other => panic!("Expected Single, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_no_rows() {
        let source = OpenWifiMapSource::new(MockAsyncHttpClient::json(r#"{"rows":[]}"#));
        assert_eq!(
            source.lookup(&LookupKey::ssid("ghost")).await,
            SourceOutcome::failed("openwifimap", "No node found with SSID \"ghost\"")
        );
    }

    #[tokio::test]
    async fn test_status_error() {
        let source = OpenWifiMapSource::new(MockAsyncHttpClient::status(500, ""));
        assert_eq!(
            source.lookup(&LookupKey::ssid("x")).await,
            SourceOutcome::failed(
                "openwifimap",
                "Request to openwifimap.net failed with status code 500"
            )
        );
    }

    #[tokio::test]
    async fn test_bssid_unsupported() {
        let client = MockAsyncHttpClient::json("{}");
        let source = OpenWifiMapSource::new(client.clone());
        let outcome = source
            .lookup(&LookupKey::bssid("AA:BB:CC:DD:EE:FF").unwrap())
            .await;
        assert!(matches!(outcome, SourceOutcome::Failed(_)));
        assert!(client.requests().is_empty());
    }
}
