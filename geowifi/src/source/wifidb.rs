//! WiFiDB GeoJSON export search.
//!
//! `GET https://wifidb.net/wifidb/api/geojson.php?func=exp_search&...`
//!
//! Every search field must be present in the query string; unused ones are
//! sent empty. Coordinates arrive as strings in `features[].properties`.

use serde::Deserialize;

use crate::record::{LookupKey, SearchKind};
use crate::source::{
    AsyncHttpClient, RawCoordinate, Source, SourceError, SourceId, SourceOutcome, SourceRecord,
};

const WIFIDB_URL: &str = "https://wifidb.net/wifidb/api/geojson.php";

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    properties: Properties,
}

#[derive(Debug, Deserialize)]
struct Properties {
    mac: Option<String>,
    ssid: Option<String>,
    lat: Option<RawCoordinate>,
    lon: Option<RawCoordinate>,
}

/// WiFiDB source. Answers both BSSID and SSID queries.
pub struct WifiDbSource<C: AsyncHttpClient> {
    http_client: C,
}

impl<C: AsyncHttpClient> WifiDbSource<C> {
    pub fn new(http_client: C) -> Self {
        Self { http_client }
    }

    fn build_url(&self, key: &LookupKey) -> Result<String, SourceError> {
        let (ssid, mac) = match key.kind() {
            SearchKind::Bssid => ("", key.value()),
            SearchKind::Ssid => (key.value(), ""),
        };
        let params = [
            ("func", "exp_search"),
            ("ssid", ssid),
            ("mac", mac),
            ("radio", ""),
            ("chan", ""),
            ("auth", ""),
            ("encry", ""),
            ("sectype", ""),
            ("json", "0"),
            ("labeled", "0"),
        ];
        reqwest::Url::parse_with_params(WIFIDB_URL, &params)
            .map(String::from)
            .map_err(|e| SourceError::HttpError(format!("Invalid URL: {}", e)))
    }

    async fn search(&self, key: &LookupKey) -> Result<SourceOutcome, SourceError> {
        let url = self.build_url(key)?;
        let response = self
            .http_client
            .get_with_headers(&url, &[("Accept", "application/json")])
            .await?;

        if response.status != 200 {
            return Err(SourceError::Provider("Request failed".to_string()));
        }

        let collection: FeatureCollection = response.json()?;
        if collection.features.is_empty() {
            let message = match key.kind() {
                SearchKind::Bssid => "BSSID not found",
                SearchKind::Ssid => "SSID not found",
            };
            return Err(SourceError::Provider(message.to_string()));
        }

        let records = collection
            .features
            .into_iter()
            .map(|feature| {
                let props = feature.properties;
                let mut record = SourceRecord::with_raw(self.module(), props.lat, props.lon);
                record.bssid = props.mac;
                record.ssid = props.ssid;
                record
            })
            .collect();

        Ok(SourceOutcome::Many(records))
    }
}

impl<C: AsyncHttpClient> Source for WifiDbSource<C> {
    fn id(&self) -> SourceId {
        SourceId::WifiDb
    }

    async fn lookup(&self, key: &LookupKey) -> SourceOutcome {
        SourceOutcome::from_result(self.module(), self.search(key).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MockAsyncHttpClient;

    const BODY: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "geometry": {"type": "Point", "coordinates": [-71.06, 42.36]},
             "properties": {"id": 1, "mac": "AA:BB:CC:DD:EE:FF", "ssid": "linksys", "lat": "42.36", "lon": "-71.06"}},
            {"type": "Feature", "geometry": {"type": "Point", "coordinates": [0, 0]},
             "properties": {"id": 2, "mac": "AA:BB:CC:DD:EE:01", "ssid": "linksys", "lat": "0.0000", "lon": "0.0000"}}
        ]
    }"#;

    #[test]
    fn test_bssid_url_leaves_ssid_empty() {
        let source = WifiDbSource::new(MockAsyncHttpClient::json("{}"));
        let url = source
            .build_url(&LookupKey::bssid("AA:BB:CC:DD:EE:FF").unwrap())
            .unwrap();
        assert_eq!(
            url,
            "https://wifidb.net/wifidb/api/geojson.php?func=exp_search&ssid=&mac=AA%3ABB%3ACC%3ADD%3AEE%3AFF&radio=&chan=&auth=&encry=&sectype=&json=0&labeled=0"
        );
    }

    #[test]
    fn test_ssid_url_leaves_mac_empty() {
        let source = WifiDbSource::new(MockAsyncHttpClient::json("{}"));
        let url = source.build_url(&LookupKey::ssid("linksys")).unwrap();
        assert!(url.contains("ssid=linksys&mac=&"));
    }

    #[tokio::test]
    async fn test_features_mapped_with_string_coordinates() {
        let source = WifiDbSource::new(MockAsyncHttpClient::json(BODY));

        match source.lookup(&LookupKey::ssid("linksys")).await {
            SourceOutcome::Many(records) => {
                assert_eq!(records.len(), 2);
                assert_eq!(records[0].module, "wifidb");
                assert_eq!(records[0].bssid.as_deref(), Some("AA:BB:CC:DD:EE:FF"));
                assert_eq!(records[0].latitude, Some(RawCoordinate::from("42.36")));
            }
            other => panic!("Expected Many, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_features_message_depends_on_kind() {
        let body = r#"{"type":"FeatureCollection","features":[]}"#;

        let source = WifiDbSource::new(MockAsyncHttpClient::json(body));
        assert_eq!(
            source.lookup(&LookupKey::ssid("nothing")).await,
            SourceOutcome::failed("wifidb", "SSID not found")
        );
        assert_eq!(
            source
                .lookup(&LookupKey::bssid("AA:BB:CC:DD:EE:FF").unwrap())
                .await,
            SourceOutcome::failed("wifidb", "BSSID not found")
        );
    }

    #[tokio::test]
    async fn test_non_200_status() {
        let source = WifiDbSource::new(MockAsyncHttpClient::status(503, "down"));
        assert_eq!(
            source.lookup(&LookupKey::ssid("x")).await,
            SourceOutcome::failed("wifidb", "Request failed")
        );
    }
}
