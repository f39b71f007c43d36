//! Mylnikov open WiFi geolocation database.
//!
//! `https://api.mylnikov.org/geolocation/wifi?v=1.1&data=open&bssid={bssid}`
//!
//! No authentication. The HTTP status is always 200; success is signalled by
//! an embedded `result` code of 200 and failures carry a `desc` message.

use serde::Deserialize;

use crate::record::{LookupKey, SearchKind};
use crate::source::{
    AsyncHttpClient, RawCoordinate, Source, SourceError, SourceId, SourceOutcome, SourceRecord,
};

const MYLNIKOV_URL: &str = "https://api.mylnikov.org/geolocation/wifi";

/// Embedded success code.
const RESULT_OK: i64 = 200;

#[derive(Debug, Deserialize)]
struct MylnikovResponse {
    result: i64,
    data: Option<MylnikovData>,
    desc: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MylnikovData {
    lat: Option<RawCoordinate>,
    lon: Option<RawCoordinate>,
    range: Option<f64>,
}

/// Mylnikov geolocation source.
pub struct MylnikovSource<C: AsyncHttpClient> {
    http_client: C,
}

impl<C: AsyncHttpClient> MylnikovSource<C> {
    pub fn new(http_client: C) -> Self {
        Self { http_client }
    }

    fn build_url(&self, bssid: &str) -> Result<String, SourceError> {
        reqwest::Url::parse_with_params(
            MYLNIKOV_URL,
            &[("v", "1.1"), ("data", "open"), ("bssid", bssid)],
        )
        .map(String::from)
        .map_err(|e| SourceError::HttpError(format!("Invalid URL: {}", e)))
    }

    async fn locate(&self, bssid: &str) -> Result<SourceOutcome, SourceError> {
        let url = self.build_url(bssid)?;
        let response = self
            .http_client
            .post_with_headers(
                &url,
                &[
                    ("Accept", "application/json"),
                    ("Content-Type", "application/x-www-form-urlencoded"),
                ],
                Vec::new(),
            )
            .await?;

        let parsed: MylnikovResponse = response.json()?;
        if parsed.result != RESULT_OK {
            return Err(SourceError::Provider(
                parsed
                    .desc
                    .unwrap_or_else(|| format!("Lookup failed with result {}", parsed.result)),
            ));
        }

        let data = parsed.data.ok_or_else(|| {
            SourceError::InvalidResponse("Successful response without data".to_string())
        })?;
        let (Some(lat), Some(lon)) = (data.lat, data.lon) else {
            return Err(SourceError::InvalidResponse(
                "Successful response without coordinates".to_string(),
            ));
        };

        let mut record = SourceRecord::new(self.module(), lat, lon).with_bssid(bssid);
        if let Some(range) = data.range {
            record = record.with_extra("range", range.to_string());
        }
        Ok(SourceOutcome::Single(record))
    }
}

impl<C: AsyncHttpClient> Source for MylnikovSource<C> {
    fn id(&self) -> SourceId {
        SourceId::Mylnikov
    }

    async fn lookup(&self, key: &LookupKey) -> SourceOutcome {
        let result = match key.kind() {
            SearchKind::Bssid => self.locate(key.value()).await,
            kind => Err(SourceError::UnsupportedKind(kind)),
        };
        SourceOutcome::from_result(self.module(), result)
    }
}
