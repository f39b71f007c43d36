//! Freifunk community map.
//!
//! `GET https://www.freifunk-karte.de/data.php` returns every router of every
//! community in one document; the node whose `name` equals the SSID exactly
//! is reported.

use serde::Deserialize;

use crate::record::{LookupKey, SearchKind};
use crate::source::{
    AsyncHttpClient, RawCoordinate, Source, SourceError, SourceId, SourceOutcome, SourceRecord,
};

const FREIFUNK_DATA_URL: &str = "https://www.freifunk-karte.de/data.php";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MapData {
    #[serde(default)]
    all_the_routers: Vec<Router>,
}

#[derive(Debug, Deserialize)]
struct Router {
    name: Option<String>,
    lat: Option<RawCoordinate>,
    long: Option<RawCoordinate>,
    community: Option<String>,
}

/// Freifunk source. SSID queries only.
pub struct FreifunkSource<C: AsyncHttpClient> {
    http_client: C,
}

impl<C: AsyncHttpClient> FreifunkSource<C> {
    pub fn new(http_client: C) -> Self {
        Self { http_client }
    }

    async fn find_router(&self, ssid: &str) -> Result<SourceOutcome, SourceError> {
        let response = self
            .http_client
            .get_with_headers(FREIFUNK_DATA_URL, &[("Accept", "application/json")])
            .await?;

        if response.status != 200 {
            return Err(SourceError::Provider("Request failed".to_string()));
        }

        let data: MapData = response.json()?;
        let router = data
            .all_the_routers
            .into_iter()
            .find(|router| router.name.as_deref() == Some(ssid))
            .ok_or_else(|| SourceError::Provider("SSID not found".to_string()))?;

        let mut record =
            SourceRecord::with_raw(self.module(), router.lat, router.long).with_ssid(ssid);
        if let Some(community) = router.community {
            record = record.with_extra("community", community);
        }
        Ok(SourceOutcome::Single(record))
    }
}

impl<C: AsyncHttpClient> Source for FreifunkSource<C> {
    fn id(&self) -> SourceId {
        SourceId::Freifunk
    }

    async fn lookup(&self, key: &LookupKey) -> SourceOutcome {
        let result = match key.kind() {
            SearchKind::Ssid => self.find_router(key.value()).await,
            kind => Err(SourceError::UnsupportedKind(kind)),
        };
        SourceOutcome::from_result(self.module(), result)
    }
}
