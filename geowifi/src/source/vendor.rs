//! MAC vendor lookup via `https://api.macvendors.com/{bssid}`.
//!
//! The body of a 2xx answer is the manufacturer name as plain text.

use crate::record::{LookupKey, SearchKind, VendorInfo};
use crate::source::{AsyncHttpClient, Source, SourceError, SourceId, SourceOutcome};

const MACVENDORS_URL: &str = "https://api.macvendors.com/";

/// Manufacturer lookup. BSSID queries only.
pub struct MacVendorSource<C: AsyncHttpClient> {
    http_client: C,
}

impl<C: AsyncHttpClient> MacVendorSource<C> {
    pub fn new(http_client: C) -> Self {
        Self { http_client }
    }

    fn build_url(&self, bssid: &str) -> String {
        format!("{}{}", MACVENDORS_URL, bssid)
    }

    async fn vendor(&self, bssid: &str) -> Result<SourceOutcome, SourceError> {
        let response = self
            .http_client
            .get_with_headers(&self.build_url(bssid), &[])
            .await?;

        if !response.is_success() {
            return Err(SourceError::Provider(format!(
                "Vendor lookup failed with status {}",
                response.status
            )));
        }

        let vendor = response.text().trim().to_string();
        Ok(SourceOutcome::Vendor(VendorInfo::new(bssid, vendor)))
    }
}

impl<C: AsyncHttpClient> Source for MacVendorSource<C> {
    fn id(&self) -> SourceId {
        SourceId::MacVendors
    }

    async fn lookup(&self, key: &LookupKey) -> SourceOutcome {
        let result = match key.kind() {
            SearchKind::Bssid => self.vendor(key.value()).await,
            kind => Err(SourceError::UnsupportedKind(kind)),
        };
        SourceOutcome::from_result(self.module(), result)
    }
}
