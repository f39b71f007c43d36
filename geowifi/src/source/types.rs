//! Source types and traits

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;

use serde::Deserialize;
use thiserror::Error;

use crate::record::{ErrorRecord, LookupKey, SearchKind, VendorInfo};

/// Errors that can occur while querying a source.
///
/// These never escape a source: [`Source::lookup`] folds them into an
/// [`ErrorRecord`] carrying the source's module name.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SourceError {
    /// Transport failure (DNS, connect, TLS, timeout, body read)
    #[error("HTTP error: {0}")]
    HttpError(String),
    /// Response could not be decoded
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    /// The provider answered with its own error message
    #[error("{0}")]
    Provider(String),
    /// A credential this source needs is absent from the configuration
    #[error("{0} not configured")]
    NotConfigured(&'static str),
    /// The source cannot answer this kind of query
    #[error("{0} lookups are not supported")]
    UnsupportedKind(SearchKind),
}

impl From<serde_json::Error> for SourceError {
    fn from(e: serde_json::Error) -> Self {
        SourceError::InvalidResponse(e.to_string())
    }
}

/// Identity of every upstream provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SourceId {
    Wigle,
    Apple,
    Mylnikov,
    Google,
    Combain,
    WifiDb,
    OpenWifiMap,
    Freifunk,
    MacVendors,
}

/// Sources consulted for a BSSID query, in submission order.
const BSSID_SOURCES: &[SourceId] = &[
    SourceId::Wigle,
    SourceId::Apple,
    SourceId::Mylnikov,
    SourceId::Google,
    SourceId::Combain,
    SourceId::WifiDb,
    SourceId::MacVendors,
];

/// Sources consulted for an SSID query, in submission order.
const SSID_SOURCES: &[SourceId] = &[
    SourceId::Wigle,
    SourceId::OpenWifiMap,
    SourceId::WifiDb,
    SourceId::Freifunk,
];

impl SourceId {
    /// Every known source.
    pub const ALL: [SourceId; 9] = [
        SourceId::Wigle,
        SourceId::Apple,
        SourceId::Mylnikov,
        SourceId::Google,
        SourceId::Combain,
        SourceId::WifiDb,
        SourceId::OpenWifiMap,
        SourceId::Freifunk,
        SourceId::MacVendors,
    ];

    /// Returns the sources applicable to a query kind.
    pub fn for_kind(kind: SearchKind) -> &'static [SourceId] {
        match kind {
            SearchKind::Bssid => BSSID_SOURCES,
            SearchKind::Ssid => SSID_SOURCES,
        }
    }

    /// Module name stamped on every record this source produces.
    pub fn module(&self) -> &'static str {
        match self {
            SourceId::Wigle => "wigle",
            SourceId::Apple => "apple",
            SourceId::Mylnikov => "mylnikov",
            SourceId::Google => "google",
            SourceId::Combain => "combain",
            SourceId::WifiDb => "wifidb",
            SourceId::OpenWifiMap => "openwifimap",
            SourceId::Freifunk => "freifunk-karte",
            SourceId::MacVendors => crate::record::VENDOR_MODULE,
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.module())
    }
}

/// A coordinate as the provider sent it.
///
/// Several providers encode coordinates as JSON strings; coercion to `f64`
/// happens in the normalizer, not in the adapters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawCoordinate {
    Number(f64),
    Text(String),
}

impl From<f64> for RawCoordinate {
    fn from(value: f64) -> Self {
        RawCoordinate::Number(value)
    }
}

impl From<&str> for RawCoordinate {
    fn from(value: &str) -> Self {
        RawCoordinate::Text(value.to_string())
    }
}

/// A provider result before coordinate coercion.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRecord {
    pub module: String,
    pub bssid: Option<String>,
    pub ssid: Option<String>,
    pub latitude: Option<RawCoordinate>,
    pub longitude: Option<RawCoordinate>,
    pub extra: BTreeMap<String, String>,
}

impl SourceRecord {
    pub fn new(
        module: impl Into<String>,
        latitude: impl Into<RawCoordinate>,
        longitude: impl Into<RawCoordinate>,
    ) -> Self {
        Self {
            module: module.into(),
            bssid: None,
            ssid: None,
            latitude: Some(latitude.into()),
            longitude: Some(longitude.into()),
            extra: BTreeMap::new(),
        }
    }

    /// Creates a record whose coordinates may be absent in the payload.
    pub fn with_raw(
        module: impl Into<String>,
        latitude: Option<RawCoordinate>,
        longitude: Option<RawCoordinate>,
    ) -> Self {
        Self {
            module: module.into(),
            bssid: None,
            ssid: None,
            latitude,
            longitude,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_bssid(mut self, bssid: impl Into<String>) -> Self {
        self.bssid = Some(bssid.into());
        self
    }

    pub fn with_ssid(mut self, ssid: impl Into<String>) -> Self {
        self.ssid = Some(ssid.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// What one source invocation produced.
///
/// A source yields exactly one outcome: records, a vendor annotation, or a
/// single error.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceOutcome {
    /// One record already scoped to the query.
    Single(SourceRecord),
    /// Provider result list; the dispatcher keeps only entries matching the query.
    Many(Vec<SourceRecord>),
    /// Manufacturer annotation.
    Vendor(VendorInfo),
    /// Handled failure.
    Failed(ErrorRecord),
}

impl SourceOutcome {
    /// Folds an adapter result into an outcome, attributing errors to `module`.
    pub fn from_result(module: &str, result: Result<SourceOutcome, SourceError>) -> Self {
        match result {
            Ok(outcome) => outcome,
            Err(e) => SourceOutcome::Failed(ErrorRecord::new(module, e.to_string())),
        }
    }

    pub fn failed(module: &str, error: impl Into<String>) -> Self {
        SourceOutcome::Failed(ErrorRecord::new(module, error))
    }
}

/// Trait for geolocation sources.
///
/// Implementors issue one lookup against an upstream provider and map its
/// response into a [`SourceOutcome`]. Lookups never fail: every failure path
/// becomes [`SourceOutcome::Failed`].
pub trait Source: Send + Sync {
    /// Returns the provider identity.
    fn id(&self) -> SourceId;

    /// Looks up a single key.
    fn lookup(&self, key: &LookupKey) -> impl Future<Output = SourceOutcome> + Send;

    /// Returns the module name for logging and attribution.
    fn module(&self) -> &'static str {
        self.id().module()
    }
}
