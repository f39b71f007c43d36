//! Normalized lookup records and the lookup key.
//!
//! Every source reports either located networks, a vendor annotation, or a
//! single error. The JSON artifact written by the CLI is a flat list of these
//! records, so [`LookupResult`] is untagged on the wire.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Module name reported by the MAC vendor lookup.
pub const VENDOR_MODULE: &str = "vendor_check";

/// Canonical colon-separated hex-octet MAC form.
const BSSID_PATTERN: &str = r"^[0-9A-Fa-f]{2}(:[0-9A-Fa-f]{2}){5}$";

fn bssid_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(BSSID_PATTERN).expect("BSSID pattern is valid"))
}

/// Checks whether `value` is a BSSID in `XX:XX:XX:XX:XX:XX` form.
///
/// # Example
///
/// ```
/// use geowifi::record::is_valid_bssid;
///
/// assert!(is_valid_bssid("AA:BB:CC:DD:EE:FF"));
/// assert!(!is_valid_bssid("AA:BB:CC:DD:EE"));
/// assert!(!is_valid_bssid("GG:BB:CC:DD:EE:FF"));
/// ```
pub fn is_valid_bssid(value: &str) -> bool {
    bssid_regex().is_match(value)
}

/// What the lookup value identifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchKind {
    /// Access point MAC address.
    #[default]
    Bssid,
    /// Network name.
    Ssid,
}

impl SearchKind {
    /// Lowercase name used in logs and messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchKind::Bssid => "bssid",
            SearchKind::Ssid => "ssid",
        }
    }
}

impl fmt::Display for SearchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejected BSSID value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid BSSID '{0}': expected format XX:XX:XX:XX:XX:XX")]
pub struct InvalidBssid(pub String);

/// A validated lookup value together with its kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupKey {
    kind: SearchKind,
    value: String,
}

impl LookupKey {
    /// Creates a BSSID key, rejecting anything that is not a canonical MAC.
    pub fn bssid(value: impl Into<String>) -> Result<Self, InvalidBssid> {
        let value = value.into();
        if !is_valid_bssid(&value) {
            return Err(InvalidBssid(value));
        }
        Ok(Self {
            kind: SearchKind::Bssid,
            value,
        })
    }

    /// Creates an SSID key. Any string is a valid network name.
    pub fn ssid(value: impl Into<String>) -> Self {
        Self {
            kind: SearchKind::Ssid,
            value: value.into(),
        }
    }

    /// Creates a key of the given kind.
    pub fn new(kind: SearchKind, value: impl Into<String>) -> Result<Self, InvalidBssid> {
        match kind {
            SearchKind::Bssid => Self::bssid(value),
            SearchKind::Ssid => Ok(Self::ssid(value)),
        }
    }

    pub fn kind(&self) -> SearchKind {
        self.kind
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Case-insensitive comparison against a provider-reported identifier.
    pub fn matches(&self, candidate: &str) -> bool {
        candidate.to_lowercase() == self.value.to_lowercase()
    }
}

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.value)
    }
}

/// A located network reported by one source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkRecord {
    pub module: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bssid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssid: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    /// Source-specific attributes such as `community` or `building`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl NetworkRecord {
    pub fn new(module: impl Into<String>, latitude: f64, longitude: f64) -> Self {
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

    /// The identifier matching the query kind, if the source reported one.
    pub fn identifier(&self, kind: SearchKind) -> Option<&str> {
        match kind {
            SearchKind::Bssid => self.bssid.as_deref(),
            SearchKind::Ssid => self.ssid.as_deref(),
        }
    }
}

/// A failed lookup, one per source invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub module: String,
    pub error: String,
}

impl ErrorRecord {
    pub fn new(module: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            error: error.into(),
        }
    }
}

/// Manufacturer annotation for a BSSID. Not a location result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorInfo {
    pub module: String,
    pub bssid: String,
    pub vendor: String,
}

impl VendorInfo {
    pub fn new(bssid: impl Into<String>, vendor: impl Into<String>) -> Self {
        Self {
            module: VENDOR_MODULE.to_string(),
            bssid: bssid.into(),
            vendor: vendor.into(),
        }
    }
}

/// One entry of a search report.
///
/// Variant order matters for deserialization: a network record is the only
/// shape with coordinates, an error record the only one with `error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LookupResult {
    Network(NetworkRecord),
    Error(ErrorRecord),
    Vendor(VendorInfo),
}

impl LookupResult {
    pub fn module(&self) -> &str {
        match self {
            LookupResult::Network(r) => &r.module,
            LookupResult::Error(r) => &r.module,
            LookupResult::Vendor(r) => &r.module,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, LookupResult::Error(_))
    }

    pub fn as_network(&self) -> Option<&NetworkRecord> {
        match self {
            LookupResult::Network(r) => Some(r),
            _ => None,
        }
    }
}

impl From<NetworkRecord> for LookupResult {
    fn from(record: NetworkRecord) -> Self {
        LookupResult::Network(record)
    }
}

impl From<ErrorRecord> for LookupResult {
    fn from(record: ErrorRecord) -> Self {
        LookupResult::Error(record)
    }
}

impl From<VendorInfo> for LookupResult {
    fn from(info: VendorInfo) -> Self {
        LookupResult::Vendor(info)
    }
}
