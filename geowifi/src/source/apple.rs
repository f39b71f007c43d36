//! Apple location services (WLOC) lookup.
//!
//! # Wire Format
//!
//! Unlike the other sources this one speaks a binary protocol over HTTPS.
//! The request body is a fixed preamble of length-prefixed strings followed
//! by a protobuf message listing the access point to resolve:
//!
//! ```text
//! u16 version | str locale | str identifier | str os version | u32 1 | u32 len | protobuf
//! ```
//!
//! where `str` is a big-endian `u16` length followed by the bytes. The
//! response starts with a 10-byte header that is skipped before the protobuf
//! payload is decoded.
//!
//! # Coordinates
//!
//! Latitude and longitude are integers carrying 8 implied fractional digits
//! (`4885660000` is `48.8566`). An access point Apple does not know is
//! reported with a coordinate containing [`NO_LOCATION_SENTINEL`].

use prost::Message;
use tracing::debug;

use crate::record::{LookupKey, SearchKind};
use crate::source::{AsyncHttpClient, Source, SourceError, SourceId, SourceOutcome, SourceRecord};

/// Apple WLOC endpoint.
const APPLE_WLOC_URL: &str = "https://gs-loc.apple.com/clls/wloc";

/// Digit run Apple uses in place of a coordinate for unknown access points.
pub const NO_LOCATION_SENTINEL: &str = "18000000000";

/// Implied fractional digits of a WLOC coordinate.
const FRACTION_DIGITS: usize = 8;

/// Length of the response header preceding the protobuf payload.
const RESPONSE_HEADER_LEN: usize = 10;

const LOCALE: &str = "en_US";
const CLIENT_IDENTIFIER: &str = "com.apple.locationd";
const OS_VERSION: &str = "8.1.12B411";
const USER_AGENT: &str = "locationd/1753.17 CFNetwork/711.1.12 Darwin/14.0.0";

const NOT_FOUND: &str = "Latitude or longitude value not found in response";

/// WLOC request/response message.
#[derive(Clone, PartialEq, Message)]
pub struct WlocMessage {
    #[prost(message, repeated, tag = "2")]
    pub wifi_devices: Vec<WifiDevice>,
    #[prost(int32, optional, tag = "3")]
    pub noise: Option<i32>,
    #[prost(int32, optional, tag = "4")]
    pub return_single_result: Option<i32>,
}

/// One access point in a WLOC message.
#[derive(Clone, PartialEq, Message)]
pub struct WifiDevice {
    #[prost(string, tag = "1")]
    pub bssid: String,
    #[prost(message, optional, tag = "2")]
    pub location: Option<WifiLocation>,
}

/// Fixed-point position of an access point.
#[derive(Clone, PartialEq, Message)]
pub struct WifiLocation {
    #[prost(int64, tag = "1")]
    pub latitude: i64,
    #[prost(int64, tag = "2")]
    pub longitude: i64,
    #[prost(int64, tag = "3")]
    pub accuracy: i64,
}

/// Decodes a WLOC fixed-point coordinate.
///
/// Returns `None` for the no-location sentinel and for anything that is not
/// an optionally signed digit string.
///
/// ```
/// use geowifi::source::decode_fixed_point;
///
/// assert_eq!(decode_fixed_point("4885660000"), Some(48.8566));
/// assert_eq!(decode_fixed_point("-18000000000"), None);
/// ```
pub fn decode_fixed_point(raw: &str) -> Option<f64> {
    if raw.contains(NO_LOCATION_SENTINEL) {
        return None;
    }

    let (sign, digits) = match raw.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", raw),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let padded = format!("{:0>width$}", digits, width = FRACTION_DIGITS + 1);
    let (whole, fraction) = padded.split_at(padded.len() - FRACTION_DIGITS);
    format!("{}{}.{}", sign, whole, fraction).parse().ok()
}

/// Compares two MACs octet by octet. Apple drops leading zeros (`a:b:...`).
fn same_bssid(a: &str, b: &str) -> bool {
    let octets = |s: &str| -> Option<Vec<u8>> {
        s.split(':')
            .map(|o| u8::from_str_radix(o, 16).ok())
            .collect()
    };
    match (octets(a), octets(b)) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

fn push_str(buf: &mut Vec<u8>, value: &str) {
    buf.extend_from_slice(&(value.len() as u16).to_be_bytes());
    buf.extend_from_slice(value.as_bytes());
}

/// Builds the framed request body for a single BSSID.
pub fn build_request(bssid: &str) -> Vec<u8> {
    let message = WlocMessage {
        wifi_devices: vec![WifiDevice {
            bssid: bssid.to_string(),
            location: None,
        }],
        noise: Some(0),
        return_single_result: Some(1),
    };
    let payload = message.encode_to_vec();

    let mut buf = Vec::with_capacity(64 + payload.len());
    buf.extend_from_slice(&1u16.to_be_bytes());
    push_str(&mut buf, LOCALE);
    push_str(&mut buf, CLIENT_IDENTIFIER);
    push_str(&mut buf, OS_VERSION);
    buf.extend_from_slice(&1u32.to_be_bytes());
    buf.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    buf.extend_from_slice(&payload);
    buf
}

/// Decodes a WLOC response body, header included.
pub fn parse_response(body: &[u8]) -> Result<WlocMessage, SourceError> {
    if body.len() < RESPONSE_HEADER_LEN {
        return Err(SourceError::InvalidResponse(format!(
            "Response too short ({} bytes)",
            body.len()
        )));
    }
    WlocMessage::decode(&body[RESPONSE_HEADER_LEN..])
        .map_err(|e| SourceError::InvalidResponse(format!("Failed to decode response: {}", e)))
}

/// Apple location services source.
pub struct AppleSource<C: AsyncHttpClient> {
    http_client: C,
}

impl<C: AsyncHttpClient> AppleSource<C> {
    pub fn new(http_client: C) -> Self {
        Self { http_client }
    }

    async fn locate(&self, bssid: &str) -> Result<SourceOutcome, SourceError> {
        let response = self
            .http_client
            .post_with_headers(
                APPLE_WLOC_URL,
                &[
                    ("Content-Type", "application/x-www-form-urlencoded"),
                    ("Accept", "*/*"),
                    ("Accept-Charset", "utf-8"),
                    ("Accept-Language", "en-us"),
                    ("User-Agent", USER_AGENT),
                ],
                build_request(bssid),
            )
            .await?;

        if !response.is_success() {
            return Err(SourceError::Provider(format!(
                "Request failed with status {}",
                response.status
            )));
        }

        let message = parse_response(&response.body)?;
        debug!(devices = message.wifi_devices.len(), "WLOC response decoded");

        let device = message
            .wifi_devices
            .iter()
            .find(|d| same_bssid(&d.bssid, bssid))
            .ok_or_else(|| SourceError::Provider(NOT_FOUND.to_string()))?;
        let location = device
            .location
            .as_ref()
            .ok_or_else(|| SourceError::Provider(NOT_FOUND.to_string()))?;

        let latitude = decode_fixed_point(&location.latitude.to_string());
        let longitude = decode_fixed_point(&location.longitude.to_string());
        match (latitude, longitude) {
            (Some(lat), Some(lon)) => {
                let mut record = SourceRecord::new(self.module(), lat, lon).with_bssid(bssid);
                if location.accuracy > 0 {
                    record = record.with_extra("accuracy", location.accuracy.to_string());
                }
                Ok(SourceOutcome::Single(record))
            }
            _ => Err(SourceError::Provider(NOT_FOUND.to_string())),
        }
    }
}

impl<C: AsyncHttpClient> Source for AppleSource<C> {
    fn id(&self) -> SourceId {
        SourceId::Apple
    }

    async fn lookup(&self, key: &LookupKey) -> SourceOutcome {
        let result = match key.kind() {
            SearchKind::Bssid => self.locate(key.value()).await,
            kind => Err(SourceError::UnsupportedKind(kind)),
        };
        SourceOutcome::from_result(self.module(), result)
    }
}
