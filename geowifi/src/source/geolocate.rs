//! Google-compatible geolocate wire models.
//!
//! Google and Combain accept the same `wifiAccessPoints` request body and
//! answer with `location.lat`/`location.lng` on success or an
//! `error.message` object otherwise.

use serde::{Deserialize, Serialize};

use crate::source::{HttpResponse, SourceError};

#[derive(Serialize, Debug)]
pub(crate) struct WifiAccessPoint {
    #[serde(rename = "macAddress")]
    mac_address: String,
}

#[derive(Serialize, Debug, Default)]
pub(crate) struct GeolocateRequest {
    #[serde(skip_serializing_if = "Option::is_none", rename = "considerIp")]
    consider_ip: Option<bool>,
    #[serde(rename = "wifiAccessPoints")]
    wifi_access_points: Vec<WifiAccessPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    indoor: Option<u8>,
}

impl GeolocateRequest {
    /// Request for `bssid` paired with a known companion access point.
    ///
    /// The services refuse to locate from a single access point.
    pub(crate) fn pair(bssid: &str, companion: &str) -> Self {
        Self {
            wifi_access_points: [bssid, companion]
                .into_iter()
                .map(|mac| WifiAccessPoint {
                    mac_address: mac.to_string(),
                })
                .collect(),
            ..Default::default()
        }
    }

    pub(crate) fn consider_ip(mut self, consider_ip: bool) -> Self {
        self.consider_ip = Some(consider_ip);
        self
    }

    pub(crate) fn indoor(mut self, indoor: u8) -> Self {
        self.indoor = Some(indoor);
        self
    }

    pub(crate) fn to_body(&self) -> Result<Vec<u8>, SourceError> {
        serde_json::to_vec(self)
            .map_err(|e| SourceError::InvalidResponse(format!("Failed to encode request: {}", e)))
    }
}

#[derive(Deserialize, Debug)]
pub(crate) struct Location {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Deserialize, Debug)]
pub(crate) struct Indoor {
    pub building: Option<serde_json::Value>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct GeolocateResponse {
    pub location: Location,
    pub accuracy: Option<f64>,
    pub indoor: Option<Indoor>,
}

#[derive(Deserialize, Debug)]
struct ErrorEnvelope {
    error: ApiError,
}

#[derive(Deserialize, Debug)]
struct ApiError {
    message: String,
}

/// Decodes a geolocate answer.
///
/// HTTP 200 must carry a location; anything else is turned into the
/// provider's `error.message`, or a status line when the body has none.
pub(crate) fn parse_response(response: &HttpResponse) -> Result<GeolocateResponse, SourceError> {
    if response.status == 200 {
        return response.json();
    }

    match response.json::<ErrorEnvelope>() {
        Ok(envelope) => Err(SourceError::Provider(envelope.error.message)),
        Err(_) => Err(SourceError::Provider(format!(
            "Request failed with status {}",
            response.status
        ))),
    }
}
