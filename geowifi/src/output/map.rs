//! HTML map artifact.
//!
//! The page is self-contained apart from the Leaflet assets and Google
//! hybrid tiles loaded from their CDNs when opened.

use std::path::Path;

use serde::Serialize;
use tracing::info;

use super::{write_file, OutputError};
use crate::normalize::vendor_for;
use crate::record::LookupResult;

const LEAFLET_VERSION: &str = "1.9.4";
const TILE_URL: &str = "https://mt1.google.com/vt/lyrs=y&x={x}&y={y}&z={z}";
const INITIAL_CENTER: (f64, f64) = (39.600441, -41.141473);
const INITIAL_ZOOM: u8 = 3;

/// One marker: position and popup HTML.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub label: String,
}

impl MapPoint {
    pub fn new(latitude: f64, longitude: f64, label: impl Into<String>) -> Self {
        Self {
            latitude,
            longitude,
            label: label.into(),
        }
    }
}

/// Persists points as a map file.
pub trait MapRenderer {
    fn render(&self, points: &[MapPoint], path: &Path) -> Result<(), OutputError>;
}

/// Renders a Leaflet HTML page.
#[derive(Debug, Default, Clone, Copy)]
pub struct LeafletMapRenderer;

impl LeafletMapRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Builds the page source.
    pub fn to_html(&self, points: &[MapPoint]) -> Result<String, OutputError> {
        // `<` is escaped so popup markup cannot close the script element.
        let markers = serde_json::to_string(points)?.replace('<', "\\u003c");

        Ok(format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>geowifi</title>
<link rel="stylesheet" href="https://unpkg.com/leaflet@{version}/dist/leaflet.css">
<script src="https://unpkg.com/leaflet@{version}/dist/leaflet.js"></script>
<style>
html, body, #map {{ height: 100%; margin: 0; }}
.leaflet-popup-content {{ font-family: Consolas, monospace; line-height: 1.5; }}
</style>
</head>
<body>
<div id="map"></div>
<script>
var map = L.map("map").setView([{lat}, {lon}], {zoom});
L.tileLayer("{tiles}", {{ attribution: "Google", maxZoom: 20 }}).addTo(map);
var markers = {markers};
markers.forEach(function (m) {{
  L.marker([m.latitude, m.longitude]).bindPopup(m.label).addTo(map);
}});
</script>
</body>
</html>
"#,
            version = LEAFLET_VERSION,
            lat = INITIAL_CENTER.0,
            lon = INITIAL_CENTER.1,
            zoom = INITIAL_ZOOM,
            tiles = TILE_URL,
            markers = markers,
        ))
    }
}

impl MapRenderer for LeafletMapRenderer {
    fn render(&self, points: &[MapPoint], path: &Path) -> Result<(), OutputError> {
        let html = self.to_html(points)?;
        write_file(path, html.as_bytes())?;
        info!(path = %path.display(), markers = points.len(), "Map written");
        Ok(())
    }
}

/// Builds one point per located record; errors and vendor entries are skipped.
///
/// Popups name the module, the BSSID (or SSID when no BSSID was reported)
/// and the manufacturer joined by exact BSSID.
pub fn map_points(results: &[LookupResult]) -> Vec<MapPoint> {
    results
        .iter()
        .filter_map(LookupResult::as_network)
        .map(|record| {
            let mut label = String::from("<h3>Network Information</h3>");
            label.push_str(&format!(
                "<p><b>Module</b>: {}</p>",
                escape_html(&record.module)
            ));
            if let Some(bssid) = &record.bssid {
                label.push_str(&format!("<p><b>BSSID</b>: {}</p>", escape_html(bssid)));
                if let Some(info) = vendor_for(results, bssid) {
                    label.push_str(&format!(
                        "<p><b>Vendor</b>: {}</p>",
                        escape_html(&info.vendor)
                    ));
                }
            } else if let Some(ssid) = &record.ssid {
                label.push_str(&format!("<p><b>SSID</b>: {}</p>", escape_html(ssid)));
            }
            MapPoint::new(record.latitude, record.longitude, label)
        })
        .collect()
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{ErrorRecord, NetworkRecord, VendorInfo};
    use tempfile::TempDir;

    fn sample() -> Vec<LookupResult> {
        vec![
            NetworkRecord::new("wigle", 48.85, 2.35)
                .with_bssid("AA:BB:CC:DD:EE:FF")
                .into(),
            NetworkRecord::new("openwifimap", 52.5, 13.4)
                .with_ssid("<script>")
                .into(),
            ErrorRecord::new("google", "google_api not configured").into(),
            VendorInfo::new("aa:bb:cc:dd:ee:ff", "Acme & Co").into(),
        ]
    }

    #[test]
    fn test_points_skip_errors_and_vendor() {
        let points = map_points(&sample());
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].latitude, 48.85);
        assert!(points[0].label.contains("<b>BSSID</b>: AA:BB:CC:DD:EE:FF"));
        assert!(points[0].label.contains("<b>Vendor</b>: Acme &amp; Co"));
    }

    #[test]
    fn test_ssid_is_escaped() {
        let points = map_points(&sample());
        assert!(points[1].label.contains("<b>SSID</b>: &lt;script&gt;"));
        assert!(!points[1].label.contains("Vendor"));
    }

    #[test]
    fn test_html_has_initial_view_and_markers() {
        let html = LeafletMapRenderer::new()
            .to_html(&map_points(&sample()))
            .unwrap();

        assert!(html.contains("setView([39.600441, -41.141473], 3)"));
        assert!(html.contains("lyrs=y"));
        assert!(html.contains("\"latitude\":48.85"));
        assert!(!html.contains("<h3>"));
    }

    #[test]
    fn test_render_writes_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("results").join("AA_BB_CC_DD_EE_FF.html");

        LeafletMapRenderer::new()
            .render(&map_points(&sample()), &path)
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("<!DOCTYPE html>"));
    }
}
