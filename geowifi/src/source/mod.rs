//! WiFi geolocation sources.
//!
//! Each upstream provider is an adapter implementing [`Source`] over an
//! [`AsyncHttpClient`]. Adapters never fail: every error path is folded into
//! [`SourceOutcome::Failed`] with the adapter's module name.
//!
//! # Building sources
//!
//! ```ignore
//! use geowifi::config::Settings;
//! use geowifi::source::SourceRegistry;
//!
//! let registry = SourceRegistry::from_config(&Settings::default())?;
//! ```

mod apple;
mod combain;
mod factory;
mod freifunk;
mod geolocate;
mod google;
mod http;
mod mylnikov;
mod openwifimap;
mod types;
mod vendor;
mod wifidb;
mod wigle;

pub use apple::{decode_fixed_point, AppleSource, NO_LOCATION_SENTINEL};
pub use combain::CombainSource;
pub use factory::{AnySource, SourceRegistry};
pub use freifunk::FreifunkSource;
pub use google::GoogleSource;
pub use http::{AsyncHttpClient, AsyncReqwestClient, HttpResponse, DEFAULT_TIMEOUT_SECS};
pub use mylnikov::MylnikovSource;
pub use openwifimap::OpenWifiMapSource;
pub use types::{RawCoordinate, Source, SourceError, SourceId, SourceOutcome, SourceRecord};
pub use vendor::MacVendorSource;
pub use wifidb::WifiDbSource;
pub use wigle::WigleSource;

#[cfg(test)]
pub use http::tests::MockAsyncHttpClient;
