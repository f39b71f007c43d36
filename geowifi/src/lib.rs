//! geowifi - WiFi network geolocation by BSSID or SSID.
//!
//! Queries several public and commercial WiFi geolocation databases
//! concurrently and folds their heterogeneous answers into one report of
//! located networks and per-source errors.
//!
//! # Modules
//!
//! - [`record`] - lookup key and normalized records
//! - [`source`] - upstream provider adapters
//! - [`dispatch`] - concurrent fan-out over sources
//! - [`normalize`] - filtering and coordinate coercion
//! - [`output`] - table, JSON and map presentation
//! - [`config`] - INI configuration and runtime settings
//! - [`logging`] - tracing setup

pub mod config;
pub mod dispatch;
pub mod logging;
pub mod normalize;
pub mod output;
pub mod record;
pub mod source;

/// Version of the geowifi library.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
