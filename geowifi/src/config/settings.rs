//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.

use std::path::PathBuf;

use super::file::{default_log_file, DEFAULT_OUTPUT_DIR};
use crate::source::DEFAULT_TIMEOUT_SECS;

/// Complete configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConfigFile {
    /// Provider credentials
    pub api: ApiSettings,
    /// Transport settings
    pub network: NetworkSettings,
    /// Result filtering policy
    pub search: SearchSettings,
    /// Artifact location
    pub output: OutputSettings,
    /// Log file location
    pub logging: LoggingSettings,
}

/// `[api]` credentials. Empty values are treated as unset.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ApiSettings {
    /// Encoded Wigle `name:token` pair, sent as HTTP Basic credentials
    pub wigle_auth: Option<String>,
    /// Google Geolocation API key
    pub google_api: Option<String>,
    /// Combain API key
    pub combain_api: Option<String>,
}

/// `[network]` settings.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkSettings {
    /// Accept invalid TLS certificates from every source
    pub no_ssl_verify: bool,
    /// Per-request timeout in seconds
    pub timeout: u64,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            no_ssl_verify: false,
            timeout: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// `[search]` settings.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchSettings {
    /// Also drop exact 0.0 latitudes from SSID list results
    pub drop_zero_ssid: bool,
}

/// `[output]` settings.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSettings {
    /// Directory receiving JSON and map artifacts
    pub directory: PathBuf,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

/// `[logging]` settings.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    pub file: PathBuf,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            file: default_log_file(),
        }
    }
}
