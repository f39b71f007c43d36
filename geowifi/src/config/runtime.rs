//! Immutable runtime settings handed to sources and the dispatcher.

use std::path::{Path, PathBuf};

use super::settings::ConfigFile;

/// Resolved settings for one run.
///
/// Built once from the config file and command-line overrides, then shared
/// read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    wigle_auth: Option<String>,
    google_api: Option<String>,
    combain_api: Option<String>,
    verify_tls: bool,
    timeout_secs: u64,
    drop_zero_ssid: bool,
    output_dir: PathBuf,
}

impl Settings {
    pub fn from_config(config: &ConfigFile) -> Self {
        Self {
            wigle_auth: config.api.wigle_auth.clone(),
            google_api: config.api.google_api.clone(),
            combain_api: config.api.combain_api.clone(),
            verify_tls: !config.network.no_ssl_verify,
            timeout_secs: config.network.timeout,
            drop_zero_ssid: config.search.drop_zero_ssid,
            output_dir: config.output.directory.clone(),
        }
    }

    /// Disables certificate verification. Never re-enables it.
    pub fn with_insecure_tls(mut self, insecure: bool) -> Self {
        if insecure {
            self.verify_tls = false;
        }
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn wigle_auth(&self) -> Option<&str> {
        self.wigle_auth.as_deref()
    }

    pub fn google_api(&self) -> Option<&str> {
        self.google_api.as_deref()
    }

    pub fn combain_api(&self) -> Option<&str> {
        self.combain_api.as_deref()
    }

    pub fn verify_tls(&self) -> bool {
        self.verify_tls
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    pub fn drop_zero_ssid(&self) -> bool {
        self.drop_zero_ssid
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_config(&ConfigFile::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_verify_tls() {
        let settings = Settings::default();
        assert!(settings.verify_tls());
        assert_eq!(settings.timeout_secs(), 30);
        assert!(settings.wigle_auth().is_none());
        assert_eq!(settings.output_dir(), Path::new("results"));
    }

    #[test]
    fn test_config_no_ssl_verify() {
        let mut config = ConfigFile::default();
        config.network.no_ssl_verify = true;
        config.api.google_api = Some("key".to_string());
        config.search.drop_zero_ssid = true;

        let settings = Settings::from_config(&config);
        assert!(!settings.verify_tls());
        assert_eq!(settings.google_api(), Some("key"));
        assert!(settings.drop_zero_ssid());
    }

    #[test]
    fn test_cli_flag_cannot_reenable_verification() {
        let mut config = ConfigFile::default();
        config.network.no_ssl_verify = true;

        let settings = Settings::from_config(&config).with_insecure_tls(false);
        assert!(!settings.verify_tls());

        let settings = Settings::default().with_insecure_tls(true);
        assert!(!settings.verify_tls());
    }

    #[test]
    fn test_overrides() {
        let settings = Settings::default()
            .with_timeout_secs(3)
            .with_output_dir("/tmp/out");
        assert_eq!(settings.timeout_secs(), 3);
        assert_eq!(settings.output_dir(), Path::new("/tmp/out"));
    }
}
