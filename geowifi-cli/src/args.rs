//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use geowifi::record::SearchKind;

/// What the identifier is.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum SearchBy {
    /// Access point MAC address (XX:XX:XX:XX:XX:XX)
    #[default]
    Bssid,
    /// Network name
    Ssid,
}

impl From<SearchBy> for SearchKind {
    fn from(search_by: SearchBy) -> Self {
        match search_by {
            SearchBy::Bssid => SearchKind::Bssid,
            SearchBy::Ssid => SearchKind::Ssid,
        }
    }
}

/// Artifact written after the table is printed.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// HTML map with one marker per located record
    Map,
    /// Flat JSON list of every result
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Map => "html",
            OutputFormat::Json => "json",
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "geowifi")]
#[command(version)]
#[command(
    about = "Search WiFi geolocation data by BSSID or SSID across public databases",
    long_about = None
)]
pub struct Args {
    /// BSSID or SSID of the network to search for
    #[arg(required_unless_present = "init_config")]
    pub identifier: Option<String>,

    /// Whether the identifier is a BSSID or an SSID
    #[arg(short, long, value_enum, default_value = "bssid")]
    pub search_by: SearchBy,

    /// Also save results as a map or JSON file
    #[arg(short, long, value_enum)]
    pub output_format: Option<OutputFormat>,

    /// Directory for saved results (overrides [output] directory)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Config file path (default: ~/.geowifi/config.ini)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write a configuration template and exit
    #[arg(long)]
    pub init_config: bool,

    /// Accept invalid TLS certificates from every source
    #[arg(long)]
    pub no_ssl_verify: bool,

    /// Per-request timeout in seconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Enable debug logging regardless of RUST_LOG
    #[arg(long)]
    pub debug: bool,

    /// Mirror log events to stderr
    #[arg(long)]
    pub verbose: bool,

    /// Do not print the banner
    #[arg(long)]
    pub no_banner: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["geowifi", "AA:BB:CC:DD:EE:FF"]).unwrap();
        assert_eq!(args.identifier.as_deref(), Some("AA:BB:CC:DD:EE:FF"));
        assert_eq!(args.search_by, SearchBy::Bssid);
        assert_eq!(args.output_format, None);
        assert!(!args.no_ssl_verify);
        assert_eq!(args.timeout, None);
    }

    #[test]
    fn test_short_flags() {
        let args = Args::try_parse_from(["geowifi", "-s", "ssid", "-o", "json", "Home WiFi"])
            .unwrap();
        assert_eq!(args.search_by, SearchBy::Ssid);
        assert_eq!(args.output_format, Some(OutputFormat::Json));
        assert_eq!(SearchKind::from(args.search_by), SearchKind::Ssid);
    }

    #[test]
    fn test_identifier_required_unless_init_config() {
        assert!(Args::try_parse_from(["geowifi"]).is_err());
        let args = Args::try_parse_from(["geowifi", "--init-config"]).unwrap();
        assert!(args.init_config);
        assert!(args.identifier.is_none());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        assert!(Args::try_parse_from(["geowifi", "--timeout", "0", "x"]).is_err());
        let args = Args::try_parse_from(["geowifi", "--timeout", "5", "x"]).unwrap();
        assert_eq!(args.timeout, Some(5));
    }

    #[test]
    fn test_unknown_output_format_rejected() {
        assert!(Args::try_parse_from(["geowifi", "-o", "csv", "x"]).is_err());
    }

    #[test]
    fn test_extension() {
        assert_eq!(OutputFormat::Map.extension(), "html");
        assert_eq!(OutputFormat::Json.extension(), "json");
    }
}
