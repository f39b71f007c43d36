//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;

use geowifi::config::ConfigFileError;
use geowifi::output::OutputError;
use geowifi::record::InvalidBssid;
use geowifi::source::SourceError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(std::io::Error),
    /// Configuration error
    Config(ConfigFileError),
    /// Identifier is not a well-formed BSSID
    InvalidBssid(InvalidBssid),
    /// Identifier missing from the command line
    MissingIdentifier,
    /// Failed to start the async runtime
    Runtime(std::io::Error),
    /// Failed to build the HTTP client shared by sources
    HttpClient(SourceError),
    /// Failed to write the JSON or map artifact
    Output(OutputError),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::InvalidBssid(_) => {
                eprintln!();
                eprintln!("A BSSID is six hex octets separated by colons, e.g. 00:11:22:AA:BB:CC");
                eprintln!("Use --search-by ssid to look up a network name instead.");
            }
            CliError::MissingIdentifier => {
                eprintln!();
                eprintln!("Usage: geowifi [OPTIONS] <IDENTIFIER>");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(e) => write!(f, "Failed to initialize logging: {}", e),
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::InvalidBssid(e) => write!(f, "{}", e),
            CliError::MissingIdentifier => write!(f, "No BSSID or SSID given"),
            CliError::Runtime(e) => write!(f, "Failed to start async runtime: {}", e),
            CliError::HttpClient(e) => write!(f, "Failed to create HTTP client: {}", e),
            CliError::Output(e) => write!(f, "Failed to write results: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::LoggingInit(e) => Some(e),
            CliError::Config(e) => Some(e),
            CliError::InvalidBssid(e) => Some(e),
            CliError::Runtime(e) => Some(e),
            CliError::HttpClient(e) => Some(e),
            CliError::Output(e) => Some(e),
            CliError::MissingIdentifier => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e)
    }
}

impl From<InvalidBssid> for CliError {
    fn from(e: InvalidBssid) -> Self {
        CliError::InvalidBssid(e)
    }
}

impl From<OutputError> for CliError {
    fn from(e: OutputError) -> Self {
        CliError::Output(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_bssid_message() {
        let err = CliError::from(InvalidBssid("AA:BB".to_string()));
        assert!(err.to_string().contains("AA:BB"));
    }

    #[test]
    fn test_config_error_has_source() {
        let err = CliError::from(ConfigFileError::NotFound("/tmp/missing.ini".into()));
        assert!(err.to_string().starts_with("Configuration error"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
