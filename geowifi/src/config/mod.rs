//! Configuration for geowifi.
//!
//! The user-editable INI file at `~/.geowifi/config.ini` is loaded into a
//! [`ConfigFile`], then resolved together with command-line overrides into
//! the immutable [`Settings`] consumed by sources.
//!
//! # Example
//!
//! ```
//! use geowifi::config::{ConfigFile, Settings};
//!
//! let settings = Settings::from_config(&ConfigFile::default()).with_timeout_secs(10);
//! assert!(settings.verify_tls());
//! assert!(settings.wigle_auth().is_none());
//! ```

mod file;
mod parser;
mod runtime;
mod settings;
mod writer;

pub use file::{
    config_directory, config_file_path, default_log_file, ConfigFileError, DEFAULT_OUTPUT_DIR,
};
pub use runtime::Settings;
pub use settings::{
    ApiSettings, ConfigFile, LoggingSettings, NetworkSettings, OutputSettings, SearchSettings,
};
