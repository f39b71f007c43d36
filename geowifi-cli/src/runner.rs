//! CLI runner for common setup and operations.
//!
//! Encapsulates configuration loading, logging initialization, the lookup
//! itself and artifact persistence.

use std::path::{Path, PathBuf};
use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use geowifi::config::{config_file_path, ConfigFile, ConfigFileError, Settings};
use geowifi::dispatch::QueryDispatcher;
use geowifi::logging::{init_logging, LoggingGuard, LoggingOptions};
use geowifi::normalize::{FilterPolicy, SearchSummary};
use geowifi::output::{
    artifact_path, map_points, JsonWriter, LeafletMapRenderer, MapRenderer, ResultTable,
};
use geowifi::record::{LookupKey, LookupResult};
use geowifi::source::{SourceId, SourceRegistry};

use crate::args::{Args, OutputFormat};
use crate::error::CliError;

/// Command-line overrides applied on top of the config file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOptions {
    pub config: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub no_ssl_verify: bool,
    pub timeout: Option<u64>,
    pub debug: bool,
    pub verbose: bool,
}

impl From<&Args> for RunOptions {
    fn from(args: &Args) -> Self {
        Self {
            config: args.config.clone(),
            output_dir: args.output_dir.clone(),
            no_ssl_verify: args.no_ssl_verify,
            timeout: args.timeout,
            debug: args.debug,
            verbose: args.verbose,
        }
    }
}

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    settings: Settings,
}

impl CliRunner {
    /// Create a new CLI runner, loading config and initializing logging.
    ///
    /// A config file that cannot be loaded is reported on stderr and the run
    /// continues with defaults.
    pub fn new(options: &RunOptions) -> Result<Self, CliError> {
        let (config, config_error) = match load_config(options.config.as_deref()) {
            Ok(config) => (config, None),
            Err(e) => {
                eprintln!(" {} Configuration error: {}", style("●").yellow(), e);
                eprintln!("   Continuing with default settings.");
                (ConfigFile::default(), Some(e))
            }
        };

        let logging = LoggingOptions::new(&config.logging.file)
            .with_debug(options.debug)
            .with_verbose(options.verbose);
        let logging_guard = init_logging(&logging).map_err(CliError::LoggingInit)?;

        if let Some(e) = config_error {
            warn!(error = %e, "Using default configuration");
        }

        Ok(Self {
            logging_guard,
            settings: resolve_settings(&config, options),
        })
    }

    /// Log startup information for a lookup.
    pub fn log_startup(&self, key: &LookupKey) {
        info!("geowifi v{}", geowifi::VERSION);
        info!(
            kind = %key.kind(),
            value = key.value(),
            verify_tls = self.settings.verify_tls(),
            timeout_secs = self.settings.timeout_secs(),
            "Starting lookup"
        );
    }

    /// Query every applicable source, showing a spinner until all report.
    pub fn search(&self, key: &LookupKey) -> Result<Vec<LookupResult>, CliError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(CliError::Runtime)?;
        let _guard = runtime.enter();

        let registry = SourceRegistry::from_config(&self.settings).map_err(CliError::HttpClient)?;
        let dispatcher = QueryDispatcher::new(registry).with_policy(FilterPolicy {
            drop_zero_ssid: self.settings.drop_zero_ssid(),
        });

        let spinner = spinner(&format!(
            "Querying {} sources for {}...",
            SourceId::for_kind(key.kind()).len(),
            key
        ));
        let results = runtime.block_on(dispatcher.search(key));
        spinner.finish_and_clear();

        Ok(results)
    }

    /// Print the table, per-module errors, vendor and summary to stdout.
    pub fn print_report(&self, results: &[LookupResult]) {
        print!("{}", ResultTable::new(results));

        let summary = SearchSummary::from_results(results);
        println!();
        println!(" {}", style(summary).dim());
        println!();
    }

    /// Save results in the requested format under the output directory.
    pub fn save(
        &self,
        format: OutputFormat,
        key: &LookupKey,
        results: &[LookupResult],
    ) -> Result<PathBuf, CliError> {
        let path = artifact_path(self.settings.output_dir(), key.value(), format.extension());
        save_results(format, &path, results)?;

        let label = match format {
            OutputFormat::Map => "Map",
            OutputFormat::Json => "Json file",
        };
        let shown = std::fs::canonicalize(&path).unwrap_or_else(|_| path.clone());
        println!(
            " {} {} saved at: {}",
            style("●").green(),
            style(label).yellow(),
            style(shown.display()).cyan()
        );
        println!();

        Ok(path)
    }
}

/// Load the explicitly requested config file, or the default one.
///
/// Only an explicit path must exist.
pub fn load_config(path: Option<&Path>) -> Result<ConfigFile, ConfigFileError> {
    match path {
        Some(path) => ConfigFile::load_from(path),
        None => ConfigFile::load(),
    }
}

/// Combine the config file with command-line overrides.
pub fn resolve_settings(config: &ConfigFile, options: &RunOptions) -> Settings {
    let mut settings = Settings::from_config(config).with_insecure_tls(options.no_ssl_verify);
    if let Some(timeout) = options.timeout {
        settings = settings.with_timeout_secs(timeout);
    }
    if let Some(dir) = &options.output_dir {
        settings = settings.with_output_dir(dir);
    }
    settings
}

/// Write `results` to `path` in `format`.
pub fn save_results(
    format: OutputFormat,
    path: &Path,
    results: &[LookupResult],
) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => JsonWriter::new().write(path, results)?,
        OutputFormat::Map => LeafletMapRenderer::new().render(&map_points(results), path)?,
    }
    Ok(())
}

/// Write the configuration template, leaving an existing file untouched.
pub fn init_config(path: Option<&Path>) -> Result<PathBuf, CliError> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(config_file_path);

    if path.exists() {
        println!("Config file already exists: {}", path.display());
        return Ok(path);
    }

    ConfigFile::default().save_to(&path)?;
    println!("Wrote configuration template to {}", path.display());
    println!("Add your wigle_auth, google_api and combain_api keys to enable those sources.");
    Ok(path)
}

fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    let template = ProgressStyle::with_template(" {spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(template);
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}
