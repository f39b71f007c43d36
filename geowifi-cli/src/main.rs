//! geowifi CLI - Command-line interface
//!
//! Looks up a BSSID or SSID in every applicable WiFi geolocation database,
//! prints the combined report and optionally saves it as JSON or an HTML map.

mod args;
mod banner;
mod error;
mod runner;

use clap::Parser;
use geowifi::record::LookupKey;

use args::Args;
use error::CliError;
use runner::{CliRunner, RunOptions};

fn main() {
    let args = Args::parse();

    if !args.no_banner {
        banner::print_banner();
    }

    if let Err(e) = run(args) {
        e.exit();
    }
}

fn run(args: Args) -> Result<(), CliError> {
    if args.init_config {
        runner::init_config(args.config.as_deref())?;
        return Ok(());
    }

    // Reject malformed input before touching the log file or the network.
    let identifier = args.identifier.clone().ok_or(CliError::MissingIdentifier)?;
    let key = LookupKey::new(args.search_by.into(), identifier)?;

    let runner = CliRunner::new(&RunOptions::from(&args))?;
    runner.log_startup(&key);

    let results = runner.search(&key)?;
    runner.print_report(&results);

    if let Some(format) = args.output_format {
        runner.save(format, &key, &results)?;
    }

    Ok(())
}
