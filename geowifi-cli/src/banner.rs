//! Startup banner.

use console::style;

const LOGO: &str = r"
   ___  ___  ___  __      __ _  ___  _
  / __|| __|/ _ \ \ \    / /(_)| __|(_)
 | (_ || _|| (_) | \ \/\/ / | || _| | |
  \___||___|\___/   \_/\_/  |_||_|  |_|";

/// Prints the logo and version to stderr so stdout carries only the report.
pub fn print_banner() {
    eprintln!("{}", style(LOGO).magenta().bold());
    eprintln!(
        "  {} {}",
        style(format!("v{}", geowifi::VERSION)).dim(),
        style("WiFi geolocation by BSSID and SSID").italic()
    );
    eprintln!();
}
