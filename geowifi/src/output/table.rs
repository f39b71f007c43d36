//! Terminal report table.

use std::fmt;

use console::{style, StyledObject};
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::record::LookupResult;

/// Marker for a cell the source did not report.
const EMPTY_CELL: &str = "❌";

#[derive(Tabled)]
struct Row {
    #[tabled(rename = "Module")]
    module: String,
    #[tabled(rename = "BSSID")]
    bssid: String,
    #[tabled(rename = "SSID")]
    ssid: String,
    #[tabled(rename = "Latitude")]
    latitude: String,
    #[tabled(rename = "Longitude")]
    longitude: String,
}

/// Search report rendered for the terminal.
///
/// Location and error entries form the grid, with error rows painted red.
/// The error messages and the vendor annotation are listed below it.
pub struct ResultTable<'a> {
    results: &'a [LookupResult],
    colors: bool,
}

impl<'a> ResultTable<'a> {
    /// Uses colors when the terminal supports them.
    pub fn new(results: &'a [LookupResult]) -> Self {
        Self {
            results,
            colors: console::colors_enabled(),
        }
    }

    pub fn with_colors(mut self, colors: bool) -> Self {
        self.colors = colors;
        self
    }

    fn paint<D>(&self, styled: StyledObject<D>) -> StyledObject<D> {
        styled.force_styling(self.colors)
    }

    fn cell(&self, value: Option<String>, error: bool) -> String {
        let text = value
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| EMPTY_CELL.to_string());
        if error {
            self.paint(style(text).red()).to_string()
        } else {
            text
        }
    }

    fn rows(&self) -> Vec<Row> {
        self.results
            .iter()
            .filter_map(|result| match result {
                LookupResult::Network(record) => Some(Row {
                    module: self.cell(Some(record.module.clone()), false),
                    bssid: self.cell(record.bssid.clone(), false),
                    ssid: self.cell(record.ssid.clone(), false),
                    latitude: record.latitude.to_string(),
                    longitude: record.longitude.to_string(),
                }),
                LookupResult::Error(record) => Some(Row {
                    module: self.cell(Some(record.module.clone()), true),
                    bssid: self.cell(None, true),
                    ssid: self.cell(None, true),
                    latitude: self.cell(None, true),
                    longitude: self.cell(None, true),
                }),
                LookupResult::Vendor(_) => None,
            })
            .collect()
    }

    /// The grid alone.
    pub fn grid(&self) -> String {
        Table::new(self.rows()).with(Style::rounded()).to_string()
    }

    /// One line per failed module.
    pub fn error_lines(&self) -> Vec<String> {
        self.results
            .iter()
            .filter_map(|result| match result {
                LookupResult::Error(record) => Some(format!(
                    " {} Error in {} module: {}",
                    self.paint(style("●").red()),
                    self.paint(style(&record.module).cyan()),
                    record.error.to_lowercase()
                )),
                _ => None,
            })
            .collect()
    }

    /// The manufacturer line, when the vendor lookup succeeded.
    pub fn vendor_lines(&self) -> Vec<String> {
        self.results
            .iter()
            .filter_map(|result| match result {
                LookupResult::Vendor(info) => Some(format!(
                    " {} Vendor_check module result: {}",
                    self.paint(style("●").green()),
                    self.paint(style(&info.vendor).cyan())
                )),
                _ => None,
            })
            .collect()
    }
}

impl fmt::Display for ResultTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.grid())?;
        writeln!(f)?;
        for line in self.error_lines() {
            writeln!(f, "{}", line)?;
        }
        let vendors = self.vendor_lines();
        if !vendors.is_empty() {
            writeln!(f)?;
            for line in vendors {
                writeln!(f, "{}", line)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{ErrorRecord, NetworkRecord, VendorInfo};

    const RED: &str = "\u{1b}[31m";

    fn sample() -> Vec<LookupResult> {
        vec![
            NetworkRecord::new("wigle", 48.85, 2.35)
                .with_bssid("AA:BB:CC:DD:EE:FF")
                .with_ssid("TestNet")
                .into(),
            ErrorRecord::new("apple", "No location found").into(),
            VendorInfo::new("AA:BB:CC:DD:EE:FF", "Acme").into(),
        ]
    }

    #[test]
    fn test_grid_columns_and_rows() {
        let results = sample();
        let grid = ResultTable::new(&results).with_colors(false).grid();

        for header in ["Module", "BSSID", "SSID", "Latitude", "Longitude"] {
            assert!(grid.contains(header));
        }
        assert!(grid.contains("TestNet"));
        assert!(grid.contains("48.85"));
        assert!(!grid.contains("Acme"));
        assert_eq!(grid.matches(EMPTY_CELL).count(), 4);
    }

    #[test]
    fn test_error_rows_are_red() {
        let results = sample();
        let grid = ResultTable::new(&results).with_colors(true).grid();

        let wigle_line = grid.lines().find(|l| l.contains("wigle")).unwrap();
        let apple_line = grid.lines().find(|l| l.contains("apple")).unwrap();
        assert!(!wigle_line.contains(RED));
        assert!(apple_line.contains(RED));
    }

    #[test]
    fn test_error_and_vendor_lines() {
        let results = sample();
        let table = ResultTable::new(&results).with_colors(false);

        assert_eq!(
            table.error_lines(),
            vec![" ● Error in apple module: no location found".to_string()]
        );
        assert_eq!(
            table.vendor_lines(),
            vec![" ● Vendor_check module result: Acme".to_string()]
        );

        let rendered = table.to_string();
        assert!(rendered.contains("Error in apple module"));
        assert!(rendered.ends_with("Vendor_check module result: Acme\n"));
    }
}
