//! Post-processing of source outcomes into report entries.
//!
//! List-returning sources report neighbouring networks too, so their entries
//! are filtered against the lookup key. Coordinates are coerced to `f64`
//! here rather than in the adapters.

use std::collections::BTreeSet;
use std::fmt;

use tracing::debug;

use crate::record::{
    ErrorRecord, LookupKey, LookupResult, NetworkRecord, SearchKind, VendorInfo,
};
use crate::source::{RawCoordinate, SourceOutcome, SourceRecord};

/// Which list entries are treated as unresolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FilterPolicy {
    /// Apply the zero-latitude rule to SSID queries as well.
    pub drop_zero_ssid: bool,
}

impl FilterPolicy {
    fn drops_zero_latitude(&self, kind: SearchKind) -> bool {
        match kind {
            SearchKind::Bssid => true,
            SearchKind::Ssid => self.drop_zero_ssid,
        }
    }
}

/// Converts a provider coordinate to `f64`.
///
/// Numbers pass through unchanged, numeric strings are parsed; anything else,
/// including non-finite values, is rejected.
pub fn coerce(raw: &RawCoordinate) -> Option<f64> {
    let value = match raw {
        RawCoordinate::Number(v) => *v,
        RawCoordinate::Text(s) => s.trim().parse::<f64>().ok()?,
    };
    value.is_finite().then_some(value)
}

fn to_network(record: SourceRecord) -> Result<NetworkRecord, String> {
    let latitude = record.latitude.as_ref().and_then(coerce);
    let longitude = record.longitude.as_ref().and_then(coerce);

    let (Some(latitude), Some(longitude)) = (latitude, longitude) else {
        return Err(format!(
            "Invalid coordinates: latitude={:?}, longitude={:?}",
            record.latitude, record.longitude
        ));
    };

    Ok(NetworkRecord {
        module: record.module,
        bssid: record.bssid,
        ssid: record.ssid,
        latitude,
        longitude,
        extra: record.extra,
    })
}

/// Turns one source outcome into report entries.
///
/// Always yields at least one entry so that every selected source is
/// represented in the report.
pub fn normalize(
    key: &LookupKey,
    module: &str,
    outcome: SourceOutcome,
    policy: FilterPolicy,
) -> Vec<LookupResult> {
    match outcome {
        SourceOutcome::Single(record) => match to_network(record) {
            Ok(network) => vec![network.into()],
            Err(error) => vec![ErrorRecord::new(module, error).into()],
        },
        SourceOutcome::Many(records) => {
            let total = records.len();
            let kept: Vec<LookupResult> = records
                .into_iter()
                .filter_map(|record| to_network(record).ok())
                .filter(|network| {
                    network
                        .identifier(key.kind())
                        .is_some_and(|id| key.matches(id))
                })
                .filter(|network| {
                    !(policy.drops_zero_latitude(key.kind()) && network.latitude == 0.0)
                })
                .map(LookupResult::from)
                .collect();

            debug!(module, total, kept = kept.len(), "Filtered list results");

            if kept.is_empty() {
                vec![ErrorRecord::new(module, format!("No results matching {}", key.value())).into()]
            } else {
                kept
            }
        }
        SourceOutcome::Vendor(info) => vec![info.into()],
        SourceOutcome::Failed(error) => vec![error.into()],
    }
}

/// Finds the vendor annotation for `bssid`.
///
/// Joins by exact BSSID equality, ignoring ASCII case.
pub fn vendor_for<'a>(results: &'a [LookupResult], bssid: &str) -> Option<&'a VendorInfo> {
    results.iter().find_map(|result| match result {
        LookupResult::Vendor(info) if info.bssid.eq_ignore_ascii_case(bssid) => Some(info),
        _ => None,
    })
}

/// Per-run counts for logs and the CLI footer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchSummary {
    /// Located network records
    pub records: usize,
    /// Distinct modules that located the network
    pub located_modules: usize,
    /// Modules that reported an error
    pub failed_modules: usize,
}

impl SearchSummary {
    pub fn from_results(results: &[LookupResult]) -> Self {
        let mut located = BTreeSet::new();
        let mut records = 0;
        let mut failed_modules = 0;

        for result in results {
            match result {
                LookupResult::Network(record) => {
                    records += 1;
                    located.insert(record.module.as_str());
                }
                LookupResult::Error(_) => failed_modules += 1,
                LookupResult::Vendor(_) => {}
            }
        }

        Self {
            records,
            located_modules: located.len(),
            failed_modules,
        }
    }

    pub fn is_located(&self) -> bool {
        self.records > 0
    }
}

impl fmt::Display for SearchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} result(s) from {} source(s), {} source(s) failed",
            self.records, self.located_modules, self.failed_modules
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn bssid_key() -> LookupKey {
        LookupKey::bssid("AA:BB:CC:DD:EE:FF").unwrap()
    }

    fn listed(bssid: &str, lat: impl Into<RawCoordinate>) -> SourceRecord {
        SourceRecord::new("wigle", lat, 2.35).with_bssid(bssid)
    }

    #[test]
    fn test_coerce() {
        assert_eq!(coerce(&RawCoordinate::Number(48.85)), Some(48.85));
        assert_eq!(coerce(&RawCoordinate::from(" -71.06 ")), Some(-71.06));
        assert_eq!(coerce(&RawCoordinate::from("north")), None);
        assert_eq!(coerce(&RawCoordinate::from("NaN")), None);
        assert_eq!(coerce(&RawCoordinate::Number(f64::INFINITY)), None);
    }

    #[test]
    fn test_list_keeps_only_case_insensitive_match() {
        let outcome = SourceOutcome::Many(vec![
            listed("aa:bb:cc:dd:ee:ff", 48.85),
            listed("AA:BB:CC:DD:EE:00", 48.86),
        ]);

        let results = normalize(&bssid_key(), "wigle", outcome, FilterPolicy::default());

        assert_eq!(results.len(), 1);
        let network = results[0].as_network().unwrap();
        assert_eq!(network.bssid.as_deref(), Some("aa:bb:cc:dd:ee:ff"));
    }

    #[test]
    fn test_zero_latitude_dropped_for_bssid() {
        let outcome = SourceOutcome::Many(vec![
            listed("AA:BB:CC:DD:EE:FF", 0.0),
            listed("AA:BB:CC:DD:EE:FF", 0.0001),
        ]);

        let results = normalize(&bssid_key(), "wigle", outcome, FilterPolicy::default());

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].as_network().unwrap().latitude, 0.0001);
    }

    #[test]
    fn test_zero_latitude_string_dropped() {
        let outcome = SourceOutcome::Many(vec![listed("AA:BB:CC:DD:EE:FF", "0.0000")]);
        let results = normalize(&bssid_key(), "wifidb", outcome, FilterPolicy::default());
        assert_eq!(
            results,
            vec![LookupResult::Error(ErrorRecord::new(
                "wifidb",
                "No results matching AA:BB:CC:DD:EE:FF"
            ))]
        );
    }

    #[test]
    fn test_zero_latitude_kept_for_ssid_by_default() {
        let key = LookupKey::ssid("linksys");
        let record = || SourceRecord::new("wifidb", "0.0", "0.0").with_ssid("LinkSys");

        let kept = normalize(
            &key,
            "wifidb",
            SourceOutcome::Many(vec![record()]),
            FilterPolicy::default(),
        );
        assert!(kept[0].as_network().is_some());

        let dropped = normalize(
            &key,
            "wifidb",
            SourceOutcome::Many(vec![record()]),
            FilterPolicy {
                drop_zero_ssid: true,
            },
        );
        assert!(dropped[0].is_error());
    }

    #[test]
    fn test_unparseable_list_entry_dropped() {
        let outcome = SourceOutcome::Many(vec![
            listed("AA:BB:CC:DD:EE:FF", "n/a"),
            listed("AA:BB:CC:DD:EE:FF", "12.5"),
        ]);
        let results = normalize(&bssid_key(), "wigle", outcome, FilterPolicy::default());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].as_network().unwrap().latitude, 12.5);
    }

    #[test]
    fn test_single_kept_as_is() {
        let record = SourceRecord::new("apple", 0.0, 0.0).with_bssid("AA:BB:CC:DD:EE:FF");
        let results = normalize(
            &bssid_key(),
            "apple",
            SourceOutcome::Single(record),
            FilterPolicy::default(),
        );
        assert!(results[0].as_network().is_some());
    }

    #[test]
    fn test_single_with_bad_coordinates_is_error() {
        let record =
            SourceRecord::with_raw("freifunk-karte", None, Some(RawCoordinate::Number(1.0)));
        let results = normalize(
            &LookupKey::ssid("x"),
            "freifunk-karte",
            SourceOutcome::Single(record),
            FilterPolicy::default(),
        );
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].module(), "freifunk-karte");
        assert!(results[0].is_error());
    }

    #[test]
    fn test_vendor_join_is_exact() {
        let results = vec![
            LookupResult::Vendor(VendorInfo::new("AA:BB:CC:DD:EE:00", "Other")),
            LookupResult::Vendor(VendorInfo::new("aa:bb:cc:dd:ee:ff", "Acme")),
        ];

        assert_eq!(
            vendor_for(&results, "AA:BB:CC:DD:EE:FF").map(|v| v.vendor.as_str()),
            Some("Acme")
        );
        assert!(vendor_for(&results, "AA:BB:CC:DD:EE:11").is_none());
    }

    #[test]
    fn test_summary() {
        let results: Vec<LookupResult> = vec![
            NetworkRecord::new("wigle", 1.0, 1.0).into(),
            NetworkRecord::new("wigle", 2.0, 2.0).into(),
            NetworkRecord::new("apple", 1.0, 1.0).into(),
            ErrorRecord::new("google", "google_api not configured").into(),
            VendorInfo::new("AA:BB:CC:DD:EE:FF", "Acme").into(),
        ];

        let summary = SearchSummary::from_results(&results);
        assert_eq!(
            summary,
            SearchSummary {
                records: 3,
                located_modules: 2,
                failed_modules: 1
            }
        );
        assert!(summary.is_located());
        assert_eq!(
            summary.to_string(),
            "3 result(s) from 2 source(s), 1 source(s) failed"
        );
    }

    proptest! {
        #[test]
        fn prop_coerce_is_idempotent(v in -180.0f64..180.0) {
            let once = coerce(&RawCoordinate::Number(v)).unwrap();
            prop_assert_eq!(coerce(&RawCoordinate::Number(once)), Some(v));
        }

        #[test]
        fn prop_coerce_parses_displayed_value(v in -180.0f64..180.0) {
            prop_assert_eq!(coerce(&RawCoordinate::Text(v.to_string())), Some(v));
        }
    }
}
