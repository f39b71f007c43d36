//! INI serialization logic for converting `ConfigFile` → INI string.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let wigle_auth = config.api.wigle_auth.as_deref().unwrap_or("");
    let google_api = config.api.google_api.as_deref().unwrap_or("");
    let combain_api = config.api.combain_api.as_deref().unwrap_or("");

    format!(
        r#"[api]
; Wigle encoded API name/token pair ("Encoded for use" on wigle.net/account)
wigle_auth = {}
; Google Geolocation API key
google_api = {}
; Combain API key
combain_api = {}

[network]
; Accept invalid TLS certificates from every source
no-ssl-verify = {}
; Per-request timeout in seconds
timeout = {}

[search]
; Drop SSID results reported at latitude 0.0
drop_zero_ssid = {}

[output]
; Directory for JSON and map artifacts
directory = {}

[logging]
file = {}
"#,
        wigle_auth,
        google_api,
        combain_api,
        config.network.no_ssl_verify,
        config.network.timeout,
        config.search.drop_zero_ssid,
        path_to_string(&config.output.directory),
        path_to_string(&config.logging.file),
    )
}

fn path_to_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_keys_written_empty() {
        let content = to_config_string(&ConfigFile::default());
        assert!(content.contains("wigle_auth = \n"));
        assert!(content.contains("timeout = 30\n"));
        assert!(content.contains("directory = results\n"));
    }
}
