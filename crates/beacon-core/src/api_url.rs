//! Collector endpoint normalization.

use crate::error::{CoreError, CoreResult};

/// Endpoint file names the collector answers tracking requests on. URLs that
/// already point at one of these are kept as given; anything else gets the
/// default appended.
const KNOWN_ENDPOINTS: &[&str] = &["matomo.php", "piwik.php", "piwik-proxy.php"];

/// Default endpoint file appended to bare base URLs.
const DEFAULT_ENDPOINT: &str = "matomo.php";

/// A normalized collector address, split the way the dispatcher consumes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiUrl {
    /// Host (and optional port), no scheme, no path.
    pub host: String,
    /// Absolute path starting with `/`, ending in a known endpoint file.
    pub path: String,
    /// True when the input carried an explicit `https://` scheme.
    pub secure: bool,
}

impl ApiUrl {
    /// The full `host + path` form, as accepted by [`normalize_api_url`].
    pub fn to_url(&self) -> String {
        format!("{}{}", self.host, self.path)
    }
}

/// Normalize a collector URL supplied by the application.
///
/// Accepts `host`, `host/base`, or a full URL with an `http://`/`https://`
/// scheme. URLs already naming a known endpoint file are kept verbatim;
/// otherwise `/matomo.php` is appended. Rejects empty hosts and schemes
/// other than http/https.
pub fn normalize_api_url(input: &str) -> CoreResult<ApiUrl> {
    let (rest, secure) = match input.split_once("://") {
        Some(("http", rest)) => (rest, false),
        Some(("https", rest)) => (rest, true),
        Some((scheme, _)) => return Err(CoreError::UnsupportedScheme(scheme.to_string())),
        None => (input, false),
    };

    let rest = rest.trim_end_matches('/');
    if rest.is_empty() {
        return Err(CoreError::InvalidUrl(input.to_string()));
    }

    let full = if KNOWN_ENDPOINTS.iter().any(|e| rest.ends_with(e)) {
        rest.to_string()
    } else {
        format!("{rest}/{DEFAULT_ENDPOINT}")
    };

    let (host, path) = match full.split_once('/') {
        Some((host, path)) if !host.is_empty() => (host.to_string(), format!("/{path}")),
        _ => return Err(CoreError::InvalidUrl(input.to_string())),
    };

    Ok(ApiUrl { host, path, secure })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_host_gets_default_endpoint() {
        let api = normalize_api_url("stats.example.org").unwrap();
        assert_eq!(api.host, "stats.example.org");
        assert_eq!(api.path, "/matomo.php");
        assert!(!api.secure);
    }

    #[test]
    fn base_path_gets_default_endpoint() {
        let api = normalize_api_url("stats.example.org/analytics/").unwrap();
        assert_eq!(api.path, "/analytics/matomo.php");
    }

    #[test]
    fn known_endpoints_are_kept() {
        for endpoint in ["matomo.php", "piwik.php", "piwik-proxy.php"] {
            let api = normalize_api_url(&format!("stats.example.org/{endpoint}")).unwrap();
            assert_eq!(api.path, format!("/{endpoint}"));
        }
    }

    #[test]
    fn https_scheme_sets_secure() {
        let api = normalize_api_url("https://stats.example.org").unwrap();
        assert!(api.secure);
        assert_eq!(api.host, "stats.example.org");

        let api = normalize_api_url("http://stats.example.org").unwrap();
        assert!(!api.secure);
    }

    #[test]
    fn bad_inputs_are_rejected() {
        assert!(normalize_api_url("").is_err());
        assert!(normalize_api_url("https://").is_err());
        assert!(normalize_api_url("ftp://stats.example.org").is_err());
    }

    #[test]
    fn to_url_round_trips() {
        let api = normalize_api_url("stats.example.org/matomo.php").unwrap();
        assert_eq!(api.to_url(), "stats.example.org/matomo.php");
        assert_eq!(normalize_api_url(&api.to_url()).unwrap(), api);
    }
}
