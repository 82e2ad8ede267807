use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use url::{Host, Url};

use crate::error::{Result, SharedError};

/// Endpoint used when no base URL has been configured.
pub const LOCALHOST_BASE_URL: &str = "http://127.0.0.1:8000";

static LOCALHOST: Lazy<ApiBaseUrl> = Lazy::new(|| {
    ApiBaseUrl::parse(LOCALHOST_BASE_URL).expect("localhost base URL is well-formed")
});

/// Base address of the planner API: scheme, host, optional port and an
/// optional mount path.
///
/// The inner URL always ends with `/`, so joining a relative path keeps
/// every segment of the mount path. `Display` shows the normalized form
/// without that trailing slash: scheme and host are lowercased, a default
/// port (80 for http, 443 for https) is dropped, and a configured
/// trailing slash is not kept. `HTTP://Example.COM:80/api/` displays as
/// `http://example.com/api`; `http://10.0.0.75:8000` displays unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ApiBaseUrl(Url);

impl ApiBaseUrl {
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let mut url = Url::parse(trimmed).map_err(|e| SharedError::InvalidBaseUrl {
            input: trimmed.to_string(),
            reason: e.to_string(),
        })?;

        match url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(SharedError::UnsupportedScheme {
                    scheme: other.to_string(),
                })
            }
        }

        if url.query().is_some() {
            return Err(unexpected(trimmed, "query string"));
        }
        if url.fragment().is_some() {
            return Err(unexpected(trimmed, "fragment"));
        }
        if !url.username().is_empty() || url.password().is_some() {
            return Err(unexpected(trimmed, "credentials"));
        }

        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        Ok(Self(url))
    }

    /// Parses a value that may be absent. Empty input and the literal
    /// `null` (any case) mean "not configured".
    pub fn parse_optional(input: &str) -> Result<Option<Self>> {
        if is_null_marker(input) {
            Ok(None)
        } else {
            Self::parse(input).map(Some)
        }
    }

    pub fn localhost() -> Self {
        LOCALHOST.clone()
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// Normalized form, always with a trailing slash.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn scheme(&self) -> &str {
        self.0.scheme()
    }

    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }

    pub fn port_or_known_default(&self) -> Option<u16> {
        self.0.port_or_known_default()
    }

    pub fn is_loopback(&self) -> bool {
        match self.0.host() {
            Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
            Some(Host::Ipv4(ip)) => IpAddr::V4(ip).is_loopback(),
            Some(Host::Ipv6(ip)) => IpAddr::V6(ip).is_loopback(),
            None => false,
        }
    }

    /// Joins a relative API path onto this base. Leading slashes on
    /// `path` are ignored so that a mount path such as `/api/` survives.
    /// The result must stay under the mount path: absolute URLs and `..`
    /// segments that climb above it are rejected.
    pub fn join(&self, path: &str) -> Result<Url> {
        let relative = path.trim_start_matches('/');
        // `tasks:batch` parses as a cannot-be-a-base URL and is still a path
        if let Ok(url) = Url::parse(relative) {
            if !url.cannot_be_a_base() {
                return Err(SharedError::AbsolutePath(path.to_string()));
            }
        }

        let joined = self
            .0
            .join(&format!("./{}", relative))
            .map_err(|e| SharedError::InvalidBaseUrl {
                input: format!("{}{}", self.0, relative),
                reason: e.to_string(),
            })?;

        if !joined.path().starts_with(self.0.path()) {
            return Err(SharedError::EscapesBasePath {
                path: path.to_string(),
                base: self.to_string(),
            });
        }
        Ok(joined)
    }
}

fn unexpected(input: &str, component: &'static str) -> SharedError {
    SharedError::UnexpectedComponent {
        input: input.to_string(),
        component,
    }
}

pub fn is_null_marker(input: &str) -> bool {
    let trimmed = input.trim();
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null")
}

impl fmt::Display for ApiBaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.0.as_str();
        f.write_str(s.strip_suffix('/').unwrap_or(s))
    }
}

impl FromStr for ApiBaseUrl {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ApiBaseUrl {
    type Error = SharedError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<ApiBaseUrl> for String {
    fn from(value: ApiBaseUrl) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use test_case::test_case;

    #[test]
    fn test_local_network_address_round_trips() {
        let url = ApiBaseUrl::parse("http://10.0.0.75:8000").unwrap();
        assert_eq!(url.to_string(), "http://10.0.0.75:8000");
        assert_eq!(url.as_str(), "http://10.0.0.75:8000/");
        assert_eq!(url.host(), Some("10.0.0.75"));
        assert_eq!(url.port_or_known_default(), Some(8000));
        assert!(!url.is_loopback());
    }

    #[test]
    fn test_production_https_url() {
        let url = ApiBaseUrl::parse("https://your-app.up.railway.app").unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.to_string(), "https://your-app.up.railway.app");
        assert_eq!(url.port_or_known_default(), Some(443));
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        let url = ApiBaseUrl::parse("  http://127.0.0.1:8000 \n").unwrap();
        assert_eq!(url.to_string(), "http://127.0.0.1:8000");
    }

    #[test]
    fn test_mount_path_gets_trailing_slash() {
        let url = ApiBaseUrl::parse("https://example.com/api").unwrap();
        assert_eq!(url.as_str(), "https://example.com/api/");
        assert_eq!(url.to_string(), "https://example.com/api");
    }

    #[test_case("10.0.0.75:8000" ; "missing scheme")]
    #[test_case("http://" ; "empty host")]
    #[test_case("not a url" ; "garbage")]
    fn test_rejects_malformed(input: &str) {
        assert!(matches!(
            ApiBaseUrl::parse(input),
            Err(SharedError::InvalidBaseUrl { .. })
        ));
    }

    #[test_case("ftp://10.0.0.75" ; "ftp")]
    #[test_case("ws://localhost:8000" ; "websocket")]
    #[test_case("localhost:8000" ; "host parsed as scheme")]
    fn test_rejects_other_schemes(input: &str) {
        assert!(matches!(
            ApiBaseUrl::parse(input),
            Err(SharedError::UnsupportedScheme { .. })
        ));
    }

    #[test_case("http://h:8000/?debug=1", "query string")]
    #[test_case("http://h:8000/#top", "fragment")]
    #[test_case("http://user:pw@h:8000", "credentials")]
    fn test_rejects_extra_components(input: &str, expected: &str) {
        match ApiBaseUrl::parse(input) {
            Err(SharedError::UnexpectedComponent { component, .. }) => {
                assert_eq!(component, expected)
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test_case("" ; "empty")]
    #[test_case("   " ; "blank")]
    #[test_case("null" ; "lowercase null")]
    #[test_case("NULL" ; "uppercase null")]
    fn test_null_markers_mean_absent(input: &str) {
        assert_eq!(ApiBaseUrl::parse_optional(input).unwrap(), None);
    }

    #[test]
    fn test_parse_optional_present() {
        let url = ApiBaseUrl::parse_optional("http://10.0.0.75:8000").unwrap();
        assert_eq!(url.map(|u| u.to_string()), Some("http://10.0.0.75:8000".to_string()));
    }

    #[test]
    fn test_localhost_default() {
        let url = ApiBaseUrl::localhost();
        assert_eq!(url.to_string(), LOCALHOST_BASE_URL);
        assert!(url.is_loopback());
        assert!(ApiBaseUrl::parse("http://localhost:8000").unwrap().is_loopback());
        assert!(ApiBaseUrl::parse("http://[::1]:8000").unwrap().is_loopback());
    }

    #[test]
    fn test_join_keeps_mount_path() {
        let url = ApiBaseUrl::parse("https://example.com/api").unwrap();
        assert_eq!(url.join("/tasks").unwrap().as_str(), "https://example.com/api/tasks");
        assert_eq!(url.join("tasks/7").unwrap().as_str(), "https://example.com/api/tasks/7");
    }

    #[test]
    fn test_display_is_normalized() {
        let url = ApiBaseUrl::parse("HTTP://Example.COM:80").unwrap();
        assert_eq!(url.to_string(), "http://example.com");

        let url = ApiBaseUrl::parse("https://h.example/api/").unwrap();
        assert_eq!(url.to_string(), "https://h.example/api");
        assert_eq!(url.as_str(), "https://h.example/api/");
    }

    #[test]
    fn test_join_allows_colon_in_relative_path() {
        let url = ApiBaseUrl::parse("https://h.example/api").unwrap();
        assert_eq!(url.join("/tasks:batch").unwrap().as_str(), "https://h.example/api/tasks:batch");
        assert_eq!(url.join("tasks:batch/7").unwrap().as_str(), "https://h.example/api/tasks:batch/7");
    }

    #[test]
    fn test_join_empty_path_is_base() {
        let url = ApiBaseUrl::parse("https://h.example/api").unwrap();
        assert_eq!(url.join("/").unwrap().as_str(), "https://h.example/api/");
    }

    #[test_case("/../admin" ; "leading parent")]
    #[test_case("tasks/../../admin" ; "nested parent")]
    #[test_case("/%2e%2e/admin" ; "encoded parent")]
    fn test_join_cannot_leave_mount_path(path: &str) {
        let url = ApiBaseUrl::parse("https://h.example/api").unwrap();
        assert!(matches!(url.join(path), Err(SharedError::EscapesBasePath { .. })));
    }

    #[test]
    fn test_join_parent_inside_mount_path() {
        let url = ApiBaseUrl::parse("https://h.example/api").unwrap();
        assert_eq!(url.join("tasks/../schedule").unwrap().as_str(), "https://h.example/api/schedule");
    }

    #[test]
    fn test_join_rejects_absolute_targets() {
        let url = ApiBaseUrl::localhost();
        assert!(matches!(
            url.join("https://elsewhere.example/tasks"),
            Err(SharedError::AbsolutePath(_))
        ));
        assert!(matches!(url.join("/http://elsewhere.example"), Err(SharedError::AbsolutePath(_))));
    }

    #[test]
    fn test_serde_uses_display_form() {
        let url = ApiBaseUrl::parse("http://10.0.0.75:8000").unwrap();
        let json = serde_json::to_string(&url).unwrap();
        assert_eq!(json, "\"http://10.0.0.75:8000\"");

        let back: ApiBaseUrl = serde_json::from_str(&json).unwrap();
        assert_eq!(back, url);

        assert!(serde_json::from_str::<ApiBaseUrl>("\"ftp://x\"").is_err());
    }

    proptest! {
        #[test]
        fn prop_ipv4_with_port_displays_as_given(a in 1u8..=254, b: u8, c: u8, d in 1u8..=254, port in 1024u16..) {
            let input = format!("http://{}.{}.{}.{}:{}", a, b, c, d, port);
            let url = ApiBaseUrl::parse(&input).unwrap();
            prop_assert_eq!(url.to_string(), input);
        }
    }
}
