//! CORS negotiation
//!
//! Preflight short-circuit and additive response-header injection. The
//! merge never overwrites a header a handler already set; defaults only
//! fill the gaps.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderMap, HeaderName, HeaderValue};
use hyper::{Response, StatusCode};

/// Cross-origin policy applied by the dispatcher.
///
/// Mutable only during setup (`Router::cors`, last call wins); read-only
/// once dispatch begins.
#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allow_origin: String,
    pub allow_methods: String,
    pub allow_headers: String,
    pub allow_credentials: Option<bool>,
    pub vary: Option<String>,
    pub max_age: u32,
    pub options_success_status: u16,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origin: "*".to_string(),
            allow_methods: "*".to_string(),
            allow_headers: "*".to_string(),
            allow_credentials: None,
            vary: None,
            max_age: 86_400,
            options_success_status: 204,
        }
    }
}

impl CorsConfig {
    /// Inject policy headers under their canonical wire names, skipping
    /// any header already present.
    pub fn apply(&self, headers: &mut HeaderMap) {
        set_if_absent(headers, "access-control-allow-origin", &self.allow_origin);
        set_if_absent(headers, "access-control-allow-methods", &self.allow_methods);
        set_if_absent(headers, "access-control-allow-headers", &self.allow_headers);
        if self.allow_credentials.unwrap_or(false) {
            set_if_absent(headers, "access-control-allow-credentials", "true");
        }
        if let Some(vary) = &self.vary {
            set_if_absent(headers, "vary", vary);
        }
        if self.max_age != 0 {
            set_if_absent(headers, "access-control-max-age", &self.max_age.to_string());
        }
    }

    /// Empty-body reply to a preflight request, carrying the configured
    /// policy headers and success status.
    pub fn preflight_response(&self) -> Response<Full<Bytes>> {
        let status = StatusCode::from_u16(self.options_success_status)
            .unwrap_or(StatusCode::NO_CONTENT);
        let mut response = Response::new(Full::new(Bytes::new()));
        *response.status_mut() = status;
        self.apply(response.headers_mut());
        response
    }
}

fn set_if_absent(headers: &mut HeaderMap, name: &'static str, value: &str) {
    let name = HeaderName::from_static(name);
    if headers.contains_key(&name) {
        return;
    }
    if let Ok(value) = HeaderValue::from_str(value) {
        headers.insert(name, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cors = CorsConfig::default();
        assert_eq!(cors.allow_origin, "*");
        assert_eq!(cors.max_age, 86_400);
        assert_eq!(cors.options_success_status, 204);
        assert!(cors.allow_credentials.is_none());
        assert!(cors.vary.is_none());
    }

    #[test]
    fn test_apply_fills_missing_headers() {
        let cors = CorsConfig::default();
        let mut headers = HeaderMap::new();
        cors.apply(&mut headers);

        assert_eq!(headers["access-control-allow-origin"], "*");
        assert_eq!(headers["access-control-allow-methods"], "*");
        assert_eq!(headers["access-control-allow-headers"], "*");
        assert_eq!(headers["access-control-max-age"], "86400");
        assert!(!headers.contains_key("access-control-allow-credentials"));
        assert!(!headers.contains_key("vary"));
    }

    #[test]
    fn test_apply_never_overwrites() {
        let cors = CorsConfig::default();
        let mut headers = HeaderMap::new();
        headers.insert(
            "access-control-allow-origin",
            HeaderValue::from_static("https://example.com"),
        );
        cors.apply(&mut headers);

        assert_eq!(headers["access-control-allow-origin"], "https://example.com");
        assert_eq!(headers["access-control-allow-methods"], "*");
    }

    #[test]
    fn test_optional_headers() {
        let cors = CorsConfig {
            allow_credentials: Some(true),
            vary: Some("Origin".to_string()),
            ..CorsConfig::default()
        };
        let mut headers = HeaderMap::new();
        cors.apply(&mut headers);

        assert_eq!(headers["access-control-allow-credentials"], "true");
        assert_eq!(headers["vary"], "Origin");
    }

    #[test]
    fn test_preflight_response() {
        let cors = CorsConfig {
            allow_origin: "https://example.com".to_string(),
            ..CorsConfig::default()
        };
        let response = cors.preflight_response();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(
            response.headers()["access-control-allow-origin"],
            "https://example.com"
        );
    }
}
