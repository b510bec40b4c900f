//! Route matching module
//!
//! Resolves a concrete request to a registered route by segment-wise
//! comparison: literal segments must match exactly, `:name` segments
//! capture the observed value. First structural match wins; there is no
//! specificity scoring, registration order is the only tie-break.

use std::collections::HashMap;

use super::Route;

/// Path parameters captured from `:name` pattern segments.
pub type PathParams = HashMap<String, String>;
/// Flattened query-string mapping, last value wins on duplicate keys.
pub type QueryParams = HashMap<String, String>;

/// Matches any method, or any path when used as a whole pattern.
pub const WILDCARD: &str = "*";

/// Find the first registered route matching `method` and `path`.
///
/// Routes are scanned in registration order; when no concrete route
/// matches, a route whose raw pattern is `*` serves as the fallback.
pub fn find_route<'a, E>(
    routes: &'a [Route<E>],
    method: &str,
    path: &str,
) -> Option<(&'a Route<E>, PathParams)> {
    let observed = split_segments(path);

    for route in routes {
        if !method_matches(&route.method, method) {
            continue;
        }
        if let Some(params) = match_pattern(&route.pattern, &observed) {
            return Some((route, params));
        }
    }

    routes
        .iter()
        .find(|r| r.pattern == WILDCARD && method_matches(&r.method, method))
        .map(|r| (r, PathParams::new()))
}

/// Flatten a raw query string into a single-valued mapping.
pub fn parse_query(raw: Option<&str>) -> QueryParams {
    raw.map_or_else(QueryParams::new, parse_pairs)
}

/// Parse `k=v&k2=v2` pairs with percent-decoding. Shared between the
/// query string and form bodies.
pub fn parse_pairs(raw: &str) -> HashMap<String, String> {
    let mut pairs = HashMap::new();
    for pair in raw.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        pairs.insert(decode(key), decode(value));
    }
    pairs
}

fn decode(component: &str) -> String {
    urlencoding::decode(component).map_or_else(|_| component.to_string(), |c| c.into_owned())
}

/// Empty segments are discarded, so leading/trailing/doubled slashes are
/// insignificant on both the pattern and the observed path. A capture can
/// therefore never bind an empty segment: the counts stop lining up first.
fn split_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

fn method_matches(route_method: &str, method: &str) -> bool {
    route_method == WILDCARD || route_method == method
}

fn match_pattern(pattern: &str, observed: &[&str]) -> Option<PathParams> {
    let segments = split_segments(pattern);
    if segments.len() != observed.len() {
        return None;
    }

    let mut params = PathParams::new();
    for (segment, value) in segments.iter().zip(observed) {
        if let Some(name) = segment.strip_prefix(':') {
            params.insert(name.to_string(), (*value).to_string());
        } else if segment != value {
            return None;
        }
    }
    Some(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::Router;

    fn noop_router(entries: &[(&str, &str)]) -> Router<()> {
        let mut router = Router::new();
        for (method, pattern) in entries {
            router = router.register_one(method, pattern, |_ctx| async {
                Ok(crate::router::Outcome::Next)
            });
        }
        router
    }

    #[test]
    fn test_literal_match() {
        let router = noop_router(&[("GET", "/users/list")]);
        assert!(find_route(router.routes(), "GET", "/users/list").is_some());
        assert!(find_route(router.routes(), "GET", "/users/other").is_none());
        assert!(find_route(router.routes(), "POST", "/users/list").is_none());
    }

    #[test]
    fn test_param_capture_is_literal_string() {
        let router = noop_router(&[("GET", "/users/:id")]);
        let (_, params) = find_route(router.routes(), "GET", "/users/42").unwrap();
        assert_eq!(params["id"], "42");

        let (_, params) = find_route(router.routes(), "GET", "/users/0042").unwrap();
        assert_eq!(params["id"], "0042"); // never type-coerced
    }

    #[test]
    fn test_registration_order_wins() {
        let router = noop_router(&[("GET", "/users/:id"), ("GET", "/users/me")]);
        let (route, params) = find_route(router.routes(), "GET", "/users/me").unwrap();
        assert_eq!(route.pattern, "/users/:id");
        assert_eq!(params["id"], "me");
    }

    #[test]
    fn test_slashes_are_insignificant() {
        let router = noop_router(&[("GET", "/gen/")]);
        assert!(find_route(router.routes(), "GET", "/gen").is_some());
        assert!(find_route(router.routes(), "GET", "/gen/").is_some());
        assert!(find_route(router.routes(), "GET", "//gen//").is_some());
    }

    #[test]
    fn test_segment_count_mismatch() {
        let router = noop_router(&[("GET", "/a/:b")]);
        assert!(find_route(router.routes(), "GET", "/a").is_none());
        assert!(find_route(router.routes(), "GET", "/a/b/c").is_none());
    }

    #[test]
    fn test_empty_segment_never_captured() {
        // `/files//` collapses to one segment, so the two-segment pattern
        // cannot match; an "optional" empty capture is unsatisfiable.
        let router = noop_router(&[("GET", "/files/:name")]);
        assert!(find_route(router.routes(), "GET", "/files//").is_none());
    }

    #[test]
    fn test_wildcard_method() {
        let router = noop_router(&[("*", "/anything/:x")]);
        assert!(find_route(router.routes(), "DELETE", "/anything/1").is_some());
        assert!(find_route(router.routes(), "PATCH", "/anything/2").is_some());
    }

    #[test]
    fn test_wildcard_fallback_after_concrete_routes() {
        let router = noop_router(&[("*", "*"), ("GET", "/exact")]);
        let (route, _) = find_route(router.routes(), "GET", "/exact").unwrap();
        assert_eq!(route.pattern, "/exact");

        let (route, params) = find_route(router.routes(), "POST", "/no/such/path").unwrap();
        assert_eq!(route.pattern, "*");
        assert!(params.is_empty());
    }

    #[test]
    fn test_wildcard_fallback_respects_method() {
        let router = noop_router(&[("GET", "*")]);
        assert!(find_route(router.routes(), "GET", "/missing").is_some());
        assert!(find_route(router.routes(), "POST", "/missing").is_none());
    }

    #[test]
    fn test_parse_query_last_value_wins() {
        let query = parse_query(Some("tab=posts&tab=likes&page=2"));
        assert_eq!(query["tab"], "likes");
        assert_eq!(query["page"], "2");
    }

    #[test]
    fn test_parse_query_decodes_and_defaults() {
        let query = parse_query(Some("name=J%C3%BCrgen&flag"));
        assert_eq!(query["name"], "Jürgen");
        assert_eq!(query["flag"], "");
        assert!(parse_query(None).is_empty());
    }
}
