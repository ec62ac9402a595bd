use axum::http::Method;
use std::collections::HashMap;

use crate::handlers::{self, Handler};
use crate::types::Operation;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// Route shape such as `/items/{id}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn parse(raw: &str) -> Self {
        let segments = split_path(raw)
            .map(|segment| match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Some(name) => Segment::Param(name.to_string()),
                None => Segment::Literal(segment.to_string()),
            })
            .collect();

        Self {
            raw: raw.to_string(),
            segments,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Captured parameters when `path` has this shape, percent-decoded.
    /// Empty segments and segments that do not decode to UTF-8 never satisfy
    /// a parameter.
    pub fn matches(&self, path: &str) -> Option<HashMap<String, String>> {
        let parts: Vec<&str> = split_path(path).collect();
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = HashMap::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(literal) if literal == part => {}
                Segment::Param(name) if !part.is_empty() => {
                    let value = urlencoding::decode(part).ok()?;
                    params.insert(name.clone(), value.into_owned());
                }
                _ => return None,
            }
        }
        Some(params)
    }
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.strip_prefix('/').unwrap_or(path).split('/')
}

struct Route {
    method: Method,
    pattern: PathPattern,
    operation: Operation,
    handler: Handler,
}

/// Result of a successful lookup
pub struct RouteMatch<'r> {
    pub operation: Operation,
    pub handler: Handler,
    pub resource: &'r str,
    pub params: HashMap<String, String>,
}

/// Exact method plus path-shape routing table
#[derive(Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// The item API: collection and single-item routes
    pub fn items() -> Self {
        Self::new()
            .route(Method::GET, "/items", Operation::List, handlers::list_items)
            .route(Method::POST, "/items", Operation::Create, handlers::create_item)
            .route(Method::GET, "/items/{id}", Operation::Get, handlers::get_item)
            .route(Method::PUT, "/items/{id}", Operation::Update, handlers::update_item)
            .route(Method::DELETE, "/items/{id}", Operation::Delete, handlers::delete_item)
    }

    pub fn route(mut self, method: Method, pattern: &str, operation: Operation, handler: Handler) -> Self {
        self.routes.push(Route {
            method,
            pattern: PathPattern::parse(pattern),
            operation,
            handler,
        });
        self
    }

    /// First route whose method and shape both match
    pub fn resolve(&self, method: &str, path: &str) -> Option<RouteMatch<'_>> {
        self.routes
            .iter()
            .filter(|route| route.method.as_str().eq_ignore_ascii_case(method))
            .find_map(|route| {
                route.pattern.matches(path).map(|params| RouteMatch {
                    operation: route.operation,
                    handler: route.handler,
                    resource: route.pattern.as_str(),
                    params,
                })
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_captures_parameters() {
        let pattern = PathPattern::parse("/items/{id}");
        let params = pattern.matches("/items/abc-123").unwrap();
        assert_eq!(params["id"], "abc-123");

        assert!(pattern.matches("/items").is_none());
        assert!(pattern.matches("/items/").is_none());
        assert!(pattern.matches("/items/a/b").is_none());
        assert!(pattern.matches("/things/a").is_none());
    }

    #[test]
    fn captured_parameters_are_percent_decoded() {
        let pattern = PathPattern::parse("/items/{id}");
        assert_eq!(pattern.matches("/items/a%2Fb").unwrap()["id"], "a/b");
        assert_eq!(pattern.matches("/items/caf%C3%A9").unwrap()["id"], "café");
        assert!(pattern.matches("/items/%FF").is_none());
    }

    #[test]
    fn literal_pattern_matches_exactly() {
        let pattern = PathPattern::parse("/items");
        assert_eq!(pattern.matches("/items"), Some(HashMap::new()));
        assert!(pattern.matches("/items/").is_none());
        assert!(pattern.matches("/Items").is_none());
    }

    #[test]
    fn resolves_each_item_route() {
        let router = Router::items();
        let cases = [
            ("GET", "/items", Operation::List),
            ("POST", "/items", Operation::Create),
            ("GET", "/items/a", Operation::Get),
            ("PUT", "/items/a", Operation::Update),
            ("DELETE", "/items/a", Operation::Delete),
        ];
        for (method, path, operation) in cases {
            let matched = router.resolve(method, path).unwrap();
            assert_eq!(matched.operation, operation, "{} {}", method, path);
        }
    }

    #[test]
    fn single_item_match_reports_resource_and_id() {
        let router = Router::items();
        let matched = router.resolve("delete", "/items/xyz").unwrap();
        assert_eq!(matched.resource, "/items/{id}");
        assert_eq!(matched.params["id"], "xyz");
    }

    #[test]
    fn unmatched_combinations_resolve_to_none() {
        let router = Router::items();
        assert!(router.resolve("DELETE", "/items").is_none());
        assert!(router.resolve("PUT", "/items").is_none());
        assert!(router.resolve("POST", "/items/a").is_none());
        assert!(router.resolve("PATCH", "/items/a").is_none());
        assert!(router.resolve("GET", "/").is_none());
        assert!(router.resolve("GET", "/users").is_none());
    }
}
