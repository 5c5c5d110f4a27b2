//! Route table and path template matching.

use std::collections::HashMap;

use thiserror::Error;

/// Operations exposed by the reservation API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    SignUp,
    SignIn,
    ListTables,
    CreateTable,
    GetTable,
    ListReservations,
    CreateReservation,
}

/// Registered `(template, method, route)` triples.
const ROUTES: &[(&str, &str, Route)] = &[
    ("/signup", "POST", Route::SignUp),
    ("/signin", "POST", Route::SignIn),
    ("/tables", "GET", Route::ListTables),
    ("/tables", "POST", Route::CreateTable),
    ("/tables/{tableId}", "GET", Route::GetTable),
    ("/reservations", "GET", Route::ListReservations),
    ("/reservations", "POST", Route::CreateReservation),
];

/// A resolved route with the parameters captured from the path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    pub route: Route,
    pub params: HashMap<String, String>,
}

impl RouteMatch {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("Invalid request. Resource or HTTP method is missing.")]
    Malformed,

    #[error("Unsupported path or method: {path} {method}")]
    NotFound { path: String, method: String },

    #[error("Unsupported path or method: {path} {method}")]
    MethodNotAllowed { path: String, method: String },
}

/// Resolve a method and path to exactly one registered route.
pub fn resolve(method: &str, path: &str) -> Result<RouteMatch, RouteError> {
    if method.trim().is_empty() || path.trim().is_empty() {
        return Err(RouteError::Malformed);
    }

    let mut path_matched = false;
    for (template, route_method, route) in ROUTES {
        let Some(params) = match_template(template, path) else {
            continue;
        };
        path_matched = true;
        if route_method.eq_ignore_ascii_case(method) {
            return Ok(RouteMatch {
                route: *route,
                params,
            });
        }
    }

    let path = path.to_string();
    let method = method.to_string();
    if path_matched {
        Err(RouteError::MethodNotAllowed { path, method })
    } else {
        Err(RouteError::NotFound { path, method })
    }
}

/// Match a `{param}` template against a concrete path, ignoring one trailing slash.
fn match_template(template: &str, path: &str) -> Option<HashMap<String, String>> {
    let path = match path.strip_suffix('/') {
        Some(trimmed) if !trimmed.is_empty() => trimmed,
        _ => path,
    };

    let mut template_segments = template.split('/');
    let mut path_segments = path.split('/');
    let mut params = HashMap::new();

    loop {
        match (template_segments.next(), path_segments.next()) {
            (None, None) => return Some(params),
            (Some(expected), Some(actual)) => {
                if let Some(name) = expected.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                    if actual.is_empty() {
                        return None;
                    }
                    params.insert(name.to_string(), actual.to_string());
                } else if expected != actual {
                    return None;
                }
            }
            _ => return None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolves_every_registered_route() {
        for (template, method, route) in ROUTES {
            let path = template.replace("{tableId}", "7");
            assert_eq!(resolve(method, &path).unwrap().route, *route);
        }
    }

    #[test]
    fn test_captures_table_id() {
        let matched = resolve("GET", "/tables/42").unwrap();
        assert_eq!(matched.route, Route::GetTable);
        assert_eq!(matched.param("tableId"), Some("42"));
    }

    #[test]
    fn test_trailing_slash_is_ignored() {
        assert_eq!(resolve("GET", "/tables/").unwrap().route, Route::ListTables);
    }

    #[test]
    fn test_unknown_path() {
        let err = resolve("GET", "/menu").unwrap_err();
        assert_eq!(
            err,
            RouteError::NotFound {
                path: "/menu".into(),
                method: "GET".into()
            }
        );
        assert_eq!(err.to_string(), "Unsupported path or method: /menu GET");
    }

    #[test]
    fn test_wrong_method_on_known_path() {
        let err = resolve("DELETE", "/tables/3").unwrap_err();
        assert!(matches!(err, RouteError::MethodNotAllowed { .. }));
        assert_eq!(err.to_string(), "Unsupported path or method: /tables/3 DELETE");
    }

    #[test]
    fn test_nested_paths_do_not_match() {
        assert!(resolve("GET", "/tables/3/extra").is_err());
        assert!(resolve("GET", "/tables//").is_err());
    }

    #[test]
    fn test_missing_method_or_path() {
        assert_eq!(resolve("", "/tables"), Err(RouteError::Malformed));
        assert_eq!(resolve("GET", ""), Err(RouteError::Malformed));
    }
}
