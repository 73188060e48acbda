//! Route matching module
//!
//! Matches a request method and path against a fixed route table of
//! `(method, pattern)` pairs. Patterns are literal segments plus integer
//! captures, e.g. `/api/users/{id}`.

use hyper::Method;

/// One segment of a path pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    /// Must equal the path segment exactly
    Literal(&'static str),
    /// Captures a run of ASCII digits under the given name
    Int(&'static str),
}

/// A route: method, path pattern and the handler it dispatches to
#[derive(Debug)]
pub struct Route<H> {
    pub method: Method,
    pub pattern: &'static [Segment],
    pub handler: H,
}

/// Integer captures extracted from a matched path
///
/// Captures keep the digit text as sent, so ids wider than any machine
/// integer still match the route.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PathParams {
    values: Vec<(&'static str, String)>,
}

impl PathParams {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Outcome of matching a request against the route table
#[derive(Debug)]
pub enum RouteMatch<'a, H> {
    Found {
        route: &'a Route<H>,
        params: PathParams,
    },
    /// Path is known but not for this method; lists the methods it accepts
    MethodNotAllowed { allowed: Vec<Method> },
    NotFound,
}

/// Find the route for a method and path
///
/// The first route whose pattern and method both match wins. If the path
/// matches some pattern but no method does, the accepted methods are returned.
pub fn match_route<'a, H>(method: &Method, path: &str, routes: &'a [Route<H>]) -> RouteMatch<'a, H> {
    let found = routes
        .iter()
        .filter(|route| route.method == *method)
        .find_map(|route| match_path(route.pattern, path).map(|params| (route, params)));

    if let Some((route, params)) = found {
        return RouteMatch::Found { route, params };
    }

    let allowed = allowed_methods(path, routes);
    if allowed.is_empty() {
        RouteMatch::NotFound
    } else {
        RouteMatch::MethodNotAllowed { allowed }
    }
}

/// Methods accepted on a path, empty when the path is unknown
pub fn allowed_methods<H>(path: &str, routes: &[Route<H>]) -> Vec<Method> {
    let mut allowed: Vec<Method> = Vec::new();
    for route in routes {
        if match_path(route.pattern, path).is_some() && !allowed.contains(&route.method) {
            allowed.push(route.method.clone());
        }
    }
    allowed
}

/// Match a path against a pattern, returning captures on success
pub fn match_path(pattern: &[Segment], path: &str) -> Option<PathParams> {
    let rest = path.strip_prefix('/')?;
    let parts: Vec<&str> = if rest.is_empty() {
        Vec::new()
    } else {
        rest.split('/').collect()
    };

    if parts.len() != pattern.len() {
        return None;
    }

    let mut params = PathParams::default();
    for (segment, part) in pattern.iter().zip(parts) {
        match segment {
            Segment::Literal(lit) if *lit == part => {}
            Segment::Literal(_) => return None,
            Segment::Int(name) if is_digits(part) => params.values.push((*name, part.to_string())),
            Segment::Int(_) => return None,
        }
    }
    Some(params)
}

/// Digits only: no sign, no whitespace, no empty segment
fn is_digits(part: &str) -> bool {
    !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit())
}
