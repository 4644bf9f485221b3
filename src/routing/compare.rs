//! Route identity comparisons
//!
//! Three notions of "the same route" are used during reconciliation:
//! - by name: a raw string (scheme stripped) equals a route's display form
//! - by GUID: used to decide whether a route is already bound
//! - by settings: host, path, port, space and domain GUID all agree

use super::parser::scheme_pattern;
use crate::domain::Route;

/// Strip a leading `http://`, `https://` or `tcp://` from a raw route string
pub fn strip_scheme(raw: &str) -> &str {
    match scheme_pattern().find(raw) {
        Some(m) => &raw[m.end()..],
        None => raw,
    }
}

/// Find the route whose display string equals `raw` without its scheme
pub fn find_by_name<'a>(raw: &str, routes: &'a [Route]) -> Option<&'a Route> {
    let stripped = strip_scheme(raw);
    routes.iter().find(|route| route.to_string() == stripped)
}

/// Whether a route with the same GUID is in `routes`
pub fn contains_guid(route: &Route, routes: &[Route]) -> bool {
    routes.iter().any(|r| r.guid == route.guid)
}

/// Whether two routes describe the same binding point
pub fn same_settings(a: &Route, b: &Route) -> bool {
    a.host == b.host
        && a.path == b.path
        && a.port == b.port
        && a.space_guid == b.space_guid
        && a.domain.guid == b.domain.guid
}

/// Find a route with the same settings as `route`
pub fn find_by_settings<'a>(route: &Route, routes: &'a [Route]) -> Option<&'a Route> {
    routes.iter().find(|r| same_settings(route, r))
}
