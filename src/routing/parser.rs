//! Raw route string parsing
//!
//! Turns user-supplied route strings such as `www.example.com/api` or
//! `tcp.example.com:1024` into their host, port and path components.
//! Strings without a scheme are treated as `http://` URLs.

use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;
use url::Url;

use crate::errors::{Result, RouteError};

const DEFAULT_SCHEME: &str = "http://";

/// Host, port and path of a raw route string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRoute {
    /// Full hostname; which part of it is the domain is not known yet
    pub host: String,
    /// Port exactly as written, if any
    pub port: Option<u16>,
    /// Request path (with query); empty for `/`
    pub path: String,
}

/// Leading scheme accepted on raw route strings
pub(crate) fn scheme_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?:https?|tcp)://").expect("Route scheme regex compilation failed")
    })
}

/// Parse a raw route string.
pub fn parse_route(raw: &str) -> Result<ParsedRoute> {
    let uri: Cow<'_, str> = if scheme_pattern().is_match(raw) {
        Cow::Borrowed(raw)
    } else {
        Cow::Owned(format!("{}{}", DEFAULT_SCHEME, raw))
    };

    let url = Url::parse(&uri).map_err(|e| RouteError::malformed_route(raw, e.to_string()))?;

    let host = url.host_str().unwrap_or_default().to_string();
    if host.is_empty() {
        return Err(RouteError::malformed_route(raw, "missing host"));
    }

    // `Url::port` hides ports equal to the scheme default, so read it as written
    let port = match explicit_port(&uri) {
        Some(text) => Some(
            text.parse::<u16>()
                .map_err(|e| RouteError::malformed_route(raw, format!("invalid port: {}", e)))?,
        ),
        None => None,
    };

    let mut path = url.path().to_string();
    if let Some(query) = url.query() {
        path.push('?');
        path.push_str(query);
    }
    if path == "/" {
        path.clear();
    }

    Ok(ParsedRoute { host, port, path })
}

/// The port text of a URI's authority, if one was written.
fn explicit_port(uri: &str) -> Option<&str> {
    let rest = uri.split_once("://").map_or(uri, |(_, rest)| rest);
    let authority_end = rest.find(['/', '\\', '?', '#']).unwrap_or(rest.len());
    let authority = &rest[..authority_end];
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, host_port)| host_port);

    let colon = if host_port.starts_with('[') {
        host_port.find("]:").map(|i| i + 1)
    } else {
        host_port.rfind(':')
    };

    colon.map(|i| &host_port[i + 1..]).filter(|port| !port.is_empty())
}
