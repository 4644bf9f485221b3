//! Route domain types
//!
//! Pure domain entities for routes and the domains they live under. These
//! types carry their own validation and display logic and have no
//! infrastructure dependencies.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::id::{DomainGuid, RouteGuid, SpaceGuid};
use crate::errors::{Result, RouteError};

/// How traffic for a domain is routed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoutingType {
    /// Host/path based HTTP routing
    #[default]
    Http,
    /// Port based TCP routing
    Tcp,
}

/// Who may create routes under a domain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainScope {
    /// Owned by (private to) a single organization
    #[default]
    Owned,
    /// Shared globally across organizations
    Shared,
}

/// A registered domain known to the platform.
///
/// Domain names are globally unique on the platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
    /// Dotted DNS suffix, e.g. `apps.example.com`
    pub name: String,

    /// Platform GUID; empty until resolved
    #[serde(default)]
    pub guid: DomainGuid,

    #[serde(default)]
    pub routing_type: RoutingType,

    #[serde(default)]
    pub scope: DomainScope,

    /// Internal domains are never picked as an organization default
    #[serde(default)]
    pub internal: bool,
}

impl Domain {
    /// Create a domain with the given name and GUID, HTTP and org-owned
    pub fn new(name: impl Into<String>, guid: impl Into<DomainGuid>) -> Self {
        Self { name: name.into(), guid: guid.into(), ..Default::default() }
    }

    /// Mark the domain as TCP routed
    pub fn tcp(mut self) -> Self {
        self.routing_type = RoutingType::Tcp;
        self
    }

    /// Mark the domain as globally shared
    pub fn shared(mut self) -> Self {
        self.scope = DomainScope::Shared;
        self
    }

    pub fn is_http(&self) -> bool {
        self.routing_type == RoutingType::Http
    }

    pub fn is_tcp(&self) -> bool {
        self.routing_type == RoutingType::Tcp
    }

    pub fn is_shared(&self) -> bool {
        self.scope == DomainScope::Shared
    }
}

/// A binding target that may or may not exist on the platform yet.
///
/// A route with an empty `guid` is a "potential" route: it has been
/// calculated locally and still has to be created. Binding state is tracked
/// by the platform, not on this value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    /// Host label(s); empty for TCP routes and no-hostname routes
    #[serde(default)]
    pub host: String,

    pub domain: Domain,

    /// Request path; empty means "/"
    #[serde(default)]
    pub path: String,

    /// Only meaningful for TCP domains
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    #[serde(default)]
    pub space_guid: SpaceGuid,

    #[serde(default)]
    pub guid: RouteGuid,
}

impl Route {
    /// Whether this route still has to be created on the platform
    pub fn is_potential(&self) -> bool {
        self.guid.is_empty()
    }

    /// TCP routes without a port ask the platform to allocate one
    pub fn wants_random_port(&self) -> bool {
        self.domain.is_tcp() && self.port.is_none()
    }

    /// Check host/path/port compatibility with the domain's routing type.
    pub fn validate(&self) -> Result<()> {
        if self.domain.is_http() {
            if self.port.is_some() {
                return Err(RouteError::InvalidHttpRouteSettings {
                    domain: self.domain.name.clone(),
                });
            }
            if self.domain.is_shared() && self.host.is_empty() {
                return Err(RouteError::NoHostnameAndSharedDomain);
            }
        } else if !self.host.is_empty() || !self.path.is_empty() {
            return Err(RouteError::InvalidTcpRouteSettings { domain: self.domain.name.clone() });
        }

        Ok(())
    }
}

/// Renders `[host.]domain[:port][/path]` with the path cleaned; a TCP route
/// without an allocated port renders its port as `????`.
impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.host.is_empty() {
            write!(f, "{}.", self.host)?;
        }
        write!(f, "{}", self.domain.name)?;

        match self.port {
            Some(port) => write!(f, ":{}", port)?,
            None if self.domain.is_tcp() => write!(f, ":????")?,
            None => {}
        }

        write!(f, "{}", clean_path(&self.path))
    }
}

/// Lexically clean a route path: repeated and trailing slashes and `.`
/// segments drop out, `..` removes the segment before it.
fn clean_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            segment => segments.push(segment),
        }
    }
    segments.iter().map(|segment| format!("/{}", segment)).collect()
}
