//! # Error Handling
//!
//! Error types for route resolution and reconciliation, defined with `thiserror`.
//!
//! Validation variants are raised locally before any control-plane call.
//! `RouteNotFound` is the recoverable "lookup came back empty" signal; the
//! services treat it as "absent, proceed" and never surface it to callers.

/// Custom result type for routeplane operations
pub type Result<T> = std::result::Result<T, RouteError>;

/// Main error type for route resolution and reconciliation
#[derive(thiserror::Error, Debug)]
pub enum RouteError {
    /// A raw route string could not be parsed
    #[error("Malformed route '{route}': {reason}")]
    MalformedRoute { route: String, reason: String },

    /// No registered domain matches the name (or any suffix of it)
    #[error("Domain '{name}' not found")]
    DomainNotFound { name: String },

    /// No registered domain matches any suffix of a requested route
    #[error("The route {route} did not match any existing domains.")]
    NoMatchingDomain { route: String },

    /// Manifest requested a route path on a TCP domain
    #[error("The route path is not supported for TCP domains")]
    RoutePathWithTcpDomain,

    /// Manifest requested a hostname on a TCP domain
    #[error("The hostname is not supported for TCP domains")]
    HostnameWithTcpDomain,

    /// An HTTP route on a shared domain needs a hostname
    #[error("The route requires a hostname when using a shared domain")]
    NoHostnameAndSharedDomain,

    /// A port was given for an HTTP domain
    #[error("Port not allowed in HTTP domain {domain}")]
    InvalidHttpRouteSettings { domain: String },

    /// A host or path was given for a TCP domain
    #[error("Host and path not allowed in route with TCP domain {domain}")]
    InvalidTcpRouteSettings { domain: String },

    /// The route exists but belongs to a different space
    #[error("Route {route} has been registered to another space.")]
    RouteInDifferentSpace { route: String },

    /// Lookup by settings found no route
    #[error("Route with host '{host}', domain '{domain}', path '{path}' and port {port:?} not found")]
    RouteNotFound {
        host: String,
        domain: String,
        path: String,
        port: Option<u16>,
    },

    /// The organization has no usable domain to default to
    #[error("No domains found for organization {org}")]
    NoDomainsFound { org: String },

    /// The control plane rejected a request
    #[error("Platform error (status: {status}, code: {code}): {description}")]
    Platform {
        status: u16,
        code: String,
        description: String,
    },

    /// The control plane could not be reached
    #[error("Transport error: {context}")]
    Transport {
        #[source]
        source: reqwest::Error,
        context: String,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {context}")]
    Serialization {
        #[source]
        source: serde_json::Error,
        context: String,
    },

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RouteError {
    /// Create a malformed route error
    pub fn malformed_route<R: Into<String>, S: Into<String>>(route: R, reason: S) -> Self {
        Self::MalformedRoute { route: route.into(), reason: reason.into() }
    }

    /// Create a domain not found error
    pub fn domain_not_found<S: Into<String>>(name: S) -> Self {
        Self::DomainNotFound { name: name.into() }
    }

    /// Create a no matching domain error
    pub fn no_matching_domain<S: Into<String>>(route: S) -> Self {
        Self::NoMatchingDomain { route: route.into() }
    }

    /// Create a route in different space error
    pub fn route_in_different_space<S: Into<String>>(route: S) -> Self {
        Self::RouteInDifferentSpace { route: route.into() }
    }

    /// Create a platform error
    pub fn platform<C: Into<String>, D: Into<String>>(status: u16, code: C, description: D) -> Self {
        Self::Platform { status, code: code.into(), description: description.into() }
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Wrap a transport error with context
    pub fn transport<S: Into<String>>(source: reqwest::Error, context: S) -> Self {
        Self::Transport { source, context: context.into() }
    }

    /// Whether this is the recoverable "route lookup came back empty" signal
    pub fn is_not_found(&self) -> bool {
        matches!(self, RouteError::RouteNotFound { .. })
    }
}

impl From<reqwest::Error> for RouteError {
    fn from(error: reqwest::Error) -> Self {
        Self::Transport { source: error, context: "Control plane request failed".to_string() }
    }
}

impl From<serde_json::Error> for RouteError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization { source: error, context: "JSON serialization failed".to_string() }
    }
}
