//! Platform Identifier Types with NewType Pattern
//!
//! Type-safe wrappers for the opaque GUIDs handed out by the control plane.
//! Unlike locally generated IDs these may be empty: an empty GUID means the
//! resource has not been created (or resolved) on the platform yet.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to generate NewType GUID wrappers with all required traits
macro_rules! platform_guid {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a GUID returned by the platform
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            /// The empty GUID of a resource that does not exist yet
            pub fn empty() -> Self {
                Self(String::new())
            }

            /// Whether this GUID is unset
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            /// Get the inner string value
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

platform_guid!(
    /// GUID of a route
    RouteGuid
);

platform_guid!(
    /// GUID of a registered domain
    DomainGuid
);

platform_guid!(
    /// GUID of an application
    AppGuid
);

platform_guid!(
    /// GUID of the space that owns routes
    SpaceGuid
);

platform_guid!(
    /// GUID of an organization
    OrgGuid
);
