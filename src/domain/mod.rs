//! Domain layer
//!
//! Pure domain entities for route resolution with no infrastructure
//! dependencies: routes and domains, applications and their route sets,
//! manifest settings, and the warnings that accompany every operation.
//!
//! ## Module Organization
//!
//! - `id`: Type-safe platform GUIDs with NewType pattern
//! - `route`: Routes, domains and their validation rules
//! - `application`: Applications and the configuration reconciled for them
//! - `manifest`: Route-related manifest settings
//! - `warnings`: Non-fatal diagnostics

pub mod application;
pub mod id;
pub mod manifest;
pub mod route;
pub mod warnings;

pub use application::{Application, ApplicationConfig};
pub use id::{AppGuid, DomainGuid, OrgGuid, RouteGuid, SpaceGuid};
pub use manifest::{Manifest, ManifestApplication, ManifestRoute};
pub use route::{Domain, DomainScope, Route, RoutingType};
pub use warnings::Warnings;
