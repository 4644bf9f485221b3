//! # Control Plane Client
//!
//! The route services never talk to the network themselves. Everything they
//! need from the platform goes through the [`ControlPlane`] trait, which the
//! HTTP client in [`http`] implements against a Cloud Controller v2 style API.
//!
//! Every method appends the platform's warnings to the caller's [`Warnings`],
//! whether the call succeeds or not.

pub mod http;

#[cfg(test)]
pub(crate) mod fake;

use async_trait::async_trait;
use std::collections::BTreeSet;

use crate::domain::{AppGuid, Domain, OrgGuid, Route, RouteGuid, Warnings};
use crate::errors::Result;

pub use http::CloudControllerClient;

/// Operations the route services consume from the platform.
///
/// Implementations must be Send + Sync for use in async contexts. Retries,
/// timeouts and cancellation are the implementation's concern.
#[async_trait]
pub trait ControlPlane: Send + Sync + std::fmt::Debug {
    /// Which of `names` are domains visible to the organization
    async fn lookup_domains(
        &self,
        names: &BTreeSet<String>,
        org: &OrgGuid,
        warnings: &mut Warnings,
    ) -> Result<Vec<Domain>>;

    /// Create `route`, asking for a generated port when `random_port` is set
    async fn create_route(
        &self,
        route: &Route,
        random_port: bool,
        warnings: &mut Warnings,
    ) -> Result<Route>;

    /// The platform route with the same host, domain, path and port in the
    /// route's space. Fails with `RouteNotFound` when there is none.
    async fn find_route(&self, route: &Route, warnings: &mut Warnings) -> Result<Route>;

    /// Bind a route to an application
    async fn map_route(
        &self,
        route: &RouteGuid,
        app: &AppGuid,
        warnings: &mut Warnings,
    ) -> Result<()>;

    /// Unbind a route from an application
    async fn unmap_route(
        &self,
        route: &RouteGuid,
        app: &AppGuid,
        warnings: &mut Warnings,
    ) -> Result<()>;

    /// Routes currently bound to an application
    async fn application_routes(&self, app: &AppGuid, warnings: &mut Warnings)
        -> Result<Vec<Route>>;

    /// The domain routes default to for an organization
    async fn default_domain(&self, org: &OrgGuid, warnings: &mut Warnings) -> Result<Domain>;
}
