//! Route reconciliation service
//!
//! Brings the platform in line with an application's desired routes:
//! creating routes that do not exist yet, binding and unbinding routes,
//! and synthesizing the default route for a manifest application.
//!
//! Calls are made one at a time and the first failure aborts. Side effects
//! already applied on the platform are not rolled back.

use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

use crate::client::ControlPlane;
use crate::domain::{
    Application, ApplicationConfig, Domain, ManifestApplication, OrgGuid, Route, RouteGuid,
    SpaceGuid, Warnings,
};
use crate::errors::{Result, RouteError};
use crate::routing::{contains_guid, find_by_settings, sanitize_hostname};

/// Service reconciling application routes with the platform
#[derive(Debug, Clone)]
pub struct RouteReconciler {
    control_plane: Arc<dyn ControlPlane>,
}

impl RouteReconciler {
    /// Create a new route reconciler
    pub fn new(control_plane: Arc<dyn ControlPlane>) -> Self {
        Self { control_plane }
    }

    /// Bind every desired route that is not already current.
    ///
    /// On success `current_routes` becomes `desired_routes` and the flag
    /// reports whether any binding was made. On failure the configuration
    /// is dropped.
    #[instrument(skip(self, config, warnings), fields(app = %config.application.guid))]
    pub async fn map_routes(
        &self,
        mut config: ApplicationConfig,
        warnings: &mut Warnings,
    ) -> Result<(ApplicationConfig, bool)> {
        info!("mapping routes");

        let app = &config.application.guid;
        let mut bound_routes = false;

        for route in &config.desired_routes {
            if contains_guid(route, &config.current_routes) {
                debug!(route = %route, "route already bound to app");
                continue;
            }

            debug!(route = %route, guid = %route.guid, "mapping route");
            self.control_plane.map_route(&route.guid, app, warnings).await.map_err(|err| {
                error!(error = %err, "mapping route");
                match err {
                    RouteError::RouteInDifferentSpace { .. } => {
                        RouteError::route_in_different_space(route.to_string())
                    }
                    other => other,
                }
            })?;
            bound_routes = true;
        }

        debug!("mapping routes complete");
        config.current_routes = config.desired_routes.clone();

        Ok((config, bound_routes))
    }

    /// Unbind every current route, clearing `current_routes` on success.
    ///
    /// A failure leaves `config` exactly as it was passed in.
    #[instrument(skip(self, config, warnings), fields(app = %config.application.guid))]
    pub async fn unmap_routes(
        &self,
        config: &mut ApplicationConfig,
        warnings: &mut Warnings,
    ) -> Result<()> {
        let app = &config.application.guid;

        for route in &config.current_routes {
            debug!(route = %route, "unmapping route");
            self.control_plane.unmap_route(&route.guid, app, warnings).await.map_err(|err| {
                error!(error = %err, "unmapping route");
                err
            })?;
        }

        config.current_routes.clear();
        Ok(())
    }

    /// Create every desired route that has no GUID yet.
    ///
    /// The flag reports whether any route was created. An `Err` means some
    /// routes may already have been created before the failure.
    #[instrument(skip(self, config, warnings), fields(app = %config.application.guid))]
    pub async fn create_routes(
        &self,
        mut config: ApplicationConfig,
        warnings: &mut Warnings,
    ) -> Result<(ApplicationConfig, bool)> {
        info!("creating routes");

        let mut routes = Vec::with_capacity(config.desired_routes.len());
        let mut created_routes = false;

        for route in std::mem::take(&mut config.desired_routes) {
            if !route.is_potential() {
                debug!(route = %route, "already exists, skipping");
                routes.push(route);
                continue;
            }

            debug!(route = %route, "creating route");
            let created = self
                .control_plane
                .create_route(&route, route.wants_random_port(), warnings)
                .await
                .map_err(|err| {
                    error!(error = %err, "creating route");
                    err
                })?;
            routes.push(created);
            created_routes = true;
        }

        config.desired_routes = routes;
        Ok((config, created_routes))
    }

    /// The route a manifest application gets when it lists no routes.
    ///
    /// Returns an existing route (from `known_routes` or the platform) when
    /// one matches, otherwise a GUID-empty route to be created. TCP domains
    /// always yield a fresh route so the platform allocates a port.
    #[instrument(skip(self, manifest_app, known_routes, warnings), fields(app = %manifest_app.name))]
    pub async fn default_route(
        &self,
        manifest_app: &ManifestApplication,
        org: &OrgGuid,
        space: &SpaceGuid,
        known_routes: &[Route],
        warnings: &mut Warnings,
    ) -> Result<Route> {
        let domain = self.calculate_domain(manifest_app, org, warnings).await?;
        let host = calculate_hostname(manifest_app, &domain)?;
        let path = calculate_path(manifest_app, &domain)?;

        let route = Route {
            host,
            domain,
            path,
            port: None,
            space_guid: space.clone(),
            guid: RouteGuid::empty(),
        };

        if route.domain.is_tcp() {
            return Ok(route);
        }

        if let Some(cached) = find_by_settings(&route, known_routes) {
            debug!(route = %cached, "default route already known");
            return Ok(cached.clone());
        }

        match self.control_plane.find_route(&route, warnings).await {
            Ok(found) => Ok(found),
            Err(err) if err.is_not_found() => Ok(route),
            Err(err) => Err(err),
        }
    }

    /// Ensure the app is bound to `<app name>.<default domain>`, creating the
    /// route if necessary.
    #[instrument(skip(self, app, warnings), fields(app = %app.guid))]
    pub async fn create_and_map_default_application_route(
        &self,
        org: &OrgGuid,
        space: &SpaceGuid,
        app: &Application,
        warnings: &mut Warnings,
    ) -> Result<()> {
        let domain = self.control_plane.default_domain(org, warnings).await?;
        let default_route = Route {
            host: app.name.clone(),
            domain,
            space_guid: space.clone(),
            ..Default::default()
        };

        let bound_routes = self.control_plane.application_routes(&app.guid, warnings).await?;
        if find_by_settings(&default_route, &bound_routes).is_some() {
            debug!(route = %default_route, "default route already bound");
            return Ok(());
        }

        let space_route = match self.control_plane.find_route(&default_route, warnings).await {
            Ok(found) => found,
            Err(err) if err.is_not_found() => {
                info!(route = %default_route, "creating default route");
                self.control_plane.create_route(&default_route, false, warnings).await?
            }
            Err(err) => return Err(err),
        };

        self.control_plane.map_route(&space_route.guid, &app.guid, warnings).await
    }

    async fn calculate_domain(
        &self,
        manifest_app: &ManifestApplication,
        org: &OrgGuid,
        warnings: &mut Warnings,
    ) -> Result<Domain> {
        let Some(name) = manifest_app.explicit_domain() else {
            return self.control_plane.default_domain(org, warnings).await.map_err(|err| {
                error!(error = %err, "could not find default domains");
                err
            });
        };

        let names = BTreeSet::from([name.to_string()]);
        let found = self.control_plane.lookup_domains(&names, org, warnings).await.map_err(|err| {
            error!(domain = name, error = %err, "could not find provided domain");
            err
        })?;

        // Domain names are unique across shared and private domains
        found.into_iter().next().ok_or_else(|| {
            error!(domain = name, "could not find provided domain");
            RouteError::domain_not_found(name)
        })
    }
}

fn calculate_hostname(manifest_app: &ManifestApplication, domain: &Domain) -> Result<String> {
    let explicit = manifest_app.explicit_hostname();

    if explicit.is_some() && domain.is_tcp() {
        return Err(RouteError::HostnameWithTcpDomain);
    }
    if manifest_app.no_hostname && domain.is_shared() && domain.is_http() {
        return Err(RouteError::NoHostnameAndSharedDomain);
    }
    if manifest_app.no_hostname || !domain.is_http() {
        return Ok(String::new());
    }

    Ok(sanitize_hostname(explicit.unwrap_or(&manifest_app.name)))
}

fn calculate_path(manifest_app: &ManifestApplication, domain: &Domain) -> Result<String> {
    match manifest_app.explicit_route_path() {
        Some(_) if domain.is_tcp() => Err(RouteError::RoutePathWithTcpDomain),
        Some(path) => Ok(path.to_string()),
        None => Ok(String::new()),
    }
}
