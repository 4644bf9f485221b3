//! Route calculation service
//!
//! Turns raw route strings into fully resolved [`Route`] values. Existing
//! routes are always carried into the result. Strings naming none of them
//! are parsed, matched against the platform's registered domains (looked up
//! in a single batch), validated, and checked for an existing platform route.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

use crate::client::ControlPlane;
use crate::domain::{Domain, OrgGuid, Route, RouteGuid, SpaceGuid, Warnings};
use crate::errors::{Result, RouteError};
use crate::routing::{candidate_suffixes, find_by_name, parse_route, resolve_domain, ParsedRoute};

/// Service resolving raw route strings against the platform
#[derive(Debug, Clone)]
pub struct RouteCalculator {
    control_plane: Arc<dyn ControlPlane>,
}

impl RouteCalculator {
    /// Create a new route calculator
    pub fn new(control_plane: Arc<dyn ControlPlane>) -> Self {
        Self { control_plane }
    }

    /// Resolve `raw_routes` into routes in `space`.
    ///
    /// Returns every route in `existing_routes`, in order, followed by the
    /// newly resolved ones. Resolved routes that do not exist on the platform yet
    /// come back with an empty GUID.
    #[instrument(skip(self, raw_routes, existing_routes, warnings), fields(routes = raw_routes.len()))]
    pub async fn calculate_routes(
        &self,
        raw_routes: &[String],
        org: &OrgGuid,
        space: &SpaceGuid,
        existing_routes: &[Route],
        warnings: &mut Warnings,
    ) -> Result<Vec<Route>> {
        info!("calculating routes");

        let (mut calculated, unknown) = split_existing_routes(raw_routes, existing_routes);
        if unknown.is_empty() {
            return Ok(calculated);
        }

        let parsed = unknown
            .iter()
            .map(|raw| parse_route(raw).map(|route| (raw.as_str(), route)))
            .collect::<Result<Vec<(&str, ParsedRoute)>>>()
            .map_err(|err| {
                error!(error = %err, "parse route");
                err
            })?;

        let known_domains = self.lookup_domains(&parsed, org, warnings).await?;

        for (raw, route) in parsed {
            debug!(route = raw, "generating route");

            let (host_labels, domain) =
                resolve_domain(&route.host, &known_domains).map_err(|err| match err {
                    RouteError::DomainNotFound { .. } => {
                        error!(route = raw, "no matching domains");
                        RouteError::no_matching_domain(raw)
                    }
                    other => other,
                })?;

            let potential = Route {
                host: host_labels.join("."),
                domain,
                path: route.path,
                port: route.port,
                space_guid: space.clone(),
                guid: RouteGuid::empty(),
            };
            potential.validate()?;

            let resolved = self.find_or_potential(potential, warnings).await.map_err(|err| {
                error!(error = %err, "route lookup");
                err
            })?;
            calculated.push(resolved);
        }

        Ok(calculated)
    }

    /// Look up every candidate domain suffix of the parsed hosts in one call
    async fn lookup_domains(
        &self,
        parsed: &[(&str, ParsedRoute)],
        org: &OrgGuid,
        warnings: &mut Warnings,
    ) -> Result<HashMap<String, Domain>> {
        let candidates: BTreeSet<String> =
            parsed.iter().flat_map(|(_, route)| candidate_suffixes(&route.host)).collect();
        debug!(candidates = ?candidates, "domain breakdown");

        if candidates.is_empty() {
            return Ok(HashMap::new());
        }

        let found = self.control_plane.lookup_domains(&candidates, org, warnings).await.map_err(
            |err| {
                error!(error = %err, "domain lookup");
                err
            },
        )?;

        Ok(found
            .into_iter()
            .map(|domain| {
                debug!(domain = %domain.name, "found domain");
                (domain.name.clone(), domain)
            })
            .collect())
    }

    /// The platform's copy of `route` if one exists, otherwise `route` itself
    async fn find_or_potential(&self, mut route: Route, warnings: &mut Warnings) -> Result<Route> {
        match self.control_plane.find_route(&route, warnings).await {
            Ok(existing) => {
                route.guid = existing.guid;
                Ok(route)
            }
            Err(err) if err.is_not_found() => Ok(route),
            Err(err) => Err(err),
        }
    }
}

/// Every existing route, plus the raw strings that name none of them
fn split_existing_routes<'a>(
    raw_routes: &'a [String],
    existing_routes: &[Route],
) -> (Vec<Route>, Vec<&'a String>) {
    let unknown = raw_routes
        .iter()
        .filter(|raw| {
            let known = find_by_name(raw, existing_routes).is_some();
            if !known {
                debug!(route = %raw, "unable to find route in cache");
            }
            !known
        })
        .collect();

    (existing_routes.to_vec(), unknown)
}
