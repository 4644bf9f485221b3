//! In-memory control plane for service tests.
//!
//! Records every call, emits one warning per call (`"<operation>: <target>"`)
//! and can be told to fail specific operations.

use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Mutex;

use super::ControlPlane;
use crate::domain::{AppGuid, Domain, OrgGuid, Route, RouteGuid, Warnings};
use crate::errors::{Result, RouteError};
use crate::routing::same_settings;

/// A recorded control-plane call
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    LookupDomains(Vec<String>),
    CreateRoute { route: String, random_port: bool },
    FindRoute(String),
    MapRoute(RouteGuid, AppGuid),
    UnmapRoute(RouteGuid, AppGuid),
    ApplicationRoutes(AppGuid),
    DefaultDomain(OrgGuid),
}

/// Operations that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Op {
    LookupDomains,
    CreateRoute,
    FindRoute,
    MapRoute,
    UnmapRoute,
    ApplicationRoutes,
    DefaultDomain,
}

/// The error an injected failure produces
#[derive(Debug, Clone, Copy)]
pub(crate) enum FailWith {
    Platform,
    DifferentSpace,
}

#[derive(Debug)]
struct Failure {
    op: Op,
    target: String,
    with: FailWith,
}

#[derive(Debug, Default)]
struct FakeState {
    domains: Vec<Domain>,
    default_domain: Option<Domain>,
    routes: Vec<Route>,
    bindings: Vec<(RouteGuid, AppGuid)>,
    calls: Vec<Call>,
    failures: Vec<Failure>,
    next_guid: u32,
    next_port: u16,
}

#[derive(Debug, Default)]
pub(crate) struct FakeControlPlane {
    state: Mutex<FakeState>,
}

impl FakeControlPlane {
    pub(crate) fn new() -> Self {
        let fake = Self::default();
        fake.state.lock().unwrap().next_port = 1024;
        fake
    }

    pub(crate) fn with_domain(self, domain: Domain) -> Self {
        self.state.lock().unwrap().domains.push(domain);
        self
    }

    pub(crate) fn with_default_domain(self, domain: Domain) -> Self {
        self.state.lock().unwrap().default_domain = Some(domain);
        self
    }

    /// Register a route that already exists on the platform
    pub(crate) fn with_route(self, route: Route) -> Self {
        self.state.lock().unwrap().routes.push(route);
        self
    }

    pub(crate) fn with_binding(self, route: RouteGuid, app: AppGuid) -> Self {
        self.state.lock().unwrap().bindings.push((route, app));
        self
    }

    /// Fail `op` when its target (route GUID, route string, app GUID or org
    /// GUID) equals `target`; an empty target fails every call
    pub(crate) fn failing(self, op: Op, target: impl Into<String>, with: FailWith) -> Self {
        self.state.lock().unwrap().failures.push(Failure { op, target: target.into(), with });
        self
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub(crate) fn bindings(&self) -> Vec<(RouteGuid, AppGuid)> {
        self.state.lock().unwrap().bindings.clone()
    }

    pub(crate) fn count(&self, op: Op) -> usize {
        self.calls().iter().filter(|call| call_op(call) == op).count()
    }
}

fn call_op(call: &Call) -> Op {
    match call {
        Call::LookupDomains(_) => Op::LookupDomains,
        Call::CreateRoute { .. } => Op::CreateRoute,
        Call::FindRoute(_) => Op::FindRoute,
        Call::MapRoute(..) => Op::MapRoute,
        Call::UnmapRoute(..) => Op::UnmapRoute,
        Call::ApplicationRoutes(_) => Op::ApplicationRoutes,
        Call::DefaultDomain(_) => Op::DefaultDomain,
    }
}

impl FakeState {
    /// Record the call, emit its warning and apply any injected failure
    fn enter(&mut self, call: Call, target: &str, warnings: &mut Warnings) -> Result<()> {
        let op = call_op(&call);
        self.calls.push(call);
        warnings.push(format!("{:?}: {}", op, target));

        let failure = self
            .failures
            .iter()
            .find(|f| f.op == op && (f.target.is_empty() || f.target == target));
        match failure.map(|f| f.with) {
            Some(FailWith::Platform) => {
                Err(RouteError::platform(500, "CF-Fake", format!("{:?} failed for {}", op, target)))
            }
            Some(FailWith::DifferentSpace) => Err(RouteError::route_in_different_space(target)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ControlPlane for FakeControlPlane {
    async fn lookup_domains(
        &self,
        names: &BTreeSet<String>,
        org: &OrgGuid,
        warnings: &mut Warnings,
    ) -> Result<Vec<Domain>> {
        let mut state = self.state.lock().unwrap();
        state.enter(Call::LookupDomains(names.iter().cloned().collect()), org.as_str(), warnings)?;
        Ok(state.domains.iter().filter(|d| names.contains(&d.name)).cloned().collect())
    }

    async fn create_route(
        &self,
        route: &Route,
        random_port: bool,
        warnings: &mut Warnings,
    ) -> Result<Route> {
        let mut state = self.state.lock().unwrap();
        let target = route.to_string();
        state.enter(Call::CreateRoute { route: target.clone(), random_port }, &target, warnings)?;

        state.next_guid += 1;
        let mut created = route.clone();
        created.guid = RouteGuid::new(format!("created-route-{}", state.next_guid));
        if random_port {
            created.port = Some(state.next_port);
            state.next_port += 1;
        }
        state.routes.push(created.clone());
        Ok(created)
    }

    async fn find_route(&self, route: &Route, warnings: &mut Warnings) -> Result<Route> {
        let mut state = self.state.lock().unwrap();
        let target = route.to_string();
        state.enter(Call::FindRoute(target.clone()), &target, warnings)?;

        if let Some(found) = state.routes.iter().find(|r| same_settings(route, r)) {
            return Ok(found.clone());
        }
        let elsewhere = state.routes.iter().any(|r| {
            r.host == route.host
                && r.path == route.path
                && r.port == route.port
                && r.domain.guid == route.domain.guid
        });
        if elsewhere {
            return Err(RouteError::route_in_different_space(target));
        }

        Err(RouteError::RouteNotFound {
            host: route.host.clone(),
            domain: route.domain.name.clone(),
            path: route.path.clone(),
            port: route.port,
        })
    }

    async fn map_route(
        &self,
        route: &RouteGuid,
        app: &AppGuid,
        warnings: &mut Warnings,
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.enter(Call::MapRoute(route.clone(), app.clone()), route.as_str(), warnings)?;
        state.bindings.push((route.clone(), app.clone()));
        Ok(())
    }

    async fn unmap_route(
        &self,
        route: &RouteGuid,
        app: &AppGuid,
        warnings: &mut Warnings,
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.enter(Call::UnmapRoute(route.clone(), app.clone()), route.as_str(), warnings)?;
        state.bindings.retain(|(r, a)| !(r == route && a == app));
        Ok(())
    }

    async fn application_routes(
        &self,
        app: &AppGuid,
        warnings: &mut Warnings,
    ) -> Result<Vec<Route>> {
        let mut state = self.state.lock().unwrap();
        state.enter(Call::ApplicationRoutes(app.clone()), app.as_str(), warnings)?;

        let bound: Vec<RouteGuid> =
            state.bindings.iter().filter(|(_, a)| a == app).map(|(r, _)| r.clone()).collect();
        Ok(state.routes.iter().filter(|r| bound.contains(&r.guid)).cloned().collect())
    }

    async fn default_domain(&self, org: &OrgGuid, warnings: &mut Warnings) -> Result<Domain> {
        let mut state = self.state.lock().unwrap();
        state.enter(Call::DefaultDomain(org.clone()), org.as_str(), warnings)?;
        state
            .default_domain
            .clone()
            .ok_or_else(|| RouteError::NoDomainsFound { org: org.to_string() })
    }
}
