//! Route CLI commands
//!
//! Each handler collects platform warnings as it goes and prints them to
//! stderr before its result, or before the error when it fails.

use anyhow::{Context, Result};
use clap::Subcommand;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use super::output::{print_routes, print_warnings, OutputFormat};
use crate::client::ControlPlane;
use crate::domain::{
    AppGuid, Application, ApplicationConfig, Manifest, OrgGuid, Route, SpaceGuid, Warnings,
};
use crate::routing::find_by_settings;
use crate::services::{RouteCalculator, RouteReconciler};

#[derive(Subcommand)]
pub enum RouteCommands {
    /// Resolve route strings against the platform without changing anything
    Resolve {
        /// Organization GUID
        #[arg(long)]
        org: String,

        /// Space GUID
        #[arg(long)]
        space: String,

        /// Route to resolve, e.g. www.example.com/path or tcp.example.com:1024
        #[arg(long = "route", required = true)]
        routes: Vec<String>,
    },

    /// Show the default route for a manifest application
    DefaultRoute {
        #[arg(long)]
        org: String,

        #[arg(long)]
        space: String,

        /// Path to the deployment manifest
        #[arg(short, long)]
        manifest: PathBuf,

        /// Application name; may be omitted for single-application manifests
        #[arg(long)]
        app: Option<String>,
    },

    /// Create and bind routes for an application
    Bind {
        #[arg(long)]
        org: String,

        #[arg(long)]
        space: String,

        #[arg(long)]
        app_guid: String,

        #[arg(long)]
        app_name: String,

        /// Routes to bind; without any the app gets its default route
        #[arg(long = "route", conflicts_with = "manifest")]
        routes: Vec<String>,

        /// Take the routes from the manifest entry named after the app
        #[arg(short, long)]
        manifest: Option<PathBuf>,
    },

    /// Unbind every route from an application
    Unbind {
        #[arg(long)]
        app_guid: String,
    },
}

/// Run a route command, printing warnings before the outcome
pub async fn handle_route_command(
    command: RouteCommands,
    control_plane: Arc<dyn ControlPlane>,
    output: OutputFormat,
) -> Result<()> {
    let mut warnings = Warnings::new();
    let result = run(command, control_plane, &mut warnings).await;
    print_warnings(&warnings);

    let routes = result?;
    print_routes(&routes, output)
}

async fn run(
    command: RouteCommands,
    control_plane: Arc<dyn ControlPlane>,
    warnings: &mut Warnings,
) -> Result<Vec<Route>> {
    let calculator = RouteCalculator::new(control_plane.clone());
    let reconciler = RouteReconciler::new(control_plane.clone());

    match command {
        RouteCommands::Resolve { org, space, routes } => {
            let resolved = calculator
                .calculate_routes(&routes, &OrgGuid::new(org), &SpaceGuid::new(space), &[], warnings)
                .await
                .context("Failed to resolve routes")?;
            Ok(resolved)
        }

        RouteCommands::DefaultRoute { org, space, manifest, app } => {
            let manifest = Manifest::load(&manifest)
                .with_context(|| format!("Failed to load manifest {}", manifest.display()))?;
            let manifest_app = manifest.application(app.as_deref()).with_context(|| match &app {
                Some(name) => format!("Application '{}' not found in manifest", name),
                None => "--app is required unless the manifest has exactly one application"
                    .to_string(),
            })?;

            let route = reconciler
                .default_route(
                    manifest_app,
                    &OrgGuid::new(org),
                    &SpaceGuid::new(space),
                    &[],
                    warnings,
                )
                .await
                .context("Failed to determine default route")?;
            Ok(vec![route])
        }

        RouteCommands::Bind { org, space, app_guid, app_name, manifest: Some(manifest), .. } => {
            let org = OrgGuid::new(org);
            let space = SpaceGuid::new(space);
            let manifest = Manifest::load(&manifest)
                .with_context(|| format!("Failed to load manifest {}", manifest.display()))?;
            let manifest_app = manifest
                .application(Some(app_name.as_str()))
                .with_context(|| format!("Application '{}' not found in manifest", app_name))?;
            let app = Application::new(app_guid, app_name.clone());

            let current = control_plane
                .application_routes(&app.guid, warnings)
                .await
                .context("Failed to list application routes")?;
            if manifest_app.no_route {
                info!(app = %app_name, "no-route set, leaving bindings unchanged");
                return Ok(current);
            }

            let raw_routes = manifest_app.route_strings();
            let desired = if raw_routes.is_empty() {
                let route = reconciler
                    .default_route(manifest_app, &org, &space, &current, warnings)
                    .await
                    .context("Failed to determine default route")?;
                let mut desired = current.clone();
                if find_by_settings(&route, &current).is_none() {
                    desired.push(route);
                }
                desired
            } else {
                calculator
                    .calculate_routes(&raw_routes, &org, &space, &current, warnings)
                    .await
                    .context("Failed to resolve routes")?
            };

            reconcile(&reconciler, app, desired, current, warnings).await
        }

        RouteCommands::Bind { org, space, app_guid, app_name, routes, manifest: None } => {
            let org = OrgGuid::new(org);
            let space = SpaceGuid::new(space);
            let app = Application::new(app_guid, app_name);

            if routes.is_empty() {
                reconciler
                    .create_and_map_default_application_route(&org, &space, &app, warnings)
                    .await
                    .context("Failed to bind default route")?;
                let bound = control_plane
                    .application_routes(&app.guid, warnings)
                    .await
                    .context("Failed to list application routes")?;
                return Ok(bound);
            }

            let current = control_plane
                .application_routes(&app.guid, warnings)
                .await
                .context("Failed to list application routes")?;
            let desired = calculator
                .calculate_routes(&routes, &org, &space, &current, warnings)
                .await
                .context("Failed to resolve routes")?;

            reconcile(&reconciler, app, desired, current, warnings).await
        }

        RouteCommands::Unbind { app_guid } => {
            let app = AppGuid::new(app_guid);
            let current = control_plane
                .application_routes(&app, warnings)
                .await
                .context("Failed to list application routes")?;

            let mut config = ApplicationConfig::new(Application::new(app, String::new()))
                .with_current_routes(current.clone());
            reconciler.unmap_routes(&mut config, warnings).await.context("Failed to unmap routes")?;

            info!(unbound = current.len(), "routes unbound");
            Ok(current)
        }
    }
}

/// Create the missing desired routes, then bind them
async fn reconcile(
    reconciler: &RouteReconciler,
    app: Application,
    desired: Vec<Route>,
    current: Vec<Route>,
    warnings: &mut Warnings,
) -> Result<Vec<Route>> {
    let config =
        ApplicationConfig::new(app).with_desired_routes(desired).with_current_routes(current);
    let (config, created) = reconciler
        .create_routes(config, warnings)
        .await
        .context("Failed to create routes; some routes may have been created")?;
    let (config, bound) =
        reconciler.map_routes(config, warnings).await.context("Failed to map routes")?;

    info!(created, bound, "routes reconciled");
    Ok(config.current_routes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fake::{FakeControlPlane, Op};
    use crate::domain::{Domain, RouteGuid};
    use std::path::Path;
    use tempfile::TempDir;

    fn domain() -> Domain {
        Domain::new("example.com", "domain-1")
    }

    fn write_manifest(dir: &Path, contents: &str) -> PathBuf {
        let path = dir.join("manifest.yml");
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn manifest_bind(manifest: PathBuf) -> RouteCommands {
        RouteCommands::Bind {
            org: "org-1".to_string(),
            space: "space-1".to_string(),
            app_guid: "app-1".to_string(),
            app_name: "web".to_string(),
            routes: Vec::new(),
            manifest: Some(manifest),
        }
    }

    #[tokio::test]
    async fn bind_creates_and_maps_requested_routes() {
        let fake = Arc::new(FakeControlPlane::new().with_domain(domain()));
        let mut warnings = Warnings::new();

        let bound = run(
            RouteCommands::Bind {
                org: "org-1".to_string(),
                space: "space-1".to_string(),
                app_guid: "app-1".to_string(),
                app_name: "web".to_string(),
                routes: vec!["www.example.com".to_string()],
                manifest: None,
            },
            fake.clone(),
            &mut warnings,
        )
        .await
        .unwrap();

        assert_eq!(bound.len(), 1);
        assert_eq!(bound[0].guid.as_str(), "created-route-1");
        assert_eq!(fake.bindings(), vec![(RouteGuid::new("created-route-1"), AppGuid::new("app-1"))]);
    }

    #[tokio::test]
    async fn bind_without_routes_uses_default_route() {
        let fake = Arc::new(FakeControlPlane::new().with_default_domain(domain()));
        let mut warnings = Warnings::new();

        let bound = run(
            RouteCommands::Bind {
                org: "org-1".to_string(),
                space: "space-1".to_string(),
                app_guid: "app-1".to_string(),
                app_name: "web".to_string(),
                routes: Vec::new(),
                manifest: None,
            },
            fake.clone(),
            &mut warnings,
        )
        .await
        .unwrap();

        assert_eq!(bound.len(), 1);
        assert_eq!(bound[0].to_string(), "web.example.com");
    }

    #[tokio::test]
    async fn bind_from_manifest_adds_listed_routes() {
        let dir = TempDir::new().unwrap();
        let manifest = write_manifest(
            dir.path(),
            "applications:\n- name: web\n  routes:\n  - route: www.example.com\n",
        );
        let existing = Route {
            host: "old".to_string(),
            domain: domain(),
            space_guid: SpaceGuid::new("space-1"),
            guid: RouteGuid::new("route-1"),
            ..Default::default()
        };
        let fake = Arc::new(
            FakeControlPlane::new()
                .with_domain(domain())
                .with_route(existing)
                .with_binding(RouteGuid::new("route-1"), AppGuid::new("app-1")),
        );
        let mut warnings = Warnings::new();

        let bound = run(manifest_bind(manifest), fake.clone(), &mut warnings).await.unwrap();

        let names: Vec<String> = bound.iter().map(Route::to_string).collect();
        assert_eq!(names, vec!["old.example.com", "www.example.com"]);
        assert_eq!(fake.count(Op::MapRoute), 1);
        assert_eq!(fake.bindings().len(), 2);
    }

    #[tokio::test]
    async fn bind_from_manifest_without_routes_uses_default_route() {
        let dir = TempDir::new().unwrap();
        let manifest = write_manifest(dir.path(), "applications:\n- name: web\n");
        let fake = Arc::new(FakeControlPlane::new().with_default_domain(domain()));
        let mut warnings = Warnings::new();

        let bound = run(manifest_bind(manifest), fake.clone(), &mut warnings).await.unwrap();

        assert_eq!(bound.len(), 1);
        assert_eq!(bound[0].to_string(), "web.example.com");
        assert_eq!(fake.count(Op::CreateRoute), 1);
        assert_eq!(fake.bindings(), vec![(RouteGuid::new("created-route-1"), AppGuid::new("app-1"))]);
    }

    #[tokio::test]
    async fn bind_from_manifest_with_no_route_changes_nothing() {
        let dir = TempDir::new().unwrap();
        let manifest = write_manifest(
            dir.path(),
            "applications:\n- name: web\n  no-route: true\n  routes:\n  - route: www.example.com\n",
        );
        let fake = Arc::new(FakeControlPlane::new().with_domain(domain()));
        let mut warnings = Warnings::new();

        let bound = run(manifest_bind(manifest), fake.clone(), &mut warnings).await.unwrap();

        assert!(bound.is_empty());
        assert_eq!(fake.count(Op::LookupDomains), 0);
        assert_eq!(fake.count(Op::CreateRoute), 0);
        assert_eq!(fake.count(Op::MapRoute), 0);
    }

    #[tokio::test]
    async fn bind_from_manifest_requires_matching_application() {
        let dir = TempDir::new().unwrap();
        let manifest = write_manifest(dir.path(), "applications:\n- name: worker\n");
        let fake = Arc::new(FakeControlPlane::new());
        let mut warnings = Warnings::new();

        let err = run(manifest_bind(manifest), fake.clone(), &mut warnings).await.unwrap_err();

        assert!(err.to_string().contains("'web' not found in manifest"));
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn unbind_removes_every_binding() {
        let existing = Route {
            host: "www".to_string(),
            domain: domain(),
            guid: RouteGuid::new("route-1"),
            ..Default::default()
        };
        let fake = Arc::new(
            FakeControlPlane::new()
                .with_route(existing)
                .with_binding(RouteGuid::new("route-1"), AppGuid::new("app-1")),
        );
        let mut warnings = Warnings::new();

        let unbound = run(
            RouteCommands::Unbind { app_guid: "app-1".to_string() },
            fake.clone(),
            &mut warnings,
        )
        .await
        .unwrap();

        assert_eq!(unbound.len(), 1);
        assert!(fake.bindings().is_empty());
        assert_eq!(fake.count(Op::UnmapRoute), 1);
    }

    #[tokio::test]
    async fn failures_keep_collected_warnings() {
        let fake = Arc::new(FakeControlPlane::new());
        let mut warnings = Warnings::new();

        let result = run(
            RouteCommands::Resolve {
                org: "org-1".to_string(),
                space: "space-1".to_string(),
                routes: vec!["www.nowhere.com".to_string()],
            },
            fake,
            &mut warnings,
        )
        .await;

        assert!(result.is_err());
        assert_eq!(warnings.iter().collect::<Vec<_>>(), vec!["LookupDomains: org-1"]);
    }
}
