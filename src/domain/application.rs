//! Application types passed through route reconciliation.

use serde::{Deserialize, Serialize};

use super::id::AppGuid;
use super::route::Route;

/// An application as known to the platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub guid: AppGuid,
    pub name: String,
}

impl Application {
    pub fn new(guid: impl Into<AppGuid>, name: impl Into<String>) -> Self {
        Self { guid: guid.into(), name: name.into() }
    }
}

/// The unit of work handed through the route reconciler.
///
/// The calculator fills `desired_routes`; reconciliation replaces
/// `current_routes` once routes are mapped, or clears it once they are
/// unmapped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationConfig {
    pub application: Application,

    #[serde(default)]
    pub desired_routes: Vec<Route>,

    #[serde(default)]
    pub current_routes: Vec<Route>,
}

impl ApplicationConfig {
    pub fn new(application: Application) -> Self {
        Self { application, ..Default::default() }
    }

    pub fn with_desired_routes(mut self, routes: Vec<Route>) -> Self {
        self.desired_routes = routes;
        self
    }

    pub fn with_current_routes(mut self, routes: Vec<Route>) -> Self {
        self.current_routes = routes;
        self
    }
}
