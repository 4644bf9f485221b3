//! Manifest application settings that drive default route synthesis.
//!
//! Only the route-related keys of a deployment manifest are modelled here.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::{Result, RouteError};

/// A single application entry from a deployment manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ManifestApplication {
    pub name: String,

    /// Explicit hostname; the app name is used when absent
    #[serde(default, alias = "host", skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,

    /// Explicit domain name; the org default domain is used when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    #[serde(default)]
    pub no_hostname: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_path: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub routes: Vec<ManifestRoute>,

    #[serde(default)]
    pub no_route: bool,
}

/// `- route: www.example.com/path`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestRoute {
    pub route: String,
}

impl ManifestApplication {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Default::default() }
    }

    /// Explicit hostname, treating an empty string as unset
    pub fn explicit_hostname(&self) -> Option<&str> {
        self.hostname.as_deref().filter(|h| !h.is_empty())
    }

    /// Explicit domain, treating an empty string as unset
    pub fn explicit_domain(&self) -> Option<&str> {
        self.domain.as_deref().filter(|d| !d.is_empty())
    }

    /// Explicit route path, treating an empty string as unset
    pub fn explicit_route_path(&self) -> Option<&str> {
        self.route_path.as_deref().filter(|p| !p.is_empty())
    }

    /// The raw route strings listed under `routes:`
    pub fn route_strings(&self) -> Vec<String> {
        self.routes.iter().map(|r| r.route.clone()).collect()
    }
}

/// A deployment manifest: `applications: [...]`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub applications: Vec<ManifestApplication>,
}

impl Manifest {
    /// Parse a manifest from YAML
    pub fn from_yaml(contents: &str) -> Result<Self> {
        serde_yaml::from_str(contents)
            .map_err(|e| RouteError::config(format!("Invalid manifest: {}", e)))
    }

    /// Load a manifest file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Find an application by name, or the only application when `name` is None
    pub fn application(&self, name: Option<&str>) -> Option<&ManifestApplication> {
        match name {
            Some(name) => self.applications.iter().find(|app| app.name == name),
            None if self.applications.len() == 1 => self.applications.first(),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"
applications:
- name: web
  host: www
  domain: example.com
  route-path: /api
- name: worker
  no-hostname: true
  routes:
  - route: worker.example.com
  - route: tcp.example.com:1024
"#;

    #[test]
    fn parses_route_settings() {
        let manifest = Manifest::from_yaml(MANIFEST).unwrap();
        assert_eq!(manifest.applications.len(), 2);

        let web = manifest.application(Some("web")).unwrap();
        assert_eq!(web.explicit_hostname(), Some("www"));
        assert_eq!(web.explicit_domain(), Some("example.com"));
        assert_eq!(web.explicit_route_path(), Some("/api"));
        assert!(!web.no_hostname);

        let worker = manifest.application(Some("worker")).unwrap();
        assert!(worker.no_hostname);
        assert_eq!(worker.route_strings(), vec!["worker.example.com", "tcp.example.com:1024"]);
    }

    #[test]
    fn application_lookup_without_name_requires_single_entry() {
        let manifest = Manifest::from_yaml(MANIFEST).unwrap();
        assert!(manifest.application(None).is_none());

        let single = Manifest::from_yaml("applications:\n- name: only\n").unwrap();
        assert_eq!(single.application(None).unwrap().name, "only");
    }

    #[test]
    fn empty_values_are_unset() {
        let app = ManifestApplication {
            hostname: Some(String::new()),
            route_path: Some(String::new()),
            ..ManifestApplication::new("app")
        };
        assert!(app.explicit_hostname().is_none());
        assert!(app.explicit_route_path().is_none());
    }

    #[test]
    fn rejects_invalid_yaml() {
        let err = Manifest::from_yaml("applications: [").unwrap_err();
        assert!(matches!(err, RouteError::Config(_)));
    }
}
