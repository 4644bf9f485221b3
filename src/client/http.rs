//! HTTP client for the platform's Cloud Controller API
//!
//! Implements [`ControlPlane`] against the v2 REST resources for domains,
//! routes and application route bindings. Platform warnings arrive in the
//! `X-Cf-Warnings` response header as comma separated, URL-encoded strings.

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::time::Duration;
use tracing::{debug, trace};

use super::ControlPlane;
use crate::config::ClientSettings;
use crate::domain::{
    AppGuid, Domain, DomainGuid, DomainScope, OrgGuid, Route, RouteGuid, RoutingType, SpaceGuid,
    Warnings,
};
use crate::errors::{Result, RouteError};

/// Response header carrying platform warnings
pub const WARNINGS_HEADER: &str = "x-cf-warnings";

/// Error code the platform returns when a route and app live in different spaces
const INVALID_RELATION: &str = "CF-InvalidRelation";

/// Authenticated Cloud Controller client
#[derive(Debug, Clone)]
pub struct CloudControllerClient {
    client: Client,
    settings: ClientSettings,
}

/// One page of a v2 list response
#[derive(Debug, Deserialize)]
struct Page<T> {
    #[serde(default = "Vec::new")]
    resources: Vec<Resource<T>>,
    #[serde(default)]
    next_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Resource<T> {
    metadata: Metadata,
    entity: T,
}

#[derive(Debug, Deserialize)]
struct Metadata {
    guid: String,
}

#[derive(Debug, Deserialize)]
struct SharedDomainEntity {
    name: String,
    #[serde(default)]
    router_group_type: Option<String>,
    #[serde(default)]
    internal: bool,
}

#[derive(Debug, Deserialize)]
struct PrivateDomainEntity {
    name: String,
}

#[derive(Debug, Deserialize)]
struct RouteEntity {
    #[serde(default)]
    host: String,
    #[serde(default)]
    path: String,
    #[serde(default)]
    port: Option<u16>,
    domain_guid: String,
    space_guid: String,
}

#[derive(Debug, Serialize)]
struct CreateRouteRequest<'a> {
    domain_guid: &'a str,
    space_guid: &'a str,
    host: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    path: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    port: Option<u16>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    error_code: Option<String>,
}

fn shared_domain(resource: Resource<SharedDomainEntity>) -> Domain {
    let routing_type = match resource.entity.router_group_type.as_deref() {
        Some("tcp") => RoutingType::Tcp,
        _ => RoutingType::Http,
    };
    Domain {
        name: resource.entity.name,
        guid: DomainGuid::new(resource.metadata.guid),
        routing_type,
        scope: DomainScope::Shared,
        internal: resource.entity.internal,
    }
}

fn private_domain(resource: Resource<PrivateDomainEntity>) -> Domain {
    Domain {
        name: resource.entity.name,
        guid: DomainGuid::new(resource.metadata.guid),
        routing_type: RoutingType::Http,
        scope: DomainScope::Owned,
        internal: false,
    }
}

fn route_from_resource(resource: Resource<RouteEntity>, domain: Domain) -> Route {
    Route {
        host: resource.entity.host,
        domain,
        path: resource.entity.path,
        port: resource.entity.port,
        space_guid: SpaceGuid::new(resource.entity.space_guid),
        guid: RouteGuid::new(resource.metadata.guid),
    }
}

/// Decode the platform warnings carried on a response
pub fn decode_warnings(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(WARNINGS_HEADER)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .filter(|warning| !warning.is_empty())
        .map(|warning| {
            let spaced = warning.replace('+', " ");
            match urlencoding::decode(&spaced) {
                Ok(decoded) => decoded.into_owned(),
                Err(_) => spaced.clone(),
            }
        })
        .collect()
}

/// Build an error from a failed response body
fn platform_error(status: StatusCode, body: &str) -> RouteError {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(error) => RouteError::platform(
            status.as_u16(),
            error.error_code.unwrap_or_else(|| "unknown".to_string()),
            error.description.unwrap_or_else(|| body.to_string()),
        ),
        Err(_) => RouteError::platform(status.as_u16(), "unknown", body),
    }
}

fn is_status(error: &RouteError, expected: StatusCode) -> bool {
    matches!(error, RouteError::Platform { status, .. } if *status == expected.as_u16())
}

fn name_filter(names: &BTreeSet<String>) -> String {
    format!("name IN {}", names.iter().cloned().collect::<Vec<_>>().join(","))
}

impl CloudControllerClient {
    /// Create a new client with the given settings
    pub fn new(settings: ClientSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(format!("{}/{}", crate::APP_NAME, crate::VERSION))
            .build()
            .map_err(|e| RouteError::transport(e, "Failed to build HTTP client"))?;

        Ok(Self { client, settings })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.settings.api_url.trim_end_matches('/'), path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.settings.token.as_deref() {
            Some(token) if !token.is_empty() => request.bearer_auth(token),
            _ => request,
        }
    }

    fn get(&self, path: &str) -> RequestBuilder {
        let url = self.url(path);
        debug!("GET {}", url);
        self.authorize(self.client.get(&url))
    }

    fn post(&self, path: &str) -> RequestBuilder {
        let url = self.url(path);
        debug!("POST {}", url);
        self.authorize(self.client.post(&url))
    }

    fn put(&self, path: &str) -> RequestBuilder {
        let url = self.url(path);
        debug!("PUT {}", url);
        self.authorize(self.client.put(&url))
    }

    fn delete(&self, path: &str) -> RequestBuilder {
        let url = self.url(path);
        debug!("DELETE {}", url);
        self.authorize(self.client.delete(&url))
    }

    /// Send a request, collect its warnings and check the status
    async fn execute(&self, request: RequestBuilder, warnings: &mut Warnings) -> Result<Response> {
        let response =
            request.send().await.map_err(|e| RouteError::transport(e, "Failed to send request"))?;

        warnings.extend(decode_warnings(response.headers()));

        let status = response.status();
        debug!("Response status: {}", status);

        if status.is_success() {
            return Ok(response);
        }

        let error_text =
            response.text().await.unwrap_or_else(|_| "<unable to read error>".to_string());
        if self.settings.verbose {
            trace!("Error response:\n{}", error_text);
        }

        Err(platform_error(status, &error_text))
    }

    /// Deserialize a JSON response body
    async fn json<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        let body = response
            .text()
            .await
            .map_err(|e| RouteError::transport(e, "Failed to read response body"))?;

        if self.settings.verbose {
            trace!("Response body:\n{}", body);
        }

        serde_json::from_str(&body).map_err(|source| RouteError::Serialization {
            source,
            context: format!("Failed to deserialize response: {}", body),
        })
    }

    /// Fetch every page of a list resource
    async fn get_all<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        warnings: &mut Warnings,
    ) -> Result<Vec<Resource<T>>> {
        let response = self.execute(self.get(path).query(query), warnings).await?;
        let mut page: Page<T> = self.json(response).await?;
        let mut resources = std::mem::take(&mut page.resources);

        while let Some(next_url) = page.next_url.take() {
            let response = self.execute(self.get(&next_url), warnings).await?;
            page = self.json(response).await?;
            resources.append(&mut page.resources);
        }

        Ok(resources)
    }

    /// Fetch a domain by GUID, trying shared domains before private ones
    async fn domain_by_guid(&self, guid: &str, warnings: &mut Warnings) -> Result<Domain> {
        let shared = self.execute(self.get(&format!("/v2/shared_domains/{}", guid)), warnings).await;
        match shared {
            Ok(response) => {
                Ok(shared_domain(self.json(response).await?))
            }
            Err(err) if is_status(&err, StatusCode::NOT_FOUND) => {
                let response = self
                    .execute(self.get(&format!("/v2/private_domains/{}", guid)), warnings)
                    .await?;
                Ok(private_domain(self.json(response).await?))
            }
            Err(err) => Err(err),
        }
    }
}

#[async_trait]
impl ControlPlane for CloudControllerClient {
    async fn lookup_domains(
        &self,
        names: &BTreeSet<String>,
        org: &OrgGuid,
        warnings: &mut Warnings,
    ) -> Result<Vec<Domain>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let query = [("q", name_filter(names))];
        let shared: Vec<Resource<SharedDomainEntity>> =
            self.get_all("/v2/shared_domains", &query, warnings).await?;
        let private: Vec<Resource<PrivateDomainEntity>> = self
            .get_all(&format!("/v2/organizations/{}/private_domains", org), &query, warnings)
            .await?;

        Ok(shared.into_iter().map(shared_domain).chain(private.into_iter().map(private_domain)).collect())
    }

    async fn create_route(
        &self,
        route: &Route,
        random_port: bool,
        warnings: &mut Warnings,
    ) -> Result<Route> {
        let body = CreateRouteRequest {
            domain_guid: route.domain.guid.as_str(),
            space_guid: route.space_guid.as_str(),
            host: &route.host,
            path: &route.path,
            port: route.port,
        };

        let mut request = self.post("/v2/routes").json(&body);
        if random_port {
            request = request.query(&[("generate_port", "true")]);
        }

        let response = self.execute(request, warnings).await?;
        let resource: Resource<RouteEntity> = self.json(response).await?;
        Ok(route_from_resource(resource, route.domain.clone()))
    }

    async fn find_route(&self, route: &Route, warnings: &mut Warnings) -> Result<Route> {
        let mut query = vec![
            ("q", format!("host:{}", route.host)),
            ("q", format!("domain_guid:{}", route.domain.guid)),
            ("q", format!("path:{}", route.path)),
        ];
        if let Some(port) = route.port {
            query.push(("q", format!("port:{}", port)));
        }

        let found: Vec<Resource<RouteEntity>> =
            self.get_all("/v2/routes", &query, warnings).await?;

        // The platform may ignore an empty path filter
        let existing = found
            .into_iter()
            .find(|r| r.entity.path == route.path && r.entity.port == route.port)
            .ok_or_else(|| RouteError::RouteNotFound {
                host: route.host.clone(),
                domain: route.domain.name.clone(),
                path: route.path.clone(),
                port: route.port,
            })?;

        if existing.entity.space_guid != route.space_guid.as_str() {
            return Err(RouteError::route_in_different_space(route.to_string()));
        }

        Ok(route_from_resource(existing, route.domain.clone()))
    }

    async fn map_route(
        &self,
        route: &RouteGuid,
        app: &AppGuid,
        warnings: &mut Warnings,
    ) -> Result<()> {
        let request = self.put(&format!("/v2/routes/{}/apps/{}", route, app));
        match self.execute(request, warnings).await {
            Ok(_) => Ok(()),
            Err(RouteError::Platform { code, .. }) if code == INVALID_RELATION => {
                Err(RouteError::route_in_different_space(route.as_str()))
            }
            Err(err) => Err(err),
        }
    }

    async fn unmap_route(
        &self,
        route: &RouteGuid,
        app: &AppGuid,
        warnings: &mut Warnings,
    ) -> Result<()> {
        let request = self.delete(&format!("/v2/routes/{}/apps/{}", route, app));
        self.execute(request, warnings).await?;
        Ok(())
    }

    async fn application_routes(
        &self,
        app: &AppGuid,
        warnings: &mut Warnings,
    ) -> Result<Vec<Route>> {
        let resources: Vec<Resource<RouteEntity>> =
            self.get_all(&format!("/v2/apps/{}/routes", app), &[], warnings).await?;

        let mut domains: HashMap<String, Domain> = HashMap::new();
        let mut routes = Vec::with_capacity(resources.len());
        for resource in resources {
            let domain_guid = resource.entity.domain_guid.clone();
            let domain = match domains.get(&domain_guid) {
                Some(domain) => domain.clone(),
                None => {
                    let domain = self.domain_by_guid(&domain_guid, warnings).await?;
                    domains.insert(domain_guid, domain.clone());
                    domain
                }
            };
            routes.push(route_from_resource(resource, domain));
        }

        Ok(routes)
    }

    async fn default_domain(&self, org: &OrgGuid, warnings: &mut Warnings) -> Result<Domain> {
        let shared: Vec<Resource<SharedDomainEntity>> =
            self.get_all("/v2/shared_domains", &[], warnings).await?;
        if let Some(domain) = shared.into_iter().map(shared_domain).find(|d| !d.internal) {
            return Ok(domain);
        }

        let private: Vec<Resource<PrivateDomainEntity>> = self
            .get_all(&format!("/v2/organizations/{}/private_domains", org), &[], warnings)
            .await?;
        private
            .into_iter()
            .map(private_domain)
            .next()
            .ok_or_else(|| RouteError::NoDomainsFound { org: org.to_string() })
    }
}
