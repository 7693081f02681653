use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use url::Url;

use super::{DataSource, SourceError};
use crate::config::UpstreamConfig;
use crate::models::{Campus, OrganizationType, RawNamed, RawOrganization, RawProject};
use crate::normalize::{first_present, organization::parse_views};

/// Every collection the upstream serves, from a single fetch.
#[derive(Debug, Default)]
pub struct Dataset {
    pub projects: Vec<RawProject>,
    pub organizations: Vec<RawOrganization>,
    pub campuses: Vec<Campus>,
    pub organization_types: Vec<OrganizationType>,
}

/// Source backed by the SAKU tRPC endpoint. There is no per-record lookup
/// upstream: every call fetches the whole dataset and filters in memory.
pub struct UpstreamSource {
    client: Client,
    config: UpstreamConfig,
}

impl UpstreamSource {
    pub fn new(config: UpstreamConfig) -> Result<Self, SourceError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5).min(config.timeout()))
            .timeout(config.timeout())
            .build()
            .map_err(|e| SourceError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub async fn fetch_dataset(&self) -> Result<Dataset, SourceError> {
        debug!("Fetching dataset from {}", self.config.dataset_url);

        let response = self
            .client
            .get(&self.config.dataset_url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        let payload: Value = response.json().await?;
        let dataset = extract_dataset(payload)?;

        info!(
            projects = dataset.projects.len(),
            organizations = dataset.organizations.len(),
            "Fetched upstream dataset"
        );
        Ok(dataset)
    }

    fn view_url(&self, id: &str) -> Result<Url, SourceError> {
        let base = self
            .config
            .base_url
            .as_deref()
            .ok_or(SourceError::NotConfigured("UPSTREAM_BASE_URL"))?;

        let mut url = Url::parse(base).map_err(|e| SourceError::Transport(format!("Invalid base URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| SourceError::Transport("Base URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(["api", "organization", id, "view"]);
        Ok(url)
    }
}

#[async_trait]
impl DataSource for UpstreamSource {
    fn name(&self) -> &'static str {
        "upstream"
    }

    async fn list_projects(&self) -> Result<Vec<RawProject>, SourceError> {
        Ok(self.fetch_dataset().await?.projects)
    }

    async fn get_project(&self, id: &str) -> Result<Option<RawProject>, SourceError> {
        let dataset = self.fetch_dataset().await?;
        Ok(dataset
            .projects
            .into_iter()
            .find(|p| p.id.as_deref() == Some(id)))
    }

    async fn list_projects_by_organization(&self, org_id: &str) -> Result<Vec<RawProject>, SourceError> {
        let dataset = self.fetch_dataset().await?;
        Ok(dataset
            .projects
            .into_iter()
            .filter(|p| owning_organization(p) == Some(org_id))
            .collect())
    }

    async fn list_organizations(&self) -> Result<Vec<RawOrganization>, SourceError> {
        Ok(self.fetch_dataset().await?.organizations)
    }

    async fn get_organization(&self, id: &str) -> Result<Option<RawOrganization>, SourceError> {
        let dataset = self.fetch_dataset().await?;
        Ok(dataset
            .organizations
            .into_iter()
            .find(|o| o.id.as_deref() == Some(id)))
    }

    async fn increment_organization_views(&self, id: &str) -> Result<Option<i64>, SourceError> {
        let url = self.view_url(id)?;
        let mut request = self.client.put(url).json(&json!({ "action": "increment_view" }));
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => return Ok(None),
            status if !status.is_success() => return Err(SourceError::Status(status.as_u16())),
            _ => {}
        }

        let body: Value = response.json().await?;
        let views = body
            .get("organization")
            .filter(|org| org.is_object())
            .map(|org| parse_views(org.get("views")));
        if views.is_none() {
            warn!(organization = id, "View update response carried no organization");
        }
        Ok(views)
    }

    async fn list_campuses(&self) -> Result<Vec<Campus>, SourceError> {
        Ok(self.fetch_dataset().await?.campuses)
    }

    async fn list_organization_types(&self) -> Result<Vec<OrganizationType>, SourceError> {
        Ok(self.fetch_dataset().await?.organization_types)
    }

    async fn health_check(&self) -> Result<(), SourceError> {
        self.fetch_dataset().await.map(|_| ())
    }
}

/// Unwrap the tRPC envelope `{ result: { data: { json: { ... } } } }`.
///
/// A missing envelope is a malformed payload. Inside it, a collection that is
/// not an array reads as empty and entries that are not objects are skipped.
pub fn extract_dataset(payload: Value) -> Result<Dataset, SourceError> {
    let mut body = match payload.pointer("/result/data/json") {
        Some(Value::Object(map)) => map.clone(),
        _ => return Err(SourceError::MalformedPayload("missing result.data.json".to_string())),
    };

    let mut collection = |key: &str| -> Vec<Value> {
        match body.remove(key) {
            Some(Value::Array(items)) => items,
            None | Some(Value::Null) => Vec::new(),
            Some(other) => {
                warn!(collection = key, value = %other, "Collection is not an array, reading as empty");
                Vec::new()
            }
        }
    };

    let projects = collection("projects")
        .into_iter()
        .filter_map(RawProject::from_value)
        .collect();
    let organizations = collection("organizations")
        .into_iter()
        .filter_map(RawOrganization::from_value)
        .collect();
    let campuses = named_entries(collection("campuses"))
        .map(|(id, name)| Campus { id, name })
        .collect();
    let organization_types = named_entries(collection("organizationsType"))
        .map(|(id, name)| OrganizationType { id, name })
        .collect();

    Ok(Dataset {
        projects,
        organizations,
        campuses,
        organization_types,
    })
}

fn owning_organization(project: &RawProject) -> Option<&str> {
    first_present([
        project.organization_orgid.as_deref(),
        project.organization_id.as_deref(),
        project.nested_organization().and_then(|org| org.id.as_deref()),
    ])
}

/// `{id?, name}` objects or bare strings, skipping anything without a name.
fn named_entries(items: Vec<Value>) -> impl Iterator<Item = (Option<String>, String)> {
    items.into_iter().filter_map(|item| match item {
        Value::String(name) => Some((None, name)),
        Value::Object(_) => {
            let named: RawNamed = serde_json::from_value(item).ok()?;
            Some((named.id, named.name?))
        }
        _ => None,
    })
}
