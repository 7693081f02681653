//! Data access facade.
//!
//! A `DataSource` speaks to one backing store and reports failures honestly.
//! `Repository` wraps it with the configured `FailurePolicy`, which is all the
//! handlers ever see.

pub mod postgres;
pub mod upstream;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::error;

use crate::config::{AppConfig, FailurePolicy, SourceKind};
use crate::models::{Campus, OrganizationType, RawOrganization, RawProject};

pub use postgres::PostgresSource;
pub use upstream::UpstreamSource;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Upstream request failed: {0}")]
    Transport(String),

    #[error("Upstream request timed out")]
    Timeout,

    #[error("Upstream returned status {0}")]
    Status(u16),

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Source not configured: {0}")]
    NotConfigured(&'static str),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SourceError::Timeout
        } else if let Some(status) = err.status() {
            SourceError::Status(status.as_u16())
        } else if err.is_decode() {
            SourceError::MalformedPayload(err.to_string())
        } else {
            SourceError::Transport(err.to_string())
        }
    }
}

/// Uniform lookups over one backing store.
///
/// Lists are fully materialized; `Ok(None)` / `Ok(vec![])` mean the store
/// answered and had nothing, `Err` means it could not answer.
#[async_trait]
pub trait DataSource: Send + Sync {
    fn name(&self) -> &'static str;

    /// Projects, newest first where the store records creation time.
    async fn list_projects(&self) -> Result<Vec<RawProject>, SourceError>;

    async fn get_project(&self, id: &str) -> Result<Option<RawProject>, SourceError>;

    async fn list_projects_by_organization(&self, org_id: &str) -> Result<Vec<RawProject>, SourceError>;

    async fn list_organizations(&self) -> Result<Vec<RawOrganization>, SourceError>;

    async fn get_organization(&self, id: &str) -> Result<Option<RawOrganization>, SourceError>;

    /// Atomically bump one organization's view counter, returning the new value.
    async fn increment_organization_views(&self, id: &str) -> Result<Option<i64>, SourceError>;

    async fn list_campuses(&self) -> Result<Vec<Campus>, SourceError>;

    async fn list_organization_types(&self) -> Result<Vec<OrganizationType>, SourceError>;

    async fn health_check(&self) -> Result<(), SourceError>;
}

/// The facade handlers call: a data source plus the failure policy.
#[derive(Clone)]
pub struct Repository {
    source: Arc<dyn DataSource>,
    policy: FailurePolicy,
}

impl Repository {
    pub fn new(source: Arc<dyn DataSource>, policy: FailurePolicy) -> Self {
        Self { source, policy }
    }

    /// Build the source named by the configuration.
    pub async fn from_config(config: &AppConfig) -> Result<Self, SourceError> {
        let source: Arc<dyn DataSource> = match &config.source.kind {
            SourceKind::Upstream(upstream) => Arc::new(UpstreamSource::new(upstream.clone())?),
            SourceKind::Database(database) => Arc::new(PostgresSource::connect(database).await?),
        };
        Ok(Self::new(source, config.source.failure_policy))
    }

    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    pub async fn list_projects(&self) -> Result<Vec<RawProject>, SourceError> {
        self.degrade_list("list_projects", self.source.list_projects().await)
    }

    pub async fn get_project(&self, id: &str) -> Result<Option<RawProject>, SourceError> {
        self.degrade_one("get_project", self.source.get_project(id).await)
    }

    pub async fn list_projects_by_organization(&self, org_id: &str) -> Result<Vec<RawProject>, SourceError> {
        self.degrade_list(
            "list_projects_by_organization",
            self.source.list_projects_by_organization(org_id).await,
        )
    }

    pub async fn list_organizations(&self) -> Result<Vec<RawOrganization>, SourceError> {
        self.degrade_list("list_organizations", self.source.list_organizations().await)
    }

    pub async fn get_organization(&self, id: &str) -> Result<Option<RawOrganization>, SourceError> {
        self.degrade_one("get_organization", self.source.get_organization(id).await)
    }

    pub async fn increment_organization_views(&self, id: &str) -> Result<Option<i64>, SourceError> {
        self.degrade_one(
            "increment_organization_views",
            self.source.increment_organization_views(id).await,
        )
    }

    pub async fn list_campuses(&self) -> Result<Vec<Campus>, SourceError> {
        self.degrade_list("list_campuses", self.source.list_campuses().await)
    }

    pub async fn list_organization_types(&self) -> Result<Vec<OrganizationType>, SourceError> {
        self.degrade_list("list_organization_types", self.source.list_organization_types().await)
    }

    /// Health is never degraded: the caller wants to know.
    pub async fn health_check(&self) -> Result<(), SourceError> {
        self.source.health_check().await
    }

    fn degrade_list<T>(&self, op: &str, result: Result<Vec<T>, SourceError>) -> Result<Vec<T>, SourceError> {
        match (result, self.policy) {
            (Err(e), FailurePolicy::Degrade) => {
                error!(source = self.source.name(), op, error = %e, "Backing store failed, returning empty list");
                Ok(Vec::new())
            }
            (result, _) => result,
        }
    }

    fn degrade_one<T>(&self, op: &str, result: Result<Option<T>, SourceError>) -> Result<Option<T>, SourceError> {
        match (result, self.policy) {
            (Err(e), FailurePolicy::Degrade) => {
                error!(source = self.source.name(), op, error = %e, "Backing store failed, treating as absent");
                Ok(None)
            }
            (result, _) => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenSource;

    #[async_trait]
    impl DataSource for BrokenSource {
        fn name(&self) -> &'static str {
            "broken"
        }
        async fn list_projects(&self) -> Result<Vec<RawProject>, SourceError> {
            Err(SourceError::Timeout)
        }
        async fn get_project(&self, _id: &str) -> Result<Option<RawProject>, SourceError> {
            Err(SourceError::Status(500))
        }
        async fn list_projects_by_organization(&self, _org_id: &str) -> Result<Vec<RawProject>, SourceError> {
            Err(SourceError::Timeout)
        }
        async fn list_organizations(&self) -> Result<Vec<RawOrganization>, SourceError> {
            Err(SourceError::MalformedPayload("no result".into()))
        }
        async fn get_organization(&self, _id: &str) -> Result<Option<RawOrganization>, SourceError> {
            Err(SourceError::Transport("refused".into()))
        }
        async fn increment_organization_views(&self, _id: &str) -> Result<Option<i64>, SourceError> {
            Err(SourceError::Transport("refused".into()))
        }
        async fn list_campuses(&self) -> Result<Vec<Campus>, SourceError> {
            Err(SourceError::Timeout)
        }
        async fn list_organization_types(&self) -> Result<Vec<OrganizationType>, SourceError> {
            Err(SourceError::Timeout)
        }
        async fn health_check(&self) -> Result<(), SourceError> {
            Err(SourceError::Timeout)
        }
    }

    #[tokio::test]
    async fn reqwest_timeout_maps_to_timeout() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            // accept, then never answer
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(std::time::Duration::from_secs(5)).await;
        });

        let err = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(200))
            .build()
            .unwrap()
            .get(format!("http://{}/", addr))
            .send()
            .await
            .unwrap_err();

        assert!(matches!(SourceError::from(err), SourceError::Timeout));
    }

    #[tokio::test]
    async fn degrade_policy_hides_failures() {
        let repo = Repository::new(Arc::new(BrokenSource), FailurePolicy::Degrade);
        assert!(repo.list_projects().await.unwrap().is_empty());
        assert!(repo.get_project("x").await.unwrap().is_none());
        assert!(repo.list_organizations().await.unwrap().is_empty());
        assert!(repo.get_organization("x").await.unwrap().is_none());
        assert!(repo.increment_organization_views("x").await.unwrap().is_none());
        assert!(repo.list_campuses().await.unwrap().is_empty());
        // health is reported as-is
        assert!(repo.health_check().await.is_err());
    }

    #[tokio::test]
    async fn error_policy_propagates_failures() {
        let repo = Repository::new(Arc::new(BrokenSource), FailurePolicy::Error);
        assert!(matches!(repo.list_projects().await, Err(SourceError::Timeout)));
        assert!(matches!(repo.get_project("x").await, Err(SourceError::Status(500))));
        assert!(matches!(
            repo.list_projects_by_organization("o").await,
            Err(SourceError::Timeout)
        ));
    }
}
