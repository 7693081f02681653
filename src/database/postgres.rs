use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, PgPool, Row};
use tracing::info;
use url::Url;

use super::{DataSource, SourceError};
use crate::config::DatabaseConfig;
use crate::models::{Campus, OrganizationType, RawOrganization, RawProject};

/// Every row is materialized with `row_to_json` so jsonb and text columns
/// reach the normalizer in the same shape the upstream uses.
fn project_query(filter: &str) -> String {
    format!(
        r#"
        SELECT row_to_json(t) AS row FROM (
            SELECT
                p.id::text AS id,
                p.date_start_the_project,
                p.date_end_the_project,
                p.project_location,
                p.project_name_en,
                p.project_name_th,
                p.activity_hours,
                p.activity_format,
                p.expected_project_outcome,
                p.schedule,
                p.organization_orgid::text AS organization_orgid,
                p.outside_kaset,
                p.principles_and_reasoning,
                p.project_objectives,
                o.orgnameen AS org_name_en,
                o.orgnameth AS org_name_th,
                o.org_nickname,
                c.name AS campus_name
            FROM projects p
            JOIN organizations o ON o.id = p.organization_orgid
            LEFT JOIN campus c ON c.id = o.campid
            {}
            ORDER BY p.created_at DESC
        ) t
        "#,
        filter
    )
}

fn organization_query(filter: &str) -> String {
    format!(
        r#"
        SELECT row_to_json(t) AS row FROM (
            SELECT
                o.id::text AS id,
                o.orgnameen,
                o.orgnameth,
                o."organizationMark",
                o.org_image,
                o.description,
                o.instagram,
                o.facebook,
                o.views,
                o.org_nickname,
                ot.name AS org_type_name,
                c.name AS campus_name
            FROM organizations o
            LEFT JOIN organization_type ot ON ot.id = o.org_type_id
            LEFT JOIN campus c ON c.id = o.campid
            {}
            ORDER BY o.id
        ) t
        "#,
        filter
    )
}

/// Source backed by the relational store.
pub struct PostgresSource {
    pool: PgPool,
}

impl PostgresSource {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, SourceError> {
        let url = Url::parse(&config.url)
            .map_err(|e| SourceError::Transport(format!("Invalid DATABASE_URL: {}", e)))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url.as_str())
            .await?;

        info!(
            "Created database pool for: {}{}",
            url.host_str().unwrap_or("localhost"),
            url.path()
        );
        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_rows(&self, sql: &str, bind: Option<&str>) -> Result<Vec<Value>, SourceError> {
        let mut query = sqlx::query(sql);
        if let Some(param) = bind {
            query = query.bind(param);
        }
        let rows = query.fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| row.try_get::<Value, _>("row").map_err(SourceError::from))
            .collect()
    }

    async fn fetch_projects(&self, filter: &str, bind: Option<&str>) -> Result<Vec<RawProject>, SourceError> {
        let rows = self.fetch_rows(&project_query(filter), bind).await?;
        Ok(rows.into_iter().filter_map(RawProject::from_value).collect())
    }

    async fn fetch_organizations(&self, filter: &str, bind: Option<&str>) -> Result<Vec<RawOrganization>, SourceError> {
        let rows = self.fetch_rows(&organization_query(filter), bind).await?;
        Ok(rows.into_iter().filter_map(RawOrganization::from_value).collect())
    }
}

#[async_trait]
impl DataSource for PostgresSource {
    fn name(&self) -> &'static str {
        "database"
    }

    async fn list_projects(&self) -> Result<Vec<RawProject>, SourceError> {
        self.fetch_projects("", None).await
    }

    async fn get_project(&self, id: &str) -> Result<Option<RawProject>, SourceError> {
        let projects = self.fetch_projects("WHERE p.id::text = $1", Some(id)).await?;
        Ok(projects.into_iter().next())
    }

    async fn list_projects_by_organization(&self, org_id: &str) -> Result<Vec<RawProject>, SourceError> {
        self.fetch_projects("WHERE p.organization_orgid::text = $1", Some(org_id))
            .await
    }

    async fn list_organizations(&self) -> Result<Vec<RawOrganization>, SourceError> {
        self.fetch_organizations("", None).await
    }

    async fn get_organization(&self, id: &str) -> Result<Option<RawOrganization>, SourceError> {
        let organizations = self.fetch_organizations("WHERE o.id::text = $1", Some(id)).await?;
        Ok(organizations.into_iter().next())
    }

    async fn increment_organization_views(&self, id: &str) -> Result<Option<i64>, SourceError> {
        let row = sqlx::query(
            "UPDATE organizations SET views = COALESCE(views, 0) + 1 WHERE id::text = $1 RETURNING views::bigint AS views",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(match row {
            Some(row) => Some(row.try_get::<i64, _>("views")?),
            None => None,
        })
    }

    async fn list_campuses(&self) -> Result<Vec<Campus>, SourceError> {
        let rows = sqlx::query("SELECT id::text AS id, name FROM campus ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| -> Result<Campus, SourceError> {
                Ok(Campus {
                    id: row.try_get("id")?,
                    name: row.try_get("name")?,
                })
            })
            .collect()
    }

    async fn list_organization_types(&self) -> Result<Vec<OrganizationType>, SourceError> {
        let rows = sqlx::query("SELECT id::text AS id, name FROM organization_type ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| -> Result<OrganizationType, SourceError> {
                Ok(OrganizationType {
                    id: row.try_get("id")?,
                    name: row.try_get("name")?,
                })
            })
            .collect()
    }

    async fn health_check(&self) -> Result<(), SourceError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
