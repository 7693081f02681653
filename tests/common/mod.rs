#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, put},
    Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use kuclub_api::config::AppConfig;
use kuclub_api::database::Repository;
use kuclub_api::server::{self, AppState};

pub const CLIENT_SECRET: &str = "test-client-secret";
pub const JWT_SECRET: &str = "test-jwt-secret";
pub const UPSTREAM_KEY: &str = "upstream-key";

/// Dataset in the shape the SAKU endpoint serves: string-encoded structured
/// fields and organization details nested under `Organization`.
pub fn sample_dataset() -> Value {
    json!({
        "projects": [
            {
                "id": "p-1",
                "date_start_the_project": "2024-06-01T01:00:00.000Z",
                "date_end_the_project": "2024-06-02T10:00:00.000Z",
                "project_location": "Bangkhen",
                "project_name_en": "Volunteer Camp",
                "project_name_th": "ค่ายอาสา",
                "activity_hours": "{\"social_activities\": 12, \"competency_development_activities\": {\"virtue\": 3}}",
                "activity_format": "Workshop, Seminar",
                "expected_project_outcome": "[\"Teamwork\"]",
                "schedule": "{\"each_day\":[{\"date\":\"2024-06-01\",\"time\":[\"09:00-16:00\"],\"description\":\"Day 1\"}],\"location\":\"Hall\"}",
                "organization_orgid": "org-7",
                "outside_kaset": "undefined",
                "project_objectives": "Help, Learn",
                "Organization": {
                    "orgnameen": "Volunteer Club",
                    "orgnameth": "ชมรมอาสา",
                    "org_nickname": "VC",
                    "campus": { "name": "วิทยาเขตบางเขน" }
                }
            },
            {
                "id": "p-2",
                "project_name_en": "Robot Day",
                "activity_hours": "not json",
                "outside_kaset": "{\"district\":\"Mueang\",\"province\":\"Nan\"}",
                "Organization": { "id": "org-7", "orgnameen": "Volunteer Club" }
            },
            {
                "id": "p-3",
                "project_name_en": "Chess Open",
                "organization_orgid": "org-9"
            }
        ],
        "organizations": [
            {
                "id": "org-7",
                "orgnameen": "Volunteer Club",
                "orgnameth": "ชมรมอาสา",
                "organizationMark": "vc.png",
                "views": "5",
                "org_nickname": "VC",
                "org_type": { "name": "ชมรมด้านบำเพ็ญประโยชน์" },
                "campus": { "name": "วิทยาเขตบางเขน" }
            },
            {
                "id": "org-9",
                "orgnameen": "Chess Club",
                "views": null
            }
        ],
        "campuses": [
            { "id": "1", "name": "วิทยาเขตบางเขน" },
            { "id": "2", "name": "วิทยาเขตกำแพงแสน" }
        ],
        "organizationsType": ["ชมรมด้านกีฬา"]
    })
}

#[derive(Clone)]
struct MockState {
    dataset: Arc<Value>,
    views: Arc<Mutex<HashMap<String, i64>>>,
    auth_seen: Arc<Mutex<Vec<Option<String>>>>,
    failing: bool,
    delay: Option<Duration>,
}

/// In-process stand-in for the upstream service, bound to an ephemeral port.
pub struct MockUpstream {
    pub base_url: String,
    state: MockState,
}

impl MockUpstream {
    pub async fn start(dataset: Value) -> Result<Self> {
        Self::spawn(dataset, false, None).await
    }

    /// Every request answers 500.
    pub async fn failing() -> Result<Self> {
        Self::spawn(json!({}), true, None).await
    }

    /// Serves `dataset`, but only after `delay`.
    pub async fn slow(dataset: Value, delay: Duration) -> Result<Self> {
        Self::spawn(dataset, false, Some(delay)).await
    }

    async fn spawn(dataset: Value, failing: bool, delay: Option<Duration>) -> Result<Self> {
        let views = dataset["organizations"]
            .as_array()
            .map(|orgs| {
                orgs.iter()
                    .filter_map(|org| {
                        let id = org["id"].as_str()?.to_string();
                        let views = match &org["views"] {
                            Value::String(s) => s.parse().unwrap_or(0),
                            other => other.as_i64().unwrap_or(0),
                        };
                        Some((id, views))
                    })
                    .collect()
            })
            .unwrap_or_default();

        let state = MockState {
            dataset: Arc::new(dataset),
            views: Arc::new(Mutex::new(views)),
            auth_seen: Arc::new(Mutex::new(Vec::new())),
            failing,
            delay,
        };

        let app = Router::new()
            .route("/trpc/kuclub", get(serve_dataset))
            .route("/api/organization/:id/view", put(increment_view))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            base_url: format!("http://{}", addr),
            state,
        })
    }

    pub fn dataset_url(&self) -> String {
        format!("{}/trpc/kuclub", self.base_url)
    }

    /// Authorization headers received on view updates, in order.
    pub fn auth_seen(&self) -> Vec<Option<String>> {
        self.state.auth_seen.lock().unwrap().clone()
    }
}

async fn serve_dataset(State(state): State<MockState>) -> Response {
    if let Some(delay) = state.delay {
        tokio::time::sleep(delay).await;
    }
    if state.failing {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    Json(json!({ "result": { "data": { "json": state.dataset.as_ref().clone() } } })).into_response()
}

async fn increment_view(
    State(state): State<MockState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if state.failing {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    if body != json!({ "action": "increment_view" }) {
        return StatusCode::BAD_REQUEST.into_response();
    }

    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.auth_seen.lock().unwrap().push(auth);

    let mut views = state.views.lock().unwrap();
    match views.get_mut(&id) {
        Some(count) => {
            *count += 1;
            Json(json!({ "success": true, "organization": { "id": id, "views": *count } })).into_response()
        }
        None => (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" }))).into_response(),
    }
}

/// Development config pointed at `upstream`; `overrides` win over the defaults.
pub fn upstream_config(upstream: &MockUpstream, overrides: &[(&str, &str)]) -> Result<AppConfig> {
    let mut vars: HashMap<String, String> = HashMap::new();
    vars.insert("JWT_SECRET".into(), JWT_SECRET.into());
    vars.insert("CLIENT_SECRET".into(), CLIENT_SECRET.into());
    vars.insert("UPSTREAM_DATASET_URL".into(), upstream.dataset_url());
    vars.insert("UPSTREAM_BASE_URL".into(), upstream.base_url.clone());
    vars.insert("UPSTREAM_API_KEY".into(), UPSTREAM_KEY.into());
    vars.insert("UPSTREAM_TIMEOUT_SECS".into(), "2".into());
    for (name, value) in overrides {
        vars.insert(name.to_string(), value.to_string());
    }

    AppConfig::from_lookup(|name| vars.get(name).cloned()).context("test config")
}

/// Router for in-memory `oneshot` requests. The upstream source does not
/// connect at startup, so an unreachable URL is fine here.
pub async fn offline_router(overrides: &[(&str, &str)]) -> Result<Router> {
    let mut vars: HashMap<String, String> = HashMap::new();
    vars.insert("JWT_SECRET".into(), JWT_SECRET.into());
    vars.insert("CLIENT_SECRET".into(), CLIENT_SECRET.into());
    vars.insert("UPSTREAM_DATASET_URL".into(), "http://127.0.0.1:9/trpc/kuclub".into());
    for (name, value) in overrides {
        vars.insert(name.to_string(), value.to_string());
    }

    let config = AppConfig::from_lookup(|name| vars.get(name).cloned())?;
    let repository = Repository::from_config(&config).await?;
    Ok(server::app(AppState::new(config, repository)))
}

/// The API served over a real socket, with a client that knows its address.
pub struct TestApp {
    pub base_url: String,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn(config: AppConfig) -> Result<Self> {
        let repository = Repository::from_config(&config).await?;
        let app = server::app(AppState::new(config, repository));

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            base_url: format!("http://{}", addr),
            client: reqwest::Client::new(),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn token(&self) -> Result<String> {
        let body: Value = self
            .client
            .post(self.url("/api/auth/get-token"))
            .header("x-client-secret", CLIENT_SECRET)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        body["token"]
            .as_str()
            .map(str::to_string)
            .context("token missing from response")
    }

    /// Authenticated GET returning status and JSON body.
    pub async fn get(&self, path: &str) -> Result<(reqwest::StatusCode, Value)> {
        let token = self.token().await?;
        let res = self.client.get(self.url(path)).bearer_auth(token).send().await?;
        let status = res.status();
        Ok((status, res.json().await?))
    }

    /// Authenticated PUT returning status and JSON body.
    pub async fn put(&self, path: &str) -> Result<(reqwest::StatusCode, Value)> {
        let token = self.token().await?;
        let res = self.client.put(self.url(path)).bearer_auth(token).send().await?;
        let status = res.status();
        Ok((status, res.json().await?))
    }
}
