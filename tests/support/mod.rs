#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, Bytes},
    http::{Request, Response},
};
use keydash::application::key_settings::KeySettingsService;
use keydash::application::repos::{KeysRepo, RepoError};
use keydash::domain::keys::{
    ApiRecord, KeyAuthRecord, KeyRecord, KeyRefill, KeyWithRelations, RefillInterval,
    WorkspaceRecord,
};
use keydash::infra::db::PostgresRepositories;
use keydash::infra::http::{DashboardState, TenantResolver, build_router};
use http_body_util::BodyExt;
use time::macros::datetime;
use tower::ServiceExt;

pub const TENANT_HEADER: &str = "x-authenticated-tenant";

#[derive(Default)]
pub struct FakeKeysRepo {
    keys: HashMap<String, KeyWithRelations>,
    calls: Mutex<Vec<String>>,
    fail: bool,
}

impl FakeKeysRepo {
    pub fn with_keys(keys: impl IntoIterator<Item = KeyWithRelations>) -> Self {
        Self {
            keys: keys
                .into_iter()
                .map(|key| (key.key.id.clone(), key))
                .collect(),
            ..Default::default()
        }
    }

    /// A repository whose every lookup times out.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("calls lock").len()
    }
}

#[async_trait]
impl KeysRepo for FakeKeysRepo {
    async fn find_live_key(&self, key_id: &str) -> Result<Option<KeyWithRelations>, RepoError> {
        self.calls
            .lock()
            .expect("calls lock")
            .push(key_id.to_string());
        if self.fail {
            return Err(RepoError::Timeout);
        }
        Ok(self
            .keys
            .get(key_id)
            .filter(|found| found.key.is_live())
            .cloned())
    }
}

pub fn hydrated_key(id: &str, tenant_id: &str) -> KeyWithRelations {
    KeyWithRelations {
        key: KeyRecord {
            id: id.to_string(),
            key_auth_id: "ks_1".to_string(),
            workspace_id: "ws_1".to_string(),
            start: "kd_9f2".to_string(),
            name: Some("Production".to_string()),
            owner_id: Some("user_42".to_string()),
            meta: Some(r#"{"plan":"pro"}"#.to_string()),
            created_at: datetime!(2024-05-01 08:00 UTC),
            expires: None,
            deleted_at: None,
            enabled: true,
            remaining: Some(100),
            refill: Some(KeyRefill {
                interval: RefillInterval::Daily,
                amount: 100,
            }),
            ratelimit: None,
        },
        workspace: WorkspaceRecord {
            id: "ws_1".to_string(),
            tenant_id: tenant_id.to_string(),
            name: "Acme".to_string(),
        },
        key_auth: KeyAuthRecord {
            id: "ks_1".to_string(),
            api: ApiRecord {
                id: "api_1".to_string(),
                name: "Payments".to_string(),
            },
        },
    }
}

/// Router backed by `repo`; the pool never dials because no route under test touches it.
pub fn router(repo: Arc<FakeKeysRepo>) -> Router {
    let pool = PostgresRepositories::connect_lazy("postgres://keydash@127.0.0.1:1/keydash", 1)
        .expect("lazy pool should build");
    let state = DashboardState {
        db: Arc::new(PostgresRepositories::new(pool)),
        key_settings: Arc::new(KeySettingsService::new(repo)),
        tenant_resolver: TenantResolver::from_header_name(TENANT_HEADER)
            .expect("valid tenant header"),
    };
    build_router(state)
}

pub fn get(uri: &str, tenant: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(tenant) = tenant {
        builder = builder.header(TENANT_HEADER, tenant);
    }
    builder.body(Body::empty()).expect("request should build")
}

pub async fn send(router: &Router, request: Request<Body>) -> Response<Body> {
    router
        .clone()
        .oneshot(request)
        .await
        .expect("router should respond")
}

pub async fn body_bytes(response: Response<Body>) -> Bytes {
    response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes()
}

pub async fn body_text(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await.to_vec()).expect("utf8 body")
}
