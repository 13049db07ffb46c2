use time::OffsetDateTime;

use crate::application::repos::{KeysRepo, RepoError};
use crate::domain::keys::{
    ApiRecord, KeyAuthRecord, KeyRatelimit, KeyRecord, KeyRefill, KeyWithRelations,
    RefillInterval, WorkspaceRecord,
};

use super::{PostgresRepositories, map_sqlx_error};

const FIND_LIVE_KEY_SQL: &str = r#"
    SELECT
        k.id,
        k.key_auth_id,
        k.workspace_id,
        k.start,
        k.name,
        k.owner_id,
        k.meta,
        k.created_at,
        k.expires,
        k.deleted_at,
        k.enabled,
        k.remaining,
        k.refill_interval,
        k.refill_amount,
        k.ratelimit_async,
        k.ratelimit_limit,
        k.ratelimit_duration,
        w.tenant_id AS workspace_tenant_id,
        w.name AS workspace_name,
        a.id AS api_id,
        a.name AS api_name
    FROM keys k
    INNER JOIN workspaces w ON w.id = k.workspace_id
    INNER JOIN key_auth ka ON ka.id = k.key_auth_id
    INNER JOIN apis a ON a.key_auth_id = ka.id
    WHERE k.id = $1
      AND k.deleted_at IS NULL
    LIMIT 1
"#;

#[derive(Debug, sqlx::FromRow)]
struct KeyWithRelationsRow {
    id: String,
    key_auth_id: String,
    workspace_id: String,
    start: String,
    name: Option<String>,
    owner_id: Option<String>,
    meta: Option<String>,
    created_at: OffsetDateTime,
    expires: Option<OffsetDateTime>,
    deleted_at: Option<OffsetDateTime>,
    enabled: bool,
    remaining: Option<i32>,
    refill_interval: Option<String>,
    refill_amount: Option<i32>,
    ratelimit_async: Option<bool>,
    ratelimit_limit: Option<i32>,
    ratelimit_duration: Option<i64>,
    workspace_tenant_id: String,
    workspace_name: String,
    api_id: String,
    api_name: String,
}

impl TryFrom<KeyWithRelationsRow> for KeyWithRelations {
    type Error = RepoError;

    fn try_from(row: KeyWithRelationsRow) -> Result<Self, Self::Error> {
        let refill = match (row.refill_interval.as_deref(), row.refill_amount) {
            (Some(raw), Some(amount)) => {
                let interval = raw.parse::<RefillInterval>().map_err(|err| {
                    RepoError::integrity(format!("key `{}`: {err}", row.id))
                })?;
                Some(KeyRefill { interval, amount })
            }
            _ => None,
        };

        let ratelimit = match (row.ratelimit_limit, row.ratelimit_duration) {
            (Some(limit), Some(duration_ms)) => Some(KeyRatelimit {
                limit,
                duration_ms,
                asynchronous: row.ratelimit_async.unwrap_or(false),
            }),
            _ => None,
        };

        Ok(KeyWithRelations {
            key: KeyRecord {
                id: row.id,
                key_auth_id: row.key_auth_id.clone(),
                workspace_id: row.workspace_id.clone(),
                start: row.start,
                name: row.name,
                owner_id: row.owner_id,
                meta: row.meta,
                created_at: row.created_at,
                expires: row.expires,
                deleted_at: row.deleted_at,
                enabled: row.enabled,
                remaining: row.remaining,
                refill,
                ratelimit,
            },
            workspace: WorkspaceRecord {
                id: row.workspace_id,
                tenant_id: row.workspace_tenant_id,
                name: row.workspace_name,
            },
            key_auth: KeyAuthRecord {
                id: row.key_auth_id,
                api: ApiRecord {
                    id: row.api_id,
                    name: row.api_name,
                },
            },
        })
    }
}

#[async_trait::async_trait]
impl KeysRepo for PostgresRepositories {
    async fn find_live_key(&self, key_id: &str) -> Result<Option<KeyWithRelations>, RepoError> {
        let row = sqlx::query_as::<_, KeyWithRelationsRow>(FIND_LIVE_KEY_SQL)
            .bind(key_id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        row.map(KeyWithRelations::try_from).transpose()
    }
}
