use std::sync::Arc;

use keydash::application::key_settings::{KeyAccessError, KeySettingsService};
use keydash::application::repos::KeysRepo;
use keydash::domain::keys::{KeyRatelimit, KeyRefill, RefillInterval};
use keydash::domain::tenant::TenantContext;
use keydash::infra::db::PostgresRepositories;
use sqlx::PgPool;
use time::macros::datetime;

async fn seed(pool: &PgPool) {
    sqlx::query(
        "INSERT INTO workspaces (id, tenant_id, name) VALUES
            ('ws_1', 'tenant_A', 'Acme'),
            ('ws_2', 'tenant_B', 'Globex')",
    )
    .execute(pool)
    .await
    .expect("seed workspaces");

    sqlx::query("INSERT INTO key_auth (id, workspace_id) VALUES ('ks_1', 'ws_1')")
        .execute(pool)
        .await
        .expect("seed key_auth");

    sqlx::query(
        "INSERT INTO apis (id, name, workspace_id, key_auth_id)
         VALUES ('api_1', 'Payments', 'ws_1', 'ks_1')",
    )
    .execute(pool)
    .await
    .expect("seed api");

    sqlx::query(
        "INSERT INTO keys (
            id, key_auth_id, workspace_id, hash, start, name, owner_id, meta,
            created_at, expires, enabled, remaining, refill_interval, refill_amount,
            ratelimit_async, ratelimit_limit, ratelimit_duration
        ) VALUES (
            'key_live', 'ks_1', 'ws_1', 'hash_live', 'kd_9f2', 'Production', 'user_42',
            '{\"plan\":\"pro\"}', '2024-05-01 08:00:00+00', '2030-01-01 00:00:00+00', TRUE,
            100, 'monthly', 1000, TRUE, 10, 60000
        )",
    )
    .execute(pool)
    .await
    .expect("seed live key");

    sqlx::query(
        "INSERT INTO keys (id, key_auth_id, workspace_id, hash, start, deleted_at)
         VALUES ('key_deleted', 'ks_1', 'ws_1', 'hash_deleted', 'kd_0aa', now())",
    )
    .execute(pool)
    .await
    .expect("seed deleted key");
}

#[sqlx::test(migrations = "./migrations")]
async fn live_key_hydrates_every_relation(pool: PgPool) {
    seed(&pool).await;
    let repos = PostgresRepositories::new(pool);

    let found = repos
        .find_live_key("key_live")
        .await
        .expect("lookup should succeed")
        .expect("live key should be found");

    assert_eq!(found.key.id, "key_live");
    assert_eq!(found.key.start, "kd_9f2");
    assert_eq!(found.key.name.as_deref(), Some("Production"));
    assert_eq!(found.key.owner_id.as_deref(), Some("user_42"));
    assert_eq!(found.key.meta.as_deref(), Some(r#"{"plan":"pro"}"#));
    assert_eq!(found.key.created_at, datetime!(2024-05-01 08:00 UTC));
    assert_eq!(found.key.expires, Some(datetime!(2030-01-01 00:00 UTC)));
    assert!(found.key.deleted_at.is_none());
    assert!(found.key.enabled);
    assert_eq!(found.key.remaining, Some(100));
    assert_eq!(
        found.key.refill,
        Some(KeyRefill {
            interval: RefillInterval::Monthly,
            amount: 1000,
        })
    );
    assert_eq!(
        found.key.ratelimit,
        Some(KeyRatelimit {
            limit: 10,
            duration_ms: 60_000,
            asynchronous: true,
        })
    );

    assert_eq!(found.workspace.id, "ws_1");
    assert_eq!(found.workspace.tenant_id, "tenant_A");
    assert_eq!(found.workspace.name, "Acme");
    assert_eq!(found.key_auth.id, "ks_1");
    assert_eq!(found.key_auth.api.id, "api_1");
    assert_eq!(found.key_auth.api.name, "Payments");
}

#[sqlx::test(migrations = "./migrations")]
async fn deleted_and_unknown_keys_are_absent(pool: PgPool) {
    seed(&pool).await;
    let repos = PostgresRepositories::new(pool);

    for key_id in ["key_deleted", "key_missing"] {
        let found = repos.find_live_key(key_id).await.expect("lookup should succeed");
        assert!(found.is_none(), "{key_id} should not be returned");
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn service_scopes_stored_keys_to_their_tenant(pool: PgPool) {
    seed(&pool).await;
    let service = KeySettingsService::new(Arc::new(PostgresRepositories::new(pool)));
    let owner = TenantContext::new("tenant_A").expect("tenant");
    let stranger = TenantContext::new("tenant_B").expect("tenant");

    let loaded = service.load(&owner, "key_live").await.expect("owner loads key");
    assert_eq!(loaded.key_auth.api.name, "Payments");

    for (tenant, key_id) in [
        (&stranger, "key_live"),
        (&owner, "key_deleted"),
        (&stranger, "key_deleted"),
        (&owner, "key_missing"),
        (&owner, "key\0live"),
    ] {
        let result = service.load(tenant, key_id).await;
        assert!(
            matches!(result, Err(KeyAccessError::NotFound)),
            "{key_id:?} for {tenant} should be not found"
        );
    }
}
