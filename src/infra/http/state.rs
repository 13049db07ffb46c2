use std::sync::Arc;

use crate::application::key_settings::KeySettingsService;
use crate::infra::db::PostgresRepositories;

use super::tenant::TenantResolver;

#[derive(Clone)]
pub struct DashboardState {
    pub db: Arc<PostgresRepositories>,
    pub key_settings: Arc<KeySettingsService>,
    pub tenant_resolver: TenantResolver,
}
