use std::collections::HashMap;
use std::sync::Arc;

use ems_application::{EditorAccessPolicy, EditorSettings, PermissionStore};
use ems_core::AppError;
use ems_domain::GroupingPolicy;
use ems_infrastructure::{
    HttpPermissionStore, InMemoryNotificationOutbox, InMemoryPermissionStore,
};
use tokio::sync::RwLock;
use tracing::info;

use crate::api_config::{ApiConfig, PermissionStoreConfig};
use crate::dev_seed;
use crate::state::AppState;

pub async fn build_app_state(config: &ApiConfig) -> Result<AppState, AppError> {
    let permission_store = build_permission_store(&config.permission_store).await?;

    let grouping_policy = match &config.excluded_permission_modules {
        Some(modules) => GroupingPolicy::default().with_excluded_modules(modules.iter().cloned()),
        None => GroupingPolicy::default(),
    };

    Ok(AppState {
        permission_store,
        outbox: Arc::new(InMemoryNotificationOutbox::new()),
        access_policy: EditorAccessPolicy::new(
            config.manager_role_names.clone(),
            config.viewer_role_names.clone(),
        ),
        grouping_policy,
        editor_settings: EditorSettings {
            save_timeout: config.save_timeout,
        },
        sessions: Arc::new(RwLock::new(HashMap::new())),
        session_idle_timeout: config.session_idle_timeout,
        frontend_url: config.frontend_url.clone(),
    })
}

async fn build_permission_store(
    config: &PermissionStoreConfig,
) -> Result<Arc<dyn PermissionStore>, AppError> {
    match config {
        PermissionStoreConfig::Memory => {
            let store = InMemoryPermissionStore::new();
            dev_seed::seed_permission_store(&store).await?;
            info!("using seeded in-memory permission store");
            Ok(Arc::new(store))
        }
        PermissionStoreConfig::Http {
            base_url,
            bearer_token,
            request_timeout,
        } => {
            let http_client = reqwest::Client::builder()
                .timeout(*request_timeout)
                .build()
                .map_err(|error| {
                    AppError::Internal(format!("failed to build permission store client: {error}"))
                })?;
            info!(base_url = %base_url, "using http permission store");
            Ok(Arc::new(HttpPermissionStore::new(
                http_client,
                base_url.clone(),
                bearer_token.clone(),
            )?))
        }
    }
}
