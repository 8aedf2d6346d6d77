use async_trait::async_trait;
use ems_application::PermissionStore;
use ems_core::{AppError, AppResult};
use ems_domain::{
    Permission, PermissionCode, PermissionId, PermissionSet, PermissionUpdate, Role, RoleId,
};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

/// REST client for the upstream EMS role/permission endpoints.
pub struct HttpPermissionStore {
    http_client: reqwest::Client,
    base_url: Url,
    bearer_token: Option<String>,
}

impl HttpPermissionStore {
    /// Creates a store rooted at `base_url`.
    ///
    /// The base must be hierarchical (`http(s)://host/path`).
    pub fn new(
        http_client: reqwest::Client,
        base_url: Url,
        bearer_token: Option<String>,
    ) -> AppResult<Self> {
        if base_url.cannot_be_a_base() {
            return Err(AppError::Validation(format!(
                "permission store url '{base_url}' cannot be used as a base"
            )));
        }

        Ok(Self {
            http_client,
            base_url,
            bearer_token: bearer_token.filter(|token| !token.trim().is_empty()),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> AppResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                AppError::Validation(format!(
                    "permission store url '{}' cannot be used as a base",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.bearer_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
        operation: &str,
    ) -> AppResult<T> {
        let response = self.authorize(builder).send().await.map_err(|error| {
            warn!(operation, error = %error, "permission store transport error");
            AppError::Internal(format!("permission store {operation} transport error: {error}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<response body unavailable>".to_owned());
            warn!(operation, status = status.as_u16(), "permission store rejected request");
            return Err(map_status(status, operation, body.trim()));
        }

        debug!(operation, status = status.as_u16(), "permission store request succeeded");
        response.json::<T>().await.map_err(|error| {
            AppError::Internal(format!(
                "permission store {operation} returned an unreadable body: {error}"
            ))
        })
    }
}

#[async_trait]
impl PermissionStore for HttpPermissionStore {
    async fn list_roles(&self) -> AppResult<Vec<Role>> {
        let url = self.endpoint(&["roles"])?;
        let roles: Vec<RoleDto> = self
            .send(self.http_client.get(url), "list roles")
            .await?;

        roles.into_iter().map(Role::try_from).collect()
    }

    async fn get_permissions(&self, role_id: &RoleId) -> AppResult<PermissionSet> {
        let url = self.endpoint(&["roles", role_id.as_str(), "permissions"])?;
        let permissions: Vec<PermissionDto> = self
            .send(self.http_client.get(url), "get permissions")
            .await?;

        permission_set_from_dtos(permissions)
    }

    async fn update_permissions(
        &self,
        role_id: &RoleId,
        updates: Vec<PermissionUpdate>,
    ) -> AppResult<PermissionSet> {
        let url = self.endpoint(&["roles", role_id.as_str(), "permissions"])?;
        let body = UpdatePermissionsBody::from(updates);
        let permissions: Vec<PermissionDto> = self
            .send(self.http_client.put(url).json(&body), "update permissions")
            .await?;

        permission_set_from_dtos(permissions)
    }
}

fn map_status(status: StatusCode, operation: &str, body: &str) -> AppError {
    let detail = if body.is_empty() {
        format!("permission store {operation} failed with status {status}")
    } else {
        format!("permission store {operation} failed with status {status}: {body}")
    };

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AppError::Forbidden(detail),
        StatusCode::NOT_FOUND => AppError::NotFound(detail),
        StatusCode::CONFLICT => AppError::Conflict(detail),
        status if status.is_client_error() => AppError::Validation(detail),
        _ => AppError::Internal(detail),
    }
}

#[derive(Debug, Deserialize)]
struct RoleDto {
    id: String,
    name: String,
    #[serde(default)]
    description: Option<String>,
}

impl TryFrom<RoleDto> for Role {
    type Error = AppError;

    fn try_from(value: RoleDto) -> Result<Self, Self::Error> {
        Role::new(RoleId::new(value.id)?, value.name, value.description)
    }
}

#[derive(Debug, Deserialize)]
struct PermissionDto {
    id: String,
    module: String,
    code: String,
    allowed: bool,
}

impl TryFrom<PermissionDto> for Permission {
    type Error = AppError;

    fn try_from(value: PermissionDto) -> Result<Self, Self::Error> {
        Permission::new(
            PermissionId::new(value.id)?,
            value.module,
            PermissionCode::new(value.code)?,
            value.allowed,
        )
    }
}

fn permission_set_from_dtos(permissions: Vec<PermissionDto>) -> AppResult<PermissionSet> {
    let permissions = permissions
        .into_iter()
        .map(Permission::try_from)
        .collect::<AppResult<Vec<_>>>()?;

    PermissionSet::new(permissions)
}

#[derive(Debug, Serialize)]
struct UpdatePermissionsBody {
    permissions: Vec<PermissionUpdateDto>,
}

#[derive(Debug, Serialize)]
struct PermissionUpdateDto {
    permission_id: String,
    allowed: bool,
}

impl From<Vec<PermissionUpdate>> for UpdatePermissionsBody {
    fn from(updates: Vec<PermissionUpdate>) -> Self {
        Self {
            permissions: updates
                .into_iter()
                .map(|update| PermissionUpdateDto {
                    permission_id: update.permission_id.as_str().to_owned(),
                    allowed: update.allowed,
                })
                .collect(),
        }
    }
}
