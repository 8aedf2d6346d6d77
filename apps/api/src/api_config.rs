use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use ems_core::AppError;
use tracing_subscriber::EnvFilter;
use url::Url;

const DEFAULT_MANAGER_ROLE_NAMES: &str = "Super Admin,Admin";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionStoreConfig {
    Memory,
    Http {
        base_url: Url,
        bearer_token: Option<String>,
        request_timeout: Duration,
    },
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub frontend_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub permission_store: PermissionStoreConfig,
    pub save_timeout: Duration,
    pub session_idle_timeout: Duration,
    pub manager_role_names: Vec<String>,
    pub viewer_role_names: Vec<String>,
    pub excluded_permission_modules: Option<Vec<String>>,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let frontend_url =
            lookup("FRONTEND_URL").unwrap_or_else(|| "http://localhost:3000".to_owned());
        let api_host = lookup("API_HOST").unwrap_or_else(|| "127.0.0.1".to_owned());
        let api_port = lookup("API_PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);

        let permission_store = match lookup("PERMISSION_STORE")
            .unwrap_or_else(|| "memory".to_owned())
            .trim()
            .to_ascii_lowercase()
            .as_str()
        {
            "memory" => PermissionStoreConfig::Memory,
            "http" => {
                let raw_url = required_non_empty(&lookup, "PERMISSION_STORE_URL")?;
                let base_url = Url::parse(raw_url.trim()).map_err(|error| {
                    AppError::Validation(format!("invalid PERMISSION_STORE_URL: {error}"))
                })?;
                PermissionStoreConfig::Http {
                    base_url,
                    bearer_token: lookup("PERMISSION_STORE_TOKEN")
                        .filter(|value| !value.trim().is_empty()),
                    request_timeout: seconds(&lookup, "PERMISSION_STORE_TIMEOUT_SECS", 15)?,
                }
            }
            other => {
                return Err(AppError::Validation(format!(
                    "PERMISSION_STORE must be either 'memory' or 'http', got '{other}'"
                )));
            }
        };

        let manager_role_names = comma_list(
            lookup("ROLE_MANAGER_NAMES")
                .unwrap_or_else(|| DEFAULT_MANAGER_ROLE_NAMES.to_owned())
                .as_str(),
        );
        let viewer_role_names = lookup("ROLE_VIEWER_NAMES")
            .map(|value| comma_list(value.as_str()))
            .unwrap_or_default();
        let excluded_permission_modules = lookup("EXCLUDED_PERMISSION_MODULES")
            .filter(|value| !value.trim().is_empty())
            .map(|value| comma_list(value.as_str()));

        Ok(Self {
            frontend_url,
            api_host,
            api_port,
            permission_store,
            save_timeout: seconds(&lookup, "SAVE_TIMEOUT_SECS", 30)?,
            session_idle_timeout: seconds(&lookup, "EDITOR_SESSION_IDLE_SECS", 30 * 60)?,
            manager_role_names,
            viewer_role_names,
            excluded_permission_modules,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_non_empty<F>(lookup: &F, name: &str) -> Result<String, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(name).ok_or_else(|| AppError::Validation(format!("{name} is required")))?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}

fn seconds<F>(lookup: &F, name: &str, default: u64) -> Result<Duration, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = lookup(name).filter(|value| !value.trim().is_empty()) else {
        return Ok(Duration::from_secs(default));
    };

    match value.trim().parse::<u64>() {
        Ok(0) => Err(AppError::Validation(format!("{name} must be greater than zero"))),
        Ok(seconds) => Ok(Duration::from_secs(seconds)),
        Err(error) => Err(AppError::Validation(format!("invalid {name}: {error}"))),
    }
}

fn comma_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}
