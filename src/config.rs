//! Application configuration
//!
//! Sources, lowest precedence first:
//!
//! 1. built-in defaults
//! 2. an optional YAML/TOML/JSON file (`--config`)
//! 3. `SUPPORT_TICKETS__<SECTION>__<KEY>` environment variables

use crate::core::{DEFAULT_PAGE_SIZE, LifecyclePolicy};
use crate::error::{Result, TicketError};
use crate::handlers::{DEFAULT_LOGIN_URL, HandlerSettings};
use config::{Config, ConfigError, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::{Path, PathBuf};

pub const ENV_PREFIX: &str = "SUPPORT_TICKETS";
pub const DEFAULT_USER_HEADER: &str = "x-remote-user";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub storage: StorageSettings,
    pub attachments: AttachmentSettings,
    pub auth: AuthSettings,
    pub tickets: TicketSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// One YAML file per record under `data_dir`
    File,
    /// Process memory; everything is lost on exit
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentSettings {
    pub root: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSettings {
    pub login_url: String,
    /// Header carrying the authenticated user id
    pub user_header: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketSettings {
    pub page_size: usize,
    pub lifecycle: LifecyclePolicy,
}

/// Platform data directory, or `./data` when none can be determined
pub fn default_data_dir() -> PathBuf {
    ProjectDirs::from("", "", "support-tickets")
        .map_or_else(|| PathBuf::from("data"), |dirs| dirs.data_dir().to_path_buf())
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

impl Settings {
    /// Load settings from defaults, `path` and the process environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    /// Like [`Settings::load`], reading variables from `env` instead of the
    /// process environment when given
    pub fn load_with_env(path: Option<&Path>, env: Option<HashMap<String, String>>) -> Result<Self> {
        let data_dir = default_data_dir();
        let mut builder = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8000_i64)?
            .set_default("storage.backend", "file")?
            .set_default("storage.data_dir", path_string(&data_dir))?
            .set_default("attachments.root", path_string(&data_dir.join("media")))?
            .set_default("auth.login_url", DEFAULT_LOGIN_URL)?
            .set_default("auth.user_header", DEFAULT_USER_HEADER)?
            .set_default("tickets.page_size", i64::try_from(DEFAULT_PAGE_SIZE).unwrap_or(10))?
            .set_default("tickets.lifecycle", "strict")?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path.to_path_buf()).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        let settings: Self = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.tickets.page_size == 0 {
            return Err(ConfigError::Message("tickets.page_size must be at least 1".into()).into());
        }
        if !self.auth.login_url.starts_with('/') && !self.auth.login_url.starts_with("http") {
            return Err(ConfigError::Message(format!(
                "auth.login_url must be a path or an absolute URL: {}",
                self.auth.login_url
            ))
            .into());
        }
        Ok(())
    }

    /// Address the HTTP server binds to
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        (self.server.host.as_str(), self.server.port)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| {
                TicketError::Config(ConfigError::Message(format!(
                    "cannot resolve server address {}:{}",
                    self.server.host, self.server.port
                )))
            })
    }

    pub fn handler_settings(&self) -> HandlerSettings {
        HandlerSettings {
            login_url: self.auth.login_url.clone(),
            page_size: self.tickets.page_size,
        }
    }

    /// Settings as YAML, for display
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}
