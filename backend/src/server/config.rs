//! Service configuration loaded via OrthoConfig.
//!
//! Values come from the settings file named on the command line (YAML or
//! TOML, picked by extension), then from `ENV_*` environment variables
//! (`ENV_SERVER_PORT`, `ENV_DATABASE_HOST`, ...). Keys are flat: the
//! `Server.Port` setting is spelled `server_port` in the file and
//! `ENV_SERVER_PORT` in the environment. Numeric settings carry defaults so
//! an empty environment still yields a dev-mode configuration.

use std::ffi::OsString;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use chrono::TimeDelta;
use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::outbound::persistence::PoolConfig;

const DEFAULT_BASE_PATH: &str = "/v1/stellar";
const DEFAULT_DATABASE_NAME: &str = "db_stellar";
const DEFAULT_DATABASE_USER: &str = "stellar_manager";

/// Where [`ServiceSettings::load_with_fallback`] found its values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsSource {
    /// The named settings file, overlaid by the environment.
    File,
    /// The file was missing; environment and defaults only.
    EnvironmentOnly,
}

/// Flat settings for the HTTP service.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ENV")]
pub struct ServiceSettings {
    /// Path prefix for every route.
    pub server_base_path: Option<String>,
    /// Listening port.
    #[ortho_config(default = 80)]
    pub server_port: u16,
    /// Grace period for in-flight requests on shutdown.
    #[ortho_config(default = 5)]
    pub server_shutdown_timeout_secs: u64,
    /// Database host; without it the service runs on the in-memory store.
    pub database_host: Option<String>,
    #[ortho_config(default = 5432)]
    pub database_port: u16,
    pub database_name: Option<String>,
    pub database_user: Option<String>,
    pub database_password: Option<String>,
    #[ortho_config(default = 10)]
    pub database_connections_pool_size: u32,
    /// Log filter applied to Diesel's targets.
    pub database_log_level: Option<String>,
    /// How long a request waits for a busy planet before answering 503.
    #[ortho_config(default = 5000)]
    pub game_gate_timeout_ms: u64,
    #[ortho_config(default = 100)]
    pub throttle_capacity: u32,
    #[ortho_config(default = 20)]
    pub throttle_refill_per_second: u32,
    /// Lifetime of API keys issued at login.
    #[ortho_config(default = 3600)]
    pub api_key_validity_secs: i64,
}

impl ServiceSettings {
    pub fn base_path(&self) -> String {
        let raw = self
            .server_base_path
            .as_deref()
            .unwrap_or(DEFAULT_BASE_PATH)
            .trim_end_matches('/');
        if raw.is_empty() || raw.starts_with('/') {
            raw.to_owned()
        } else {
            format!("/{raw}")
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.server_port))
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.server_shutdown_timeout_secs)
    }

    pub fn gate_timeout(&self) -> Duration {
        Duration::from_millis(self.game_gate_timeout_ms)
    }

    pub fn throttle(&self) -> (u32, u32) {
        (self.throttle_capacity, self.throttle_refill_per_second)
    }

    pub fn api_key_validity(&self) -> TimeDelta {
        TimeDelta::seconds(self.api_key_validity_secs.max(1))
    }

    pub fn database_log_level(&self) -> &str {
        self.database_log_level.as_deref().unwrap_or("warn")
    }

    /// Connection URL, or `None` in dev mode.
    pub fn database_url(&self) -> Option<String> {
        let host = self.database_host.as_deref().filter(|host| !host.is_empty())?;
        let name = self
            .database_name
            .as_deref()
            .unwrap_or(DEFAULT_DATABASE_NAME);
        let user = self
            .database_user
            .as_deref()
            .unwrap_or(DEFAULT_DATABASE_USER);
        let credentials = match self.database_password.as_deref() {
            Some(password) => format!("{user}:{password}"),
            None => user.to_owned(),
        };
        Some(format!(
            "postgres://{credentials}@{host}:{port}/{name}",
            port = self.database_port
        ))
    }

    /// Pool settings for the configured database, or `None` in dev mode.
    /// Load settings from `path` when it names a file, otherwise from the
    /// environment and defaults alone.
    pub fn load_with_fallback(path: &Path) -> std::io::Result<(Self, SettingsSource)> {
        let mut args = vec![OsString::from("stellar-backend")];
        let source = if path.is_file() {
            args.push(OsString::from("--config-path"));
            args.push(path.as_os_str().to_owned());
            SettingsSource::File
        } else {
            SettingsSource::EnvironmentOnly
        };
        let settings = Self::load_from_iter(args)
            .map_err(|e| std::io::Error::other(format!("failed to load settings: {e}")))?;
        Ok((settings, source))
    }

    pub fn pool_config(&self) -> Option<PoolConfig> {
        self.database_url()
            .map(|url| PoolConfig::new(url).with_max_size(self.database_connections_pool_size))
    }
}
