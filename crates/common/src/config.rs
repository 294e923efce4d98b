//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Authentication and session configuration.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Event listing configuration.
    #[serde(default)]
    pub events: EventsConfig,
    /// Instance metadata.
    #[serde(default)]
    pub instance: InstanceConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Authentication configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Lifetime of a signed-in session, in hours.
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: i64,
    /// Owner account created at startup when no account with this name exists.
    #[serde(default)]
    pub bootstrap_owner: Option<BootstrapOwner>,
}

/// Credentials of the owner account seeded at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapOwner {
    /// Username of the owner account.
    pub username: String,
    /// Initial password of the owner account.
    pub password: String,
}

/// Event listing configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EventsConfig {
    /// Maximum number of featured events shown on the landing page.
    #[serde(default = "default_featured_limit")]
    pub featured_limit: u64,
    /// Ticket button label used when a submission leaves it blank.
    #[serde(default = "default_ticket_button_label")]
    pub default_ticket_button_label: String,
}

/// Instance metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct InstanceConfig {
    /// Display name of this instance.
    #[serde(default = "default_instance_name")]
    pub name: String,
    /// Contact email shown to users.
    #[serde(default)]
    pub contact_email: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_hours: default_session_ttl_hours(),
            bootstrap_owner: None,
        }
    }
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            featured_limit: default_featured_limit(),
            default_ticket_button_label: default_ticket_button_label(),
        }
    }
}

impl Default for InstanceConfig {
    fn default() -> Self {
        Self {
            name: default_instance_name(),
            contact_email: None,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    100
}

const fn default_min_connections() -> u32 {
    5
}

const fn default_session_ttl_hours() -> i64 {
    24 * 30
}

const fn default_featured_limit() -> u64 {
    2
}

fn default_ticket_button_label() -> String {
    "Purchase tickets".to_string()
}

fn default_instance_name() -> String {
    "Nightline".to_string()
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `NIGHTLINE_ENV`)
    /// 3. Environment variables with `NIGHTLINE_` prefix
    ///
    /// A `.env` file in the working directory is read first, if present.
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let env = std::env::var("NIGHTLINE_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("NIGHTLINE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("NIGHTLINE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
