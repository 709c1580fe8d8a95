use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Server {
    pub listen: String,
    /// Origin used to build referral, admin and share links.
    pub public_origin: String,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default)]
    pub run_migrations: bool,
}

#[derive(Debug, Deserialize)]
pub struct Auth {
    pub url: String,
    pub api_key: String,
}

#[derive(Debug, Deserialize)]
pub struct Functions {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Resilience {
    pub timeout_ms: u64,
    pub max_attempts: u32,
    pub backoff_ms: u64,
}

impl Default for Resilience {
    fn default() -> Self {
        Self {
            timeout_ms: 5000,
            max_attempts: 3,
            backoff_ms: 250,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: Server,
    pub postgres: Postgres,
    pub auth: Auth,
    pub functions: Functions,
    #[serde(default)]
    pub resilience: Resilience,
}

fn default_max_connections() -> u32 {
    5
}

impl Settings {
    pub fn new(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(Environment::with_prefix("PORTAL").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
