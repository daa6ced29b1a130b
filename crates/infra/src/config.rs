//! Configuration loading and representation.
//!
//! Everything is read from environment variables once at startup.

use thiserror::Error;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a boolean, got '{value}'")]
    InvalidBool { name: &'static str, value: String },

    #[error("{0} is required when USE_PERSISTENT_STORES=true")]
    Missing(&'static str),
}

/// Business switches for the offer lifecycle service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleConfig {
    /// Approve sellers as soon as they register.
    pub auto_approve_sellers: bool,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            auto_approve_sellers: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: String,
    pub jwt_secret: String,
    pub use_persistent_stores: bool,
    pub database_url: Option<String>,
    pub lifecycle: LifecycleConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source (tests pass a map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        let jwt_secret = lookup("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            DEV_JWT_SECRET.to_string()
        });

        let use_persistent_stores = parse_bool(&lookup, "USE_PERSISTENT_STORES", false)?;
        let database_url = lookup("DATABASE_URL").filter(|v| !v.trim().is_empty());
        if use_persistent_stores && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let auto_approve_sellers = parse_bool(&lookup, "AUTO_APPROVE_SELLERS", true)?;

        Ok(Self {
            bind_addr,
            jwt_secret,
            use_persistent_stores,
            database_url,
            lifecycle: LifecycleConfig {
                auto_approve_sellers,
            },
        })
    }

    /// In-memory configuration for tests and local runs.
    pub fn in_memory(jwt_secret: impl Into<String>) -> Self {
        Self {
            bind_addr: "127.0.0.1:0".to_string(),
            jwt_secret: jwt_secret.into(),
            use_persistent_stores: false,
            database_url: None,
            lifecycle: LifecycleConfig::default(),
        }
    }
}

fn parse_bool<F>(lookup: &F, name: &'static str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "" => Ok(default),
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => Err(ConfigError::InvalidBool { name, value: raw }),
        },
    }
}
