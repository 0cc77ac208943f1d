// common/src/config.rs
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use config::{Config as ConfigFile, File, Environment};

/// Three days, the validity window of an issued access token.
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 3 * 24 * 60 * 60;

/// Central configuration for the server process
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server_addr: String,
    pub jwt: JwtConfig,
    pub password: PasswordConfig,
    pub cors: CorsConfig,
    pub chat: ChatConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_secs: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordConfig {
    pub bcrypt_cost: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// JSON-lines file backing the message log; in-memory when unset
    pub message_log_path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_addr: "127.0.0.1:8000".to_string(),
            jwt: JwtConfig::default(),
            password: PasswordConfig::default(),
            cors: CorsConfig::default(),
            chat: ChatConfig::default(),
        }
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "change-me".to_string(),
            ttl_secs: DEFAULT_TOKEN_TTL_SECS,
        }
    }
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["http://localhost:5173".to_string()],
        }
    }
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self, config::ConfigError> {
        // Get the run mode, defaulting to "development"
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config_dir = env::var("CONFIG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                // Check if we're in the project root or a subcrate
                let mut path = PathBuf::from("./config");
                if !path.exists() {
                    path = PathBuf::from("../config");
                }
                path
            });

        tracing::info!("Loading configuration from {}", config_dir.display());
        tracing::info!("Using run mode: {}", run_mode);

        let config = ConfigFile::builder()
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            .add_source(File::from(config_dir.join(format!("{}.toml", run_mode))).required(false))
            .add_source(File::from(config_dir.join("local.toml")).required(false))
            // e.g. APP__JWT__SECRET overrides jwt.secret
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Load from files, falling back to plain environment variables
    pub fn from_env() -> Self {
        match Self::load() {
            Ok(config) => {
                tracing::info!("Configuration loaded from files and environment");
                config
            },
            Err(e) => {
                tracing::warn!("Failed to load configuration from files: {}", e);
                tracing::info!("Falling back to environment variables only");

                let defaults = Self::default();

                let server_addr = env::var("SERVER_ADDR")
                    .unwrap_or(defaults.server_addr);

                let secret = env::var("JWT_SECRET")
                    .unwrap_or(defaults.jwt.secret);

                let ttl_secs = env::var("JWT_TTL_SECS")
                    .ok()
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(defaults.jwt.ttl_secs);

                let bcrypt_cost = env::var("BCRYPT_COST")
                    .ok()
                    .and_then(|v| v.parse::<u32>().ok())
                    .unwrap_or(defaults.password.bcrypt_cost);

                let allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
                    .map(|v| v.split(',').map(|o| o.trim().to_string()).filter(|o| !o.is_empty()).collect())
                    .unwrap_or(defaults.cors.allowed_origins);

                let message_log_path = env::var("MESSAGE_LOG_PATH").ok();

                Self {
                    server_addr,
                    jwt: JwtConfig { secret, ttl_secs },
                    password: PasswordConfig { bcrypt_cost },
                    cors: CorsConfig { allowed_origins },
                    chat: ChatConfig { message_log_path },
                }
            }
        }
    }

    /// True while the signing secret is still the shipped placeholder
    pub fn uses_default_secret(&self) -> bool {
        self.jwt.secret == JwtConfig::default().secret
    }
}
