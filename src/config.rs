use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;

use crate::models::GameMode;

/// Secret used for admin tokens when none is configured outside production
const DEVELOPMENT_JWT_SECRET: &str = "gameshow-development-secret";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub admin: AdminConfig,
    pub security: SecurityConfig,
    pub game: GameConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Without a URL the scoreboard lives in memory only
    pub url: Option<String>,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        }
    }

    pub fn default_allowed_origins(self) -> Vec<String> {
        match self {
            Environment::Production => vec![
                "https://www.lospollostv.app".to_string(),
                "https://lospollostv.app".to_string(),
            ],
            Environment::Development => vec!["http://localhost:3000".to_string()],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub static_dir: String,
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    pub username: String,
    pub passcode: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GameConfig {
    pub default_mode: GameMode,
    pub default_contestants: Vec<String>,
    pub subscriber_sweep_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let environment = Environment::parse(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let database = DatabaseConfig {
            url: env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty()),
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("DATABASE_MAX_CONNECTIONS must be a number")?,
        };

        let server = ServerConfig {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("PORT must be a number")?,
            environment,
            static_dir: env::var("STATIC_DIR").unwrap_or_else(|_| "./public".to_string()),
            allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .map(|origins| parse_list(&origins))
                .unwrap_or_else(|_| environment.default_allowed_origins()),
        };

        let admin = AdminConfig {
            username: env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string()),
            passcode: env::var("ADMIN_PASSCODE").unwrap_or_else(|_| "gameshow123".to_string()),
        };

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) => secret,
            Err(_) if environment == Environment::Production => {
                anyhow::bail!("JWT_SECRET must be set in production")
            }
            Err(_) => DEVELOPMENT_JWT_SECRET.to_string(),
        };

        let security = SecurityConfig {
            jwt_secret,
            token_ttl_hours: parse_token_ttl(
                &env::var("TOKEN_TTL_HOURS").unwrap_or_else(|_| "12".to_string()),
            )?,
        };

        let default_mode = env::var("DEFAULT_MODE")
            .unwrap_or_else(|_| "2".to_string())
            .parse::<u8>()
            .context("DEFAULT_MODE must be a number")?;

        let game = GameConfig {
            default_mode: GameMode::try_from(default_mode).map_err(anyhow::Error::msg)?,
            default_contestants: env::var("DEFAULT_CONTESTANTS")
                .map(|names| parse_list(&names))
                .unwrap_or_else(|_| default_contestant_names()),
            subscriber_sweep_secs: env::var("SUBSCRIBER_SWEEP_SECS")
                .unwrap_or_else(|_| "15".to_string())
                .parse()
                .unwrap_or(15),
        };

        Ok(Config {
            database,
            server,
            admin,
            security,
            game,
        })
    }

    pub fn database_url(&self) -> Option<&str> {
        self.database.url.as_deref()
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Admin tokens live between one hour and one year
const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365;

fn parse_token_ttl(value: &str) -> Result<i64> {
    let hours: i64 = value
        .trim()
        .parse()
        .context("TOKEN_TTL_HOURS must be a number")?;
    if !(1..=MAX_TOKEN_TTL_HOURS).contains(&hours) {
        anyhow::bail!(
            "TOKEN_TTL_HOURS must be between 1 and {}",
            MAX_TOKEN_TTL_HOURS
        );
    }
    Ok(hours)
}

fn default_contestant_names() -> Vec<String> {
    (1..=3).map(|n| format!("Newlyweds {}", n)).collect()
}

/// Split a comma-separated value, dropping blank entries
fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Self {
        Config {
            database: DatabaseConfig {
                url: None,
                max_connections: 1,
            },
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                environment: Environment::Development,
                static_dir: "./public".to_string(),
                allowed_origins: Environment::Development.default_allowed_origins(),
            },
            admin: AdminConfig {
                username: "admin".to_string(),
                passcode: "gameshow123".to_string(),
            },
            security: SecurityConfig {
                jwt_secret: "test-secret".to_string(),
                token_ttl_hours: 1,
            },
            game: GameConfig {
                default_mode: GameMode::Two,
                default_contestants: default_contestant_names(),
                subscriber_sweep_secs: 15,
            },
        }
    }
}
