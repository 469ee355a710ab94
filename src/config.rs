use config::{Config, ConfigError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub persistence: PersistenceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// 持久化超时 (秒)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    pub submit_timeout_secs: u64,
    pub write_timeout_secs: u64,
}

impl PersistenceConfig {
    pub fn submit_timeout(&self) -> Duration {
        Duration::from_secs(self.submit_timeout_secs)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_secs)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: "postgres://localhost/commande_admin".to_string(),
                max_connections: 20,
            },
            persistence: PersistenceConfig {
                submit_timeout_secs: 30,
                write_timeout_secs: 30,
            },
        }
    }
}

impl AppConfig {
    /// 默认值 + 环境变量
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Config::builder()
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", defaults.server.port as i64)?
            .set_default("database.url", defaults.database.url)?
            .set_default("database.max_connections", defaults.database.max_connections as i64)?
            .set_default(
                "persistence.submit_timeout_secs",
                defaults.persistence.submit_timeout_secs as i64,
            )?
            .set_default(
                "persistence.write_timeout_secs",
                defaults.persistence.write_timeout_secs as i64,
            )?
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option("server.port", std::env::var("SERVER_PORT").ok())?
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .set_override_option(
                "database.max_connections",
                std::env::var("DB_MAX_CONNECTIONS").ok(),
            )?
            .set_override_option(
                "persistence.submit_timeout_secs",
                std::env::var("SUBMIT_TIMEOUT_SECS").ok(),
            )?
            .set_override_option(
                "persistence.write_timeout_secs",
                std::env::var("WRITE_TIMEOUT_SECS").ok(),
            )?
            .build()?
            .try_deserialize()
    }

    /// 从环境变量加载配置, 解析失败时退回默认值
    pub fn from_env() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!("Invalid configuration ({}), using defaults", e);
            Self::default()
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
