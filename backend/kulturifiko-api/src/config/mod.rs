use serde::Deserialize;

use crate::models::CommentDeletePolicy;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_expiry_hours")]
    pub expiry_hours: u64,
}

/// Page sizes and refresh cadence of the notification feed
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_posts_page_size")]
    pub posts_page_size: usize,
    #[serde(default = "default_activity_page_size")]
    pub activity_page_size: usize,
    #[serde(default = "default_refresh_secs")]
    pub refresh_secs: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PolicyConfig {
    #[serde(default)]
    pub comment_delete: CommentDeletePolicy,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    #[default]
    Postgres,
    /// Process-local store, nothing survives a restart
    Memory,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_connections() -> u32 {
    10
}

fn default_expiry_hours() -> u64 {
    24
}

fn default_posts_page_size() -> usize {
    10
}

fn default_activity_page_size() -> usize {
    20
}

fn default_refresh_secs() -> u64 {
    60
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            posts_page_size: default_posts_page_size(),
            activity_page_size: default_activity_page_size(),
            refresh_secs: default_refresh_secs(),
        }
    }
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(true),
            )
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("database.url", "postgres://localhost/kulturifiko")?
            .set_default("database.max_connections", 10)?
            .set_default("redis.url", "redis://localhost:6379")?
            .set_default("jwt.secret", "development-secret-change-in-production")?
            .set_default("jwt.expiry_hours", 24)?
            .set_default("feed.posts_page_size", 10)?
            .set_default("feed.activity_page_size", 20)?
            .set_default("feed.refresh_secs", 60)?
            .set_default("policy.comment_delete", "author_only")?
            .set_default("storage.backend", "postgres")?
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// In-memory configuration with development defaults
    pub fn in_memory(jwt_secret: impl Into<String>) -> Self {
        Self {
            server: ServerConfig {
                host: default_host(),
                port: default_port(),
            },
            database: DatabaseConfig {
                url: String::new(),
                max_connections: default_max_connections(),
            },
            redis: RedisConfig { url: String::new() },
            jwt: JwtConfig {
                secret: jwt_secret.into(),
                expiry_hours: default_expiry_hours(),
            },
            feed: FeedConfig::default(),
            policy: PolicyConfig::default(),
            storage: StorageConfig {
                backend: StorageBackend::Memory,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_defaults() {
        let config = Config::in_memory("secret");

        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.feed.posts_page_size, 10);
        assert_eq!(config.feed.activity_page_size, 20);
        assert_eq!(config.feed.refresh_secs, 60);
        assert_eq!(config.policy.comment_delete, CommentDeletePolicy::AuthorOnly);
        assert_eq!(config.jwt.expiry_hours, 24);
    }

    #[test]
    fn test_policy_deserializes_from_snake_case() {
        let policy: PolicyConfig =
            serde_json::from_str(r#"{ "comment_delete": "author_or_admin" }"#).unwrap();
        assert_eq!(policy.comment_delete, CommentDeletePolicy::AuthorOrAdmin);
    }
}
