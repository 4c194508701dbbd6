pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod services;
pub mod utils;

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use config::Config;
pub use error::{AppError, Result};

use crate::config::StorageBackend;
use crate::db::Database;
use crate::repository::{MemoryStore, PgStore, PostRepository, UserRepository};
use crate::services::{MemoryRevocations, RedisRevocations, SessionRevocations};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub posts: Arc<dyn PostRepository>,
    pub users: Arc<dyn UserRepository>,
    pub revocations: Arc<dyn SessionRevocations>,
}

impl AppState {
    /// Connect the storage selected by `storage.backend`
    pub async fn from_config(config: Config) -> anyhow::Result<Self> {
        match config.storage.backend {
            StorageBackend::Postgres => {
                let db = Database::connect(&config).await?;
                tracing::info!("Database connections established");
                db.run_migrations().await?;

                let store = Arc::new(PgStore::new(db.pg.clone()));
                Ok(Self {
                    config,
                    posts: store.clone(),
                    users: store,
                    revocations: Arc::new(RedisRevocations::new(db.redis)),
                })
            }
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory storage; data is lost on restart");
                Ok(Self::in_memory(config, Arc::new(MemoryStore::new())))
            }
        }
    }

    pub fn in_memory(config: Config, store: Arc<MemoryStore>) -> Self {
        Self {
            config,
            posts: store.clone(),
            users: store,
            revocations: Arc::new(MemoryRevocations::new()),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(api::routes(state.clone()))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
