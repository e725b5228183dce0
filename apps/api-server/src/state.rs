//! Application state - shared across all handlers.

use std::sync::Arc;

use pinboard_core::ports::{ImageStore, PostRepository, UserRepository};
use pinboard_infra::database::{
    InMemoryPostRepository, InMemoryUserRepository, PostgresPostRepository,
    PostgresUserRepository, connect,
};
use pinboard_infra::storage::LocalImageStore;

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub images: Arc<dyn ImageStore>,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    ///
    /// Without a reachable database the server degrades to the in-memory
    /// repositories, which share the Postgres implementations' observable
    /// semantics but lose data on restart.
    pub async fn new(config: &AppConfig) -> std::io::Result<Self> {
        let images: Arc<dyn ImageStore> = Arc::new(LocalImageStore::new(
            config.uploads_dir.clone(),
            config.public_base_url.clone(),
        )?);

        let (users, posts): (Arc<dyn UserRepository>, Arc<dyn PostRepository>) =
            match &config.database {
                Some(db_config) => match connect(db_config).await {
                    Ok(conn) => (
                        Arc::new(PostgresUserRepository::new(conn.clone())),
                        Arc::new(PostgresPostRepository::new(conn)),
                    ),
                    Err(e) => {
                        tracing::error!(
                            "Failed to connect to database: {}. Using in-memory fallback.",
                            e
                        );
                        (
                            Arc::new(InMemoryUserRepository::new()),
                            Arc::new(InMemoryPostRepository::new()),
                        )
                    }
                },
                None => {
                    tracing::warn!(
                        "DATABASE_URL not set. Running without database (in-memory mode)."
                    );
                    (
                        Arc::new(InMemoryUserRepository::new()),
                        Arc::new(InMemoryPostRepository::new()),
                    )
                }
            };

        tracing::info!("Application state initialized");

        Ok(Self {
            users,
            posts,
            images,
        })
    }

    /// Fully in-memory state rooted at a caller-provided uploads dir.
    /// Used by handler tests.
    #[cfg(test)]
    pub fn in_memory(uploads_dir: std::path::PathBuf, public_base: &str) -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            posts: Arc::new(InMemoryPostRepository::new()),
            images: Arc::new(
                LocalImageStore::new(uploads_dir, public_base).expect("uploads dir"),
            ),
        }
    }
}
