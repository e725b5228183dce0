//! # Pinboard Infrastructure
//!
//! Concrete implementations of the ports defined in `pinboard-core`:
//! SeaORM/PostgreSQL repositories (plus full-semantics in-memory
//! fallbacks), JWT + Argon2 authentication, filesystem image storage,
//! and in-memory rate limiting.

pub mod auth;
pub mod database;
pub mod rate_limit;
pub mod storage;

pub use auth::{Argon2PasswordService, JwtTokenService};
pub use database::{
    DatabaseConfig, InMemoryPostRepository, InMemoryUserRepository, PostgresPostRepository,
    PostgresUserRepository, connect,
};
pub use rate_limit::{InMemoryRateLimiter, RateLimitConfig};
pub use storage::LocalImageStore;
