//! Database connection management and repository implementations.

mod connections;
pub mod entity;
mod memory;
mod postgres;

pub use connections::{DatabaseConfig, connect};
pub use memory::{InMemoryPostRepository, InMemoryUserRepository};
pub use postgres::{PostgresPostRepository, PostgresUserRepository};
