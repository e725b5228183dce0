//! Domain entities and pure business rules.

mod user;

mod post;

pub mod image;
pub mod listing;
pub mod slug;

pub use post::{Post, PostChanges};
pub use user::User;
