use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::listing::{PageRequest, PostFilter, SortOrder};
use crate::domain::{Post, PostChanges, User};
use crate::error::RepoError;

/// User repository.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by their unique ID.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError>;

    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    /// Persist a new user. Fails with [`RepoError::Constraint`] on a
    /// duplicate email.
    async fn save(&self, user: User) -> Result<User, RepoError>;
}

/// Post record store.
///
/// Uniqueness of `title` and `slug` is enforced here, not by callers; a
/// violating write fails with [`RepoError::Constraint`]. The listing
/// methods (`find_many`, `count`, `count_created_since`) are independent
/// queries with no shared snapshot.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Persist a new post.
    async fn create(&self, post: Post) -> Result<Post, RepoError>;

    /// Find a post by its unique ID.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError>;

    /// The filtered, sorted, windowed page of posts. Sort key is always
    /// `updated_at`.
    async fn find_many(
        &self,
        filter: &PostFilter,
        order: SortOrder,
        page: PageRequest,
    ) -> Result<Vec<Post>, RepoError>;

    /// Count of posts matching the filter, independent of any window.
    async fn count(&self, filter: &PostFilter) -> Result<u64, RepoError>;

    /// Count of all posts created at or after the given instant,
    /// independent of any filter.
    async fn count_created_since(&self, instant: DateTime<Utc>) -> Result<u64, RepoError>;

    /// Apply a partial update; `None` fields retain their stored values.
    /// Refreshes `updated_at`. Fails with [`RepoError::NotFound`] for an
    /// unknown id and [`RepoError::Constraint`] on a duplicate title.
    async fn update(&self, id: Uuid, changes: PostChanges) -> Result<Post, RepoError>;

    /// Delete a post permanently. Fails with [`RepoError::NotFound`] for
    /// an unknown id.
    async fn delete(&self, id: Uuid) -> Result<(), RepoError>;
}
