//! In-memory repositories with the same observable semantics as the
//! PostgreSQL implementations, including uniqueness enforcement.
//!
//! Used as the fallback when no database is configured and as the
//! behavioural test double for the listing pipeline. Data is lost on
//! process restart.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use pinboard_core::domain::listing::{PageRequest, PostFilter, SortOrder};
use pinboard_core::domain::{Post, PostChanges, User};
use pinboard_core::error::RepoError;
use pinboard_core::ports::{PostRepository, UserRepository};

/// In-memory user repository.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn save(&self, user: User) -> Result<User, RepoError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == user.email) {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }
        users.push(user.clone());
        Ok(user)
    }
}

/// In-memory post repository.
#[derive(Default)]
pub struct InMemoryPostRepository {
    posts: RwLock<Vec<Post>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn create(&self, post: Post) -> Result<Post, RepoError> {
        let mut posts = self.posts.write().await;
        if posts
            .iter()
            .any(|p| p.title == post.title || p.slug == post.slug)
        {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }
        posts.push(post.clone());
        Ok(post)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let posts = self.posts.read().await;
        Ok(posts.iter().find(|p| p.id == id).cloned())
    }

    async fn find_many(
        &self,
        filter: &PostFilter,
        order: SortOrder,
        page: PageRequest,
    ) -> Result<Vec<Post>, RepoError> {
        let posts = self.posts.read().await;
        let mut matching: Vec<Post> = posts.iter().filter(|p| filter.matches(p)).cloned().collect();
        matching.sort_by_key(|p| p.updated_at);
        if order == SortOrder::Descending {
            matching.reverse();
        }

        Ok(matching
            .into_iter()
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .collect())
    }

    async fn count(&self, filter: &PostFilter) -> Result<u64, RepoError> {
        let posts = self.posts.read().await;
        Ok(posts.iter().filter(|p| filter.matches(p)).count() as u64)
    }

    async fn count_created_since(&self, instant: DateTime<Utc>) -> Result<u64, RepoError> {
        let posts = self.posts.read().await;
        Ok(posts.iter().filter(|p| p.created_at >= instant).count() as u64)
    }

    async fn update(&self, id: Uuid, changes: PostChanges) -> Result<Post, RepoError> {
        let mut posts = self.posts.write().await;
        if let Some(title) = &changes.title
            && posts.iter().any(|p| p.id != id && p.title == *title)
        {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }

        let post = posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(RepoError::NotFound)?;

        if let Some(title) = changes.title {
            post.title = title;
        }
        if let Some(content) = changes.content {
            post.content = content;
        }
        if let Some(category) = changes.category {
            post.category = category;
        }
        if let Some(image) = changes.image {
            post.image = image;
        }
        post.updated_at = Utc::now();

        Ok(post.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut posts = self.posts.write().await;
        let before = posts.len();
        posts.retain(|p| p.id != id);
        if posts.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use pinboard_core::domain::listing::one_month_before;
    use pinboard_core::domain::slug::generate_slug;

    fn post(title: &str, category: &str, content: &str) -> Post {
        Post::new(
            Uuid::new_v4(),
            title.into(),
            generate_slug(title),
            content.into(),
            Some(category.into()),
            "https://example.com/a.jpg".into(),
        )
    }

    #[tokio::test]
    async fn colliding_slugs_fail_on_second_create() {
        let repo = InMemoryPostRepository::new();
        // Distinct titles, identical derived slug.
        repo.create(post("Best Pizza!", "food", "a")).await.unwrap();
        let second = repo.create(post("best pizza", "food", "b")).await;
        assert!(matches!(second, Err(RepoError::Constraint(_))));

        let all = repo.count(&PostFilter::default()).await.unwrap();
        assert_eq!(all, 1);
    }

    #[tokio::test]
    async fn duplicate_title_fails_on_create_and_update() {
        let repo = InMemoryPostRepository::new();
        repo.create(post("One", "x", "a")).await.unwrap();
        let two = repo.create(post("Two", "x", "b")).await.unwrap();

        let dup_create = repo.create(post("One", "x", "c")).await;
        assert!(matches!(dup_create, Err(RepoError::Constraint(_))));

        let dup_update = repo
            .update(
                two.id,
                PostChanges {
                    title: Some("One".into()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(dup_update, Err(RepoError::Constraint(_))));
    }

    #[tokio::test]
    async fn category_filter_returns_exact_matches_only() {
        let repo = InMemoryPostRepository::new();
        repo.create(post("A", "Grocery", "a")).await.unwrap();
        repo.create(post("B", "grocery", "b")).await.unwrap();
        repo.create(post("C", "Bakery", "c")).await.unwrap();

        let filter = PostFilter {
            category: Some("Grocery".into()),
            ..Default::default()
        };
        let page = repo
            .find_many(&filter, SortOrder::default(), PageRequest::default())
            .await
            .unwrap();

        assert_eq!(page.len(), 1);
        assert_eq!(page[0].title, "A");
    }

    #[tokio::test]
    async fn window_limits_items_while_count_sees_all_matching() {
        let repo = InMemoryPostRepository::new();
        for i in 0..5 {
            repo.create(post(&format!("Listing {i}"), "shop", "body"))
                .await
                .unwrap();
        }

        let filter = PostFilter {
            category: Some("shop".into()),
            ..Default::default()
        };
        let page = repo
            .find_many(
                &filter,
                SortOrder::default(),
                PageRequest::new(None, Some(2)),
            )
            .await
            .unwrap();
        let total = repo.count(&filter).await.unwrap();

        assert_eq!(page.len(), 2);
        assert_eq!(total, 5);
    }

    #[tokio::test]
    async fn default_order_is_most_recently_updated_first() {
        let repo = InMemoryPostRepository::new();
        let mut older = post("Older", "x", "a");
        older.updated_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut newer = post("Newer", "x", "b");
        newer.updated_at = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        repo.create(older).await.unwrap();
        repo.create(newer).await.unwrap();

        let desc = repo
            .find_many(
                &PostFilter::default(),
                SortOrder::default(),
                PageRequest::default(),
            )
            .await
            .unwrap();
        assert_eq!(desc[0].title, "Newer");

        let asc = repo
            .find_many(
                &PostFilter::default(),
                SortOrder::Ascending,
                PageRequest::default(),
            )
            .await
            .unwrap();
        assert_eq!(asc[0].title, "Older");
    }

    #[tokio::test]
    async fn recent_count_boundary_is_inclusive() {
        let repo = InMemoryPostRepository::new();
        let now = Utc::now();
        let boundary = one_month_before(now);

        let mut at_boundary = post("At boundary", "x", "a");
        at_boundary.created_at = boundary;
        let mut day_before = post("Day before", "x", "b");
        day_before.created_at = boundary - Duration::days(1);
        repo.create(at_boundary).await.unwrap();
        repo.create(day_before).await.unwrap();

        assert_eq!(repo.count_created_since(boundary).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn recent_count_ignores_the_listing_filter() {
        let repo = InMemoryPostRepository::new();
        repo.create(post("A", "Grocery", "a")).await.unwrap();
        repo.create(post("B", "Bakery", "b")).await.unwrap();

        // Filter-independent by contract: both freshly created posts count.
        let boundary = one_month_before(Utc::now());
        assert_eq!(repo.count_created_since(boundary).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn partial_update_retains_unspecified_fields() {
        let repo = InMemoryPostRepository::new();
        let created = repo.create(post("Keep Me", "Grocery", "body")).await.unwrap();

        let updated = repo
            .update(
                created.id,
                PostChanges {
                    content: Some("new body".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "Keep Me");
        assert_eq!(updated.category, "Grocery");
        assert_eq!(updated.content, "new body");
        assert_eq!(updated.slug, created.slug);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn malformed_author_id_matches_nothing() {
        let repo = InMemoryPostRepository::new();
        repo.create(post("A", "x", "a")).await.unwrap();

        let filter = PostFilter {
            author_id: Some("definitely-not-a-uuid".into()),
            ..Default::default()
        };
        assert_eq!(repo.count(&filter).await.unwrap(), 0);
        let page = repo
            .find_many(&filter, SortOrder::default(), PageRequest::default())
            .await
            .unwrap();
        assert!(page.is_empty());
    }

    #[tokio::test]
    async fn delete_then_lookup_is_gone() {
        let repo = InMemoryPostRepository::new();
        let created = repo.create(post("Gone Soon", "x", "a")).await.unwrap();

        repo.delete(created.id).await.unwrap();
        assert!(repo.find_by_id(created.id).await.unwrap().is_none());
        assert!(matches!(
            repo.delete(created.id).await,
            Err(RepoError::NotFound)
        ));
    }

    #[tokio::test]
    async fn duplicate_email_rejected() {
        let repo = InMemoryUserRepository::new();
        repo.save(User::new("a@example.com".into(), "hash".into()))
            .await
            .unwrap();
        let dup = repo.save(User::new("a@example.com".into(), "hash2".into())).await;
        assert!(matches!(dup, Err(RepoError::Constraint(_))));
    }
}
