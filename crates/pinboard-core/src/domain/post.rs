use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Post entity - a blog article or shop listing.
///
/// `title` and `slug` are globally unique; the store enforces both.
/// `slug` and `author_id` are immutable once the post is created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub category: String,
    pub image: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Default category for posts created without one.
    pub const DEFAULT_CATEGORY: &'static str = "uncategorized";

    /// Create a new post. The slug must already be derived from the title
    /// (see [`crate::domain::slug::generate_slug`]); `category` falls back
    /// to [`Self::DEFAULT_CATEGORY`] when absent.
    pub fn new(
        author_id: Uuid,
        title: String,
        slug: String,
        content: String,
        category: Option<String>,
        image: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            author_id,
            title,
            slug,
            content,
            category: category
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| Self::DEFAULT_CATEGORY.to_string()),
            image,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update to a post. `None` fields retain their prior values.
///
/// The slug is deliberately absent: it is fixed at creation and never
/// recomputed, even when the title changes.
#[derive(Debug, Clone, Default)]
pub struct PostChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub image: Option<String>,
}
