//! Listing pipeline types: filter, sort order, pagination window, and the
//! combined page-plus-counts result.
//!
//! The three quantities in [`PostPage`] are produced by three independent
//! repository queries with no transaction around them; under concurrent
//! writes they may reflect slightly different instants. That weak
//! consistency is deliberate, documented contract.

use chrono::{DateTime, Months, Utc};
use uuid::Uuid;

use super::Post;

/// Filter predicate for the post listing. Absent fields contribute no
/// constraint; present fields combine with logical AND.
///
/// `author_id` and `post_id` stay as raw strings: a malformed identifier
/// is not a request error, it is a predicate that matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    pub author_id: Option<String>,
    pub category: Option<String>,
    pub slug: Option<String>,
    pub post_id: Option<String>,
    pub search_term: Option<String>,
}

impl PostFilter {
    /// Whether the filter constrains anything at all.
    pub fn is_open(&self) -> bool {
        *self == Self::default()
    }

    /// Evaluate the predicate against a single post. This is the reference
    /// semantics; the SQL translation in the infra layer must agree with it.
    pub fn matches(&self, post: &Post) -> bool {
        if let Some(raw) = &self.author_id {
            match Uuid::parse_str(raw) {
                Ok(id) if post.author_id == id => {}
                _ => return false,
            }
        }
        if let Some(raw) = &self.post_id {
            match Uuid::parse_str(raw) {
                Ok(id) if post.id == id => {}
                _ => return false,
            }
        }
        if let Some(category) = &self.category
            && post.category != *category
        {
            return false;
        }
        if let Some(slug) = &self.slug
            && post.slug != *slug
        {
            return false;
        }
        if let Some(term) = &self.search_term {
            let needle = term.to_lowercase();
            let in_title = post.title.to_lowercase().contains(&needle);
            let in_content = post.content.to_lowercase().contains(&needle);
            if !in_title && !in_content {
                return false;
            }
        }
        true
    }
}

/// Sort direction over `updated_at`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

impl SortOrder {
    /// Parse the wire value; anything other than `asc` sorts descending.
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            Some("asc") => Self::Ascending,
            _ => Self::Descending,
        }
    }
}

/// Pagination window. Defaults match the public listing page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: u64,
    pub limit: u64,
}

/// Default page size of the public listing.
pub const DEFAULT_PAGE_LIMIT: u64 = 9;

/// Hard ceiling on requested page sizes to bound response volume.
pub const MAX_PAGE_LIMIT: u64 = 100;

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl PageRequest {
    /// Build a window from optional wire parameters, clamping the limit
    /// to [`MAX_PAGE_LIMIT`].
    pub fn new(offset: Option<u64>, limit: Option<u64>) -> Self {
        Self {
            offset: offset.unwrap_or(0),
            limit: limit.unwrap_or(DEFAULT_PAGE_LIMIT).min(MAX_PAGE_LIMIT),
        }
    }
}

/// One page of listing results plus the two aggregate counts.
#[derive(Debug, Clone)]
pub struct PostPage {
    pub items: Vec<Post>,
    /// Documents matching the filter, independent of the window.
    pub total_matching: u64,
    /// Posts created within the trailing calendar month, ignoring the filter.
    pub recent_count: u64,
}

/// The instant exactly one calendar month before `now` (same day-of-month,
/// clamped at month ends). Posts created on/after this instant count as
/// recent; the boundary itself is inclusive.
pub fn one_month_before(now: DateTime<Utc>) -> DateTime<Utc> {
    now.checked_sub_months(Months::new(1)).unwrap_or(now)
}
