//! Data Transfer Objects - request/response types for the API.

use serde::{Deserialize, Serialize};

/// Request to register a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterUserRequest {
    pub email: String,
    pub password: String,
}

/// Request to login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response containing a user's public information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub is_admin: bool,
    pub created_at: String,
}

/// Response containing authentication tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// A fully materialized post as returned by every post endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: String,
    pub author_id: String,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub category: String,
    pub image: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Query parameters accepted by the post listing endpoint. All optional
/// and independently combinable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListPostsQuery {
    pub author_id: Option<String>,
    pub category: Option<String>,
    pub slug: Option<String>,
    pub post_id: Option<String>,
    pub search_term: Option<String>,
    /// `asc` or `desc` (default) over `updated_at`.
    pub order: Option<String>,
    pub start_index: Option<u64>,
    pub limit: Option<u64>,
}

/// Listing page plus the two aggregate counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostListResponse {
    pub posts: Vec<PostResponse>,
    /// Posts matching the filter, regardless of the pagination window.
    pub total_posts: u64,
    /// Posts created within the trailing calendar month, regardless of
    /// the filter.
    pub last_month_posts: u64,
}

/// Acknowledgment returned by the delete endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletePostResponse {
    pub message: String,
}
