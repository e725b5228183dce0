//! Post handlers - create, list, update, delete.
//!
//! Create and update accept multipart forms so an image file can ride
//! along with the text fields; the stored location of a fresh upload
//! always wins over an explicit `image` URL (see
//! `pinboard_core::domain::image`). Mutations require an admin actor,
//! and update/delete additionally require the actor to be the post's
//! original author.

use actix_multipart::form::{MultipartForm, bytes::Bytes as UploadedFile, text::Text};
use actix_web::{HttpResponse, web};
use chrono::Utc;
use uuid::Uuid;

use pinboard_core::domain::image::resolve_image;
use pinboard_core::domain::listing::{PageRequest, PostFilter, SortOrder, one_month_before};
use pinboard_core::domain::slug::generate_slug;
use pinboard_core::domain::{Post, PostChanges};
use pinboard_shared::dto::{DeletePostResponse, ListPostsQuery, PostListResponse, PostResponse};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Multipart payload for create and update. Text fields plus an optional
/// `file` part; `image` is an explicit URL, used only when no file is
/// uploaded.
#[derive(Debug, MultipartForm)]
pub struct PostForm {
    pub title: Option<Text<String>>,
    pub content: Option<Text<String>>,
    pub category: Option<Text<String>>,
    pub image: Option<Text<String>>,
    #[multipart(limit = "5MB")]
    pub file: Option<UploadedFile>,
}

/// POST /api/posts
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    MultipartForm(form): MultipartForm<PostForm>,
) -> AppResult<HttpResponse> {
    let post = create_post(&state, &identity, form).await?;
    Ok(HttpResponse::Created().json(post_response(&post)))
}

/// GET /api/posts
pub async fn list(
    state: web::Data<AppState>,
    query: web::Query<ListPostsQuery>,
) -> AppResult<HttpResponse> {
    let response = list_posts(&state, query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// PUT /api/posts/{id}
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    MultipartForm(form): MultipartForm<PostForm>,
) -> AppResult<HttpResponse> {
    let post = update_post(&state, &identity, path.into_inner(), form).await?;
    Ok(HttpResponse::Ok().json(post_response(&post)))
}

/// DELETE /api/posts/{id}
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    delete_post(&state, &identity, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(DeletePostResponse {
        message: "The post has been deleted".to_string(),
    }))
}

async fn create_post(state: &AppState, actor: &Identity, form: PostForm) -> AppResult<Post> {
    if !actor.is_admin {
        return Err(AppError::Forbidden(
            "You are not allowed to create a post".to_string(),
        ));
    }

    let title = form.title.map(|t| t.0).filter(|t| !t.trim().is_empty());
    let content = form.content.map(|t| t.0).filter(|c| !c.trim().is_empty());
    let (Some(title), Some(content)) = (title, content) else {
        return Err(AppError::BadRequest(
            "Please provide all required fields".to_string(),
        ));
    };

    let slug = generate_slug(&title);
    if slug.is_empty() {
        return Err(AppError::BadRequest(
            "Title must contain at least one letter or digit".to_string(),
        ));
    }

    let uploaded = store_upload(state, form.file).await?;
    let image = resolve_image(uploaded.clone(), form.image.map(|t| t.0), None);

    let post = Post::new(
        actor.user_id,
        title,
        slug,
        content,
        form.category.map(|t| t.0),
        image,
    );

    // Title/slug uniqueness is the store's call; a violation surfaces
    // as a conflict, never as a pre-check here.
    match state.posts.create(post).await {
        Ok(created) => Ok(created),
        Err(err) => {
            // A rejected insert must not leave this request's upload behind.
            if let Some(url) = &uploaded {
                state.images.remove(url).await;
            }
            Err(err.into())
        }
    }
}

async fn list_posts(state: &AppState, query: ListPostsQuery) -> AppResult<PostListResponse> {
    let filter = PostFilter {
        author_id: query.author_id,
        category: query.category,
        slug: query.slug,
        post_id: query.post_id,
        search_term: query.search_term,
    };
    let order = SortOrder::from_param(query.order.as_deref());
    let page = PageRequest::new(query.start_index, query.limit);

    // Three independent queries against the same intent; under concurrent
    // writes they may see slightly different instants. Documented contract.
    let items = state.posts.find_many(&filter, order, page).await?;
    let total_matching = state.posts.count(&filter).await?;
    let recent_count = state
        .posts
        .count_created_since(one_month_before(Utc::now()))
        .await?;

    Ok(PostListResponse {
        posts: items.iter().map(post_response).collect(),
        total_posts: total_matching,
        last_month_posts: recent_count,
    })
}

async fn update_post(
    state: &AppState,
    actor: &Identity,
    id: Uuid,
    form: PostForm,
) -> AppResult<Post> {
    if !actor.is_admin {
        return Err(AppError::Forbidden(
            "You are not allowed to update this post".to_string(),
        ));
    }

    let existing = state
        .posts
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    if existing.author_id != actor.user_id {
        return Err(AppError::Forbidden(
            "You are not allowed to update this post".to_string(),
        ));
    }

    let uploaded = store_upload(state, form.file).await?;
    if uploaded.is_some() {
        // A fresh upload replaces the old asset; cleanup is best-effort
        // and only touches locally stored files.
        state.images.remove(&existing.image).await;
    }
    let image = resolve_image(
        uploaded,
        form.image.map(|t| t.0),
        Some(existing.image.clone()),
    );

    let changes = PostChanges {
        title: form.title.map(|t| t.0).filter(|t| !t.trim().is_empty()),
        content: form.content.map(|t| t.0).filter(|c| !c.trim().is_empty()),
        category: form.category.map(|t| t.0).filter(|c| !c.trim().is_empty()),
        image: Some(image),
    };

    Ok(state.posts.update(id, changes).await?)
}

async fn delete_post(state: &AppState, actor: &Identity, id: Uuid) -> AppResult<()> {
    if !actor.is_admin {
        return Err(AppError::Forbidden(
            "You are not allowed to delete this post".to_string(),
        ));
    }

    let post = state
        .posts
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    if post.author_id != actor.user_id {
        return Err(AppError::Forbidden(
            "You are not allowed to delete this post".to_string(),
        ));
    }

    // Asset first, record second, matching the original flow; a missing
    // file never blocks the deletion.
    state.images.remove(&post.image).await;
    state.posts.delete(id).await?;

    Ok(())
}

/// Store an uploaded file, if present, and return its public URL.
async fn store_upload(state: &AppState, file: Option<UploadedFile>) -> AppResult<Option<String>> {
    let Some(file) = file else {
        return Ok(None);
    };

    let name = file.file_name.clone().unwrap_or_else(|| "upload".to_string());
    let content_type = file.content_type.as_ref().map(|m| m.essence_str().to_string());
    let url = state
        .images
        .store(&name, content_type.as_deref(), file.data.to_vec())
        .await?;

    Ok(Some(url))
}

fn post_response(post: &Post) -> PostResponse {
    PostResponse {
        id: post.id.to_string(),
        author_id: post.author_id.to_string(),
        title: post.title.clone(),
        slug: post.slug.clone(),
        content: post.content.clone(),
        category: post.category.clone(),
        image: post.image.clone(),
        created_at: post.created_at.to_rfc3339(),
        updated_at: post.updated_at.to_rfc3339(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinboard_core::domain::image::DEFAULT_POST_IMAGE;

    fn admin() -> Identity {
        Identity {
            user_id: Uuid::new_v4(),
            email: "admin@example.com".to_string(),
            is_admin: true,
        }
    }

    fn text(value: &str) -> Option<Text<String>> {
        Some(Text(value.to_string()))
    }

    fn form(title: Option<&str>, content: Option<&str>) -> PostForm {
        PostForm {
            title: title.map(|t| Text(t.to_string())),
            content: content.map(|c| Text(c.to_string())),
            category: None,
            image: None,
            file: None,
        }
    }

    fn test_state() -> (tempfile::TempDir, AppState) {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::in_memory(dir.path().to_path_buf(), "http://localhost:8080");
        (dir, state)
    }

    fn upload(name: &str, payload: &[u8]) -> UploadedFile {
        UploadedFile {
            data: actix_web::web::Bytes::copy_from_slice(payload),
            content_type: Some("image/png".parse().unwrap()),
            file_name: Some(name.to_string()),
        }
    }

    #[actix_web::test]
    async fn non_admin_cannot_create() {
        let (_dir, state) = test_state();
        let actor = Identity {
            is_admin: false,
            ..admin()
        };

        let result = create_post(&state, &actor, form(Some("Shop"), Some("body"))).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[actix_web::test]
    async fn missing_required_fields_is_a_validation_error() {
        let (_dir, state) = test_state();

        let no_content = create_post(&state, &admin(), form(Some("Shop"), None)).await;
        assert!(matches!(no_content, Err(AppError::BadRequest(_))));

        let blank_title = create_post(&state, &admin(), form(Some("   "), Some("body"))).await;
        assert!(matches!(blank_title, Err(AppError::BadRequest(_))));
    }

    #[actix_web::test]
    async fn title_without_slug_material_is_rejected() {
        let (_dir, state) = test_state();

        let result = create_post(&state, &admin(), form(Some("!!!"), Some("body"))).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[actix_web::test]
    async fn create_derives_slug_and_defaults() {
        let (_dir, state) = test_state();

        let post = create_post(
            &state,
            &admin(),
            form(Some("Best Pizza Shop!!"), Some("body")),
        )
        .await
        .unwrap();

        assert_eq!(post.slug, "best-pizza-shop");
        assert_eq!(post.category, "uncategorized");
        assert_eq!(post.image, DEFAULT_POST_IMAGE);
    }

    #[actix_web::test]
    async fn explicit_image_url_is_kept_but_upload_wins() {
        let (_dir, state) = test_state();

        let mut with_url = form(Some("With URL"), Some("body"));
        with_url.image = text("https://cdn.example.com/pic.png");
        let kept = create_post(&state, &admin(), with_url).await.unwrap();
        assert_eq!(kept.image, "https://cdn.example.com/pic.png");

        let mut with_both = form(Some("With Both"), Some("body"));
        with_both.image = text("https://cdn.example.com/pic.png");
        with_both.file = Some(upload("front.png", b"pixels"));
        let won = create_post(&state, &admin(), with_both).await.unwrap();
        assert!(won.image.contains("/uploads/front-"), "{}", won.image);
    }

    #[actix_web::test]
    async fn duplicate_title_is_a_conflict() {
        let (_dir, state) = test_state();

        create_post(&state, &admin(), form(Some("Unique"), Some("a")))
            .await
            .unwrap();
        let second = create_post(&state, &admin(), form(Some("Unique"), Some("b"))).await;
        assert!(matches!(second, Err(AppError::Conflict(_))));
    }

    #[actix_web::test]
    async fn conflicting_create_cleans_up_fresh_upload() {
        let (dir, state) = test_state();

        let mut first = form(Some("Taken"), Some("a"));
        first.file = Some(upload("kept.png", b"one"));
        let created = create_post(&state, &admin(), first).await.unwrap();
        let kept_file = created.image.rsplit('/').next().unwrap().to_string();

        let mut second = form(Some("Taken"), Some("b"));
        second.file = Some(upload("orphan.png", b"two"));
        let result = create_post(&state, &admin(), second).await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
        assert!(dir.path().join(&kept_file).exists());
        let orphaned = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .any(|e| e.file_name().to_string_lossy().starts_with("orphan-"));
        assert!(!orphaned, "rejected create left its upload behind");
    }

    #[actix_web::test]
    async fn listing_pages_and_counts() {
        let (_dir, state) = test_state();
        let author = admin();
        for i in 0..5 {
            create_post(&state, &author, form(Some(&format!("Shop {i}")), Some("b")))
                .await
                .unwrap();
        }

        let response = list_posts(
            &state,
            ListPostsQuery {
                limit: Some(2),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(response.posts.len(), 2);
        assert_eq!(response.total_posts, 5);
        assert_eq!(response.last_month_posts, 5);
    }

    #[actix_web::test]
    async fn listing_filters_by_author() {
        let (_dir, state) = test_state();
        let author = admin();
        let other = admin();
        create_post(&state, &author, form(Some("Mine"), Some("b")))
            .await
            .unwrap();
        create_post(&state, &other, form(Some("Theirs"), Some("b")))
            .await
            .unwrap();

        let response = list_posts(
            &state,
            ListPostsQuery {
                author_id: Some(author.user_id.to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(response.posts.len(), 1);
        assert_eq!(response.posts[0].title, "Mine");
        // The recent count ignores the filter.
        assert_eq!(response.last_month_posts, 2);
    }

    #[actix_web::test]
    async fn non_author_update_is_forbidden_and_leaves_record_unmodified() {
        let (_dir, state) = test_state();
        let author = admin();
        let created = create_post(&state, &author, form(Some("Original"), Some("body")))
            .await
            .unwrap();

        let intruder = admin(); // admin, but not the author
        let mut attempt = form(None, Some("tampered"));
        attempt.category = text("hijacked");
        let result = update_post(&state, &intruder, created.id, attempt).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));

        let stored = state.posts.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(stored.content, "body");
        assert_eq!(stored.category, created.category);
        assert_eq!(stored.updated_at, created.updated_at);
    }

    #[actix_web::test]
    async fn partial_update_keeps_slug_and_unspecified_fields() {
        let (_dir, state) = test_state();
        let author = admin();
        let created = create_post(&state, &author, form(Some("Stable Slug"), Some("body")))
            .await
            .unwrap();

        let updated = update_post(
            &state,
            &author,
            created.id,
            form(Some("Renamed Title"), None),
        )
        .await
        .unwrap();

        assert_eq!(updated.title, "Renamed Title");
        assert_eq!(updated.slug, "stable-slug");
        assert_eq!(updated.content, "body");
        assert_eq!(updated.image, created.image);
    }

    #[actix_web::test]
    async fn update_with_upload_replaces_local_asset() {
        let (dir, state) = test_state();
        let author = admin();

        let mut initial = form(Some("Gallery"), Some("body"));
        initial.file = Some(upload("first.png", b"one"));
        let created = create_post(&state, &author, initial).await.unwrap();
        let first_file = created.image.rsplit('/').next().unwrap().to_string();
        assert!(dir.path().join(&first_file).exists());

        let mut replacement = form(None, None);
        replacement.file = Some(upload("second.png", b"two"));
        let updated = update_post(&state, &author, created.id, replacement)
            .await
            .unwrap();

        assert!(updated.image.contains("/uploads/second-"));
        assert!(!dir.path().join(&first_file).exists());
    }

    #[actix_web::test]
    async fn update_unknown_post_is_not_found() {
        let (_dir, state) = test_state();

        let result = update_post(&state, &admin(), Uuid::new_v4(), form(None, None)).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[actix_web::test]
    async fn delete_removes_record_and_local_asset() {
        let (dir, state) = test_state();
        let author = admin();

        let mut with_file = form(Some("Doomed"), Some("body"));
        with_file.file = Some(upload("doomed.png", b"bits"));
        let created = create_post(&state, &author, with_file).await.unwrap();
        let filename = created.image.rsplit('/').next().unwrap().to_string();
        assert!(dir.path().join(&filename).exists());

        delete_post(&state, &author, created.id).await.unwrap();

        assert!(state.posts.find_by_id(created.id).await.unwrap().is_none());
        assert!(!dir.path().join(&filename).exists());
    }

    #[actix_web::test]
    async fn delete_by_non_author_is_forbidden() {
        let (_dir, state) = test_state();
        let author = admin();
        let created = create_post(&state, &author, form(Some("Guarded"), Some("body")))
            .await
            .unwrap();

        let result = delete_post(&state, &admin(), created.id).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
        assert!(state.posts.find_by_id(created.id).await.unwrap().is_some());
    }
}
