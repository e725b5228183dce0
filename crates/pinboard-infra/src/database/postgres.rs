//! PostgreSQL repository implementations.

use std::marker::PhantomData;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DbConn, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use pinboard_core::domain::listing::{PageRequest, PostFilter, SortOrder};
use pinboard_core::domain::{Post, PostChanges, User};
use pinboard_core::error::RepoError;
use pinboard_core::ports::{PostRepository, UserRepository};

use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};

/// Generic PostgreSQL repository carrier; entity-specific behaviour hangs
/// off the type aliases below.
pub struct PostgresRepository<E>
where
    E: EntityTrait,
{
    pub(crate) db: DbConn,
    _entity: PhantomData<E>,
}

impl<E> PostgresRepository<E>
where
    E: EntityTrait,
{
    pub fn new(db: DbConn) -> Self {
        Self {
            db,
            _entity: PhantomData,
        }
    }
}

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresRepository<UserEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresRepository<PostEntity>;

/// Map driver errors, folding unique-index violations into `Constraint`.
fn map_db_err(err: DbErr) -> RepoError {
    let message = err.to_string();
    if message.contains("duplicate") || message.contains("unique") {
        RepoError::Constraint("Entity already exists".to_string())
    } else {
        RepoError::Query(message)
    }
}

/// Escape LIKE wildcards so a search term is matched literally.
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Translate a [`PostFilter`] into a SQL condition. Must agree with
/// [`PostFilter::matches`]; malformed UUIDs become a never-true clause so
/// they match nothing instead of failing the request.
pub(crate) fn filter_condition(filter: &PostFilter) -> Condition {
    let mut cond = Condition::all();

    if let Some(raw) = &filter.author_id {
        cond = match Uuid::parse_str(raw) {
            Ok(id) => cond.add(post::Column::AuthorId.eq(id)),
            Err(_) => cond.add(Expr::value(false)),
        };
    }
    if let Some(raw) = &filter.post_id {
        cond = match Uuid::parse_str(raw) {
            Ok(id) => cond.add(post::Column::Id.eq(id)),
            Err(_) => cond.add(Expr::value(false)),
        };
    }
    if let Some(category) = &filter.category {
        cond = cond.add(post::Column::Category.eq(category.clone()));
    }
    if let Some(slug) = &filter.slug {
        cond = cond.add(post::Column::Slug.eq(slug.clone()));
    }
    if let Some(term) = &filter.search_term {
        let pattern = format!("%{}%", escape_like(term));
        cond = cond.add(
            Condition::any()
                .add(Expr::col(post::Column::Title).ilike(pattern.clone()))
                .add(Expr::col(post::Column::Content).ilike(pattern)),
        );
    }

    cond
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let result = UserEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        // Mask email for logging to avoid PII in logs. The local part may
        // start with a multi-byte character, so slice by chars, not bytes.
        let masked = match email.split_once('@') {
            Some((local, domain)) => {
                let mut chars = local.chars();
                match chars.next() {
                    Some(first) if chars.next().is_some() => format!("{first}***@{domain}"),
                    _ => format!("***@{domain}"),
                }
            }
            None => "***".to_string(),
        };
        tracing::debug!(user_email = %masked, "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn save(&self, saved: User) -> Result<User, RepoError> {
        let active: user::ActiveModel = saved.into();
        let model = active.insert(&self.db).await.map_err(map_db_err)?;
        Ok(model.into())
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create(&self, created: Post) -> Result<Post, RepoError> {
        let active: post::ActiveModel = created.into();
        let model = active.insert(&self.db).await.map_err(map_db_err)?;
        Ok(model.into())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let result = PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_many(
        &self,
        filter: &PostFilter,
        order: SortOrder,
        page: PageRequest,
    ) -> Result<Vec<Post>, RepoError> {
        let query = PostEntity::find().filter(filter_condition(filter));
        let query = match order {
            SortOrder::Ascending => query.order_by_asc(post::Column::UpdatedAt),
            SortOrder::Descending => query.order_by_desc(post::Column::UpdatedAt),
        };

        let models = query
            .offset(page.offset)
            .limit(page.limit)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn count(&self, filter: &PostFilter) -> Result<u64, RepoError> {
        PostEntity::find()
            .filter(filter_condition(filter))
            .count(&self.db)
            .await
            .map_err(map_db_err)
    }

    async fn count_created_since(&self, instant: DateTime<Utc>) -> Result<u64, RepoError> {
        PostEntity::find()
            .filter(post::Column::CreatedAt.gte(instant))
            .count(&self.db)
            .await
            .map_err(map_db_err)
    }

    async fn update(&self, id: Uuid, changes: PostChanges) -> Result<Post, RepoError> {
        let existing = PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .ok_or(RepoError::NotFound)?;

        let mut active: post::ActiveModel = existing.into();
        if let Some(title) = changes.title {
            active.title = Set(title);
        }
        if let Some(content) = changes.content {
            active.content = Set(content);
        }
        if let Some(category) = changes.category {
            active.category = Set(category);
        }
        if let Some(image) = changes.image {
            active.image = Set(image);
        }
        active.updated_at = Set(Utc::now().into());

        let model = active.update(&self.db).await.map_err(map_db_err)?;
        Ok(model.into())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let result = PostEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }
}
