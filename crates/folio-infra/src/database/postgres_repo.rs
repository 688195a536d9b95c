//! PostgreSQL post repository.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    AccessMode, ActiveModelTrait, ColumnTrait, EntityTrait, IsolationLevel, NotSet,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use folio_core::ports::PostRepository;
use folio_core::{NewPost, POSTS_PER_PAGE, PaginationInfo, Post, PostPage, PostUpdate, RepoError};

use super::entity::post::{self, Entity as PostEntity};
use super::postgres_base::PostgresBaseRepository;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn get_post(&self, id: i32) -> Result<Post, RepoError> {
        tracing::debug!(post_id = id, "Fetching post");

        self.find_model(id)
            .await
            .map_err(|e| RepoError::backend_for("getting post", id, e))?
            .map(Into::into)
            .ok_or(RepoError::NotFound(id))
    }

    async fn list_posts(&self) -> Result<Vec<Post>, RepoError> {
        let models = PostEntity::find()
            .order_by_desc(post::Column::Created)
            .order_by_desc(post::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| RepoError::backend("getting posts", e))?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn list_posts_paginated(&self, page: i64) -> Result<PostPage, RepoError> {
        // Count and page are read from one snapshot so the page always
        // agrees with the total it was computed from.
        let txn = self
            .db
            .begin_with_config(
                Some(IsolationLevel::RepeatableRead),
                Some(AccessMode::ReadOnly),
            )
            .await
            .map_err(|e| RepoError::backend("starting pagination snapshot", e))?;

        let total = PostEntity::find()
            .count(&txn)
            .await
            .map_err(|e| RepoError::backend("getting total posts count", e))?;

        let pagination = PaginationInfo::new(total, page);

        let models = PostEntity::find()
            .order_by_desc(post::Column::Created)
            .order_by_desc(post::Column::Id)
            .limit(POSTS_PER_PAGE)
            .offset(pagination.offset())
            .all(&txn)
            .await
            .map_err(|e| RepoError::backend("getting paginated posts", e))?;

        txn.commit()
            .await
            .map_err(|e| RepoError::backend("closing pagination snapshot", e))?;

        tracing::debug!(
            requested_page = page,
            current_page = pagination.current_page,
            total_posts = total,
            "Fetched posts page"
        );

        Ok(PostPage {
            posts: models.into_iter().map(Into::into).collect(),
            pagination,
        })
    }

    async fn count_posts(&self) -> Result<u64, RepoError> {
        self.count_models()
            .await
            .map_err(|e| RepoError::backend("getting posts count", e))
    }

    async fn create_post(&self, new_post: NewPost) -> Result<Post, RepoError> {
        let now = Utc::now().fixed_offset();

        let model = post::ActiveModel {
            id: NotSet,
            title: Set(new_post.title),
            description: Set(new_post.description),
            body: Set(new_post.body),
            author: Set(new_post.author),
            created: Set(now),
            edited: Set(now),
        }
        .insert(&self.db)
        .await
        .map_err(|e| RepoError::backend("creating post", e))?;

        tracing::info!(post_id = model.id, "Post created");
        Ok(model.into())
    }

    async fn update_post(&self, id: i32, update: PostUpdate) -> Result<(), RepoError> {
        let mut query = PostEntity::update_many()
            .col_expr(post::Column::Title, Expr::value(update.title.clone()))
            .col_expr(
                post::Column::Description,
                Expr::value(update.description.clone()),
            )
            .col_expr(post::Column::Edited, Expr::value(Utc::now().fixed_offset()));

        if let Some(body) = update.body_change() {
            query = query.col_expr(post::Column::Body, Expr::value(body.to_string()));
        }

        let result = query
            .filter(post::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| RepoError::backend_for("updating post", id, e))?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound(id));
        }

        tracing::info!(post_id = id, "Post updated");
        Ok(())
    }

    async fn delete_post(&self, id: i32) -> Result<(), RepoError> {
        let affected = self
            .delete_model(id)
            .await
            .map_err(|e| RepoError::backend_for("deleting post", id, e))?;

        if affected == 0 {
            return Err(RepoError::NotFound(id));
        }

        tracing::info!(post_id = id, "Post deleted");
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
