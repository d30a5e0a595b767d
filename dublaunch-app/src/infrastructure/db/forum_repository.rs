use super::entities::{
    forum_comment, forum_post, ForumComment as ForumCommentEntity, ForumPost as ForumPostEntity,
};
use super::{contains_any, map_db_err};
use crate::application::ports::ForumStore;
use crate::domain::{ForumComment, ForumPost, ForumQuery, ForumSort, NewForumPost};
use async_trait::async_trait;
use dublaunch_errors::AppError;
use sea_orm::sea_query::Expr;
use sea_orm::{
    entity::*, query::*, DatabaseConnection, DatabaseTransaction, DbErr, PaginatorTrait,
    TransactionTrait,
};
use uuid::Uuid;

#[derive(Clone)]
pub struct ForumRepository {
    db: DatabaseConnection,
}

fn post_to_domain(m: forum_post::Model) -> ForumPost {
    ForumPost {
        id: m.id,
        category: m.category,
        author_id: m.author_id,
        title: m.title,
        content: m.content,
        is_pinned: m.is_pinned,
        is_locked: m.is_locked,
        likes_count: m.likes_count,
        comments_count: m.comments_count,
        views_count: m.views_count,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

fn comment_to_domain(m: forum_comment::Model) -> ForumComment {
    ForumComment {
        id: m.id,
        post_id: m.post_id,
        author_id: m.author_id,
        parent_id: m.parent_id,
        content: m.content,
        created_at: m.created_at,
    }
}

enum Rejected {
    MissingPost,
    MissingParent,
    Locked,
}

impl ForumRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn insert_comment_in(
        txn: &DatabaseTransaction,
        data: &ForumComment,
    ) -> Result<Result<forum_comment::Model, Rejected>, DbErr> {
        let Some(post) = ForumPostEntity::find_by_id(data.post_id)
            .lock_exclusive()
            .one(txn)
            .await?
        else {
            return Ok(Err(Rejected::MissingPost));
        };
        if post.is_locked {
            return Ok(Err(Rejected::Locked));
        }

        if let Some(parent_id) = data.parent_id {
            let parent = ForumCommentEntity::find_by_id(parent_id)
                .filter(forum_comment::Column::PostId.eq(data.post_id))
                .one(txn)
                .await?;
            if parent.is_none() {
                return Ok(Err(Rejected::MissingParent));
            }
        }

        let active = forum_comment::ActiveModel {
            id: Set(data.id),
            post_id: Set(data.post_id),
            author_id: Set(data.author_id),
            parent_id: Set(data.parent_id),
            content: Set(data.content.clone()),
            created_at: Set(data.created_at),
        };
        let model = active.insert(txn).await?;

        let live = ForumCommentEntity::find()
            .filter(forum_comment::Column::PostId.eq(data.post_id))
            .count(txn)
            .await? as i32;

        let mut post: forum_post::ActiveModel = post.into();
        post.comments_count = Set(live);
        post.update(txn).await?;

        Ok(Ok(model))
    }
}

#[async_trait]
impl ForumStore for ForumRepository {
    async fn find_post(&self, id: Uuid) -> Result<Option<ForumPost>, AppError> {
        let model = ForumPostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(model.map(post_to_domain))
    }

    async fn insert_post(&self, data: NewForumPost) -> Result<ForumPost, AppError> {
        let now = chrono::Utc::now();
        let active = forum_post::ActiveModel {
            id: Set(data.id),
            category: Set(data.category),
            author_id: Set(data.author_id),
            title: Set(data.title),
            content: Set(data.content),
            is_pinned: Set(data.is_pinned),
            is_locked: Set(data.is_locked),
            likes_count: Set(0),
            comments_count: Set(0),
            views_count: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let model = active.insert(&self.db).await.map_err(map_db_err)?;
        Ok(post_to_domain(model))
    }

    async fn list_posts(&self, query: &ForumQuery) -> Result<Vec<ForumPost>, AppError> {
        let mut select = ForumPostEntity::find();

        if let Some(category) = &query.category {
            select = select.filter(forum_post::Column::Category.eq(category.as_str()));
        }
        if let Some(author) = query.author {
            select = select.filter(forum_post::Column::AuthorId.eq(author));
        }
        if let Some(term) = query.text_term() {
            select = select.filter(contains_any(
                &[forum_post::Column::Title, forum_post::Column::Content],
                term,
            ));
        }

        select = select.order_by_desc(forum_post::Column::IsPinned);
        select = match query.sort {
            ForumSort::Newest => select,
            ForumSort::MostLiked => select.order_by_desc(forum_post::Column::LikesCount),
            ForumSort::MostCommented => select.order_by_desc(forum_post::Column::CommentsCount),
        };

        let models = select
            .order_by_desc(forum_post::Column::CreatedAt)
            .limit(query.limit_or_default())
            .all(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(models.into_iter().map(post_to_domain).collect())
    }

    async fn record_post_view(&self, id: Uuid) -> Result<i32, AppError> {
        let result = ForumPostEntity::update_many()
            .col_expr(
                forum_post::Column::ViewsCount,
                Expr::col(forum_post::Column::ViewsCount).add(1),
            )
            .filter(forum_post::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(AppError::not_found("forum post"));
        }

        let post = ForumPostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .ok_or_else(|| AppError::not_found("forum post"))?;
        Ok(post.views_count)
    }

    async fn insert_comment(&self, data: ForumComment) -> Result<ForumComment, AppError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;

        let outcome = match Self::insert_comment_in(&txn, &data).await {
            Ok(outcome) => outcome,
            Err(e) => {
                txn.rollback().await.map_err(map_db_err)?;
                return Err(map_db_err(e));
            }
        };

        match outcome {
            Ok(model) => {
                txn.commit().await.map_err(map_db_err)?;
                Ok(comment_to_domain(model))
            }
            Err(rejected) => {
                txn.rollback().await.map_err(map_db_err)?;
                Err(match rejected {
                    Rejected::MissingPost => AppError::not_found("forum post"),
                    Rejected::MissingParent => AppError::not_found("parent comment"),
                    Rejected::Locked => AppError::invalid("This thread is locked."),
                })
            }
        }
    }

    async fn comments_for(&self, post_id: Uuid) -> Result<Vec<ForumComment>, AppError> {
        let models = ForumCommentEntity::find()
            .filter(forum_comment::Column::PostId.eq(post_id))
            .order_by_asc(forum_comment::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(models.into_iter().map(comment_to_domain).collect())
    }
}
