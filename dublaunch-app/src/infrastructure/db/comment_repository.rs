use super::entities::{comment, launch, Comment as CommentEntity, Launch};
use super::map_db_err;
use crate::application::ports::CommentStore;
use crate::domain::Comment;
use async_trait::async_trait;
use dublaunch_errors::AppError;
use sea_orm::{
    entity::*, query::*, DatabaseConnection, DatabaseTransaction, DbErr, PaginatorTrait,
    TransactionTrait,
};
use uuid::Uuid;

#[derive(Clone)]
pub struct CommentRepository {
    db: DatabaseConnection,
}

fn to_domain(model: comment::Model) -> Comment {
    Comment {
        id: model.id,
        launch_id: model.launch_id,
        author_id: model.author_id,
        parent_id: model.parent_id,
        content: model.content,
        created_at: model.created_at,
    }
}

enum Missing {
    Launch,
    Parent,
}

impl CommentRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn insert_in(
        txn: &DatabaseTransaction,
        data: &Comment,
    ) -> Result<Result<comment::Model, Missing>, DbErr> {
        let Some(launch) = Launch::find_by_id(data.launch_id)
            .lock_exclusive()
            .one(txn)
            .await?
        else {
            return Ok(Err(Missing::Launch));
        };

        if let Some(parent_id) = data.parent_id {
            let parent = CommentEntity::find_by_id(parent_id)
                .filter(comment::Column::LaunchId.eq(data.launch_id))
                .one(txn)
                .await?;
            if parent.is_none() {
                return Ok(Err(Missing::Parent));
            }
        }

        let active = comment::ActiveModel {
            id: Set(data.id),
            launch_id: Set(data.launch_id),
            author_id: Set(data.author_id),
            parent_id: Set(data.parent_id),
            content: Set(data.content.clone()),
            created_at: Set(data.created_at),
        };
        let model = active.insert(txn).await?;

        let live = CommentEntity::find()
            .filter(comment::Column::LaunchId.eq(data.launch_id))
            .count(txn)
            .await? as i32;

        let mut launch: launch::ActiveModel = launch.into();
        launch.comments_count = Set(live);
        launch.update(txn).await?;

        Ok(Ok(model))
    }
}

#[async_trait]
impl CommentStore for CommentRepository {
    async fn find(&self, id: Uuid) -> Result<Option<Comment>, AppError> {
        let model = CommentEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(model.map(to_domain))
    }

    async fn insert(&self, data: Comment) -> Result<Comment, AppError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;

        let outcome = match Self::insert_in(&txn, &data).await {
            Ok(outcome) => outcome,
            Err(e) => {
                txn.rollback().await.map_err(map_db_err)?;
                return Err(map_db_err(e));
            }
        };

        match outcome {
            Ok(model) => {
                txn.commit().await.map_err(map_db_err)?;
                Ok(to_domain(model))
            }
            Err(missing) => {
                txn.rollback().await.map_err(map_db_err)?;
                Err(match missing {
                    Missing::Launch => AppError::not_found("launch"),
                    Missing::Parent => AppError::not_found("parent comment"),
                })
            }
        }
    }

    async fn for_launch(&self, launch_id: Uuid) -> Result<Vec<Comment>, AppError> {
        let models = CommentEntity::find()
            .filter(comment::Column::LaunchId.eq(launch_id))
            .order_by_asc(comment::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(models.into_iter().map(to_domain).collect())
    }
}
