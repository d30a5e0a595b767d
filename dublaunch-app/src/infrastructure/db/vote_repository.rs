use super::entities::{
    forum_post, forum_post_like, launch, vote, ForumPost, ForumPostLike, Launch, Vote,
};
use super::map_db_err;
use crate::application::ports::VoteStore;
use crate::domain::{LaunchStatus, VoteResult, VoteTarget};
use async_trait::async_trait;
use dublaunch_errors::AppError;
use sea_orm::{
    entity::*, query::*, DatabaseConnection, DatabaseTransaction, DbErr, PaginatorTrait,
    TransactionTrait,
};
use uuid::Uuid;

/// Launch votes live in `votes`, forum post likes in `forum_post_likes`. Both
/// tables share the (target, voter) primary key and the same toggle.
#[derive(Clone)]
pub struct VoteRepository {
    db: DatabaseConnection,
}

impl VoteRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn toggle_launch_vote_in(
        txn: &DatabaseTransaction,
        voter_id: Uuid,
        launch_id: Uuid,
    ) -> Result<Option<VoteResult>, DbErr> {
        // Row lock on the launch serializes toggles against it and keeps a concurrent
        // delete from slipping in between the vote write and the recount.
        let launch = match Launch::find_by_id(launch_id)
            .filter(launch::Column::Status.eq(LaunchStatus::Published.as_str()))
            .lock_exclusive()
            .one(txn)
            .await?
        {
            Some(l) => l,
            None => return Ok(None),
        };

        let existing = Vote::find_by_id((launch_id, voter_id)).one(txn).await?;

        let voted = if existing.is_some() {
            Vote::delete_by_id((launch_id, voter_id)).exec(txn).await?;
            false
        } else {
            let active = vote::ActiveModel {
                launch_id: Set(launch_id),
                voter_id: Set(voter_id),
                created_at: Set(Some(chrono::Utc::now())),
            };
            Vote::insert(active).exec_without_returning(txn).await?;
            true
        };

        let live = Vote::find()
            .filter(vote::Column::LaunchId.eq(launch_id))
            .count(txn)
            .await? as i32;

        let mut active: launch::ActiveModel = launch.into();
        active.votes_count = Set(live);
        active.update(txn).await?;

        Ok(Some(VoteResult {
            voted,
            new_count: live,
        }))
    }

    async fn toggle_post_like_in(
        txn: &DatabaseTransaction,
        voter_id: Uuid,
        post_id: Uuid,
    ) -> Result<Option<VoteResult>, DbErr> {
        let post = match ForumPost::find_by_id(post_id)
            .lock_exclusive()
            .one(txn)
            .await?
        {
            Some(p) => p,
            None => return Ok(None),
        };

        let existing = ForumPostLike::find_by_id((post_id, voter_id))
            .one(txn)
            .await?;

        let voted = if existing.is_some() {
            ForumPostLike::delete_by_id((post_id, voter_id))
                .exec(txn)
                .await?;
            false
        } else {
            let active = forum_post_like::ActiveModel {
                post_id: Set(post_id),
                voter_id: Set(voter_id),
                created_at: Set(Some(chrono::Utc::now())),
            };
            ForumPostLike::insert(active)
                .exec_without_returning(txn)
                .await?;
            true
        };

        let live = ForumPostLike::find()
            .filter(forum_post_like::Column::PostId.eq(post_id))
            .count(txn)
            .await? as i32;

        let mut active: forum_post::ActiveModel = post.into();
        active.likes_count = Set(live);
        active.update(txn).await?;

        Ok(Some(VoteResult {
            voted,
            new_count: live,
        }))
    }
}

#[async_trait]
impl VoteStore for VoteRepository {
    async fn has_voted(&self, voter_id: Uuid, target: VoteTarget) -> Result<bool, AppError> {
        let found = match target {
            VoteTarget::Launch(id) => Vote::find_by_id((id, voter_id))
                .one(&self.db)
                .await
                .map(|v| v.is_some()),
            VoteTarget::ForumPost(id) => ForumPostLike::find_by_id((id, voter_id))
                .one(&self.db)
                .await
                .map(|l| l.is_some()),
        };
        found.map_err(map_db_err)
    }

    async fn count(&self, target: VoteTarget) -> Result<i64, AppError> {
        let n = match target {
            VoteTarget::Launch(id) => {
                Vote::find()
                    .filter(vote::Column::LaunchId.eq(id))
                    .count(&self.db)
                    .await
            }
            VoteTarget::ForumPost(id) => {
                ForumPostLike::find()
                    .filter(forum_post_like::Column::PostId.eq(id))
                    .count(&self.db)
                    .await
            }
        };
        Ok(n.map_err(map_db_err)? as i64)
    }

    async fn insert(&self, vote_data: crate::domain::Vote) -> Result<(), AppError> {
        let created_at = Set(Some(chrono::Utc::now()));
        let inserted = match vote_data.target {
            VoteTarget::Launch(id) => {
                Vote::insert(vote::ActiveModel {
                    launch_id: Set(id),
                    voter_id: Set(vote_data.voter_id),
                    created_at,
                })
                .exec_without_returning(&self.db)
                .await
            }
            VoteTarget::ForumPost(id) => {
                ForumPostLike::insert(forum_post_like::ActiveModel {
                    post_id: Set(id),
                    voter_id: Set(vote_data.voter_id),
                    created_at,
                })
                .exec_without_returning(&self.db)
                .await
            }
        };
        inserted.map_err(map_db_err)?;
        Ok(())
    }

    async fn toggle(&self, voter_id: Uuid, target: VoteTarget) -> Result<VoteResult, AppError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;

        let toggled = match target {
            VoteTarget::Launch(id) => Self::toggle_launch_vote_in(&txn, voter_id, id).await,
            VoteTarget::ForumPost(id) => Self::toggle_post_like_in(&txn, voter_id, id).await,
        };

        match toggled {
            Ok(Some(result)) => {
                txn.commit().await.map_err(map_db_err)?;
                Ok(result)
            }
            Ok(None) => {
                txn.rollback().await.map_err(map_db_err)?;
                Err(AppError::not_found(target.noun()))
            }
            Err(e) => {
                tracing::debug!("Rolling back toggle on {}: {}", target, e);
                txn.rollback().await.map_err(map_db_err)?;
                Err(map_db_err(e))
            }
        }
    }
}
