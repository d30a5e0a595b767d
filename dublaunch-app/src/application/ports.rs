//! Storage seams the application services are written against.
//!
//! Two implementations live in `infrastructure`: SeaORM over Postgres, and an
//! in-memory store used by tests and `STORAGE=memory`. Each method is one atomic
//! unit against the store; uniqueness races surface as
//! [`AppError::ConflictRetryable`].

use crate::domain::{
    Comment, ForumComment, ForumPost, ForumQuery, Launch, LaunchQuery, NewForumPost, NewLaunch,
    Profile, Vote, VoteResult, VoteTarget,
};
use async_trait::async_trait;
use dublaunch_errors::AppError;
use uuid::Uuid;

#[async_trait]
pub trait LaunchStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Launch>, AppError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Launch>, AppError>;

    /// True when any launch other than `exclude` holds `slug`, whatever its status.
    async fn slug_exists(&self, slug: &str, exclude: Option<Uuid>) -> Result<bool, AppError>;

    /// Fails with `ConflictRetryable` when the slug was claimed first by someone else.
    async fn insert(&self, launch: NewLaunch) -> Result<Launch, AppError>;

    /// Published launches only.
    async fn list(&self, query: &LaunchQuery) -> Result<Vec<Launch>, AppError>;

    async fn record_view(&self, id: Uuid) -> Result<i32, AppError>;

    /// Removes the launch together with its votes and comments.
    async fn delete(&self, id: Uuid) -> Result<(), AppError>;
}

#[async_trait]
pub trait VoteStore: Send + Sync {
    async fn has_voted(&self, voter_id: Uuid, target: VoteTarget) -> Result<bool, AppError>;

    async fn count(&self, target: VoteTarget) -> Result<i64, AppError>;

    /// Raw insert of one vote row. A second row for the same pair is rejected.
    async fn insert(&self, vote: Vote) -> Result<(), AppError>;

    /// Adds or removes the voter's vote and re-derives the target's counter
    /// (`votes_count` or `likes_count`) from the vote rows, all in one
    /// transaction. `NotFound` when the target is gone or unpublished.
    async fn toggle(&self, voter_id: Uuid, target: VoteTarget) -> Result<VoteResult, AppError>;
}

#[async_trait]
pub trait CommentStore: Send + Sync {
    async fn find(&self, id: Uuid) -> Result<Option<Comment>, AppError>;

    /// Inserts the comment and re-derives `comments_count` in one transaction.
    async fn insert(&self, comment: Comment) -> Result<Comment, AppError>;

    /// Oldest first.
    async fn for_launch(&self, launch_id: Uuid) -> Result<Vec<Comment>, AppError>;
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Profile>, AppError>;

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Profile>, AppError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<Profile>, AppError>;

    /// Case-insensitive substring of username or display name.
    async fn search(&self, term: &str, limit: u64) -> Result<Vec<Profile>, AppError>;

    /// Matches on the identity provider's subject; refreshes name, e-mail and avatar.
    async fn upsert(&self, profile: &Profile) -> Result<Profile, AppError>;
}

#[async_trait]
pub trait ForumStore: Send + Sync {
    async fn find_post(&self, id: Uuid) -> Result<Option<ForumPost>, AppError>;

    async fn insert_post(&self, post: NewForumPost) -> Result<ForumPost, AppError>;

    /// Pinned first, then by `query.sort`.
    async fn list_posts(&self, query: &ForumQuery) -> Result<Vec<ForumPost>, AppError>;

    async fn record_post_view(&self, id: Uuid) -> Result<i32, AppError>;

    /// Inserts the comment and re-derives the post's `comments_count` in one
    /// transaction. `NotFound` when the post or parent is missing, or the
    /// parent belongs to another post; `InvalidInput` when the post is locked.
    async fn insert_comment(&self, comment: ForumComment) -> Result<ForumComment, AppError>;

    /// Oldest first.
    async fn comments_for(&self, post_id: Uuid) -> Result<Vec<ForumComment>, AppError>;
}
