use super::launch_catalog::load_authors;
use super::ports::{CommentStore, ProfileStore};
use crate::domain::{build_thread, Author, Comment, CommentNode};
use crate::infrastructure::security::{InputSanitizer, RateLimiter};
use dublaunch_errors::AppError;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct CommentThreads {
    comments: Arc<dyn CommentStore>,
    profiles: Arc<dyn ProfileStore>,
    rate_limiter: RateLimiter,
}

impl CommentThreads {
    pub fn new(
        comments: Arc<dyn CommentStore>,
        profiles: Arc<dyn ProfileStore>,
        rate_limiter: RateLimiter,
    ) -> Self {
        Self {
            comments,
            profiles,
            rate_limiter,
        }
    }

    /// Posts a top-level comment, or a reply when `parent_id` is set.
    pub async fn post_comment(
        &self,
        author: Option<Uuid>,
        launch_id: Uuid,
        parent_id: Option<Uuid>,
        content: &str,
    ) -> Result<Comment, AppError> {
        let author = author.ok_or(AppError::Unauthenticated)?;
        self.rate_limiter.check(author)?;
        let content = InputSanitizer::validate_comment(content)?;

        let comment = self
            .comments
            .insert(Comment::new(launch_id, author, parent_id, content))
            .await?;
        tracing::debug!("Comment {} on {}", comment.id, launch_id);
        Ok(comment)
    }

    pub async fn thread(&self, launch_id: Uuid) -> Result<Vec<CommentNode>, AppError> {
        let comments = self.comments.for_launch(launch_id).await?;
        let ids = comments.iter().map(|c| c.author_id).collect();
        let authors = load_authors(self.profiles.as_ref(), ids).await?;

        let flat = comments
            .into_iter()
            .map(|c| {
                let author = Author::from_profile(authors.get(&c.author_id).cloned());
                (c, author)
            })
            .collect();
        Ok(build_thread(flat))
    }
}
