use super::launch_catalog::load_authors;
use super::ports::{ForumStore, ProfileStore, VoteStore};
use crate::domain::{
    build_thread, Author, CommentNode, ForumComment, ForumPost, ForumPostDetails, ForumPostInput,
    ForumPostSummary, ForumQuery, NewForumPost, VoteTarget,
};
use crate::infrastructure::security::{InputSanitizer, RateLimiter};
use dublaunch_errors::AppError;
use std::sync::Arc;
use uuid::Uuid;

/// Discussion posts and their reply threads. Likes go through the
/// [`VoteLedger`](super::VoteLedger).
#[derive(Clone)]
pub struct ForumBoard {
    forum: Arc<dyn ForumStore>,
    votes: Arc<dyn VoteStore>,
    profiles: Arc<dyn ProfileStore>,
    rate_limiter: RateLimiter,
}

impl ForumBoard {
    pub fn new(
        forum: Arc<dyn ForumStore>,
        votes: Arc<dyn VoteStore>,
        profiles: Arc<dyn ProfileStore>,
        rate_limiter: RateLimiter,
    ) -> Self {
        Self {
            forum,
            votes,
            profiles,
            rate_limiter,
        }
    }

    pub async fn create_post(
        &self,
        author: Option<Uuid>,
        input: ForumPostInput,
    ) -> Result<ForumPost, AppError> {
        let author = author.ok_or(AppError::Unauthenticated)?;
        self.rate_limiter.check(author)?;
        let input = InputSanitizer::validate_forum_post(input)?;

        let post = self
            .forum
            .insert_post(NewForumPost::new(author, input))
            .await?;
        tracing::info!("Forum post {} in {}", post.id, post.category);
        Ok(post)
    }

    pub async fn posts(&self, query: ForumQuery) -> Result<Vec<ForumPostSummary>, AppError> {
        let posts = self.forum.list_posts(&query).await?;
        let ids = posts.iter().map(|p| p.author_id).collect();
        let authors = load_authors(self.profiles.as_ref(), ids).await?;

        Ok(posts
            .into_iter()
            .map(|post| ForumPostSummary {
                author: Author::from_profile(authors.get(&post.author_id).cloned()),
                post,
            })
            .collect())
    }

    /// The post behind `id`, counting one more view.
    pub async fn post_details(
        &self,
        id: Uuid,
        viewer: Option<Uuid>,
    ) -> Result<ForumPostDetails, AppError> {
        let mut post = self
            .forum
            .find_post(id)
            .await?
            .ok_or_else(|| AppError::not_found("forum post"))?;

        match self.forum.record_post_view(post.id).await {
            Ok(views) => post.views_count = views,
            Err(e) => tracing::warn!("View of post {} not recorded: {}", post.id, e),
        }

        let author = Author::from_profile(self.profiles.find_by_id(post.author_id).await?);
        let viewer_has_liked = match viewer {
            Some(viewer) => {
                self.votes
                    .has_voted(viewer, VoteTarget::ForumPost(post.id))
                    .await?
            }
            None => false,
        };

        Ok(ForumPostDetails {
            post,
            author,
            viewer_has_liked,
        })
    }

    pub async fn post_comment(
        &self,
        author: Option<Uuid>,
        post_id: Uuid,
        parent_id: Option<Uuid>,
        content: &str,
    ) -> Result<ForumComment, AppError> {
        let author = author.ok_or(AppError::Unauthenticated)?;
        self.rate_limiter.check(author)?;
        let content = InputSanitizer::validate_comment(content)?;

        let comment = self
            .forum
            .insert_comment(ForumComment::new(post_id, author, parent_id, content))
            .await?;
        tracing::debug!("Forum comment {} on {}", comment.id, post_id);
        Ok(comment)
    }

    pub async fn thread(&self, post_id: Uuid) -> Result<Vec<CommentNode<ForumComment>>, AppError> {
        let comments = self.forum.comments_for(post_id).await?;
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
